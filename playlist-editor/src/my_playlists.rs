//! The signed-in user's own playlists.

use crate::auth::SessionStorage;
use crate::backend::PlaylistBackend;
use crate::playlist_view::ErrorNotice;
use crate::youtube_api::PlaylistListResponse;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MyPlaylistsState {
    pub page_token: Option<String>,
    pub response: Option<PlaylistListResponse>,
    pub error: Option<ErrorNotice>,
}

#[derive(Debug)]
pub struct MyPlaylists<B> {
    backend: B,
    session: SessionStorage,
    state: Mutex<MyPlaylistsState>,
}

impl<B> MyPlaylists<B>
where
    B: PlaylistBackend,
{
    pub fn new(backend: B, session: SessionStorage) -> Self {
        Self {
            backend,
            session,
            state: Mutex::new(MyPlaylistsState::default()),
        }
    }

    fn view(&self) -> MutexGuard<'_, MyPlaylistsState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> MyPlaylistsState {
        self.view().clone()
    }

    /// Fetches the page at the stored page token.
    ///
    /// Listing requires a token; without one the request is still made and the resulting
    /// 401 asks the user to sign in.
    #[tracing::instrument(skip(self))]
    pub async fn fetch(&self) {
        let page_token = self.view().page_token.clone();
        let token = self.session.access_token().ok();
        let result = self
            .backend
            .list_my_playlists(page_token.as_deref(), token.as_deref())
            .await;

        let mut view = self.view();
        match result {
            Ok(response) => {
                tracing::debug!(playlists = response.items.len(), "listed own playlists");
                view.response = Some(response);
                view.error = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not list own playlists");
                view.error = Some(ErrorNotice::from_api(&e, token.is_some()));
            }
        }
    }

    pub async fn to_next_page(&self) {
        let next = self
            .view()
            .response
            .as_ref()
            .and_then(|r| r.next_page_token.clone());
        self.turn_page(next).await
    }

    pub async fn to_prev_page(&self) {
        let prev = self
            .view()
            .response
            .as_ref()
            .and_then(|r| r.prev_page_token.clone());
        self.turn_page(prev).await
    }

    async fn turn_page(&self, page_token: Option<String>) {
        let Some(page_token) = page_token else {
            return;
        };
        self.view().page_token = Some(page_token);
        self.fetch().await
    }
}
