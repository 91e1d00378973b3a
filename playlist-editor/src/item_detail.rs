//! A single playlist item, and moving it to another position.

use crate::auth::SessionStorage;
use crate::backend::PlaylistBackend;
use crate::playlist_view::ErrorNotice;
use crate::youtube_api::PlaylistItem;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailState {
    pub item: Option<PlaylistItem>,
    pub error: Option<ErrorNotice>,
}

/// Drives the item detail page.
#[derive(Debug)]
pub struct ItemDetail<B> {
    backend: B,
    session: SessionStorage,
    state: Mutex<DetailState>,
}

impl<B> ItemDetail<B>
where
    B: PlaylistBackend,
{
    pub fn new(backend: B, session: SessionStorage) -> Self {
        Self {
            backend,
            session,
            state: Mutex::new(DetailState::default()),
        }
    }

    fn view(&self) -> MutexGuard<'_, DetailState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> DetailState {
        self.view().clone()
    }

    /// Looks up the item with ID `item_id`.
    #[tracing::instrument(skip(self))]
    pub async fn load(&self, item_id: &str) {
        let result = self.backend.get_single(item_id).await;
        let signed_in = self.session.access_token().is_ok();

        let mut view = self.view();
        match result {
            Ok(page) => match page.items.into_iter().next() {
                Some(item) => {
                    tracing::debug!(video_id = item.snippet.resource_id.video_id, "loaded item");
                    view.item = Some(item);
                    view.error = None;
                }
                None => {
                    tracing::warn!("no such item");
                    view.item = None;
                    view.error = Some(ErrorNotice::new(
                        "Item not found",
                        crate::youtube_api::error::suggested_fix(404, signed_in),
                    ));
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "could not load item");
                view.error = Some(ErrorNotice::from_api(&e, signed_in));
            }
        }
    }

    /// Moves the loaded item to `position` (0-based).
    ///
    /// Returns the ID of the item's playlist once the move is saved, so the caller can go
    /// back to it. Nothing happens if no position is given, the position is negative, or no
    /// item is loaded.
    #[tracing::instrument(skip(self))]
    pub async fn save_position(&self, position: Option<i64>) -> Option<String> {
        let position = u32::try_from(position?).ok()?;
        let mut item = self.view().item.clone()?;
        item.snippet.position = position;

        let token = self.session.access_token().ok();
        let result = self.backend.update_position(&item, token.as_deref()).await;

        let mut view = self.view();
        match result {
            Ok(updated) => {
                tracing::info!(position = updated.snippet.position, "moved item");
                let playlist_id = updated.snippet.playlist_id.clone();
                view.item = Some(updated);
                view.error = None;
                Some(playlist_id)
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not move item");
                view.error = Some(ErrorNotice::from_api(&e, token.is_some()));
                None
            }
        }
    }

    pub fn clear_errors(&self) {
        self.view().error = None;
    }
}
