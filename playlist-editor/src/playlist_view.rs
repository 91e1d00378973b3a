//! The playlist page: one page of a playlist's items and what the user can do to them.
//!
//! [`ListController`] owns a [`ViewState`] and is the only thing that changes it. Every
//! operation takes `&self`, so a front-end can have several in flight at once (say, an add
//! while a page is still loading). They settle in whatever order the network answers, and
//! each one applies its result to whatever the state is at that moment. No operation returns
//! an error: failures land in [`ViewState::error`] for the front-end to show.
//!
//! The page-change and delete affordances are disabled while the operations they trigger
//! are pending, and enabled again once those settle, whichever way they settle.

use crate::auth::SessionStorage;
use crate::backend::PlaylistBackend;
use crate::extract;
use crate::youtube_api::{ApiError, PageInfo, Playlist, PlaylistItem};
use std::collections::BTreeSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// An error as the user sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub message: String,
    pub suggested_fix: Option<String>,
}

impl ErrorNotice {
    pub fn new(message: impl Into<String>, suggested_fix: Option<&str>) -> Self {
        Self {
            message: message.into(),
            suggested_fix: suggested_fix.map(str::to_string),
        }
    }

    /// `signed_in` is whether the failed request carried a bearer token.
    pub fn from_api(error: &ApiError, signed_in: bool) -> Self {
        Self::new(error.to_string(), error.suggested_fix(signed_in))
    }

    pub(crate) fn no_playlist() -> Self {
        Self::new("No playlist selected", Some("Look up a playlist first."))
    }
}

/// Everything the playlist page renders from.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// The playlist being shown. Cleared when looking it up fails.
    pub playlist_id: Option<String>,
    /// Metadata of the playlist being shown.
    pub playlist: Option<Playlist>,
    /// The page to fetch next time; `None` is the first page.
    pub page_token: Option<String>,
    /// Items on the current page, including any added since it was fetched.
    pub items: Vec<PlaylistItem>,
    /// Paging details of the last fetched page. `total_results` is bumped by adds.
    pub page_info: PageInfo,
    pub next_page_token: Option<String>,
    pub prev_page_token: Option<String>,
    /// Indices into `items` that the user has marked for deletion.
    pub marked: BTreeSet<usize>,
    pub allow_page_change: bool,
    pub allow_delete: bool,
    pub error: Option<ErrorNotice>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            playlist_id: None,
            playlist: None,
            page_token: None,
            items: Vec::new(),
            page_info: PageInfo::default(),
            next_page_token: None,
            prev_page_token: None,
            marked: BTreeSet::new(),
            // nothing is pending before the first fetch
            allow_page_change: true,
            allow_delete: true,
            error: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Prev,
    Next,
}

/// Drives the playlist page.
#[derive(Debug)]
pub struct ListController<B> {
    backend: B,
    session: SessionStorage,
    state: Mutex<ViewState>,
}

impl<B> ListController<B>
where
    B: PlaylistBackend,
{
    pub fn new(backend: B, session: SessionStorage) -> Self {
        Self {
            backend,
            session,
            state: Mutex::new(ViewState::default()),
        }
    }

    // The lock is only ever held between awaits, never across one.
    fn view(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> ViewState {
        self.view().clone()
    }

    fn token(&self) -> Option<String> {
        self.session.access_token().ok()
    }

    /// Shows the playlist named by `raw`, which may be an ID or a playlist URL.
    ///
    /// Fetches the page at the stored page token along with the playlist's metadata. Blank
    /// input does nothing.
    #[tracing::instrument(skip(self))]
    pub async fn fetch_items(&self, raw: &str) {
        let Some(playlist_id) = extract::playlist_id(raw) else {
            tracing::trace!("blank playlist input ignored");
            return;
        };

        let page_token = {
            let mut view = self.view();
            view.playlist_id = Some(playlist_id.clone());
            view.allow_page_change = false;
            view.allow_delete = false;
            view.page_token.clone()
        };

        let (page, playlist) = tokio::join!(
            self.backend.list_page(&playlist_id, page_token.as_deref()),
            self.backend.get_playlist(&playlist_id),
        );

        let mut view = self.view();
        match (page, playlist) {
            (Ok(page), Ok(playlists)) => {
                tracing::debug!(
                    playlist_id,
                    items = page.items.len(),
                    total = page.page_info.total_results,
                    "showing playlist page"
                );
                view.items = page.items;
                view.page_info = page.page_info;
                view.next_page_token = page.next_page_token;
                view.prev_page_token = page.prev_page_token;
                view.playlist = playlists.items.into_iter().next();
                view.marked.clear();
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(playlist_id, error = %e, "could not load playlist");
                view.error = Some(ErrorNotice::from_api(&e, self.session.access_token().is_ok()));
                // don't retry a bad ID on the next page turn or delete
                view.playlist_id = None;
            }
        }
        view.allow_page_change = true;
        view.allow_delete = true;
    }

    /// Looks up a new playlist from its first page, dropping any error on screen.
    pub async fn open(&self, raw: &str) {
        self.clear_page_token();
        self.clear_errors();
        self.fetch_items(raw).await;
    }

    /// Appends the video named by `raw` (an ID or a watch URL) to the current playlist.
    ///
    /// The returned item is appended locally without re-fetching. Blank input does nothing.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(&self, raw: &str) {
        let Some(video_id) = extract::video_id(raw) else {
            tracing::trace!("blank video input ignored");
            return;
        };

        let playlist_id = self.view().playlist_id.clone();
        let Some(playlist_id) = playlist_id else {
            self.view().error = Some(ErrorNotice::no_playlist());
            return;
        };

        let token = self.token();
        let result = self
            .backend
            .add_item(&playlist_id, &video_id, token.as_deref())
            .await;

        let mut view = self.view();
        match result {
            Ok(item) => {
                tracing::debug!(item_id = item.id, video_id, "added to playlist");
                view.items.push(item);
                view.page_info.total_results += 1;
            }
            Err(e) => {
                tracing::warn!(video_id, error = %e, "could not add video");
                view.error = Some(ErrorNotice::from_api(&e, token.is_some()));
            }
        }
    }

    /// Marks or unmarks the item at `index` for deletion.
    pub fn toggle_mark(&self, index: usize) {
        let mut view = self.view();
        if !view.marked.remove(&index) {
            view.marked.insert(index);
        }
    }

    /// Deletes every marked item, then re-fetches the page.
    ///
    /// If the deletion fails the marks are kept so the user can simply try again.
    #[tracing::instrument(skip(self))]
    pub async fn delete_marked(&self) {
        let (targets, playlist_id) = {
            let mut view = self.view();
            if view.marked.is_empty() {
                return;
            }
            let targets: Vec<PlaylistItem> = view
                .marked
                .iter()
                .filter_map(|&i| view.items.get(i).cloned())
                .collect();
            view.allow_delete = false;
            (targets, view.playlist_id.clone())
        };

        let token = self.token();
        let result = self.backend.delete_items(&targets, token.as_deref()).await;

        {
            let mut view = self.view();
            match result {
                Ok(deleted) => {
                    tracing::info!(deleted, "deleted marked items");
                    let gone: BTreeSet<&str> = targets.iter().map(|t| t.id.as_str()).collect();
                    view.items.retain(|i| !gone.contains(i.id.as_str()));
                    view.page_info.total_results =
                        view.page_info.total_results.saturating_sub(deleted as u32);
                    view.marked.clear();
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not delete marked items");
                    view.error = Some(ErrorNotice::from_api(&e, token.is_some()));
                    view.allow_delete = true;
                    return;
                }
            }
            if playlist_id.is_none() {
                view.allow_delete = true;
                return;
            }
        }

        if let Some(playlist_id) = playlist_id {
            self.fetch_items(&playlist_id).await;
        }
    }

    pub async fn to_prev_page(&self) {
        self.turn_page(Direction::Prev).await
    }

    pub async fn to_next_page(&self) {
        self.turn_page(Direction::Next).await
    }

    #[tracing::instrument(skip(self))]
    async fn turn_page(&self, direction: Direction) {
        let playlist_id = {
            let mut view = self.view();
            view.allow_page_change = false;
            let token = match direction {
                Direction::Prev => view.prev_page_token.clone(),
                Direction::Next => view.next_page_token.clone(),
            };
            match (token, view.playlist_id.clone()) {
                (Some(token), Some(playlist_id)) => {
                    view.page_token = Some(token);
                    playlist_id
                }
                _ => {
                    tracing::debug!("no page in that direction");
                    view.allow_page_change = true;
                    return;
                }
            }
        };

        self.fetch_items(&playlist_id).await;
    }

    pub fn clear_errors(&self) {
        self.view().error = None;
    }

    /// Goes back to the first page for the next fetch.
    pub fn clear_page_token(&self) {
        self.view().page_token = None;
    }
}
