//! The remote playlist operations the views are written against.
//!
//! [`YouTubeClient`] is the real implementation; tests substitute an in-memory one.

use crate::youtube_api::{
    ApiError, PlaylistItem, PlaylistItemListResponse, PlaylistListResponse, YouTubeClient,
};
use std::sync::Arc;

/// CRUD over a playlist's items, plus the playlist lookups the views need.
///
/// Methods that take a `token` send it as the bearer credential when it is `Some`, and send
/// the request without one otherwise.
// Callers are generic over the backend and never need `Send` futures.
#[allow(async_fn_in_trait)]
pub trait PlaylistBackend {
    /// One page (up to 50 items) of a playlist. `None` is the first page.
    async fn list_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemListResponse, ApiError>;

    /// A single item by ID; the caller reads `items[0]`.
    async fn get_single(&self, item_id: &str) -> Result<PlaylistItemListResponse, ApiError>;

    async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistListResponse, ApiError>;

    async fn list_my_playlists(
        &self,
        page_token: Option<&str>,
        token: Option<&str>,
    ) -> Result<PlaylistListResponse, ApiError>;

    /// Moves `item` to `item.snippet.position`.
    async fn update_position(
        &self,
        item: &PlaylistItem,
        token: Option<&str>,
    ) -> Result<PlaylistItem, ApiError>;

    async fn add_item(
        &self,
        playlist_id: &str,
        video_id: &str,
        token: Option<&str>,
    ) -> Result<PlaylistItem, ApiError>;

    async fn delete_item(&self, item_id: &str, token: Option<&str>) -> Result<(), ApiError>;

    /// Deletes `items` one at a time, in order, each call finishing before the next starts.
    ///
    /// Stops at the first failure and returns its error. Items deleted before that stay
    /// deleted.
    async fn delete_items(
        &self,
        items: &[PlaylistItem],
        token: Option<&str>,
    ) -> Result<usize, ApiError> {
        for (i, item) in items.iter().enumerate() {
            if let Err(e) = self.delete_item(&item.id, token).await {
                tracing::warn!(
                    deleted = i,
                    remaining = items.len() - i,
                    item_id = item.id,
                    "batch delete stopped early"
                );
                return Err(e);
            }
        }
        Ok(items.len())
    }
}

impl PlaylistBackend for YouTubeClient {
    async fn list_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemListResponse, ApiError> {
        self.list_playlist_items(playlist_id, page_token).await
    }

    async fn get_single(&self, item_id: &str) -> Result<PlaylistItemListResponse, ApiError> {
        self.get_playlist_item(item_id).await
    }

    async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistListResponse, ApiError> {
        YouTubeClient::get_playlist(self, playlist_id).await
    }

    async fn list_my_playlists(
        &self,
        page_token: Option<&str>,
        token: Option<&str>,
    ) -> Result<PlaylistListResponse, ApiError> {
        YouTubeClient::list_my_playlists(self, page_token, token).await
    }

    async fn update_position(
        &self,
        item: &PlaylistItem,
        token: Option<&str>,
    ) -> Result<PlaylistItem, ApiError> {
        self.update_playlist_item(item, token).await
    }

    async fn add_item(
        &self,
        playlist_id: &str,
        video_id: &str,
        token: Option<&str>,
    ) -> Result<PlaylistItem, ApiError> {
        self.insert_playlist_item(playlist_id, video_id, token).await
    }

    async fn delete_item(&self, item_id: &str, token: Option<&str>) -> Result<(), ApiError> {
        self.delete_playlist_item(item_id, token).await
    }
}

impl<B> PlaylistBackend for Arc<B>
where
    B: PlaylistBackend,
{
    async fn list_page(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemListResponse, ApiError> {
        (**self).list_page(playlist_id, page_token).await
    }

    async fn get_single(&self, item_id: &str) -> Result<PlaylistItemListResponse, ApiError> {
        (**self).get_single(item_id).await
    }

    async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistListResponse, ApiError> {
        (**self).get_playlist(playlist_id).await
    }

    async fn list_my_playlists(
        &self,
        page_token: Option<&str>,
        token: Option<&str>,
    ) -> Result<PlaylistListResponse, ApiError> {
        (**self).list_my_playlists(page_token, token).await
    }

    async fn update_position(
        &self,
        item: &PlaylistItem,
        token: Option<&str>,
    ) -> Result<PlaylistItem, ApiError> {
        (**self).update_position(item, token).await
    }

    async fn add_item(
        &self,
        playlist_id: &str,
        video_id: &str,
        token: Option<&str>,
    ) -> Result<PlaylistItem, ApiError> {
        (**self).add_item(playlist_id, video_id, token).await
    }

    async fn delete_item(&self, item_id: &str, token: Option<&str>) -> Result<(), ApiError> {
        (**self).delete_item(item_id, token).await
    }

    async fn delete_items(
        &self,
        items: &[PlaylistItem],
        token: Option<&str>,
    ) -> Result<usize, ApiError> {
        (**self).delete_items(items, token).await
    }
}

/// An in-memory playlist service for exercising the views.
#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use crate::youtube_api::{ListResponse, PageInfo, Playlist, PlaylistItemSnippet, ResourceId};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::Notify;

    /// What the views asked for, in order.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum Call {
        ListPage {
            playlist_id: String,
            page_token: Option<String>,
        },
        GetSingle(String),
        GetPlaylist(String),
        ListMine {
            page_token: Option<String>,
            token: Option<String>,
        },
        Update {
            item_id: String,
            position: u32,
            token: Option<String>,
        },
        Add {
            playlist_id: String,
            video_id: String,
            token: Option<String>,
        },
        Delete {
            item_id: String,
            token: Option<String>,
        },
    }

    #[derive(Debug, Default)]
    pub(crate) struct FakeBackend {
        /// Every playlist's items, in position order.
        pub cloud: Mutex<HashMap<String, Vec<PlaylistItem>>>,
        pub calls: Mutex<Vec<Call>>,
        /// Page returned by `list_page`, overriding `cloud`, keyed by page token.
        pub pages: Mutex<HashMap<Option<String>, PlaylistItemListResponse>>,
        pub my_playlists: Mutex<HashMap<Option<String>, PlaylistListResponse>>,
        /// Makes the matching operation fail with this status.
        pub fail_list: Mutex<Option<u16>>,
        pub fail_playlist: Mutex<Option<u16>>,
        pub fail_add: Mutex<Option<u16>>,
        pub fail_update: Mutex<Option<u16>>,
        /// Item IDs whose deletion fails with 403.
        pub fail_delete: Mutex<Vec<String>>,
        /// When set, `list_page` waits here before answering.
        pub list_gate: Mutex<Option<Arc<Notify>>>,
        next_id: Mutex<u32>,
    }

    pub(crate) fn item(playlist_id: &str, id: &str, position: u32) -> PlaylistItem {
        PlaylistItem {
            kind: "youtube#playlistItem".to_string(),
            id: id.to_string(),
            snippet: PlaylistItemSnippet {
                title: format!("video {id}"),
                playlist_id: playlist_id.to_string(),
                position,
                resource_id: ResourceId {
                    kind: "youtube#video".to_string(),
                    video_id: format!("v-{id}"),
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn server_error(status: u16) -> ApiError {
        ApiError::Server {
            status,
            message: format!("fake failure {status}"),
        }
    }

    impl FakeBackend {
        pub(crate) fn with_playlist(playlist_id: &str, len: u32) -> Arc<Self> {
            let fake = Self::default();
            fake.cloud.lock().unwrap().insert(
                playlist_id.to_string(),
                (0..len)
                    .map(|i| item(playlist_id, &format!("item{i}"), i))
                    .collect(),
            );
            Arc::new(fake)
        }

        pub(crate) fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn clear_calls(&self) {
            self.calls.lock().unwrap().clear();
        }

        pub(crate) fn set_page(&self, page_token: Option<&str>, page: PlaylistItemListResponse) {
            self.pages
                .lock()
                .unwrap()
                .insert(page_token.map(str::to_string), page);
        }

        pub(crate) fn cloud_ids(&self, playlist_id: &str) -> Vec<String> {
            self.cloud.lock().unwrap()[playlist_id]
                .iter()
                .map(|i| i.id.clone())
                .collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl PlaylistBackend for FakeBackend {
        async fn list_page(
            &self,
            playlist_id: &str,
            page_token: Option<&str>,
        ) -> Result<PlaylistItemListResponse, ApiError> {
            self.record(Call::ListPage {
                playlist_id: playlist_id.to_string(),
                page_token: page_token.map(str::to_string),
            });
            let gate = self.list_gate.lock().unwrap().clone();
            if let Some(gate) = gate {
                gate.notified().await;
            }
            if let Some(status) = *self.fail_list.lock().unwrap() {
                return Err(server_error(status));
            }
            if let Some(page) = self.pages.lock().unwrap().get(&page_token.map(str::to_string)) {
                return Ok(page.clone());
            }
            let cloud = self.cloud.lock().unwrap();
            let Some(items) = cloud.get(playlist_id) else {
                return Err(server_error(404));
            };
            Ok(ListResponse {
                kind: "youtube#playlistItemListResponse".to_string(),
                items: items.iter().take(50).cloned().collect(),
                page_info: PageInfo {
                    total_results: items.len() as u32,
                    results_per_page: 50,
                },
                next_page_token: None,
                prev_page_token: None,
            })
        }

        async fn get_single(&self, item_id: &str) -> Result<PlaylistItemListResponse, ApiError> {
            self.record(Call::GetSingle(item_id.to_string()));
            let cloud = self.cloud.lock().unwrap();
            let items: Vec<_> = cloud
                .values()
                .flatten()
                .filter(|i| i.id == item_id)
                .cloned()
                .collect();
            Ok(ListResponse {
                page_info: PageInfo {
                    total_results: items.len() as u32,
                    results_per_page: 50,
                },
                items,
                ..Default::default()
            })
        }

        async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistListResponse, ApiError> {
            self.record(Call::GetPlaylist(playlist_id.to_string()));
            if let Some(status) = *self.fail_playlist.lock().unwrap() {
                return Err(server_error(status));
            }
            let mut playlist = Playlist {
                id: playlist_id.to_string(),
                ..Default::default()
            };
            playlist.snippet.title = format!("playlist {playlist_id}");
            Ok(ListResponse {
                items: vec![playlist],
                ..Default::default()
            })
        }

        async fn list_my_playlists(
            &self,
            page_token: Option<&str>,
            token: Option<&str>,
        ) -> Result<PlaylistListResponse, ApiError> {
            self.record(Call::ListMine {
                page_token: page_token.map(str::to_string),
                token: token.map(str::to_string),
            });
            if token.is_none() {
                return Err(server_error(401));
            }
            Ok(self
                .my_playlists
                .lock()
                .unwrap()
                .get(&page_token.map(str::to_string))
                .cloned()
                .unwrap_or_default())
        }

        async fn update_position(
            &self,
            item: &PlaylistItem,
            token: Option<&str>,
        ) -> Result<PlaylistItem, ApiError> {
            self.record(Call::Update {
                item_id: item.id.clone(),
                position: item.snippet.position,
                token: token.map(str::to_string),
            });
            if let Some(status) = *self.fail_update.lock().unwrap() {
                return Err(server_error(status));
            }
            let mut cloud = self.cloud.lock().unwrap();
            let items = cloud
                .get_mut(&item.snippet.playlist_id)
                .ok_or_else(|| server_error(404))?;
            let from = items
                .iter()
                .position(|i| i.id == item.id)
                .ok_or_else(|| server_error(404))?;
            let moved = items.remove(from);
            let to = (item.snippet.position as usize).min(items.len());
            items.insert(to, moved);
            for (i, it) in items.iter_mut().enumerate() {
                it.snippet.position = i as u32;
            }
            Ok(items[to].clone())
        }

        async fn add_item(
            &self,
            playlist_id: &str,
            video_id: &str,
            token: Option<&str>,
        ) -> Result<PlaylistItem, ApiError> {
            self.record(Call::Add {
                playlist_id: playlist_id.to_string(),
                video_id: video_id.to_string(),
                token: token.map(str::to_string),
            });
            if let Some(status) = *self.fail_add.lock().unwrap() {
                return Err(server_error(status));
            }
            let id = {
                let mut next = self.next_id.lock().unwrap();
                *next += 1;
                format!("added{next}")
            };
            let mut cloud = self.cloud.lock().unwrap();
            let items = cloud.entry(playlist_id.to_string()).or_default();
            let mut new = item(playlist_id, &id, items.len() as u32);
            new.snippet.resource_id.video_id = video_id.to_string();
            items.push(new.clone());
            Ok(new)
        }

        async fn delete_item(&self, item_id: &str, token: Option<&str>) -> Result<(), ApiError> {
            self.record(Call::Delete {
                item_id: item_id.to_string(),
                token: token.map(str::to_string),
            });
            if self.fail_delete.lock().unwrap().iter().any(|id| id == item_id) {
                return Err(server_error(403));
            }
            for items in self.cloud.lock().unwrap().values_mut() {
                items.retain(|i| i.id != item_id);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn batch_delete_is_serial_and_stops_at_first_failure() {
        let fake = FakeBackend::with_playlist("PL", 4);
        fake.fail_delete.lock().unwrap().push("item2".to_string());

        let targets: Vec<_> = ["item0", "item2", "item3"]
            .iter()
            .map(|id| item("PL", id, 0))
            .collect();
        let e = fake.delete_items(&targets, Some("tok")).await.unwrap_err();
        assert_eq!(e.status(), Some(403));

        // item0 is gone and stays gone; item3 was never attempted
        assert_eq!(fake.cloud_ids("PL"), ["item1", "item2", "item3"]);
        let deleted: Vec<_> = fake
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete { item_id, .. } => Some(item_id),
                _ => None,
            })
            .collect();
        assert_eq!(deleted, ["item0", "item2"]);
    }

    #[tokio::test]
    async fn batch_delete_reports_count() {
        let fake = FakeBackend::with_playlist("PL", 3);
        let targets = vec![item("PL", "item0", 0), item("PL", "item1", 1)];
        assert_eq!(fake.delete_items(&targets, None).await.unwrap(), 2);
        assert_eq!(fake.cloud_ids("PL"), ["item2"]);
    }
}
