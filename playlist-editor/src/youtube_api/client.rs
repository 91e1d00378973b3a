//! Core YouTube API client functionality.

use crate::youtube_api::{
    error::ApiError,
    playlist_items::{
        PlaylistItem, PlaylistItemInsertRequest, PlaylistItemListResponse,
        PlaylistItemUpdateRequest,
    },
    playlists::PlaylistListResponse,
};
use http::Method;
use serde::Serialize;
use std::sync::Arc;
use tracing::instrument;

/// Where the YouTube Data API v3 lives.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// The largest page `*.list` endpoints will return.
pub const MAX_RESULTS: u32 = 50;

/// Client for the playlist corners of the YouTube Data API v3.
///
/// The client itself holds no credentials. Calls that modify a playlist (or read the
/// signed-in user's playlists) take the bearer token as an argument, and simply omit the
/// `Authorization` header when given `None`, leaving it to the API to reject the request.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    /// HTTP client for API requests
    client: reqwest::Client,
    /// API key sent as `key=` on every request
    api_key: Arc<str>,
    /// Base URL the resource paths are appended to
    base_url: Arc<str>,
}

impl YouTubeClient {
    /// Creates a client talking to the public YouTube API.
    pub fn new(api_key: impl Into<String>, client: reqwest::Client) -> Self {
        Self::with_base_url(api_key, client, DEFAULT_API_BASE)
    }

    /// Creates a client talking to the API at `base_url` (no trailing slash).
    pub fn with_base_url(
        api_key: impl Into<String>,
        client: reqwest::Client,
        base_url: impl Into<String>,
    ) -> Self {
        let api_key: String = api_key.into();
        let base_url: String = base_url.into();
        Self {
            client,
            api_key: Arc::from(api_key),
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    /// Makes an HTTP request to the YouTube API with common error handling.
    ///
    /// This method consolidates the shared logic across all YouTube API requests:
    /// - API key and query parameters
    /// - Authorization header, when a token is given
    /// - JSON body, when one is given
    /// - Status code validation and error mapping
    ///
    /// # Returns
    ///
    /// The raw [`reqwest::Response`] for method-specific JSON parsing.
    #[instrument(skip(self, json_body, token), level = tracing::Level::TRACE)]
    async fn make_request(
        &self,
        method: Method,
        resource: &str,
        query_params: &[(&str, &str)],
        json_body: Option<&impl Serialize>,
        token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}/{}", self.base_url, resource);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .query(&[("key", &*self.api_key)])
            .query(query_params);

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        if let Some(body) = json_body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::from).inspect_err(|e| {
            tracing::error!(%method, url = %url, error = %e, "YouTube API request did not complete");
        })?;

        let status_code = response.status();
        if !status_code.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let e = ApiError::from_response_body(status_code.as_u16(), &error_text);
            tracing::warn!(%method, url = %url, error = %e, "YouTube API request failed");
            return Err(e);
        }

        Ok(response)
    }

    /// Fetches one page of the items in a playlist.
    ///
    /// This is a public read, so no credentials are sent.
    ///
    /// # Arguments
    ///
    /// * `playlist_id` - The playlist to list
    /// * `page_token` - The page to fetch; `None` fetches the first page
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/list>
    #[instrument(skip(self))]
    pub async fn list_playlist_items(
        &self,
        playlist_id: &str,
        page_token: Option<&str>,
    ) -> Result<PlaylistItemListResponse, ApiError> {
        let max_results = MAX_RESULTS.to_string();
        let mut query_params = vec![
            ("part", "snippet"),
            ("playlistId", playlist_id),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(token) = page_token {
            query_params.push(("pageToken", token));
        }

        let items: PlaylistItemListResponse = self
            .make_request(Method::GET, "playlistItems", &query_params, None::<&()>, None)
            .await?
            .json()
            .await?;

        tracing::debug!(
            total_results = items.page_info.total_results,
            returned_items = items.items.len(),
            "fetched playlist items"
        );

        Ok(items)
    }

    /// Looks up a single playlist item by its ID.
    ///
    /// The API answers with a list response; the item, if it exists, is `items[0]`.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/list>
    #[instrument(skip(self))]
    pub async fn get_playlist_item(
        &self,
        item_id: &str,
    ) -> Result<PlaylistItemListResponse, ApiError> {
        let query_params = [("part", "snippet"), ("id", item_id)];

        let items: PlaylistItemListResponse = self
            .make_request(Method::GET, "playlistItems", &query_params, None::<&()>, None)
            .await?
            .json()
            .await?;

        tracing::debug!(item_id, returned_items = items.items.len(), "fetched playlist item");
        Ok(items)
    }

    /// Looks up a playlist's metadata by its ID.
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlists/list>
    #[instrument(skip(self))]
    pub async fn get_playlist(&self, playlist_id: &str) -> Result<PlaylistListResponse, ApiError> {
        let query_params = [("part", "snippet,status"), ("id", playlist_id)];

        let playlists: PlaylistListResponse = self
            .make_request(Method::GET, "playlists", &query_params, None::<&()>, None)
            .await?
            .json()
            .await?;

        tracing::debug!(
            playlist_id,
            returned_items = playlists.items.len(),
            "fetched playlist"
        );
        Ok(playlists)
    }

    /// Fetches one page of the signed-in user's own playlists.
    ///
    /// Uses `mine=true`, so this only works with a token. Privacy status is included.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlists/list>
    #[instrument(skip(self, token))]
    pub async fn list_my_playlists(
        &self,
        page_token: Option<&str>,
        token: Option<&str>,
    ) -> Result<PlaylistListResponse, ApiError> {
        let max_results = MAX_RESULTS.to_string();
        let mut query_params = vec![
            ("part", "snippet,status"),
            ("mine", "true"),
            ("maxResults", max_results.as_str()),
        ];
        if let Some(page_token) = page_token {
            query_params.push(("pageToken", page_token));
        }

        let playlists: PlaylistListResponse = self
            .make_request(Method::GET, "playlists", &query_params, None::<&()>, token)
            .await?
            .json()
            .await?;

        tracing::debug!(
            total_results = playlists.page_info.total_results,
            returned_items = playlists.items.len(),
            "fetched own playlists"
        );
        Ok(playlists)
    }

    /// Moves a playlist item to `item.snippet.position`.
    ///
    /// Only the item's ID, playlist, position, and video are sent.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/update>
    #[instrument(skip(self, item, token), fields(item_id = %item.id, position = item.snippet.position))]
    pub async fn update_playlist_item(
        &self,
        item: &PlaylistItem,
        token: Option<&str>,
    ) -> Result<PlaylistItem, ApiError> {
        let body = PlaylistItemUpdateRequest::from_item(item);

        let updated: PlaylistItem = self
            .make_request(
                Method::PUT,
                "playlistItems",
                &[("part", "snippet")],
                Some(&body),
                token,
            )
            .await?
            .json()
            .await?;

        tracing::debug!(item_id = updated.id, "successfully updated playlist item");
        Ok(updated)
    }

    /// Appends a video to a playlist.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/insert>
    #[instrument(skip(self, token))]
    pub async fn insert_playlist_item(
        &self,
        playlist_id: &str,
        video_id: &str,
        token: Option<&str>,
    ) -> Result<PlaylistItem, ApiError> {
        let body = PlaylistItemInsertRequest::new(playlist_id, video_id);

        let created: PlaylistItem = self
            .make_request(
                Method::POST,
                "playlistItems",
                &[("part", "snippet")],
                Some(&body),
                token,
            )
            .await?
            .json()
            .await?;

        tracing::debug!(item_id = created.id, "successfully added playlist item");
        Ok(created)
    }

    /// Removes one item from its playlist.
    ///
    /// # Required Scopes
    ///
    /// * `https://www.googleapis.com/auth/youtube`
    ///
    /// # API Reference
    ///
    /// <https://developers.google.com/youtube/v3/docs/playlistItems/delete>
    #[instrument(skip(self, token))]
    pub async fn delete_playlist_item(
        &self,
        item_id: &str,
        token: Option<&str>,
    ) -> Result<(), ApiError> {
        let _response = self
            .make_request(
                Method::DELETE,
                "playlistItems",
                &[("id", item_id)],
                None::<&()>,
                token,
            )
            .await?;

        tracing::debug!(item_id, "successfully deleted playlist item");
        Ok(())
    }
}
