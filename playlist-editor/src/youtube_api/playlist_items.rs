//! YouTube PlaylistItems API types.

use crate::youtube_api::types::ListResponse;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response structure for the `playlistItems.list` API call.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/list>
pub type PlaylistItemListResponse = ListResponse<PlaylistItem>;

/// The only resource kind this client ever places in a playlist.
pub const VIDEO_KIND: &str = "youtube#video";

/// A `playlistItem` resource identifies another resource, such as a video,
/// that is included in a playlist.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#resource>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// Identifies the API resource's type. The value will be `youtube#playlistItem`.
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub etag: String,
    /// The ID that YouTube uses to uniquely identify the playlist item.
    pub id: String,
    pub snippet: PlaylistItemSnippet,
    #[serde(rename = "contentDetails", skip_serializing_if = "Option::is_none")]
    pub content_details: Option<PlaylistItemContentDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PlaylistItemStatus>,
}

/// Basic details about the playlist item such as its title and position in the playlist.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#snippet>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItemSnippet {
    #[serde(rename = "publishedAt", skip_serializing_if = "Option::is_none")]
    pub published_at: Option<Timestamp>,
    #[serde(rename = "channelId", skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Thumbnail images keyed by resolution (`default`, `medium`, `high`, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub thumbnails: BTreeMap<String, Thumbnail>,
    #[serde(rename = "channelTitle", skip_serializing_if = "Option::is_none")]
    pub channel_title: Option<String>,
    /// The ID that YouTube uses to uniquely identify the playlist that the item is in.
    #[serde(rename = "playlistId", default)]
    pub playlist_id: String,
    /// The 0-based order in which the item appears in the playlist.
    #[serde(default)]
    pub position: u32,
    #[serde(rename = "resourceId", default)]
    pub resource_id: ResourceId,
}

/// Identifies the resource (always a video here) that the item points at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceId {
    #[serde(default)]
    pub kind: String,
    #[serde(rename = "videoId", default)]
    pub video_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// See: <https://developers.google.com/youtube/v3/docs/playlistItems#contentDetails>
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaylistItemContentDetails {
    #[serde(rename = "videoId", skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(rename = "startAt", skip_serializing_if = "Option::is_none")]
    pub start_at: Option<String>,
    #[serde(rename = "endAt", skip_serializing_if = "Option::is_none")]
    pub end_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(rename = "videoPublishedAt", skip_serializing_if = "Option::is_none")]
    pub video_published_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistItemStatus {
    #[serde(rename = "privacyStatus", skip_serializing_if = "Option::is_none")]
    pub privacy_status: Option<String>,
}

/// Body of a `playlistItems.update` request.
///
/// Only the fields needed to move an item are sent. Everything else on the
/// resource is left as the server has it.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/update>
#[derive(Debug, Serialize)]
pub struct PlaylistItemUpdateRequest<'a> {
    pub id: &'a str,
    pub snippet: SnippetRef<'a>,
}

/// Body of a `playlistItems.insert` request.
///
/// See: <https://developers.google.com/youtube/v3/docs/playlistItems/insert>
#[derive(Debug, Serialize)]
pub struct PlaylistItemInsertRequest<'a> {
    pub snippet: SnippetRef<'a>,
}

#[derive(Debug, Serialize)]
pub struct SnippetRef<'a> {
    #[serde(rename = "playlistId")]
    pub playlist_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(rename = "resourceId")]
    pub resource_id: ResourceRef<'a>,
}

#[derive(Debug, Serialize)]
pub struct ResourceRef<'a> {
    pub kind: &'static str,
    #[serde(rename = "videoId")]
    pub video_id: &'a str,
}

impl<'a> PlaylistItemUpdateRequest<'a> {
    pub fn from_item(item: &'a PlaylistItem) -> Self {
        Self {
            id: &item.id,
            snippet: SnippetRef {
                playlist_id: &item.snippet.playlist_id,
                position: Some(item.snippet.position),
                resource_id: ResourceRef {
                    kind: VIDEO_KIND,
                    video_id: &item.snippet.resource_id.video_id,
                },
            },
        }
    }
}

impl<'a> PlaylistItemInsertRequest<'a> {
    pub fn new(playlist_id: &'a str, video_id: &'a str) -> Self {
        Self {
            snippet: SnippetRef {
                playlist_id,
                position: None,
                resource_id: ResourceRef {
                    kind: VIDEO_KIND,
                    video_id,
                },
            },
        }
    }
}
