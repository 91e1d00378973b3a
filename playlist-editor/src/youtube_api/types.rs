//! Shared response envelopes for the YouTube API client.

use serde::{Deserialize, Serialize};

/// Paging details for lists of resources.
///
/// Includes the total number of items available and the number of resources
/// returned in a single page response.
///
/// See: <https://developers.google.com/youtube/v3/docs/pageInfo>
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// The total number of results in the result set.
    #[serde(rename = "totalResults", default)]
    pub total_results: u32,
    /// The number of results included in the API response.
    #[serde(rename = "resultsPerPage", default)]
    pub results_per_page: u32,
}

/// One page of a `*.list` response.
///
/// The page tokens are opaque. They are only ever handed back to the API as
/// the `pageToken` parameter, never inspected or built locally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Identifies the API resource's type, e.g. `youtube#playlistItemListResponse`.
    #[serde(default)]
    pub kind: String,
    /// The resources on this page, in the order the API returned them.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    /// Token that can be used as the value of the pageToken parameter to retrieve the next page in the result set.
    #[serde(rename = "nextPageToken", skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
    /// Token that can be used as the value of the pageToken parameter to retrieve the previous page in the result set.
    #[serde(rename = "prevPageToken", skip_serializing_if = "Option::is_none")]
    pub prev_page_token: Option<String>,
}
