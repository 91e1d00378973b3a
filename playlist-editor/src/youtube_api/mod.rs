//! YouTube Data API v3 client library, limited to playlists.
//!
//! # Core Concepts: Playlists vs Playlist Items
//!
//! ## [`playlists::Playlist`] - The Container
//! - **What it is**: Title, description, owner, and privacy setting of a playlist
//! - **Use for**: Showing which list the user is looking at, listing a user's own lists
//!
//! ## [`playlist_items::PlaylistItem`] - One Entry
//! - **What it is**: A pointer to a video plus its 0-based `position` in the playlist
//! - **Identity**: Items have their own IDs, distinct from the video ID they point at.
//!   The same video can appear in a playlist more than once.
//! - **Use for**: Listing, reordering, adding, and removing entries
//!
//! Reads of public playlists need only the API key. Anything that writes, or that reads
//! the signed-in user's own playlists, also needs an OAuth bearer token, which every
//! such method takes as an explicit argument.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use youtube_playlist_editor::youtube_api::YouTubeClient;
//!
//! # async fn example() -> eyre::Result<()> {
//! let client = YouTubeClient::new("my-api-key", reqwest::Client::new());
//!
//! let page = client.list_playlist_items("PLWQB0T3rGCzEPRWOqrfSrJW_-A7RsT4qS", None).await?;
//! for item in &page.items {
//!     println!("{:>3} {}", item.snippet.position, item.snippet.title);
//! }
//! if let Some(next) = &page.next_page_token {
//!     let _more = client.list_playlist_items("PLWQB0T3rGCzEPRWOqrfSrJW_-A7RsT4qS", Some(next)).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod playlist_items;
pub mod playlists;
pub mod types;

// Re-export main types for convenience
pub use client::{DEFAULT_API_BASE, MAX_RESULTS, YouTubeClient};
pub use error::ApiError;
pub use types::{ListResponse, PageInfo};

pub use playlist_items::{
    PlaylistItem, PlaylistItemContentDetails, PlaylistItemListResponse, PlaylistItemSnippet,
    PlaylistItemStatus, ResourceId, Thumbnail,
};

pub use playlists::{Playlist, PlaylistListResponse, PlaylistSnippet, PlaylistStatus, PrivacyStatus};
