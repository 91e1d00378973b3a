//! Browse and edit YouTube playlists.
//!
//! The views ([`playlist_view::ListController`], [`item_detail::ItemDetail`],
//! [`my_playlists::MyPlaylists`]) hold all state a front-end renders from and talk to YouTube
//! through a [`backend::PlaylistBackend`]. Writes need the user to have signed in through an
//! [`auth::CredentialGate`].

pub mod auth;
pub mod backend;
pub mod extract;
pub mod item_detail;
pub mod my_playlists;
pub mod oauth;
pub mod playlist_view;
pub mod youtube_api;

pub use playlist_view::ErrorNotice;
