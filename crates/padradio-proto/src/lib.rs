pub mod bookmarks;
pub mod catalog;
pub mod config;
pub mod error;
pub mod platform;
pub mod protocol;
