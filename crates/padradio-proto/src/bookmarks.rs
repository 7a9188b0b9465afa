use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::error::RadioError;
use crate::protocol::BookmarkSlot;

/// On-disk shape of the bookmark file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookmarkSet {
    #[serde(rename = "bookmark_A", default)]
    pub a: Option<String>,
    #[serde(rename = "bookmark_B", default)]
    pub b: Option<String>,
}

impl BookmarkSet {
    pub fn get(&self, slot: BookmarkSlot) -> Option<&str> {
        match slot {
            BookmarkSlot::A => self.a.as_deref(),
            BookmarkSlot::B => self.b.as_deref(),
        }
    }

    pub fn set(&mut self, slot: BookmarkSlot, name: String) {
        match slot {
            BookmarkSlot::A => self.a = Some(name),
            BookmarkSlot::B => self.b = Some(name),
        }
    }
}

/// Two persisted station bookmarks.  Every `set` is written through to disk
/// before it returns.
pub struct BookmarkStore {
    bookmarks: BookmarkSet,
    file: PathBuf,
}

impl BookmarkStore {
    /// Open the store.  A missing or corrupt file leaves both slots empty.
    pub fn open(file: PathBuf) -> Self {
        let bookmarks = Self::load_persistent(&file);
        Self { bookmarks, file }
    }

    pub fn get(&self, slot: BookmarkSlot) -> Option<&str> {
        self.bookmarks.get(slot)
    }

    pub fn snapshot(&self) -> &BookmarkSet {
        &self.bookmarks
    }

    pub async fn set(&mut self, slot: BookmarkSlot, name: &str) -> Result<(), RadioError> {
        self.bookmarks.set(slot, name.to_string());
        self.save().await?;
        info!("Bookmark {} set to {}", slot.label(), name);
        Ok(())
    }

    async fn save(&self) -> Result<(), RadioError> {
        if let Some(parent) = self.file.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| RadioError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(&self.bookmarks)?;
        tokio::fs::write(&self.file, json)
            .await
            .map_err(|e| RadioError::io(&self.file, e))?;
        Ok(())
    }

    fn load_persistent(file: &Path) -> BookmarkSet {
        let content = match std::fs::read_to_string(file) {
            Ok(c) => c,
            Err(_) => return BookmarkSet::default(),
        };
        match serde_json::from_str::<BookmarkSet>(&content) {
            Ok(bookmarks) => {
                info!("Bookmarks loaded: {:?}", bookmarks);
                bookmarks
            }
            Err(e) => {
                error!("Invalid bookmark file {:?}: {}", file, e);
                BookmarkSet::default()
            }
        }
    }
}
