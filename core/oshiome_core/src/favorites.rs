//! Favorites — an explicit, file-backed store of bookmarked campaigns.
//!
//! The store is a plain value: load it at startup, pass it by reference
//! to whatever view needs it, save it at the explicit boundary. There is
//! no ambient global and no implicit write-through; callers decide when
//! `save` happens.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Campaign ids the user has bookmarked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FavoritesStore {
    #[serde(skip)]
    path: PathBuf,
    favorites: BTreeSet<i64>,
}

impl FavoritesStore {
    /// Load the store from `path`. A missing file yields an empty store;
    /// an unreadable or corrupt file is treated the same way after a
    /// warning, so a damaged favorites file never blocks startup.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let favorites = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Self>(&raw) {
                Ok(store) => store.favorites,
                Err(e) => {
                    warn!("Corrupt favorites file {}: {e}", path.display());
                    BTreeSet::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeSet::new(),
            Err(e) => {
                warn!("Cannot read favorites file {}: {e}", path.display());
                BTreeSet::new()
            }
        };
        Self { path, favorites }
    }

    /// Persist the current set to the path it was loaded from.
    pub fn save(&self) -> io::Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.path, raw)
    }

    /// Toggle a campaign in or out of the set. Returns whether the
    /// campaign is a favorite after the call.
    pub fn toggle(&mut self, campaign_id: i64) -> bool {
        if self.favorites.remove(&campaign_id) {
            false
        } else {
            self.favorites.insert(campaign_id);
            true
        }
    }

    pub fn is_favorite(&self, campaign_id: i64) -> bool {
        self.favorites.contains(&campaign_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.favorites.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.favorites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.favorites.is_empty()
    }
}
