use std::sync::Arc;
use std::time::Duration;

use padradio_proto::catalog::StationCatalog;
use padradio_proto::error::RadioError;
use tracing::{debug, info, warn};

use crate::player::{Launcher, StreamHandle};
use crate::speech::Speaker;

/// Owns the current station index and at most one running player.
pub struct PlaybackController<L: Launcher> {
    catalog: Arc<StationCatalog>,
    /// `None` when the player binary is missing: playback calls become no-ops.
    launcher: Option<L>,
    current: Option<L::Handle>,
    current_idx: Option<usize>,
    stop_timeout: Duration,
    speaker: Speaker,
}

impl<L: Launcher> PlaybackController<L> {
    pub fn new(
        catalog: Arc<StationCatalog>,
        launcher: Option<L>,
        stop_timeout: Duration,
        speaker: Speaker,
    ) -> Self {
        Self {
            catalog,
            launcher,
            current: None,
            current_idx: None,
            stop_timeout,
            speaker,
        }
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    /// True while a player process handle is held.
    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_station(&self) -> Option<&str> {
        let idx = self.current_idx?;
        self.catalog.get(idx).map(|s| s.name.as_str())
    }

    /// Play `name`, or the first station when `name` is unknown.
    pub async fn start(&mut self, name: &str) -> Result<(), RadioError> {
        let idx = match self.catalog.index_of(name) {
            Some(idx) => idx,
            None if self.catalog.is_empty() => return Err(RadioError::NoStations),
            None => {
                warn!("Station '{}' not found, using first station", name);
                0
            }
        };
        self.play_index(idx).await
    }

    /// Resume the current station, or the first one if none was selected yet.
    pub async fn resume(&mut self) -> Result<(), RadioError> {
        self.play_index(self.current_idx.unwrap_or(0)).await
    }

    pub async fn next(&mut self) -> Result<(), RadioError> {
        let len = self.catalog.len();
        if len == 0 {
            return Err(RadioError::NoStations);
        }
        let current = self.current_idx.unwrap_or(0);
        self.play_index((current + 1) % len).await
    }

    pub async fn previous(&mut self) -> Result<(), RadioError> {
        let len = self.catalog.len();
        if len == 0 {
            return Err(RadioError::NoStations);
        }
        let current = self.current_idx.unwrap_or(0);
        let prev = if current == 0 { len - 1 } else { current - 1 };
        self.play_index(prev).await
    }

    /// Tear down the running player, if any.  Stopping twice is harmless.
    pub async fn stop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.shutdown(self.stop_timeout).await;
            info!("Stream stopped");
        }
    }

    async fn play_index(&mut self, idx: usize) -> Result<(), RadioError> {
        let station = self
            .catalog
            .get(idx)
            .cloned()
            .ok_or(RadioError::NoStations)?;

        self.stop().await;
        // The index moves even if the spawn below fails, so a dead stream can
        // be skipped with the next stick nudge.
        self.current_idx = Some(idx);

        let Some(launcher) = &self.launcher else {
            debug!("Playback disabled, not starting {}", station.name);
            return Ok(());
        };

        self.speaker
            .say(&format!("Starting stream of {}", station.name));
        info!("Starting stream: {} -> {}", station.name, station.url);
        let handle = launcher.launch(&station.url)?;
        self.current = Some(handle);
        info!("Stream started: {}", station.name);
        Ok(())
    }
}
