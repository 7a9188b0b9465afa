/// RadioCore: the single-owner event loop for all mutable radio state.
///
/// Every input funnels into one `mpsc` channel as a `RadioEvent`: pad events
/// from the gamepad thread, and shutdown requests from the signal handler.
/// RadioCore owns the dispatcher (debounce + Select modifier state), the
/// playback controller, the bookmark store and the leaf wrappers exclusively;
/// nothing else touches them, so no locking is needed.
///
/// Each event is handled to completion before the next one is pulled.  A
/// failing action is logged and dropped; it never ends the loop.
use padradio_proto::bookmarks::BookmarkStore;
use padradio_proto::protocol::{BookmarkSlot, InputEvent};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::dispatch::{Action, InputDispatcher};
use crate::mixer::{VolumeControl, VolumeDirection};
use crate::playback::PlaybackController;
use crate::player::Launcher;
use crate::speech::Speaker;
use crate::system::SystemOps;

/// All inputs into the RadioCore loop.
#[derive(Debug)]
pub enum RadioEvent {
    /// A recognised pad event.
    Input(InputEvent),
    /// The gamepad reader stopped (device unplugged).
    InputClosed,
    /// SIGTERM / SIGINT.
    Shutdown,
}

pub struct RadioCore<L: Launcher> {
    dispatcher: InputDispatcher,
    playback: PlaybackController<L>,
    volume: VolumeControl,
    bookmarks: BookmarkStore,
    system: SystemOps,
    speaker: Speaker,
}

impl<L: Launcher> RadioCore<L> {
    pub fn new(
        dispatcher: InputDispatcher,
        playback: PlaybackController<L>,
        volume: VolumeControl,
        bookmarks: BookmarkStore,
        system: SystemOps,
        speaker: Speaker,
    ) -> Self {
        Self {
            dispatcher,
            playback,
            volume,
            bookmarks,
            system,
            speaker,
        }
    }

    #[cfg(test)]
    pub fn playback(&self) -> &PlaybackController<L> {
        &self.playback
    }

    #[cfg(test)]
    pub fn bookmarks(&self) -> &BookmarkStore {
        &self.bookmarks
    }

    #[cfg(test)]
    pub fn dispatcher(&self) -> &InputDispatcher {
        &self.dispatcher
    }

    /// Start with bookmark A when it names a known station, else the first
    /// station.
    pub async fn start_initial(&mut self) {
        let initial = self
            .bookmarks
            .get(BookmarkSlot::A)
            .filter(|name| self.playback.catalog().contains(name))
            .map(str::to_string);
        let result = match initial {
            Some(name) => {
                info!("Starting with bookmark A: {}", name);
                self.playback.start(&name).await
            }
            None => self.playback.resume().await,
        };
        if let Err(e) = result {
            error!("Failed to start initial station: {}", e);
        }
    }

    /// Run until shutdown is requested or every sender is gone.
    pub async fn run(mut self, mut event_rx: mpsc::Receiver<RadioEvent>) -> anyhow::Result<()> {
        info!("RadioCore: listening for gamepad input");

        loop {
            match event_rx.recv().await {
                None => {
                    info!("RadioCore: event channel closed, shutting down");
                    break;
                }
                Some(RadioEvent::Shutdown) => {
                    info!("RadioCore: shutdown signal received, cleaning up");
                    break;
                }
                Some(RadioEvent::InputClosed) => {
                    warn!("RadioCore: gamepad gone, shutting down");
                    break;
                }
                Some(RadioEvent::Input(event)) => self.process(event).await,
            }
        }

        self.cleanup().await;
        Ok(())
    }

    /// Interpret one pad event and carry out the resulting action.
    pub async fn process(&mut self, event: InputEvent) {
        let Some(action) = self.dispatcher.interpret(&event) else {
            return;
        };
        debug!("RadioCore: {:?}", action);
        if let Err(e) = self.execute(action).await {
            error!("Error handling {:?}: {:#}", action, e);
        }
    }

    async fn execute(&mut self, action: Action) -> anyhow::Result<()> {
        match action {
            Action::TogglePlayback => self.toggle_playback().await?,
            Action::PreviousStation => self.playback.previous().await?,
            Action::NextStation => self.playback.next().await?,
            Action::VolumeUp => self.volume.adjust(VolumeDirection::Up).await?,
            Action::VolumeDown => self.volume.adjust(VolumeDirection::Down).await?,
            Action::SaveBookmark(slot) => self.save_bookmark(slot).await?,
            Action::RecallBookmark(slot) => self.recall_bookmark(slot).await?,
            Action::RestartApp => self.system.restart_app().await?,
            Action::AnnounceNetwork => self.system.announce_network().await?,
            Action::RunUpdate => self.system.run_update().await?,
            Action::Reboot => self.system.reboot().await?,
        }
        Ok(())
    }

    async fn toggle_playback(&mut self) -> anyhow::Result<()> {
        if self.playback.is_playing() {
            self.playback.stop().await;
        } else {
            self.playback.resume().await?;
        }
        Ok(())
    }

    async fn save_bookmark(&mut self, slot: BookmarkSlot) -> anyhow::Result<()> {
        let Some(station) = self.playback.current_station().map(str::to_string) else {
            warn!("No current station, bookmark {} not saved", slot.label());
            return Ok(());
        };
        self.bookmarks.set(slot, &station).await?;
        self.speaker
            .say(&format!("Bookmark {} set to {}", slot.label(), station));
        Ok(())
    }

    async fn recall_bookmark(&mut self, slot: BookmarkSlot) -> anyhow::Result<()> {
        let valid = self
            .bookmarks
            .get(slot)
            .filter(|name| self.playback.catalog().contains(name))
            .map(str::to_string);
        match valid {
            Some(name) => self.playback.start(&name).await?,
            None => {
                info!(
                    "Bookmark {} not set or invalid, playing first station",
                    slot.label()
                );
                let first = self
                    .playback
                    .catalog()
                    .first()
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                self.playback.start(&first).await?;
            }
        }
        Ok(())
    }

    async fn cleanup(&mut self) {
        self.playback.stop().await;
        info!("RadioCore: stopped");
    }
}
