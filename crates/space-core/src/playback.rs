//! Ambient Playback Controller: owns at most one looping background sound.
//!
//! The controller never plays audio itself.  It drives an [`AudioOutput`],
//! whose requests are applied strictly in the order they were issued, and
//! keeps the single [`AmbientAudioHandle`] that describes what the output was
//! last asked to play.
//!
//! ```text
//!   set_background_sound(u)   none playing      -> start u
//!                             u playing         -> stop          (toggle)
//!                             v playing         -> stop v, start u
//!   play_on_entry(u)          first call        -> (stop), start u
//!                             same page entry   -> ignored
//!   stop() / release()        anything playing  -> stop
//! ```
//!
//! A start is only confirmed later, when the output acknowledges it.  If the
//! handle was stopped or replaced in the meantime the acknowledgement is stale
//! and ignored: the stop was queued behind the start, so the output ends up
//! silent.

use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use crate::error::PlaybackError;

/// Resolves once the output has started (or refused) a requested sound.
pub type StartAck = oneshot::Receiver<Result<(), PlaybackError>>;

/// Something that can loop one sound at a time.
///
/// Both calls only enqueue work and must not block; the output applies them
/// in call order.
pub trait AudioOutput: Send {
    fn start_loop(&mut self, url: &str) -> StartAck;
    fn stop(&mut self);
}

/// Output used when no player is available.  Every start is refused.
pub struct SilentOutput {
    reason: String,
}

impl SilentOutput {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl AudioOutput for SilentOutput {
    fn start_loop(&mut self, _url: &str) -> StartAck {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(Err(PlaybackError::Denied(self.reason.clone())));
        rx
    }

    fn stop(&mut self) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlaybackTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    /// Requested, not yet acknowledged by the output.
    Starting,
    Playing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientAudioHandle {
    pub ticket: PlaybackTicket,
    pub source_url: String,
    pub state: HandleState,
}

impl AmbientAudioHandle {
    pub fn playing(&self) -> bool {
        self.state == HandleState::Playing
    }
}

/// A start request waiting for the output's acknowledgement.
#[derive(Debug)]
pub struct PendingStart {
    pub ticket: PlaybackTicket,
    ack: StartAck,
}

impl PendingStart {
    /// Wait for the output.  A dropped acknowledgement counts as
    /// `OutputClosed`.
    pub async fn settle(self) -> (PlaybackTicket, Result<(), PlaybackError>) {
        let result = self.ack.await.unwrap_or(Err(PlaybackError::OutputClosed));
        (self.ticket, result)
    }
}

/// Result of selecting a background sound.
#[derive(Debug)]
pub enum SoundToggle {
    Started(PendingStart),
    /// The same sound was selected again and is now stopped.
    Stopped,
}

pub struct AmbientPlayback {
    output: Box<dyn AudioOutput>,
    current: Option<AmbientAudioHandle>,
    next_ticket: u64,
    /// Incremented on every page entry; `play_on_entry` fires once per value.
    entry: u64,
    played_entry: Option<u64>,
}

impl AmbientPlayback {
    pub fn new(output: impl AudioOutput + 'static) -> Self {
        Self {
            output: Box::new(output),
            current: None,
            next_ticket: 1,
            entry: 0,
            played_entry: None,
        }
    }

    pub fn handle(&self) -> Option<&AmbientAudioHandle> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current.as_ref().map(|h| h.source_url.as_str())
    }

    /// Select `url` as the background sound.  Selecting the sound that is
    /// already playing stops it instead.
    pub fn set_background_sound(&mut self, url: &str) -> SoundToggle {
        if self.current_url() == Some(url) {
            self.stop_current("toggled off");
            return SoundToggle::Stopped;
        }
        SoundToggle::Started(self.start(url))
    }

    /// Stop whatever is playing.  Returns `false` when nothing was.
    pub fn stop(&mut self) -> bool {
        self.stop_current("stop requested")
    }

    /// Mark the start of a new page entry.
    pub fn enter_page(&mut self) {
        self.entry += 1;
    }

    /// Start `url` unconditionally, at most once per page entry.  A second
    /// call during the same entry returns `None`.
    pub fn play_on_entry(&mut self, url: &str) -> Option<PendingStart> {
        if self.played_entry == Some(self.entry) {
            debug!("playback: entry {} already started a sound", self.entry);
            return None;
        }
        self.played_entry = Some(self.entry);
        Some(self.start(url))
    }

    /// Apply the output's answer to a start request.  Returns `true` when the
    /// answer concerned the live handle.
    pub fn confirm_start(
        &mut self,
        ticket: PlaybackTicket,
        result: Result<(), PlaybackError>,
    ) -> bool {
        let is_current = self.current.as_ref().map(|h| h.ticket) == Some(ticket);
        match result {
            Ok(()) if is_current => {
                if let Some(handle) = self.current.as_mut() {
                    handle.state = HandleState::Playing;
                    info!("playback: playing {}", handle.source_url);
                }
                true
            }
            Ok(()) => {
                debug!("playback: stale start ack {:?} ignored", ticket);
                false
            }
            Err(e) => {
                warn!("playback: {}", e);
                if is_current {
                    self.current = None;
                }
                is_current
            }
        }
    }

    /// Page teardown: stop and drop the handle whether or not the page ever
    /// asked for it.
    pub fn release(&mut self) {
        self.stop_current("released");
    }

    fn start(&mut self, url: &str) -> PendingStart {
        self.stop_current("replaced");
        let ticket = PlaybackTicket(self.next_ticket);
        self.next_ticket += 1;
        let ack = self.output.start_loop(url);
        info!("playback: starting {} ({:?})", url, ticket);
        self.current = Some(AmbientAudioHandle {
            ticket,
            source_url: url.to_string(),
            state: HandleState::Starting,
        });
        PendingStart { ticket, ack }
    }

    fn stop_current(&mut self, why: &str) -> bool {
        match self.current.take() {
            Some(handle) => {
                self.output.stop();
                info!("playback: stopped {} ({})", handle.source_url, why);
                true
            }
            None => false,
        }
    }
}

impl Drop for AmbientPlayback {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Call {
        Start(String),
        Stop,
    }

    #[derive(Default)]
    struct Shared {
        calls: Vec<Call>,
        playing: Option<String>,
        held: Vec<oneshot::Sender<Result<(), PlaybackError>>>,
    }

    /// Records calls and models a device that applies them in order.
    #[derive(Clone, Default)]
    pub struct RecordingOutput {
        shared: Arc<Mutex<Shared>>,
        hold_acks: bool,
    }

    impl RecordingOutput {
        pub fn new() -> Self {
            Self::default()
        }

        /// Keep acknowledgements pending until `release_acks` is called.
        pub fn holding_acks() -> Self {
            Self {
                hold_acks: true,
                ..Self::default()
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.shared.lock().unwrap().calls.clone()
        }

        pub fn device_playing(&self) -> Option<String> {
            self.shared.lock().unwrap().playing.clone()
        }

        pub fn release_acks(&self) {
            let held: Vec<_> = self.shared.lock().unwrap().held.drain(..).collect();
            for tx in held {
                let _ = tx.send(Ok(()));
            }
        }
    }

    impl AudioOutput for RecordingOutput {
        fn start_loop(&mut self, url: &str) -> StartAck {
            let (tx, rx) = oneshot::channel();
            let mut shared = self.shared.lock().unwrap();
            shared.calls.push(Call::Start(url.to_string()));
            shared.playing = Some(url.to_string());
            if self.hold_acks {
                shared.held.push(tx);
            } else {
                let _ = tx.send(Ok(()));
            }
            rx
        }

        fn stop(&mut self) {
            let mut shared = self.shared.lock().unwrap();
            shared.calls.push(Call::Stop);
            shared.playing = None;
        }
    }
}
