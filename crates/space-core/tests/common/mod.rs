use std::sync::{Arc, Mutex};

use space_core::error::PlaybackError;
use space_core::model::MediaItem;
use space_core::playback::{AudioOutput, StartAck};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Start(String),
    Stop,
}

#[derive(Default)]
struct Device {
    calls: Vec<Call>,
    playing: Option<String>,
    held: Vec<oneshot::Sender<Result<(), PlaybackError>>>,
}

/// Fake audio device: applies requests in order and remembers them.
#[derive(Clone, Default)]
pub struct FakeOutput {
    device: Arc<Mutex<Device>>,
    hold_acks: bool,
}

#[allow(dead_code)]
impl FakeOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn holding_acks() -> Self {
        Self {
            hold_acks: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.device.lock().unwrap().calls.clone()
    }

    pub fn starts(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Start(_)))
            .count()
    }

    pub fn playing(&self) -> Option<String> {
        self.device.lock().unwrap().playing.clone()
    }

    pub fn release_acks(&self) {
        let held: Vec<_> = self.device.lock().unwrap().held.drain(..).collect();
        for tx in held {
            let _ = tx.send(Ok(()));
        }
    }
}

impl AudioOutput for FakeOutput {
    fn start_loop(&mut self, url: &str) -> StartAck {
        let (tx, rx) = oneshot::channel();
        let mut device = self.device.lock().unwrap();
        device.calls.push(Call::Start(url.to_string()));
        device.playing = Some(url.to_string());
        if self.hold_acks {
            device.held.push(tx);
        } else {
            let _ = tx.send(Ok(()));
        }
        rx
    }

    fn stop(&mut self) {
        let mut device = self.device.lock().unwrap();
        device.calls.push(Call::Stop);
        device.playing = None;
    }
}

#[allow(dead_code)]
pub fn photo(id: &str) -> MediaItem {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "alt": format!("photo {id}"),
        "src": {
            "large": format!("https://img.example/{id}/large.jpg"),
            "original": format!("https://img.example/{id}/original.jpg"),
        },
    }))
    .unwrap()
}
