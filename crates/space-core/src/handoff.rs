//! Session Handoff Channel: the payload attached to one forward navigation.
//!
//! `send` stores the payload for a destination; `receive` on that destination
//! takes it.  A reload, a back-navigation or a visit to any other route finds
//! nothing.

use tracing::debug;

use crate::model::{NavigationPayload, Route};

#[derive(Debug)]
struct Handoff {
    destination: Route,
    payload: NavigationPayload,
}

#[derive(Debug, Default)]
pub struct HandoffChannel {
    slot: Option<Handoff>,
}

impl HandoffChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `payload` to the next transition to `destination`.  Replaces any
    /// payload that was never received.
    pub fn send(&mut self, destination: Route, payload: NavigationPayload) {
        if let Some(stale) = self.slot.take() {
            debug!(
                "handoff: dropping unreceived payload for {}",
                stale.destination
            );
        }
        self.slot = Some(Handoff {
            destination,
            payload,
        });
    }

    /// Take the payload if this page load is the direct target of the last
    /// send.  Any payload addressed elsewhere is discarded.
    pub fn receive(&mut self, route: Route) -> Option<NavigationPayload> {
        let handoff = self.slot.take()?;
        if handoff.destination == route {
            Some(handoff.payload)
        } else {
            debug!(
                "handoff: payload for {} discarded on {}",
                handoff.destination, route
            );
            None
        }
    }

    /// Drop whatever is pending (navigation without a fresh send).
    pub fn clear(&mut self) {
        self.slot = None;
    }

    pub fn is_pending(&self) -> bool {
        self.slot.is_some()
    }
}

/// Background resolution for a page.  The payload wins over the durable value;
/// with neither the page shows the default color.
///
/// Breath and Favorites honour `updatedBackground`; the terminal page honours
/// the `background` it was handed.  Other payloads carry no background.
pub fn resolve_background(
    route: Route,
    payload: Option<&NavigationPayload>,
    durable: Option<String>,
) -> Option<String> {
    let handed = match (route, payload) {
        (
            Route::Breath | Route::Favorites,
            Some(NavigationPayload::BackgroundChosen { updated_background }),
        ) => updated_background.clone(),
        (Route::FinalPage, Some(NavigationPayload::SessionReady { background, .. })) => {
            background.clone()
        }
        _ => None,
    };
    handed.filter(|url| !url.is_empty()).or(durable)
}
