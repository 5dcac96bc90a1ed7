//! Ambient Session coordinator.
//!
//! Owns what every page shares (the durable selection store, the handoff
//! channel and the playback controller) plus the backdrop (the single
//! ambient visual setting) and the navigation history.  Pages never touch the
//! store or the audio output directly.
//!
//! Navigation:
//!   - `navigate(to, payload)`: forward; tears down the current page, then
//!     hands `payload` to `to`.
//!   - `back()` / `reload()`: re-enter without a payload.
//!   - `mount()`: called by the page that was just entered; receives the
//!     payload and applies its background / sound side effects.

use tracing::{debug, info};

use crate::handoff::{resolve_background, HandoffChannel};
use crate::model::{FavoriteSet, FavoriteState, MediaItem, NavigationPayload, Route};
use crate::playback::{AmbientPlayback, PendingStart, SoundToggle};
use crate::store::SelectionStore;

/// What the page background currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Backdrop {
    #[default]
    DefaultColor,
    Image(String),
}

impl Backdrop {
    pub fn image_url(&self) -> Option<&str> {
        match self {
            Backdrop::DefaultColor => None,
            Backdrop::Image(url) => Some(url),
        }
    }
}

/// Result of mounting the current page.
#[derive(Debug)]
pub struct MountedPage {
    pub route: Route,
    pub payload: Option<NavigationPayload>,
    /// Start request issued by the terminal page's entry sound.
    pub pending_start: Option<PendingStart>,
}

pub struct AmbientSession {
    store: SelectionStore,
    handoff: HandoffChannel,
    playback: AmbientPlayback,
    backdrop: Backdrop,
    route: Route,
    history: Vec<Route>,
}

impl AmbientSession {
    pub fn new(store: SelectionStore, playback: AmbientPlayback) -> Self {
        Self {
            store,
            handoff: HandoffChannel::new(),
            playback,
            backdrop: Backdrop::DefaultColor,
            route: Route::Home,
            history: Vec::new(),
        }
    }

    pub fn route(&self) -> Route {
        self.route
    }

    pub fn backdrop(&self) -> &Backdrop {
        &self.backdrop
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty()
    }

    // ── navigation ────────────────────────────────────────────────────────────

    pub fn navigate(&mut self, to: Route, payload: Option<NavigationPayload>) {
        info!("session: {} -> {}", self.route, to);
        self.leave();
        self.history.push(self.route);
        match payload {
            Some(payload) => self.handoff.send(to, payload),
            None => self.handoff.clear(),
        }
        self.enter(to);
    }

    /// History back.  Returns the route now shown.
    pub fn back(&mut self) -> Route {
        let to = self.history.pop().unwrap_or(Route::Home);
        info!("session: back {} -> {}", self.route, to);
        self.leave();
        self.handoff.clear();
        self.enter(to);
        to
    }

    pub fn reload(&mut self) {
        info!("session: reload {}", self.route);
        self.leave();
        self.handoff.clear();
        self.enter(self.route);
    }

    /// Receive the handoff for the current route and apply the page's
    /// background and sound side effects.
    pub fn mount(&mut self) -> MountedPage {
        let route = self.route;
        let payload = self.handoff.receive(route);
        let mut pending_start = None;

        match route {
            Route::Breath | Route::Favorites => {
                match resolve_background(route, payload.as_ref(), self.store.background()) {
                    Some(url) => self.select_background(&url),
                    None => self.backdrop = Backdrop::DefaultColor,
                }
            }
            Route::Sound => {
                if let Some(url) = self.store.background() {
                    self.backdrop = Backdrop::Image(url);
                }
            }
            Route::FinalPage => {
                if let Some(url) =
                    resolve_background(route, payload.as_ref(), self.store.background())
                {
                    self.backdrop = Backdrop::Image(url);
                }
                if let Some(NavigationPayload::SessionReady {
                    audio: Some(audio), ..
                }) = &payload
                {
                    pending_start = self.playback.play_on_entry(audio);
                }
            }
            Route::Home | Route::Details => {}
        }

        debug!(
            "session: mounted {} (payload: {}, backdrop: {:?})",
            route,
            payload.is_some(),
            self.backdrop
        );
        MountedPage {
            route,
            payload,
            pending_start,
        }
    }

    /// Teardown of the page being left.  Audio is released unconditionally.
    fn leave(&mut self) {
        self.playback.release();
        if self.route.owns_backdrop() {
            self.backdrop = Backdrop::DefaultColor;
        }
    }

    fn enter(&mut self, route: Route) {
        self.route = route;
        self.playback.enter_page();
    }

    // ── background ────────────────────────────────────────────────────────────

    pub fn stored_background(&self) -> Option<String> {
        self.store.background()
    }

    /// Show `url` and write it through to the durable store.
    pub fn select_background(&mut self, url: &str) {
        self.backdrop = Backdrop::Image(url.to_string());
        self.store.set_background(url);
    }

    /// Back to the default color, forgetting the durable selection.
    pub fn reset_background(&mut self) {
        self.backdrop = Backdrop::DefaultColor;
        self.store.clear_background();
    }

    // ── favorites ─────────────────────────────────────────────────────────────

    pub fn favorites(&self) -> FavoriteSet {
        self.store.favorites()
    }

    pub fn toggle_favorite(&mut self, item: &MediaItem) -> FavoriteState {
        self.store.toggle_favorite(item).0
    }

    // ── sound ─────────────────────────────────────────────────────────────────

    pub fn playback(&self) -> &AmbientPlayback {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut AmbientPlayback {
        &mut self.playback
    }

    pub fn set_background_sound(&mut self, url: &str) -> SoundToggle {
        self.playback.set_background_sound(url)
    }

    pub fn stop_sound(&mut self) -> bool {
        self.playback.stop()
    }

    /// Final teardown before exit.
    pub fn shutdown(&mut self) {
        self.leave();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playback::testing::{Call, RecordingOutput};
    use crate::store::MemoryStore;

    fn session() -> (AmbientSession, RecordingOutput) {
        let output = RecordingOutput::new();
        let session = AmbientSession::new(
            SelectionStore::new(MemoryStore::new()),
            AmbientPlayback::new(output.clone()),
        );
        (session, output)
    }

    #[test]
    fn breath_persists_the_handed_background() {
        let (mut s, _) = session();
        s.navigate(
            Route::Breath,
            Some(NavigationPayload::BackgroundChosen {
                updated_background: Some("B".into()),
            }),
        );
        s.mount();
        assert_eq!(s.backdrop(), &Backdrop::Image("B".into()));
        assert_eq!(s.stored_background().as_deref(), Some("B"));
    }

    #[test]
    fn leaving_breath_restores_default_color() {
        let (mut s, _) = session();
        s.select_background("A");
        s.navigate(Route::Breath, None);
        s.mount();
        assert_eq!(s.backdrop(), &Backdrop::Image("A".into()));

        s.navigate(Route::Details, None);
        s.mount();
        assert_eq!(s.backdrop(), &Backdrop::DefaultColor);
    }

    #[test]
    fn sound_page_restores_durable_background_without_payload() {
        let (mut s, _) = session();
        s.select_background("A");
        s.navigate(Route::Sound, None);
        s.mount();
        assert_eq!(s.backdrop().image_url(), Some("A"));
    }

    #[test]
    fn back_navigation_receives_nothing() {
        let (mut s, _) = session();
        s.navigate(Route::Breath, None);
        s.mount();
        s.navigate(
            Route::Sound,
            Some(NavigationPayload::BackgroundChosen {
                updated_background: Some("B".into()),
            }),
        );
        assert!(s.mount().payload.is_some());
        assert_eq!(s.back(), Route::Breath);
        assert!(s.mount().payload.is_none());
        assert_eq!(s.back(), Route::Home);
        assert!(!s.can_go_back());
    }

    #[test]
    fn reset_forgets_durable_background() {
        let (mut s, _) = session();
        s.navigate(Route::Breath, None);
        s.select_background("A");
        s.reset_background();
        assert_eq!(s.backdrop(), &Backdrop::DefaultColor);
        assert_eq!(s.stored_background(), None);

        s.reload();
        s.mount();
        assert_eq!(s.backdrop(), &Backdrop::DefaultColor);
    }

    #[test]
    fn any_navigation_releases_sound() {
        let (mut s, output) = session();
        s.navigate(Route::Sound, None);
        s.mount();
        let _ = s.set_background_sound("u");
        assert!(s.playback().is_active());

        s.navigate(Route::FinalPage, None);
        assert!(!s.playback().is_active());
        assert_eq!(output.device_playing(), None);
        assert_eq!(output.calls(), vec![Call::Start("u".into()), Call::Stop]);
    }

    #[test]
    fn toggle_favorite_goes_through_store() {
        let (mut s, _) = session();
        let item = MediaItem {
            id: "1".into(),
            alt_text: "lake".into(),
            preview_urls: Default::default(),
            original_url: "https://img.example/1.jpg".into(),
        };
        assert_eq!(s.toggle_favorite(&item), FavoriteState::Favorited);
        assert!(s.favorites().contains("1"));
        assert_eq!(s.toggle_favorite(&item), FavoriteState::NotFavorited);
        assert!(s.favorites().is_empty());
    }
}
