//! App: the page-based event loop.
//!
//! Architecture:
//! - `App` owns the `AmbientSession` and the page currently shown.
//! - A `tokio::mpsc` channel carries `AppMessage` events in from background
//!   tasks (terminal input, catalog requests, playback acknowledgements).
//! - The event loop draws each frame, then awaits the next message or tick.
//! - Pages return `Vec<Action>`; App applies each Action, then forwards it to
//!   the page.
//! - Catalog results carry the page-entry generation they were requested in;
//!   results for a page that was left are dropped.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use space_core::catalog::CatalogClient;
use space_core::config::SearchConfig;
use space_core::model::FavoriteState;
use space_core::playback::{PendingStart, PlaybackTicket, SoundToggle};
use space_core::{
    AmbientSession, Backdrop, CatalogError, MediaItem, NavigationPayload, PlaybackError, Route,
};

use crate::action::Action;
use crate::page::Page;
use crate::pages::{self, home::HomePage};
use crate::theme::{C_BG, C_BG_IMAGE};
use crate::widgets::{
    help_overlay::HelpOverlay,
    status_bar,
    toast::{Severity, ToastManager},
};

/// Upper bound on follow-up actions applied for one input.
const MAX_CHAIN: usize = 32;

/// Messages delivered to the event loop.
#[derive(Debug)]
pub enum AppMessage {
    Event(Event),
    ImagesLoaded {
        generation: u64,
        result: Result<Vec<MediaItem>, CatalogError>,
    },
    SoundsLoaded {
        generation: u64,
        result: Result<Vec<MediaItem>, CatalogError>,
    },
    SimilarLoaded {
        generation: u64,
        item: MediaItem,
        result: Result<Vec<MediaItem>, CatalogError>,
    },
    PlaybackSettled(PlaybackTicket, Result<(), PlaybackError>),
}

pub struct App {
    session: AmbientSession,
    catalog: CatalogClient,
    search: SearchConfig,
    page: Box<dyn Page>,
    /// Incremented on every page entry.
    generation: u64,
    tx: mpsc::Sender<AppMessage>,
    toast: ToastManager,
    help: HelpOverlay,
    should_quit: bool,
}

impl App {
    pub fn new(
        session: AmbientSession,
        catalog: CatalogClient,
        search: SearchConfig,
        tx: mpsc::Sender<AppMessage>,
    ) -> Self {
        Self {
            session,
            catalog,
            search,
            page: Box::new(HomePage::new()),
            generation: 0,
            tx,
            toast: ToastManager::new(),
            help: HelpOverlay::new(),
            should_quit: false,
        }
    }

    pub async fn run(mut self, mut rx: mpsc::Receiver<AppMessage>) -> anyhow::Result<()> {
        debug!("run(): enabling raw mode");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        debug!("run(): terminal created, size={:?}", terminal.size());

        // ── Background task: keyboard events ─────────────────────────────────
        let event_tx = self.tx.clone();
        tokio::task::spawn_blocking(move || loop {
            match event::read() {
                Ok(ev) => {
                    if event_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            }
        });

        // Toast expiry, spinner and breathing animation: 100ms.
        let mut ui_tick = tokio::time::interval(Duration::from_millis(100));
        ui_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let entry = self.mount_current();
        self.dispatch_all(entry);

        // ── Main loop ─────────────────────────────────────────────────────────
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal.draw(|f| self.draw(f))?;
            }
            needs_redraw = false;

            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    const MAX_DRAIN: usize = 64;
                    let mut redraw = self.handle_message(msg);
                    for _ in 0..MAX_DRAIN {
                        match rx.try_recv() {
                            Ok(next) => redraw |= self.handle_message(next),
                            Err(_) => break,
                        }
                    }
                    needs_redraw = redraw;
                }

                _ = ui_tick.tick() => {
                    self.toast.tick();
                    self.page.tick();
                    needs_redraw = true;
                }
            }
        }

        // ── Teardown ──────────────────────────────────────────────────────────
        self.session.shutdown();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        info!("safe-space: exiting");

        Ok(())
    }

    /// Apply one message.  Returns whether the screen needs a redraw.
    fn handle_message(&mut self, msg: AppMessage) -> bool {
        match msg {
            AppMessage::Event(Event::Key(key)) => {
                let actions = self.handle_key(key);
                self.dispatch_all(actions);
                true
            }
            AppMessage::Event(Event::Resize(..)) => true,
            AppMessage::Event(_) => false,

            AppMessage::ImagesLoaded { generation, result } => {
                if !self.is_current(generation, "images") {
                    return false;
                }
                log_catalog_result("images", &result);
                self.dispatch(Action::ImagesLoaded(result));
                true
            }
            AppMessage::SoundsLoaded { generation, result } => {
                if !self.is_current(generation, "sounds") {
                    return false;
                }
                log_catalog_result("sounds", &result);
                self.dispatch(Action::SoundsLoaded(result));
                true
            }
            AppMessage::SimilarLoaded {
                generation,
                item,
                result,
            } => {
                self.toast.dismiss_spinner();
                if !self.is_current(generation, "similar images") {
                    return true;
                }
                let similar_images = match result {
                    Ok(items) => items,
                    Err(CatalogError::NoResults) => Vec::new(),
                    Err(e) => {
                        error!("catalog: similar images for {} failed: {}", item.id, e);
                        self.toast.error("Could not load similar images.");
                        return true;
                    }
                };
                let payload = NavigationPayload::ImageDetails {
                    image: item.with_original_as_large(),
                    similar_images,
                    favorites: self.session.favorites(),
                };
                self.dispatch(Action::Navigate(Route::Details, Some(payload)));
                true
            }

            AppMessage::PlaybackSettled(ticket, result) => {
                let denied = result.as_ref().err().cloned();
                let live = self.session.playback_mut().confirm_start(ticket, result);
                if let (true, Some(e)) = (live, denied) {
                    self.toast.warning(format!("Sound unavailable: {}", e));
                }
                live
            }
        }
    }

    fn is_current(&self, generation: u64, what: &str) -> bool {
        if generation != self.generation {
            debug!(
                "dropping {} for entry {} (now {})",
                what, generation, self.generation
            );
            return false;
        }
        true
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            return vec![Action::Quit];
        }
        if self.help.visible {
            if matches!(key.code, KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Esc) {
                self.help.hide();
            }
            return vec![];
        }
        if self.page.is_editing() {
            return self.page.handle_key(key, &self.session);
        }
        match key.code {
            KeyCode::Char('q') => vec![Action::Quit],
            KeyCode::Char('?') => vec![Action::ToggleHelp],
            KeyCode::Char('h') => vec![Action::Home],
            KeyCode::Char('b') | KeyCode::Esc => vec![Action::Back],
            KeyCode::F(5) => vec![Action::Reload],
            KeyCode::Char('r') if ctrl => vec![Action::Reload],
            _ => self.page.handle_key(key, &self.session),
        }
    }

    fn dispatch_all(&mut self, actions: Vec<Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }

    /// Apply `action`, then hand it to the page it was meant for.  Follow-up
    /// actions run in order after it.
    fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        let mut applied = 0usize;
        while let Some(action) = queue.pop_front() {
            applied += 1;
            if applied > MAX_CHAIN {
                warn!("dispatch: dropping {} chained actions", queue.len() + 1);
                break;
            }
            let generation = self.generation;
            queue.extend(self.apply_action(&action));
            if generation == self.generation {
                queue.extend(self.page.on_action(&action, &self.session));
            }
        }
    }

    fn apply_action(&mut self, action: &Action) -> Vec<Action> {
        debug!("apply_action: {:?}", ActionName(action));
        match action {
            // ── Navigation ────────────────────────────────────────────────────
            Action::Navigate(route, payload) => {
                self.session.navigate(*route, payload.clone());
                self.mount_current()
            }
            Action::Back => {
                self.session.back();
                self.mount_current()
            }
            Action::Home => {
                if self.session.route() == Route::Home {
                    return vec![];
                }
                self.session.navigate(Route::Home, None);
                self.mount_current()
            }
            Action::Reload => {
                self.session.reload();
                self.mount_current()
            }

            // ── Background image ──────────────────────────────────────────────
            Action::SelectBackground(url) => {
                self.session.select_background(url);
                self.toast.push(Severity::Success, "Background set.");
                vec![]
            }
            Action::ResetBackground => {
                self.session.reset_background();
                self.toast.info("Background reset to default.");
                vec![]
            }
            Action::ToggleFavorite(item) => {
                match self.session.toggle_favorite(item) {
                    FavoriteState::Favorited => {
                        self.toast.push(Severity::Success, "Added to favorites.")
                    }
                    FavoriteState::NotFavorited => self.toast.info("Removed from favorites."),
                }
                vec![Action::FavoritesChanged]
            }

            // ── Catalog ───────────────────────────────────────────────────────
            Action::SearchImages(query) => {
                let (catalog, tx, generation) = self.task_context();
                let query = query.clone();
                let page_size = self.search.page_size();
                tokio::spawn(async move {
                    let result = catalog.search_images(&query, page_size).await;
                    let _ = tx.send(AppMessage::ImagesLoaded { generation, result }).await;
                });
                vec![]
            }
            Action::SearchSounds(query) => {
                let (catalog, tx, generation) = self.task_context();
                let query = query.clone();
                let page_size = self.search.page_size();
                tokio::spawn(async move {
                    let result = catalog.search_sounds(&query, page_size).await;
                    let _ = tx.send(AppMessage::SoundsLoaded { generation, result }).await;
                });
                vec![]
            }
            Action::OpenDetails(item) => {
                self.toast.spinner("Finding similar images...");
                let (catalog, tx, generation) = self.task_context();
                let item = item.clone();
                let page_size = self.search.page_size();
                tokio::spawn(async move {
                    let result = catalog.similar_images(&item, page_size).await;
                    let _ = tx
                        .send(AppMessage::SimilarLoaded {
                            generation,
                            item,
                            result,
                        })
                        .await;
                });
                vec![]
            }

            // ── Sound ─────────────────────────────────────────────────────────
            Action::ToggleSound(url) => {
                match self.session.set_background_sound(url) {
                    SoundToggle::Started(pending) => self.settle(pending),
                    SoundToggle::Stopped => self.toast.info("Background sound stopped."),
                }
                vec![]
            }
            Action::StopSound => {
                if self.session.stop_sound() {
                    self.toast.info("Background sound stopped.");
                }
                vec![]
            }

            // ── UI ────────────────────────────────────────────────────────────
            Action::Notify(severity, message) => {
                self.toast.push(*severity, message.clone());
                vec![]
            }
            Action::ToggleHelp => {
                self.help.toggle();
                vec![]
            }
            Action::Quit => {
                self.should_quit = true;
                vec![]
            }

            Action::FavoritesChanged | Action::ImagesLoaded(_) | Action::SoundsLoaded(_) => {
                vec![]
            }
        }
    }

    /// Mount the session's current route and build its page.
    fn mount_current(&mut self) -> Vec<Action> {
        self.generation += 1;
        self.toast.dismiss_spinner();
        let mounted = self.session.mount();
        if let Some(pending) = mounted.pending_start {
            self.settle(pending);
        }
        self.page = pages::build(mounted.route, mounted.payload, &self.session, &self.search);
        debug!("page: entered {} (entry {})", self.page.route(), self.generation);
        self.page.on_enter(&self.session)
    }

    fn task_context(&self) -> (CatalogClient, mpsc::Sender<AppMessage>, u64) {
        (self.catalog.clone(), self.tx.clone(), self.generation)
    }

    /// Wait for the output's answer off the loop and feed it back.
    fn settle(&self, pending: PendingStart) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let (ticket, result) = pending.settle().await;
            let _ = tx.send(AppMessage::PlaybackSettled(ticket, result)).await;
        });
    }

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let bg = match self.session.backdrop() {
            Backdrop::DefaultColor => C_BG,
            Backdrop::Image(_) => C_BG_IMAGE,
        };
        frame.render_widget(Block::default().style(Style::default().bg(bg)), area);

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        status_bar::draw_session_bar(
            frame,
            outer[0],
            self.session.route(),
            self.session.backdrop(),
            self.session.playback().current_url(),
        );
        self.page.draw(frame, outer[1], &self.session);
        status_bar::draw_keys_bar(frame, outer[2], self.page.keys(), self.page.is_editing());

        self.help.draw(frame, area);
        self.toast.draw(frame, area);
    }
}

fn log_catalog_result(what: &str, result: &Result<Vec<MediaItem>, CatalogError>) {
    match result {
        Ok(items) => debug!("catalog: {} {} delivered", items.len(), what),
        Err(CatalogError::NoResults) => info!("catalog: no {} found", what),
        Err(e) => error!("catalog: {} search failed: {}", what, e),
    }
}

/// Debug view of an action without dumping result payloads.
struct ActionName<'a>(&'a Action);

impl std::fmt::Debug for ActionName<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Action::ImagesLoaded(r) | Action::SoundsLoaded(r) => match r {
                Ok(items) => write!(f, "Loaded({} items)", items.len()),
                Err(e) => write!(f, "Loaded(err: {})", e),
            },
            Action::Navigate(route, payload) => {
                write!(f, "Navigate({}, payload: {})", route, payload.is_some())
            }
            other => write!(f, "{:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;
    use space_core::config::ProvidersConfig;
    use space_core::playback::{AmbientPlayback, SilentOutput};
    use space_core::store::{MemoryStore, SelectionStore};

    fn app() -> (App, mpsc::Receiver<AppMessage>) {
        let (tx, rx) = mpsc::channel(64);
        let session = AmbientSession::new(
            SelectionStore::new(MemoryStore::new()),
            AmbientPlayback::new(SilentOutput::new("test")),
        );
        let app = App::new(
            session,
            CatalogClient::new(ProvidersConfig::default()),
            SearchConfig::default(),
            tx,
        );
        (app, rx)
    }

    fn press(app: &mut App, c: char) {
        let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
        app.handle_message(AppMessage::Event(Event::Key(key)));
    }

    fn photo(id: &str) -> MediaItem {
        MediaItem {
            id: id.into(),
            alt_text: format!("hill {id}"),
            preview_urls: [("large".to_string(), format!("https://img.example/{id}.jpg"))]
                .into_iter()
                .collect(),
            original_url: format!("https://img.example/{id}-original.jpg"),
        }
    }

    #[tokio::test]
    async fn breath_search_without_credentials_reports_inline() {
        let (mut app, mut rx) = app();
        app.dispatch(Action::Navigate(Route::Breath, None));
        assert_eq!(app.page.route(), Route::Breath);

        // No key configured: the request fails before touching the network.
        let msg = rx.recv().await.expect("search result");
        assert!(matches!(
            msg,
            AppMessage::ImagesLoaded {
                result: Err(CatalogError::MissingCredential("pexels")),
                ..
            }
        ));
        assert!(app.handle_message(msg));
    }

    #[tokio::test]
    async fn results_for_a_left_page_are_dropped() {
        let (mut app, _rx) = app();
        app.dispatch(Action::Navigate(Route::Breath, None));
        let stale = app.generation;
        app.dispatch(Action::Navigate(Route::Favorites, None));

        let redraw = app.handle_message(AppMessage::ImagesLoaded {
            generation: stale,
            result: Ok(vec![photo("1")]),
        });
        assert!(!redraw);
        assert_eq!(app.page.route(), Route::Favorites);
    }

    #[tokio::test]
    async fn similar_images_open_details() {
        let (mut app, _rx) = app();
        app.dispatch(Action::Navigate(Route::Breath, None));
        let generation = app.generation;

        app.handle_message(AppMessage::SimilarLoaded {
            generation,
            item: photo("1"),
            result: Ok(vec![photo("2")]),
        });
        assert_eq!(app.session.route(), Route::Details);
    }

    #[tokio::test]
    async fn failed_similar_fetch_stays_put() {
        let (mut app, _rx) = app();
        app.dispatch(Action::Navigate(Route::Breath, None));
        let generation = app.generation;

        app.handle_message(AppMessage::SimilarLoaded {
            generation,
            item: photo("1"),
            result: Err(CatalogError::FetchFailed("503".into())),
        });
        assert_eq!(app.session.route(), Route::Breath);
    }

    #[tokio::test]
    async fn favorite_toggle_reaches_the_store() {
        let (mut app, _rx) = app();
        app.dispatch(Action::Navigate(Route::Favorites, None));
        app.dispatch(Action::ToggleFavorite(photo("5")));
        assert!(app.session.favorites().contains("5"));
        app.dispatch(Action::ToggleFavorite(photo("5")));
        assert!(app.session.favorites().is_empty());
    }

    #[tokio::test]
    async fn global_keys_navigate_and_quit() {
        let (mut app, _rx) = app();
        press(&mut app, 'h');
        assert_eq!(app.session.route(), Route::Home);

        app.dispatch(Action::Navigate(Route::Favorites, None));
        press(&mut app, 'b');
        assert_eq!(app.session.route(), Route::Home);

        press(&mut app, 'q');
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn denied_sound_is_cleared() {
        let (mut app, mut rx) = app();
        app.dispatch(Action::Navigate(Route::Sound, None));
        app.dispatch(Action::ToggleSound("https://snd.example/1.mp3".into()));
        assert!(app.session.playback().is_active());

        loop {
            match rx.recv().await.expect("message") {
                msg @ AppMessage::PlaybackSettled(..) => {
                    app.handle_message(msg);
                    break;
                }
                _ => continue,
            }
        }
        assert!(!app.session.playback().is_active());
    }
}
