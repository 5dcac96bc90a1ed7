mod common;

use common::{photo, FakeOutput};
use space_core::model::{FavoriteState, NavigationPayload, Route};
use space_core::playback::{AmbientPlayback, SilentOutput, SoundToggle};
use space_core::store::{JsonFileStore, KeyValueStore, MemoryStore, SelectionStore, FAVORITES_KEY};
use space_core::{AmbientSession, Backdrop};

fn session_with(store: SelectionStore, output: FakeOutput) -> AmbientSession {
    AmbientSession::new(store, AmbientPlayback::new(output))
}

fn chosen(url: &str) -> Option<NavigationPayload> {
    Some(NavigationPayload::BackgroundChosen {
        updated_background: Some(url.to_string()),
    })
}

#[test]
fn favorite_toggle_twice_restores_membership() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let mut session = session_with(
        SelectionStore::new(JsonFileStore::open(&path)),
        FakeOutput::new(),
    );

    session.toggle_favorite(&photo("1"));
    let before = session.favorites();

    assert_eq!(session.toggle_favorite(&photo("2")), FavoriteState::Favorited);
    assert_eq!(
        session.toggle_favorite(&photo("2")),
        FavoriteState::NotFavorited
    );
    assert_eq!(session.favorites(), before);

    // Every toggle is already on disk.
    let reopened = SelectionStore::new(JsonFileStore::open(&path));
    assert_eq!(reopened.favorites(), before);
}

#[test]
fn handed_background_beats_durable_one() {
    for route in [Route::Breath, Route::Favorites] {
        let mut store = SelectionStore::new(MemoryStore::new());
        store.set_background("A");
        let mut session = session_with(store, FakeOutput::new());

        session.navigate(route, chosen("B"));
        session.mount();
        assert_eq!(session.backdrop(), &Backdrop::Image("B".into()), "{route}");

        session.reload();
        session.mount();
        // The handed value was written through, so it is now the durable one.
        assert_eq!(session.backdrop(), &Backdrop::Image("B".into()), "{route}");
    }
}

#[test]
fn durable_background_used_without_payload() {
    let mut store = SelectionStore::new(MemoryStore::new());
    store.set_background("A");
    let mut session = session_with(store, FakeOutput::new());
    session.navigate(Route::Breath, None);
    session.mount();
    assert_eq!(session.backdrop().image_url(), Some("A"));
}

#[test]
fn no_selection_anywhere_shows_default_color() {
    let mut session = session_with(SelectionStore::new(MemoryStore::new()), FakeOutput::new());
    session.navigate(Route::Favorites, None);
    session.mount();
    assert_eq!(session.backdrop(), &Backdrop::DefaultColor);
}

#[test]
fn corrupt_favorites_read_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    {
        let mut raw = JsonFileStore::open(&path);
        raw.set(FAVORITES_KEY, "definitely not json").unwrap();
    }
    let mut session = session_with(
        SelectionStore::new(JsonFileStore::open(&path)),
        FakeOutput::new(),
    );
    assert!(session.favorites().is_empty());

    // The next toggle starts over from the empty set.
    assert_eq!(session.toggle_favorite(&photo("5")), FavoriteState::Favorited);
    assert_eq!(session.favorites().len(), 1);
}

#[test]
fn unparsable_store_file_reads_as_no_selection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

    let mut session = session_with(
        SelectionStore::new(JsonFileStore::open(&path)),
        FakeOutput::new(),
    );
    assert_eq!(session.stored_background(), None);
    session.navigate(Route::Breath, None);
    session.mount();
    assert_eq!(session.backdrop(), &Backdrop::DefaultColor);
}

#[tokio::test]
async fn leaving_a_page_stops_its_sound() {
    let output = FakeOutput::new();
    let mut session = session_with(SelectionStore::new(MemoryStore::new()), output.clone());

    session.navigate(Route::Sound, None);
    session.mount();
    let SoundToggle::Started(pending) = session.set_background_sound("https://cdn.example/r.mp3")
    else {
        panic!("expected a start");
    };
    let (ticket, result) = pending.settle().await;
    assert!(session.playback_mut().confirm_start(ticket, result));
    assert!(session.playback().handle().is_some_and(|h| h.playing()));

    // The page never calls stop itself.
    session.back();
    assert!(!session.playback().is_active());
    assert_eq!(output.playing(), None);
}

#[tokio::test]
async fn denied_playback_keeps_the_page_usable() {
    let mut session = AmbientSession::new(
        SelectionStore::new(MemoryStore::new()),
        AmbientPlayback::new(SilentOutput::new("no player")),
    );
    session.navigate(Route::Sound, None);
    session.mount();
    let SoundToggle::Started(pending) = session.set_background_sound("u") else {
        panic!("expected a start");
    };
    let (ticket, result) = pending.settle().await;
    assert!(result.is_err());
    session.playback_mut().confirm_start(ticket, result);
    assert!(!session.playback().is_active());

    session.select_background("B");
    assert_eq!(session.stored_background().as_deref(), Some("B"));
}

#[test]
fn reset_to_default_removes_durable_background() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let mut session = session_with(
        SelectionStore::new(JsonFileStore::open(&path)),
        FakeOutput::new(),
    );
    session.navigate(Route::Breath, None);
    session.mount();
    session.select_background("A");
    session.reset_background();

    let reopened = SelectionStore::new(JsonFileStore::open(&path));
    assert_eq!(reopened.background(), None);
}
