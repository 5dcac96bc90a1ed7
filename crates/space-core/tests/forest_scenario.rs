mod common;

use common::{Call, FakeOutput};
use space_core::catalog::{sounds_to_items, SoundDetail, MAX_RESULTS};
use space_core::model::{NavigationPayload, Route};
use space_core::playback::{AmbientPlayback, SoundToggle};
use space_core::store::{MemoryStore, SelectionStore};
use space_core::AmbientSession;

/// Stand-in for the sound provider's answer to "forest": more matches than
/// a page may show.
fn forest_results() -> Vec<SoundDetail> {
    (1..=15)
        .map(|n| {
            serde_json::from_value(serde_json::json!({
                "id": 1000 + n,
                "name": format!("forest take {n}"),
                "previews": {
                    "preview-hq-mp3": format!("https://cdn.example/forest-{n}-hq.mp3"),
                    "preview-lq-mp3": format!("https://cdn.example/forest-{n}-lq.mp3"),
                },
            }))
            .unwrap()
        })
        .collect()
}

#[tokio::test]
async fn forest_sound_reaches_final_page_once() {
    let output = FakeOutput::new();
    let mut store = SelectionStore::new(MemoryStore::new());
    store.set_background("https://img.example/lake.jpg");
    let mut session = AmbientSession::new(store, AmbientPlayback::new(output.clone()));

    session.navigate(Route::Sound, None);
    session.mount();

    let items = sounds_to_items(forest_results()).unwrap();
    assert!(items.len() <= MAX_RESULTS);

    let third = items[2].sound_url().unwrap().to_string();
    assert_eq!(third, "https://cdn.example/forest-3-hq.mp3");
    let SoundToggle::Started(pending) = session.set_background_sound(&third) else {
        panic!("expected a start");
    };
    let (ticket, result) = pending.settle().await;
    session.playback_mut().confirm_start(ticket, result);
    assert_eq!(session.playback().current_url(), Some(third.as_str()));

    let background = session.stored_background();
    session.navigate(
        Route::FinalPage,
        Some(NavigationPayload::SessionReady {
            background,
            audio: Some(third.clone()),
        }),
    );

    let mounted = session.mount();
    let pending = mounted.pending_start.expect("entry sound should start");
    // A second mount effect during the same entry must not start it again.
    assert!(session.mount().pending_start.is_none());
    assert!(session.playback_mut().play_on_entry(&third).is_none());

    let (ticket, result) = pending.settle().await;
    assert!(session.playback_mut().confirm_start(ticket, result));
    assert_eq!(session.backdrop().image_url(), Some("https://img.example/lake.jpg"));
    assert_eq!(output.playing().as_deref(), Some(third.as_str()));
    assert_eq!(
        output.calls(),
        vec![
            Call::Start(third.clone()),
            Call::Stop,
            Call::Start(third.clone()),
        ]
    );
}
