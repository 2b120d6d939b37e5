//! Integration tests for YtEmbed Core

use std::sync::Arc;
use std::time::Duration;

use tokio::time;
use tokio_test::{assert_pending, assert_ready};
use ytembed_core::simulation::{RecordingElement, RemoteCall, SimulatedProvider};
use ytembed_core::{
    extract_id, translate, AdapterOptions, BridgeOutcome, EmbedAdapter, EmbedApiLoader, Error,
    EventKind, LoaderConfig, MediaFile, PlayerVars, PointerKind, PollerCommand, Property,
    PropertyValue, Readiness, ShadowState, TimeRanges,
};

fn setup() -> (Arc<SimulatedProvider>, EmbedApiLoader) {
    let provider = Arc::new(SimulatedProvider::new());
    let loader = EmbedApiLoader::new(LoaderConfig::default(), provider.clone());
    (provider, loader)
}

async fn adapter_for(
    element: &Arc<RecordingElement>,
    loader: &EmbedApiLoader,
    src: &str,
) -> EmbedAdapter {
    EmbedAdapter::create(
        element.clone(),
        AdapterOptions::default(),
        &[MediaFile::new(src)],
        loader,
    )
    .await
    .unwrap()
}

async fn wait_destroyed(provider: &SimulatedProvider, index: usize) {
    time::timeout(Duration::from_secs(1), async {
        loop {
            let destroyed = provider
                .player(index)
                .is_some_and(|p| p.calls().contains(&RemoteCall::Destroy));
            if destroyed {
                break;
            }
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("remote player never destroyed");
}

async fn wait_ready(adapter: &EmbedAdapter) {
    time::timeout(Duration::from_secs(1), adapter.ready())
        .await
        .expect("adapter never became ready")
        .unwrap();
}

// =============================================================================
// Identifier Tests
// =============================================================================

#[test]
fn test_extract_id_shapes() {
    assert_eq!(
        extract_id(Some("http://www.youtube.com/watch?feature=player_embedded&v=ABC&t=10")),
        Some("ABC".to_string())
    );
    assert_eq!(
        extract_id(Some("http://www.youtube.com/v/XYZ?version=3")),
        Some("XYZ".to_string())
    );
    assert_eq!(extract_id(Some("http://youtu.be/XYZ")), Some("XYZ".to_string()));
    assert_eq!(extract_id(None), None);
}

// =============================================================================
// Loader Tests
// =============================================================================

#[tokio::test]
async fn test_script_injected_once_for_many_adapters() {
    let (provider, loader) = setup();
    let first = Arc::new(RecordingElement::new("first"));
    let second = Arc::new(RecordingElement::new("second"));

    let _a = adapter_for(&first, &loader, "https://youtu.be/aaa").await;
    let _b = adapter_for(&second, &loader, "https://youtu.be/bbb").await;

    assert_eq!(provider.script_injections(), vec!["https://www.youtube.com/player_api"]);
    assert_eq!(loader.pending_count().await, 2);
    assert_eq!(provider.created_count(), 0);

    assert_eq!(loader.on_global_ready().await, 2);
    assert_eq!(
        provider.created_containers(),
        vec!["first_youtube_iframe", "second_youtube_iframe"]
    );
    assert_eq!(loader.pending_count().await, 0);
}

#[tokio::test]
async fn test_creation_after_api_ready_is_immediate() {
    let (provider, loader) = setup();
    loader.on_global_ready().await;

    let element = Arc::new(RecordingElement::new("late"));
    let _adapter = adapter_for(&element, &loader, "https://youtu.be/abc123").await;

    assert_eq!(provider.created_count(), 1);
    assert!(provider.script_injections().is_empty());
}

#[tokio::test]
async fn test_creation_request_carries_options() {
    let (provider, loader) = setup();
    let element = Arc::new(RecordingElement::new("player1").with_size(1280, 720));
    let options = AdapterOptions::from_json(
        r#"{"prefix": "yt", "providerVars": {"controls": 1}, "origin": "https://example.com:8443/page"}"#,
    )
    .unwrap();

    let adapter = EmbedAdapter::create(
        element.clone(),
        options,
        &[MediaFile::with_type("https://www.youtube.com/watch?v=abc123", "video/youtube")],
        &loader,
    )
    .await
    .unwrap();
    loader.on_global_ready().await;

    let request = provider.request(0).unwrap();
    assert_eq!(adapter.id(), "player1_yt");
    assert_eq!(request.container_id, "player1_yt");
    assert_eq!(request.content_id, "abc123");
    assert_eq!((request.width, request.height), (1280, 720));
    assert_eq!(request.origin.as_deref(), Some("example.com:8443"));
    assert_eq!(request.player_vars.get("controls"), Some(&serde_json::json!(1)));
    assert_eq!(request.player_vars.get("rel"), Some(&serde_json::json!(0)));
    assert_eq!(request.player_vars.len(), PlayerVars::defaults().len());
}

#[tokio::test]
async fn test_invalid_options_rejected() {
    let (provider, loader) = setup();
    let element = Arc::new(RecordingElement::new("player1"));
    let options = AdapterOptions {
        prefix: String::new(),
        ..Default::default()
    };

    let result =
        EmbedAdapter::create(element.clone(), options, &[MediaFile::new("https://youtu.be/a")], &loader)
            .await;

    assert!(matches!(result, Err(Error::InvalidConfig(_))));
    assert!(provider.script_injections().is_empty());
    assert!(element.containers().is_empty());

    assert!(matches!(
        AdapterOptions::from_json(r#"{"progressIntervalMs": 0}"#),
        Err(Error::InvalidConfig(_))
    ));
}

#[tokio::test]
async fn test_failed_immediate_creation_restores_element() {
    let provider = Arc::new(SimulatedProvider::new().failing_creation("player1_youtube_iframe"));
    let loader = EmbedApiLoader::new(LoaderConfig::default(), provider.clone());
    loader.on_global_ready().await;

    let element = Arc::new(RecordingElement::new("player1"));
    let result = EmbedAdapter::create(
        element.clone(),
        AdapterOptions::default(),
        &[MediaFile::new("https://youtu.be/abc123")],
        &loader,
    )
    .await;

    match result {
        Err(e) => {
            assert_eq!(e.error_code(), "PLAYER_CREATION");
            assert!(e.is_recoverable());
        }
        Ok(_) => panic!("creation should have failed"),
    }
    assert!(element.containers().is_empty());
    assert!(!element.is_original_hidden());
    assert_eq!(provider.created_count(), 0);
}

// =============================================================================
// Queueing Tests
// =============================================================================

#[tokio::test]
async fn test_queued_seek_keeps_submission_order() {
    let (provider, loader) = setup();
    let element = Arc::new(RecordingElement::new("player1"));
    let adapter = adapter_for(&element, &loader, "https://youtu.be/abc123").await;

    adapter.set(Property::Src, "https://youtu.be/abc123").await.unwrap();
    adapter.set(Property::CurrentTime, 42.0).await.unwrap();
    adapter.pause().await.unwrap();

    loader.on_global_ready().await;
    provider.ready(0);
    wait_ready(&adapter).await;

    let calls = provider.player(0).unwrap().calls();
    let seeks: Vec<_> = calls.iter().filter(|c| matches!(c, RemoteCall::Seek(_))).collect();
    assert_eq!(seeks, vec![&RemoteCall::Seek(42.0)]);
    assert_eq!(
        calls,
        vec![
            RemoteCall::CueVideo("abc123".to_string()),
            RemoteCall::Seek(42.0),
            RemoteCall::Pause,
        ]
    );
}

#[tokio::test]
async fn test_ready_future_resolves_on_ready() {
    let (provider, loader) = setup();
    let element = Arc::new(RecordingElement::new("player1"));
    let adapter = adapter_for(&element, &loader, "https://youtu.be/abc123").await;

    let mut ready = tokio_test::task::spawn(adapter.ready());
    assert_pending!(ready.poll());

    loader.on_global_ready().await;
    assert_pending!(ready.poll());

    provider.ready(0);
    element.wait_for_events(4).await;
    assert!(ready.is_woken());
    assert_ready!(ready.poll()).unwrap();
    assert_eq!(adapter.readiness(), Readiness::Ready);
}

// =============================================================================
// End-to-End Tests
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_end_to_end_queue_and_replay() {
    let (provider, loader) = setup();
    let element = Arc::new(RecordingElement::new("player1"));
    let adapter = adapter_for(&element, &loader, "https://youtu.be/abc123").await;

    assert_eq!(
        adapter.set(Property::Src, "https://youtu.be/abc123").await.unwrap(),
        BridgeOutcome::Queued
    );
    assert_eq!(adapter.set(Property::Volume, 0.5).await.unwrap(), BridgeOutcome::Queued);
    assert_eq!(adapter.play().await.unwrap(), BridgeOutcome::Queued);
    assert_eq!(adapter.pending_calls().await, 3);

    loader.on_global_ready().await;
    assert!(provider.ready(0));
    wait_ready(&adapter).await;

    let player = provider.player(0).unwrap();
    assert_eq!(
        player.calls(),
        vec![
            RemoteCall::CueVideo("abc123".to_string()),
            RemoteCall::SetVolume(0.5),
            RemoteCall::Play,
        ]
    );
    assert_eq!(
        element.kinds(),
        vec![
            EventKind::RendererReady,
            EventKind::LoadedData,
            EventKind::LoadedMetadata,
            EventKind::CanPlay,
        ]
    );

    time::timeout(Duration::from_millis(100), element.wait_for_events(5))
        .await
        .expect("volumechange never dispatched");
    time::sleep(Duration::from_millis(500)).await;

    let kinds = element.kinds();
    assert_eq!(kinds.len(), 5);
    assert_eq!(kinds[4], EventKind::VolumeChange);
    for kind in EventKind::READY_SEQUENCE {
        assert_eq!(element.count_of(kind), 1);
    }
    assert!(element.events().iter().all(|e| e.target == "player1_youtube_iframe"));
}

#[tokio::test(start_paused = true)]
async fn test_provider_states_drive_events_and_poller() {
    let (provider, loader) = setup();
    let element = Arc::new(RecordingElement::new("player1"));
    let adapter = adapter_for(&element, &loader, "https://youtu.be/abc123").await;

    loader.on_global_ready().await;
    provider.ready(0);
    wait_ready(&adapter).await;
    let base = element.events().len();

    provider.state_change(0, 5);
    provider.state_change(0, 1);
    element.wait_for_events(base + 5).await;
    assert!(adapter.is_polling().await);
    assert_eq!(adapter.shadow().await, ShadowState { paused: false, ended: false });

    // Ticks at 250, 500 and 750ms
    time::sleep(Duration::from_millis(800)).await;
    assert_eq!(element.count_of(EventKind::TimeUpdate), 3);

    provider.state_change(0, 2);
    provider.state_change(0, 0);
    element.wait_for_events(base + 10).await;
    assert!(!adapter.is_polling().await);

    time::sleep(Duration::from_secs(2)).await;
    assert_eq!(element.count_of(EventKind::TimeUpdate), 3);

    assert_eq!(
        element.kinds()[base..],
        [
            EventKind::LoadedData,
            EventKind::LoadedMetadata,
            EventKind::CanPlay,
            EventKind::Play,
            EventKind::Playing,
            EventKind::TimeUpdate,
            EventKind::TimeUpdate,
            EventKind::TimeUpdate,
            EventKind::Pause,
            EventKind::Ended,
        ]
    );
    assert_eq!(adapter.shadow().await, ShadowState { paused: false, ended: true });
    assert_eq!(adapter.get(Property::Ended).await.unwrap(), PropertyValue::Bool(true));
}

#[test]
fn test_translation_sequence() {
    let mut shadow = ShadowState::default();
    let mut commands = Vec::new();
    for code in [5, 1, 2, 0] {
        let t = translate(code, shadow);
        commands.push(t.poller);
        shadow = t.shadow;
    }

    assert_eq!(
        commands,
        vec![
            PollerCommand::Unchanged,
            PollerCommand::Start,
            PollerCommand::Stop,
            PollerCommand::Stop,
        ]
    );
    assert_eq!(shadow, ShadowState { paused: false, ended: true });
}

// =============================================================================
// Bridge Tests
// =============================================================================

#[tokio::test]
async fn test_bound_reads_go_to_remote() {
    let (provider, loader) = setup();
    let element = Arc::new(RecordingElement::new("player1"));
    let adapter = adapter_for(&element, &loader, "https://youtu.be/abc123").await;

    loader.on_global_ready().await;
    let player = provider.player(0).unwrap();
    player.set_duration(120.0);
    player.set_loaded_fraction(0.5);
    player.set_current_time(12.5);
    provider.ready(0);
    wait_ready(&adapter).await;

    assert_eq!(adapter.get(Property::Duration).await.unwrap(), PropertyValue::Number(120.0));
    assert_eq!(adapter.get(Property::CurrentTime).await.unwrap(), PropertyValue::Number(12.5));
    assert_eq!(
        adapter.get(Property::Buffered).await.unwrap(),
        PropertyValue::Ranges(TimeRanges::single(0.0, 60.0))
    );

    adapter.set_named("src", "https://www.youtube.com/watch?v=next").await.unwrap();
    assert_eq!(
        adapter.get_named("src").await.unwrap(),
        PropertyValue::Text("https://www.youtube.com/watch?v=next".to_string())
    );
}

#[tokio::test]
async fn test_unknown_names_are_not_applicable() {
    let (provider, loader) = setup();
    let element = Arc::new(RecordingElement::new("player1"));
    let adapter = adapter_for(&element, &loader, "https://youtu.be/abc123").await;

    assert_eq!(adapter.set_named("playbackRate", 2.0).await.unwrap(), BridgeOutcome::NotApplicable);
    assert_eq!(adapter.invoke_named("fastSeek").await.unwrap(), BridgeOutcome::NotApplicable);

    loader.on_global_ready().await;
    provider.ready(0);
    wait_ready(&adapter).await;

    assert_eq!(adapter.set_named("playbackRate", 2.0).await.unwrap(), BridgeOutcome::NotApplicable);
    assert_eq!(adapter.set(Property::Paused, false).await.unwrap(), BridgeOutcome::NotApplicable);
    assert!(provider.player(0).unwrap().calls().is_empty());
}

// =============================================================================
// Surface Tests
// =============================================================================

#[tokio::test]
async fn test_pointer_passthrough_and_visibility() {
    let (provider, loader) = setup();
    let element = Arc::new(RecordingElement::new("player1"));
    let adapter = adapter_for(&element, &loader, "https://youtu.be/abc123").await;

    assert_eq!(adapter.set_size(320, 180).await.unwrap(), BridgeOutcome::NotApplicable);

    loader.on_global_ready().await;
    provider.ready(0);
    wait_ready(&adapter).await;

    let player = provider.player(0).unwrap();
    let surface = player.simulated_surface();
    assert!(surface.is_watched());

    assert!(surface.hover(PointerKind::Enter));
    assert!(surface.hover(PointerKind::Leave));
    element.wait_for_events(6).await;
    assert_eq!(element.kinds()[4..], [EventKind::MouseOver, EventKind::MouseOut]);

    adapter.hide().await.unwrap();
    assert!(!surface.is_visible());
    adapter.show().await.unwrap();
    assert!(surface.is_visible());

    assert_eq!(adapter.set_size(320, 180).await.unwrap(), BridgeOutcome::Applied);
    assert_eq!(player.calls(), vec![RemoteCall::Pause, RemoteCall::SetSize(320, 180)]);
}

// =============================================================================
// Destroy Tests
// =============================================================================

#[tokio::test]
async fn test_destroy_before_ready_drops_late_callbacks() {
    let (provider, loader) = setup();
    let element = Arc::new(RecordingElement::new("player1"));
    let adapter = adapter_for(&element, &loader, "https://youtu.be/abc123").await;

    adapter.play().await.unwrap();
    adapter.destroy().await;

    loader.on_global_ready().await;
    provider.ready(0);
    provider.state_change(0, 1);
    wait_destroyed(&provider, 0).await;
    tokio::task::yield_now().await;

    assert!(element.events().is_empty());
    assert_eq!(provider.player(0).unwrap().calls(), vec![RemoteCall::Destroy]);
    assert!(matches!(adapter.ready().await, Err(Error::AdapterReleased(_))));
    assert!(matches!(
        adapter.get(Property::Paused).await,
        Err(Error::AdapterReleased(_))
    ));
}

#[tokio::test]
async fn test_destroy_after_immediate_creation_destroys_once() {
    let (provider, loader) = setup();
    loader.on_global_ready().await;
    let element = Arc::new(RecordingElement::new("player1"));
    let adapter = adapter_for(&element, &loader, "https://youtu.be/abc123").await;

    adapter.destroy().await;
    let player = provider.player(0).unwrap();
    assert_eq!(player.calls(), vec![RemoteCall::Destroy]);

    // The provider still reports the same player ready afterwards
    provider.ready(0);
    tokio::task::yield_now().await;

    assert_eq!(player.calls(), vec![RemoteCall::Destroy]);
    assert!(element.events().is_empty());
}

#[tokio::test]
async fn test_dropped_adapter_destroys_late_player() {
    let (provider, loader) = setup();
    let element = Arc::new(RecordingElement::new("player1"));
    let adapter = adapter_for(&element, &loader, "https://youtu.be/abc123").await;
    adapter.play().await.unwrap();
    drop(adapter);

    loader.on_global_ready().await;
    provider.ready(0);
    wait_destroyed(&provider, 0).await;

    assert_eq!(provider.player(0).unwrap().calls(), vec![RemoteCall::Destroy]);
    assert!(element.events().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_destroy_cancels_pending_volume_change() {
    let (provider, loader) = setup();
    let element = Arc::new(RecordingElement::new("player1"));
    let adapter = adapter_for(&element, &loader, "https://youtu.be/abc123").await;

    loader.on_global_ready().await;
    provider.ready(0);
    wait_ready(&adapter).await;

    adapter.set(Property::Volume, 0.2).await.unwrap();
    adapter.destroy().await;
    time::sleep(Duration::from_millis(200)).await;

    assert_eq!(element.count_of(EventKind::VolumeChange), 0);
    assert_eq!(
        provider.player(0).unwrap().calls(),
        vec![RemoteCall::SetVolume(0.2), RemoteCall::Destroy]
    );
}
