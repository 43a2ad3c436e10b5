//! Test: connecting and closing in every session mode

use tests::{hook_lock::global_hook, Fixture, SessionMode, TestTarget};

#[tokio::test(flavor = "multi_thread")]
async fn test_connect_and_close_plain() {
    let target = TestTarget::resolve().await;
    let session = target.connect(Fixture::Minimal, SessionMode::Plain).await;
    assert!(session.server_info().is_some());
    session.close().await.expect("close should succeed");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connect_and_close_affinity() {
    let target = TestTarget::resolve().await;
    let session = target.connect(Fixture::Minimal, SessionMode::Affinity).await;
    assert_eq!(session.mode(), SessionMode::Affinity);
    assert_eq!(session.endpoint(), target.url(Fixture::Minimal));
    assert!(session.server_info().is_some());
    session.close().await.expect("close should succeed");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_connect_and_close_affinity_global() {
    let _guard = global_hook().await;
    let before = mcpconform_transport::hook::current();

    let target = TestTarget::resolve().await;
    let session = target
        .connect(Fixture::Minimal, SessionMode::AffinityGlobal)
        .await;
    assert!(!mcpconform_transport::hook::is_installed(&before));
    session.close().await.expect("close should succeed");

    // The service drops its transport on the way out; give it a moment.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(mcpconform_transport::hook::is_installed(&before));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_affinity_session_picks_up_session_token() {
    let target = TestTarget::resolve().await;
    let session = target.connect(Fixture::Full, SessionMode::Affinity).await;

    let state = session.affinity_state().expect("affinity mode keeps state");
    assert!(state.session.is_present(), "stateful server issues mcp-session-id");

    session.close().await.unwrap();
}
