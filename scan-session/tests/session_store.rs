//! Session store integration tests
//!
//! Drive the store through a `MockProvider` the way a host would: start it,
//! push identity events, and observe the signal and listeners.

use futures::StreamExt;
use scan_session::{
    GateDecision, Identity, IdentityEvent, MockProvider, Route, SessionConfig, SessionSignal,
    SessionStore, ViewGate,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn no_timeout() -> SessionConfig {
    SessionConfig {
        resolve_timeout: None,
    }
}

async fn wait_until(store: &SessionStore, predicate: impl Fn(&SessionSignal) -> bool) -> SessionSignal {
    let mut rx = store.watch();
    let signal = tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| predicate(s)))
        .await
        .expect("signal did not change in time")
        .expect("store dropped");
    signal.clone()
}

/// Unresolved until the first event, then follows the provider.
#[tokio::test]
async fn test_signal_follows_provider_events() {
    let provider = Arc::new(MockProvider::new());
    let store = SessionStore::new(no_timeout());
    store.start(provider.clone()).await.unwrap();

    assert_eq!(store.current_session(), SessionSignal::Unresolved);
    assert_eq!(ViewGate::Protected.decide(&store.current_session()), GateDecision::Loading);

    provider.emit(IdentityEvent::SignedOut);
    assert_eq!(store.resolved().await, SessionSignal::Absent);
    assert_eq!(
        ViewGate::Protected.decide(&store.current_session()),
        GateDecision::Redirect { to: Route::Login }
    );

    let identity = Identity::new("uid-42").with_display_name("Ada");
    provider.emit(IdentityEvent::SignedIn(identity.clone()));
    let signal = wait_until(&store, |s| s.identity().is_some()).await;
    assert_eq!(signal, SessionSignal::Present(identity));

    store.shutdown();
}

/// A listener registered then deregistered receives nothing further.
#[tokio::test]
async fn test_deregistered_listener_receives_nothing() {
    let provider = Arc::new(MockProvider::new());
    let store = SessionStore::new(no_timeout());

    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let subscription = store.on_change(move |signal| sink.lock().unwrap().push(signal.clone()));

    store.start(provider.clone()).await.unwrap();
    provider.emit(IdentityEvent::SignedOut);
    store.resolved().await;

    subscription.unsubscribe();

    provider.emit(IdentityEvent::SignedIn(Identity::new("u1")));
    wait_until(&store, |s| s.identity().is_some()).await;

    assert_eq!(*calls.lock().unwrap(), vec![SessionSignal::Absent]);
}

/// Listeners see every transition exactly once and in order.
#[tokio::test]
async fn test_listener_sees_transitions_in_order() {
    let provider = Arc::new(MockProvider::new());
    let store = SessionStore::new(no_timeout());

    let labels = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&labels);
    let _subscription = store.on_change(move |signal| sink.lock().unwrap().push(signal.label()));

    provider.emit(IdentityEvent::SignedIn(Identity::new("u1")));
    provider.emit(IdentityEvent::SignedOut);
    provider.emit(IdentityEvent::SignedOut);
    provider.emit(IdentityEvent::SignedIn(Identity::new("u1")));
    provider.close();

    store.start(provider.clone()).await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if labels.lock().unwrap().len() >= 3 {
                break;
            }
            tokio::task::yield_now().await;
        }
    })
    .await
    .expect("listener was not called three times");

    assert_eq!(*labels.lock().unwrap(), vec!["present", "absent", "present"]);
}

/// The change stream starts with the current signal and follows transitions.
#[tokio::test]
async fn test_change_stream() {
    let provider = Arc::new(MockProvider::new());
    let store = SessionStore::new(no_timeout());
    store.start(provider.clone()).await.unwrap();

    let mut changes = store.changes();
    assert_eq!(changes.next().await, Some(SessionSignal::Unresolved));

    provider.emit(IdentityEvent::SignedOut);
    assert_eq!(changes.next().await, Some(SessionSignal::Absent));
}

/// A provider that closes before answering settles to Absent.
#[tokio::test]
async fn test_closed_channel_settles_absent() {
    let provider = Arc::new(MockProvider::new());
    provider.close();

    let store = SessionStore::new(no_timeout());
    store.start(provider).await.unwrap();

    assert_eq!(store.resolved().await, SessionSignal::Absent);
}

/// Channel errors resolve to Absent instead of propagating.
#[tokio::test]
async fn test_channel_error_settles_absent() {
    let provider = Arc::new(MockProvider::new());
    let store = SessionStore::new(no_timeout());
    store.start(provider.clone()).await.unwrap();

    provider.emit(IdentityEvent::SignedIn(Identity::new("u1")));
    wait_until(&store, |s| s.identity().is_some()).await;

    provider.emit(IdentityEvent::Failed("token refresh failed".to_string()));
    let signal = wait_until(&store, |s| matches!(s, SessionSignal::Absent)).await;
    assert_eq!(signal, SessionSignal::Absent);
}

/// A silent provider settles to Absent after the resolve timeout; a late
/// sign-in still moves the store to Present.
#[tokio::test(start_paused = true)]
async fn test_resolve_timeout() {
    let provider = Arc::new(MockProvider::new());
    let store = SessionStore::new(SessionConfig {
        resolve_timeout: Some(Duration::from_millis(500)),
    });
    store.start(provider.clone()).await.unwrap();

    assert_eq!(store.current_session(), SessionSignal::Unresolved);
    assert_eq!(store.resolved().await, SessionSignal::Absent);

    provider.emit(IdentityEvent::SignedIn(Identity::new("late")));
    let signal = wait_until(&store, |s| s.identity().is_some()).await;
    assert_eq!(signal.identity().map(|i| i.uid.as_str()), Some("late"));
}

/// Sign-in and sign-out through the provider flow back into the store.
#[tokio::test]
async fn test_sign_in_sign_out_round() {
    let provider = Arc::new(MockProvider::new().with_account(Identity::new("u7")));
    let store = SessionStore::new(no_timeout());
    store.start(provider.clone()).await.unwrap();

    provider.emit(IdentityEvent::SignedOut);
    assert_eq!(store.resolved().await, SessionSignal::Absent);

    use scan_session::IdentityProvider;
    provider.sign_in().await.unwrap();
    wait_until(&store, |s| s.identity().is_some()).await;
    assert_eq!(
        ViewGate::Entry.decide(&store.current_session()),
        GateDecision::Redirect { to: Route::Dashboard }
    );

    provider.sign_out().await.unwrap();
    let signal = wait_until(&store, |s| matches!(s, SessionSignal::Absent)).await;
    assert_eq!(signal, SessionSignal::Absent);
}
