//! SessionStore - owned observer of the current identity.
//!
//! The store is an explicit service object: hosts create it, `start()` it
//! against a provider, hand clones to the screens that need it and
//! `shutdown()` it on teardown. There is no process-wide instance.
//!
//! ## Notification
//!
//! ```text
//! provider event ──► apply() ──► signal updated (under lock)
//!                                   │
//!                                   ├─► watch channel (send_replace)
//!                                   └─► pending queue ──► drain() ──► listeners
//! ```
//!
//! Listeners are invoked outside the lock, one transition at a time. A
//! transition applied from inside a listener is queued and delivered after
//! the current one, so every listener sees transitions in order.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::provider::{IdentityEvent, IdentityEvents, IdentityProvider};
use crate::signal::SessionSignal;

/// Configuration for the session store.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long to wait for the provider's first event before settling
    /// to `Absent`. `None` waits indefinitely.
    pub resolve_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            resolve_timeout: Some(Duration::from_secs(10)),
        }
    }
}

type Listener = Arc<dyn Fn(&SessionSignal) + Send + Sync>;

#[derive(Clone)]
struct ListenerEntry {
    id: u64,
    active: Arc<AtomicBool>,
    callback: Listener,
}

struct StoreState {
    signal: SessionSignal,
    listeners: Vec<ListenerEntry>,
    pending: VecDeque<SessionSignal>,
    dispatching: bool,
    pump: Option<JoinHandle<()>>,
    started: bool,
    /// Bumped by every shutdown; a start that outlives its run drops its pump.
    run: u64,
}

struct Shared {
    state: Mutex<StoreState>,
    watch_tx: watch::Sender<SessionSignal>,
    next_listener_id: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Observer of the current authenticated identity.
///
/// Cloning is cheap and every clone shares the same signal and listeners.
#[derive(Clone)]
pub struct SessionStore {
    config: SessionConfig,
    shared: Arc<Shared>,
}

impl SessionStore {
    /// Create a store in the `Unresolved` state.
    pub fn new(config: SessionConfig) -> Self {
        let (watch_tx, _) = watch::channel(SessionSignal::Unresolved);
        Self {
            config,
            shared: Arc::new(Shared {
                state: Mutex::new(StoreState {
                    signal: SessionSignal::Unresolved,
                    listeners: Vec::new(),
                    pending: VecDeque::new(),
                    dispatching: false,
                    pump: None,
                    started: false,
                    run: 0,
                }),
                watch_tx,
                next_listener_id: AtomicU64::new(1),
            }),
        }
    }

    /// Subscribe to the provider and start applying its events.
    ///
    /// A provider that cannot be subscribed to settles the signal to
    /// `Absent`; the failure is logged, not returned.
    pub async fn start(&self, provider: Arc<dyn IdentityProvider>) -> Result<(), SessionError> {
        let run = {
            let mut state = self.shared.lock();
            if state.started {
                return Err(SessionError::AlreadyStarted);
            }
            state.started = true;
            state.run
        };

        info!(provider = provider.id(), "Starting session store");

        let events = match provider.subscribe().await {
            Ok(events) => events,
            Err(e) => {
                warn!(provider = provider.id(), error = %e, "Identity provider subscription failed");
                self.apply(IdentityEvent::Failed(e.to_string()));
                return Ok(());
            }
        };

        let store = self.clone();
        let resolve_timeout = self.config.resolve_timeout;
        let handle = tokio::spawn(async move { store.pump(events, resolve_timeout).await });

        let mut state = self.shared.lock();
        if state.started && state.run == run {
            state.pump = Some(handle);
        } else {
            debug!("Store shut down while subscribing, stopping event pump");
            handle.abort();
        }
        Ok(())
    }

    /// Stop applying provider events and drop all listeners.
    ///
    /// The last signal is kept; the store can be started again.
    pub fn shutdown(&self) {
        let (pump, listeners) = {
            let mut state = self.shared.lock();
            state.started = false;
            state.run += 1;
            (state.pump.take(), std::mem::take(&mut state.listeners))
        };

        if let Some(handle) = pump {
            handle.abort();
        }
        for listener in &listeners {
            listener.active.store(false, Ordering::SeqCst);
        }

        info!(listeners = listeners.len(), "Session store shut down");
    }

    /// Latest known signal.
    pub fn current_session(&self) -> SessionSignal {
        self.shared.lock().signal.clone()
    }

    /// Register a listener called once per transition, in transition order.
    ///
    /// The listener stays registered until the returned `Subscription` is
    /// unsubscribed or dropped.
    pub fn on_change<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionSignal) + Send + Sync + 'static,
    {
        let id = self.shared.next_listener_id.fetch_add(1, Ordering::SeqCst);
        let active = Arc::new(AtomicBool::new(true));

        self.shared.lock().listeners.push(ListenerEntry {
            id,
            active: Arc::clone(&active),
            callback: Arc::new(listener),
        });

        Subscription {
            id,
            active,
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Receiver that always holds the latest signal.
    pub fn watch(&self) -> watch::Receiver<SessionSignal> {
        self.shared.watch_tx.subscribe()
    }

    /// Stream of signals, starting with the current one.
    pub fn changes(&self) -> WatchStream<SessionSignal> {
        WatchStream::new(self.watch())
    }

    /// Wait until the provider has answered at least once.
    pub async fn resolved(&self) -> SessionSignal {
        let mut rx = self.watch();
        let waited = rx
            .wait_for(SessionSignal::is_resolved)
            .await
            .map(|signal| signal.clone());
        match waited {
            Ok(signal) => signal,
            Err(_) => self.current_session(),
        }
    }

    /// Apply one provider event. Returns true when it caused a transition.
    pub fn apply(&self, event: IdentityEvent) -> bool {
        let next = match event {
            IdentityEvent::SignedIn(identity) => SessionSignal::Present(identity),
            IdentityEvent::SignedOut => SessionSignal::Absent,
            IdentityEvent::Failed(reason) => {
                warn!(%reason, "Identity channel error, treating as signed out");
                SessionSignal::Absent
            }
        };
        self.transition(next)
    }

    async fn pump(self, mut events: IdentityEvents, resolve_timeout: Option<Duration>) {
        if let Some(limit) = resolve_timeout {
            match tokio::time::timeout(limit, events.recv()).await {
                Ok(Some(event)) => {
                    self.apply(event);
                }
                Ok(None) => {
                    self.settle_closed();
                    return;
                }
                Err(_) => {
                    self.apply(IdentityEvent::Failed(format!(
                        "no identity event within {}ms",
                        limit.as_millis()
                    )));
                }
            }
        }

        while let Some(event) = events.recv().await {
            self.apply(event);
        }

        self.settle_closed();
    }

    fn settle_closed(&self) {
        debug!("Identity channel closed");
        if !self.current_session().is_resolved() {
            self.apply(IdentityEvent::Failed("identity channel closed".to_string()));
        }
    }

    fn transition(&self, next: SessionSignal) -> bool {
        {
            let mut state = self.shared.lock();
            if state.signal == next {
                return false;
            }

            debug!(from = state.signal.label(), to = next.label(), "Session transition");
            state.signal = next.clone();
            state.pending.push_back(next.clone());
            self.shared.watch_tx.send_replace(next);

            if state.dispatching {
                return true;
            }
            state.dispatching = true;
        }

        self.drain();
        true
    }

    fn drain(&self) {
        let mut guard = DispatchGuard {
            shared: &self.shared,
            armed: true,
        };

        loop {
            let (signal, listeners) = {
                let mut state = self.shared.lock();
                match state.pending.pop_front() {
                    Some(signal) => (signal, state.listeners.clone()),
                    None => {
                        state.dispatching = false;
                        guard.armed = false;
                        return;
                    }
                }
            };

            for listener in listeners {
                // Checked per call: an earlier listener may have unsubscribed this one.
                if listener.active.load(Ordering::SeqCst) {
                    (listener.callback)(&signal);
                }
            }
        }
    }
}

/// Clears the dispatching flag if a listener unwinds out of `drain`.
/// Queued transitions are delivered by the next one.
struct DispatchGuard<'a> {
    shared: &'a Shared,
    armed: bool,
}

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.shared.lock().dispatching = false;
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

/// Deregistration handle returned by `SessionStore::on_change`.
///
/// Once unsubscribed (explicitly or by drop) the listener is never called again.
pub struct Subscription {
    id: u64,
    active: Arc<AtomicBool>,
    shared: Weak<Shared>,
}

impl Subscription {
    /// Stop receiving callbacks.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Whether the listener is still registered.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(shared) = self.shared.upgrade() {
            shared.lock().listeners.retain(|l| l.id != self.id);
        }
    }
}
