//! Synchronous fan-out of host page events
//!
//! The host shell emits connectivity, visibility and teardown events into a
//! [`PageEvents`] hub. Components register listeners and keep the returned
//! [`Subscription`]; dropping it removes the listener. Listeners run on the
//! emitting thread, so anything that needs I/O must spawn a task.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use edubrain_common::Subscription;
use parking_lot::Mutex;
use tracing::debug;

use crate::health::NetworkStatus;

/// Event raised by the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEvent {
    Online,
    Offline,
    VisibilityChanged { visible: bool },
    /// The host is about to tear the client down.
    Unload,
}

/// Callback invoked for every emitted event.
pub type PageEventListener = Arc<dyn Fn(&PageEvent) + Send + Sync>;

struct HubInner {
    listeners: Mutex<Vec<(u64, PageEventListener)>>,
    next_id: AtomicU64,
    online: AtomicBool,
}

/// Registry of page event listeners.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone)]
pub struct PageEvents {
    inner: Arc<HubInner>,
}

impl PageEvents {
    /// Create a hub that assumes the network is online.
    pub fn new() -> Self {
        Self::with_online(true)
    }

    /// Create a hub with an explicit initial connectivity state.
    pub fn with_online(online: bool) -> Self {
        Self {
            inner: Arc::new(HubInner {
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
                online: AtomicBool::new(online),
            }),
        }
    }

    /// Register `listener`; it stays registered while the returned handle lives.
    pub fn subscribe(
        &self,
        label: &'static str,
        listener: impl Fn(&PageEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        debug!(label, id, "page event listener registered");

        let registry: Weak<HubInner> = Arc::downgrade(&self.inner);
        Subscription::new(label, move || {
            if let Some(inner) = registry.upgrade() {
                inner.listeners.lock().retain(|(entry, _)| *entry != id);
            }
        })
    }

    /// Deliver `event` to every registered listener.
    ///
    /// Connectivity events update [`NetworkStatus::is_online`] before any
    /// listener runs.
    pub fn emit(&self, event: PageEvent) {
        match event {
            PageEvent::Online => self.inner.online.store(true, Ordering::SeqCst),
            PageEvent::Offline => self.inner.online.store(false, Ordering::SeqCst),
            PageEvent::VisibilityChanged { .. } | PageEvent::Unload => {}
        }

        // Snapshot so listeners may subscribe or unsubscribe while running.
        let listeners: Vec<PageEventListener> =
            self.inner.listeners.lock().iter().map(|(_, listener)| Arc::clone(listener)).collect();

        debug!(?event, listeners = listeners.len(), "emitting page event");
        for listener in listeners {
            listener(&event);
        }
    }

    /// Number of listeners currently registered.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

impl Default for PageEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkStatus for PageEvents {
    fn is_online(&self) -> bool {
        self.inner.online.load(Ordering::SeqCst)
    }
}

impl fmt::Debug for PageEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageEvents")
            .field("listeners", &self.listener_count())
            .field("online", &self.is_online())
            .finish()
    }
}
