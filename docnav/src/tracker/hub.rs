//! Shared viewport listeners
//!
//! Many trackers can be alive at once (one per rendered article pane). The
//! hub keeps a single host listener per event kind, no matter how many
//! trackers subscribe, and fans each event out to every live tracker.

use super::ActiveSectionTracker;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Kinds of viewport events a tracker reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportEventKind {
    Scroll,
    Resize,
}

impl ViewportEventKind {
    /// Every kind the hub listens for
    pub const ALL: [ViewportEventKind; 2] = [ViewportEventKind::Scroll, ViewportEventKind::Resize];
}

/// A viewport change together with the scroll position at that moment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportEvent {
    pub kind: ViewportEventKind,
    pub scroll_y: f64,
}

impl ViewportEvent {
    pub fn scroll(scroll_y: f64) -> Self {
        Self {
            kind: ViewportEventKind::Scroll,
            scroll_y,
        }
    }

    pub fn resize(scroll_y: f64) -> Self {
        Self {
            kind: ViewportEventKind::Resize,
            scroll_y,
        }
    }
}

/// The environment that actually delivers viewport events
pub trait ListenerHost {
    /// Start delivering events of `kind` to the hub
    fn add_listener(&mut self, kind: ViewportEventKind);

    /// Stop delivering events of `kind`
    fn remove_listener(&mut self, kind: ViewportEventKind);
}

/// Handle returned by [`ViewportHub::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber {
    id: SubscriptionId,
    tracker: Weak<RefCell<ActiveSectionTracker>>,
}

/// Fans viewport events out to subscribed trackers
pub struct ViewportHub<H: ListenerHost> {
    host: H,
    subscribers: Vec<Subscriber>,
    next_id: u64,
    attached: bool,
}

impl<H: ListenerHost> ViewportHub<H> {
    /// Create a hub with no subscribers; nothing is attached to `host` yet
    pub fn new(host: H) -> Self {
        Self {
            host,
            subscribers: Vec::new(),
            next_id: 0,
            attached: false,
        }
    }

    /// Subscribe a tracker to scroll and resize events
    ///
    /// The hub only holds a weak reference; dropping the tracker is enough
    /// to stop deliveries to it.
    pub fn subscribe(&mut self, tracker: &Rc<RefCell<ActiveSectionTracker>>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            tracker: Rc::downgrade(tracker),
        });
        self.sync_host();
        id
    }

    /// Remove a subscription; unknown ids are ignored
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|sub| sub.id != id);
        self.sync_host();
    }

    /// Deliver an event to every live tracker, in subscription order
    ///
    /// A tracker that is already borrowed elsewhere misses this event and
    /// picks up the next one. Returns the number of trackers that received
    /// the event.
    pub fn dispatch(&mut self, event: ViewportEvent) -> usize {
        self.prune();

        let trackers: Vec<_> = self
            .subscribers
            .iter()
            .filter_map(|sub| sub.tracker.upgrade())
            .collect();

        let mut delivered = 0;
        for tracker in &trackers {
            match tracker.try_borrow_mut() {
                Ok(mut tracker) => {
                    tracker.handle_event(event);
                    delivered += 1;
                }
                Err(_) => log::debug!("Tracker busy, skipping {:?} event", event.kind),
            }
        }
        delivered
    }

    /// Drop subscriptions whose tracker no longer exists
    pub fn prune(&mut self) {
        self.subscribers.retain(|sub| sub.tracker.strong_count() > 0);
        self.sync_host();
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|sub| sub.tracker.strong_count() > 0)
            .count()
    }

    /// Whether host listeners are currently attached
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Attach on the first subscriber, detach after the last one
    fn sync_host(&mut self) {
        let wanted = !self.subscribers.is_empty();
        if wanted == self.attached {
            return;
        }

        for kind in ViewportEventKind::ALL {
            if wanted {
                self.host.add_listener(kind);
            } else {
                self.host.remove_listener(kind);
            }
        }
        log::debug!(
            "Viewport listeners {}",
            if wanted { "attached" } else { "detached" }
        );
        self.attached = wanted;
    }
}

impl<H: ListenerHost> Drop for ViewportHub<H> {
    fn drop(&mut self) {
        self.subscribers.clear();
        self.sync_host();
    }
}
