//! Single-threaded publish/subscribe signal

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<A> = Box<dyn FnMut(&A)>;

/// Identifier of one connection on a [`Signal`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

struct Slot<A> {
    id: SubscriptionId,
    /// `None` while the callback is running
    callback: Option<Callback<A>>,
}

struct SlotList<A> {
    next_id: u64,
    slots: Vec<Slot<A>>,
}

impl<A> SlotList<A> {
    fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.id != id);
        self.slots.len() != before
    }
}

/// Event source that invokes its connected callbacks in connection order
///
/// Callbacks may connect, disconnect or emit on the same signal while it is
/// being emitted. A callback connected during an emit is first invoked on the
/// next emit.
pub struct Signal<A: 'static = ()> {
    slots: Rc<RefCell<SlotList<A>>>,
}

impl<A: 'static> Default for Signal<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: 'static> fmt::Debug for Signal<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<A: 'static> Signal<A> {
    /// Create a signal with no subscribers
    pub fn new() -> Self {
        Self {
            slots: Rc::new(RefCell::new(SlotList {
                next_id: 0,
                slots: Vec::new(),
            })),
        }
    }

    /// Connect a callback; it stays connected until the returned token is dropped
    #[must_use = "dropping the subscription disconnects the callback immediately"]
    pub fn connect(&self, callback: impl FnMut(&A) + 'static) -> Subscription {
        let id = {
            let mut list = self.slots.borrow_mut();
            let id = SubscriptionId(list.next_id);
            list.next_id += 1;
            list.slots.push(Slot {
                id,
                callback: Some(Box::new(callback)),
            });
            id
        };

        let weak: Weak<RefCell<SlotList<A>>> = Rc::downgrade(&self.slots);
        Subscription {
            id,
            disconnect: Some(Box::new(move || {
                if let Some(slots) = weak.upgrade() {
                    slots.borrow_mut().remove(id);
                }
            })),
        }
    }

    /// Disconnect a callback by id; returns `false` when it was not connected
    pub fn disconnect(&self, id: SubscriptionId) -> bool {
        self.slots.borrow_mut().remove(id)
    }

    /// Disconnect every callback
    pub fn disconnect_all(&self) {
        self.slots.borrow_mut().slots.clear();
    }

    /// Number of connected callbacks
    pub fn subscriber_count(&self) -> usize {
        self.slots.borrow().slots.len()
    }

    /// Invoke every connected callback
    pub fn emit(&self, args: &A) {
        self.emit_filtered(args, |_| true);
    }

    /// Invoke every connected callback except `skip`
    pub fn emit_except(&self, skip: SubscriptionId, args: &A) {
        self.emit_filtered(args, |id| id != skip);
    }

    /// Invoke only the callback connected as `target`; returns whether it ran
    pub fn emit_to(&self, target: SubscriptionId, args: &A) -> bool {
        self.emit_filtered(args, |id| id == target) > 0
    }

    fn emit_filtered(&self, args: &A, filter: impl Fn(SubscriptionId) -> bool) -> usize {
        let ids: Vec<SubscriptionId> = self
            .slots
            .borrow()
            .slots
            .iter()
            .map(|slot| slot.id)
            .filter(|&id| filter(id))
            .collect();

        let mut invoked = 0;
        for id in ids {
            let callback = self
                .slots
                .borrow_mut()
                .slots
                .iter_mut()
                .find(|slot| slot.id == id)
                .and_then(|slot| slot.callback.take());

            // Disconnected earlier in this emit, or re-entrantly running
            let Some(mut callback) = callback else { continue };
            callback(args);
            invoked += 1;

            if let Some(slot) = self.slots.borrow_mut().slots.iter_mut().find(|slot| slot.id == id) {
                slot.callback = Some(callback);
            }
        }
        invoked
    }
}

/// Connection token returned by [`Signal::connect`]
///
/// Dropping it disconnects the callback. Call [`Subscription::detach`] to keep
/// the callback connected for as long as the signal lives.
pub struct Subscription {
    id: SubscriptionId,
    disconnect: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Id of the connection this token controls
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Release the token without disconnecting
    pub fn detach(mut self) -> SubscriptionId {
        self.disconnect = None;
        self.id
    }

    /// Disconnect now
    pub fn disconnect(mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(disconnect) = self.disconnect.take() {
            disconnect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_emit_reaches_subscribers_in_connection_order() {
        let signal = Signal::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let log = Rc::clone(&log);
            signal.connect(move |v| log.borrow_mut().push(("first", *v)))
        };
        let second = {
            let log = Rc::clone(&log);
            signal.connect(move |v| log.borrow_mut().push(("second", *v)))
        };

        signal.emit(&7);
        assert_eq!(*log.borrow(), vec![("first", 7), ("second", 7)]);
        drop((first, second));
    }

    #[test]
    fn test_dropping_subscription_disconnects() {
        let signal = Signal::<()>::new();
        let hits = Rc::new(Cell::new(0));

        let subscription = {
            let hits = Rc::clone(&hits);
            signal.connect(move |()| hits.set(hits.get() + 1))
        };
        signal.emit(&());
        drop(subscription);
        signal.emit(&());

        assert_eq!(hits.get(), 1);
        assert_eq!(signal.subscriber_count(), 0);
    }

    #[test]
    fn test_detached_subscription_stays_connected() {
        let signal = Signal::<()>::new();
        let hits = Rc::new(Cell::new(0));
        {
            let hits = Rc::clone(&hits);
            signal.connect(move |()| hits.set(hits.get() + 1)).detach();
        }
        signal.emit(&());
        signal.emit(&());
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_emit_except_and_emit_to() {
        let signal = Signal::<()>::new();
        let a_hits = Rc::new(Cell::new(0));
        let b_hits = Rc::new(Cell::new(0));

        let a = {
            let hits = Rc::clone(&a_hits);
            signal.connect(move |()| hits.set(hits.get() + 1))
        };
        let b = {
            let hits = Rc::clone(&b_hits);
            signal.connect(move |()| hits.set(hits.get() + 1))
        };

        signal.emit_except(a.id(), &());
        assert_eq!((a_hits.get(), b_hits.get()), (0, 1));

        assert!(signal.emit_to(a.id(), &()));
        assert_eq!((a_hits.get(), b_hits.get()), (1, 1));

        signal.disconnect_all();
        assert!(!signal.emit_to(b.id(), &()));
    }

    #[test]
    fn test_callback_can_disconnect_itself_while_emitting() {
        let signal = Rc::new(Signal::<()>::new());
        let own_id: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));
        let hits = Rc::new(Cell::new(0));

        let id = {
            let signal_ref = Rc::downgrade(&signal);
            let own_id = Rc::clone(&own_id);
            let hits = Rc::clone(&hits);
            signal
                .connect(move |()| {
                    hits.set(hits.get() + 1);
                    if let (Some(signal), Some(id)) = (signal_ref.upgrade(), own_id.get()) {
                        signal.disconnect(id);
                    }
                })
                .detach()
        };
        own_id.set(Some(id));

        signal.emit(&());
        signal.emit(&());
        assert_eq!(hits.get(), 1);
    }
}
