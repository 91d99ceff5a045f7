// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered handler lists with explicit subscribe/unsubscribe.

use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use core::fmt;
use smallvec::SmallVec;

/// Identifies one subscription within a [`Handlers`] list.
///
/// Ids are never reused by the list that issued them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    /// Returns the raw id.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

type Handler<A> = Rc<dyn Fn(&A)>;

/// An ordered list of event handlers taking `&A`.
///
/// Handlers run in subscription order. [`emit`](Self::emit) walks a snapshot of
/// the list, so a handler may subscribe or unsubscribe (itself or others)
/// while the event is being dispatched; such changes take effect for the next
/// emission.
///
/// The argument type may be unsized, which lets capability events hand the
/// sender out as a trait object:
///
/// ```rust
/// use core::cell::Cell;
/// use std::rc::Rc;
/// use understory_bindable::Handlers;
///
/// let clicked: Handlers<str> = Handlers::new();
/// let count = Rc::new(Cell::new(0));
/// let seen = count.clone();
/// let id = clicked.subscribe(move |name: &str| {
///     assert_eq!(name, "ok");
///     seen.set(seen.get() + 1);
/// });
///
/// clicked.emit("ok");
/// assert!(clicked.unsubscribe(id));
/// clicked.emit("ok");
/// assert_eq!(count.get(), 1);
/// ```
pub struct Handlers<A: ?Sized> {
    next_id: Cell<u64>,
    entries: RefCell<SmallVec<[(SubscriptionId, Handler<A>); 2]>>,
}

impl<A: ?Sized> Handlers<A> {
    /// Creates an empty handler list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: Cell::new(0),
            entries: RefCell::new(SmallVec::new()),
        }
    }

    /// Appends `handler` and returns its subscription id.
    pub fn subscribe(&self, handler: impl Fn(&A) + 'static) -> SubscriptionId {
        self.subscribe_rc(Rc::new(handler))
    }

    /// Appends an already shared handler.
    pub fn subscribe_rc(&self, handler: Rc<dyn Fn(&A)>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.entries.borrow_mut().push((id, handler));
        id
    }

    /// Removes a subscription.
    ///
    /// Returns `false` if `id` was not subscribed (already removed, or issued by
    /// another list).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.entries.borrow_mut();
        if let Some(index) = entries.iter().position(|(sid, _)| *sid == id) {
            entries.remove(index);
            true
        } else {
            false
        }
    }

    /// Invokes every handler with `args`, in subscription order.
    pub fn emit(&self, args: &A) {
        let snapshot: SmallVec<[Handler<A>; 4]> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in snapshot {
            handler(args);
        }
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` if nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl<A: ?Sized> Default for Handlers<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ?Sized> fmt::Debug for Handlers<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("len", &self.len())
            .field("next_id", &self.next_id.get())
            .finish()
    }
}
