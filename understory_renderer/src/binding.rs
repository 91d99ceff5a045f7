// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The live association between a renderer and one element.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use understory_bindable::{BindableObject, Handlers, PropertyChanged, SubscriptionId};

/// Raised when a binding moves from one element to another.
pub struct ElementChanged<E> {
    /// The element that was bound before.
    pub old: Option<Rc<E>>,
    /// The element bound now.
    pub new: Option<Rc<E>>,
}

impl<E> fmt::Debug for ElementChanged<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementChanged")
            .field("old", &self.old.is_some())
            .field("new", &self.new.is_some())
            .finish()
    }
}

/// Lifecycle of a [`RendererBinding`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BindingPhase {
    /// No element yet.
    Unbound,
    /// Following an element.
    Bound,
    /// Torn down; every further call is a no-op.
    Disposed,
}

enum State<E> {
    Unbound,
    Bound {
        element: Rc<E>,
        subscription: SubscriptionId,
    },
    Disposed,
}

/// Tracks which element a renderer shows and forwards its changes.
///
/// `Unbound → Bound(a) → Bound(b) → … → Disposed`. Rebinding unsubscribes
/// from the old element before subscribing to the new one, then raises
/// [`element_changed`](Self::element_changed). While bound, every property
/// change of the element is re-raised through
/// [`property_changed`](Self::property_changed).
pub struct RendererBinding<E> {
    this: Weak<Self>,
    state: RefCell<State<E>>,
    element_changed: Handlers<ElementChanged<E>>,
    property_changed: Handlers<PropertyChanged>,
}

impl<E> RendererBinding<E> {
    /// The bound element.
    #[must_use]
    pub fn element(&self) -> Option<Rc<E>> {
        match &*self.state.borrow() {
            State::Bound { element, .. } => Some(element.clone()),
            State::Unbound | State::Disposed => None,
        }
    }

    /// Where the binding is in its lifecycle.
    #[must_use]
    pub fn phase(&self) -> BindingPhase {
        match &*self.state.borrow() {
            State::Unbound => BindingPhase::Unbound,
            State::Bound { .. } => BindingPhase::Bound,
            State::Disposed => BindingPhase::Disposed,
        }
    }

    /// Returns `true` after [`dispose`](Self::dispose).
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.phase() == BindingPhase::Disposed
    }

    /// Raised after the bound element changes.
    #[must_use]
    pub fn element_changed(&self) -> &Handlers<ElementChanged<E>> {
        &self.element_changed
    }

    /// Re-raises property changes of the bound element.
    #[must_use]
    pub fn property_changed(&self) -> &Handlers<PropertyChanged> {
        &self.property_changed
    }
}

impl<E: BindableObject + 'static> RendererBinding<E> {
    /// Creates an unbound binding.
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            state: RefCell::new(State::Unbound),
            element_changed: Handlers::new(),
            property_changed: Handlers::new(),
        })
    }

    /// Binds `element`, or unbinds with `None`.
    ///
    /// Binding the element that is already bound does nothing. Ignored after
    /// [`dispose`](Self::dispose).
    pub fn set_element(&self, element: Option<Rc<E>>) {
        let old = {
            let state = self.state.borrow();
            match &*state {
                State::Disposed => {
                    tracing::debug!("ignoring element change on a disposed renderer");
                    return;
                }
                State::Bound { element: current, .. } => {
                    if element.as_ref().is_some_and(|new| Rc::ptr_eq(new, current)) {
                        return;
                    }
                    Some(current.clone())
                }
                State::Unbound => {
                    if element.is_none() {
                        return;
                    }
                    None
                }
            }
        };

        self.release_element();
        if let Some(new) = &element {
            let subscription = self.follow(new);
            *self.state.borrow_mut() = State::Bound {
                element: new.clone(),
                subscription,
            };
        }
        tracing::debug!(rebind = old.is_some(), bound = element.is_some(), "renderer element changed");

        self.element_changed.emit(&ElementChanged { old, new: element });
    }

    /// Unsubscribes from the element and stops forwarding anything.
    ///
    /// Idempotent.
    pub fn dispose(&self) {
        if self.is_disposed() {
            return;
        }
        self.release_element();
        *self.state.borrow_mut() = State::Disposed;
        tracing::debug!("renderer binding disposed");
    }

    fn follow(&self, element: &Rc<E>) -> SubscriptionId {
        let this = self.this.clone();
        element.properties().subscribe(move |change| {
            if let Some(binding) = this.upgrade() {
                binding.property_changed.emit(change);
            }
        })
    }

    fn release_element(&self) {
        let previous = std::mem::replace(&mut *self.state.borrow_mut(), State::Unbound);
        if let State::Bound {
            element,
            subscription,
        } = previous
        {
            element.properties().unsubscribe(subscription);
        }
    }
}

impl<E> fmt::Debug for RendererBinding<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererBinding")
            .field("phase", &self.phase())
            .field("element_changed", &self.element_changed.len())
            .field("property_changed", &self.property_changed.len())
            .finish()
    }
}
