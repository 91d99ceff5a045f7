// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-instance sparse property storage with change notification.
//!
//! A [`PropertyBag`] stores only the values that were explicitly set. Reads of
//! anything else fall through to the registered default. Like the rest of the
//! property family, entries live in a sorted `SmallVec` searched by
//! [`PropertyId`], so the first few set properties need no heap allocation.
//!
//! # Notification order
//!
//! One committed change of a property runs, in order:
//!
//! 1. the descriptor's `on_changing` hook,
//! 2. the storage mutation,
//! 3. the descriptor's `on_changed` hook,
//! 4. instance subscribers, in subscription order,
//! 5. mirrors registered with [`PropertyRegistry::mirror`].
//!
//! Rejected writes and writes of a value equal to the current effective value
//! run none of these.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use core::any::Any;
use core::cell::RefCell;
use core::fmt;
use smallvec::SmallVec;

use crate::error::PropertyError;
use crate::handlers::{Handlers, SubscriptionId};
use crate::id::{Property, PropertyId, PropertyKey};
use crate::metadata::{DefaultValue, PropertyMetadata, PropertyValue};
use crate::registry::PropertyRegistry;

/// Inline capacity for explicitly set values.
///
/// Widgets rarely set more than a handful of their properties.
const INLINE_CAPACITY: usize = 8;

type Entries = SmallVec<[(PropertyId, Box<dyn Any>); INLINE_CAPACITY]>;

/// Arguments of a property-changed notification.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PropertyChanged {
    /// The property whose effective value changed.
    pub property: PropertyId,
    /// The property's registered name.
    pub name: &'static str,
}

impl PropertyChanged {
    /// Returns `true` if this notification is about `property`.
    #[must_use]
    #[inline]
    pub fn is<T>(&self, property: Property<T>) -> bool {
        self.property == property.id()
    }
}

/// Sparse, observable storage for one object's properties.
///
/// The bag is confined to a single thread (it is neither `Send` nor `Sync`)
/// and every method takes `&self`: hooks and subscribers may read and write
/// the same bag while a notification is being dispatched.
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use understory_bindable::{PropertyBag, PropertyError, PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::new();
/// let cursor = registry
///     .register(
///         "Entry",
///         "CursorPosition",
///         PropertyMetadataBuilder::new(0_i32).validate(|v| *v >= 0).build(),
///     )
///     .unwrap();
///
/// let bag = PropertyBag::new(Rc::new(registry));
/// assert_eq!(bag.get(cursor), 0);
///
/// bag.set(cursor, 4).unwrap();
/// assert_eq!(bag.get(cursor), 4);
///
/// assert_eq!(
///     bag.set(cursor, -2),
///     Err(PropertyError::InvalidValue { name: "CursorPosition" })
/// );
/// assert_eq!(bag.get(cursor), 4);
///
/// bag.clear(cursor).unwrap();
/// assert!(!bag.is_set(cursor));
/// assert_eq!(bag.get(cursor), 0);
/// ```
pub struct PropertyBag {
    registry: Rc<PropertyRegistry>,
    owner: Option<Weak<dyn Any>>,
    /// Explicit values, sorted by [`PropertyId`].
    entries: RefCell<Entries>,
    /// Factory defaults kept for properties that ask for it.
    cached_defaults: RefCell<SmallVec<[(PropertyId, Box<dyn Any>); 2]>>,
    changed: Handlers<PropertyChanged>,
}

impl PropertyBag {
    /// Creates an empty bag backed by `registry`.
    #[must_use]
    pub fn new(registry: Rc<PropertyRegistry>) -> Self {
        Self {
            registry,
            owner: None,
            entries: RefCell::new(SmallVec::new()),
            cached_defaults: RefCell::new(SmallVec::new()),
            changed: Handlers::new(),
        }
    }

    /// Creates an empty bag that knows its owning object.
    ///
    /// Build the owner with [`Rc::new_cyclic`] so the bag can be created inside
    /// it; descriptor hooks then reach the owner through [`owner`](Self::owner).
    #[must_use]
    pub fn with_owner<W: Any>(registry: Rc<PropertyRegistry>, owner: Weak<W>) -> Self {
        let owner: Weak<dyn Any> = owner;
        Self {
            owner: Some(owner),
            ..Self::new(registry)
        }
    }

    /// Returns the owning object, if it is still alive and has type `W`.
    #[must_use]
    pub fn owner<W: Any>(&self) -> Option<Rc<W>> {
        self.owner.as_ref()?.upgrade()?.downcast::<W>().ok()
    }

    /// Returns the registry this bag reads its metadata from.
    #[must_use]
    #[inline]
    pub fn registry(&self) -> &Rc<PropertyRegistry> {
        &self.registry
    }

    /// Returns the effective value of `property`: the explicit value if one is
    /// set, otherwise the default.
    ///
    /// # Panics
    ///
    /// Panics if `property` is not registered with type `T` in this bag's
    /// registry.
    #[must_use]
    pub fn get<T: PropertyValue>(&self, property: Property<T>) -> T {
        if let Some(value) = self.explicit(property) {
            return value;
        }
        self.default_value(property)
    }

    /// Returns the default value of `property` for this instance.
    ///
    /// A default factory runs on every call unless its metadata enables
    /// caching, in which case the first result is kept.
    ///
    /// # Panics
    ///
    /// Panics if `property` is not registered with type `T`.
    #[must_use]
    pub fn default_value<T: PropertyValue>(&self, property: Property<T>) -> T {
        let metadata = self.metadata(property);
        match metadata.default_source() {
            DefaultValue::Value(value) => value.clone(),
            DefaultValue::Factory(factory) => {
                let id = property.id();
                if metadata.caches_default() {
                    let cached = self.cached_defaults.borrow();
                    if let Some((_, value)) = cached.iter().find(|(pid, _)| *pid == id) {
                        return downcast::<T>(&**value, id).clone();
                    }
                }
                // The factory may read this bag, so no borrow is held here.
                let value = factory(self);
                if metadata.caches_default() {
                    self.cached_defaults
                        .borrow_mut()
                        .push((id, Box::new(value.clone())));
                }
                value
            }
        }
    }

    /// Returns `true` if `property` holds an explicit value.
    ///
    /// This is distinct from "equals the default": an explicit value equal to
    /// the default still counts as set.
    #[must_use]
    pub fn is_set<T>(&self, property: Property<T>) -> bool {
        self.find(property.id()).is_ok()
    }

    /// Assigns `value` to a writable property.
    ///
    /// The value is validated, then coerced. If the result equals the current
    /// effective value it is recorded as explicit without any notification;
    /// otherwise the change is committed and announced.
    ///
    /// # Errors
    ///
    /// * [`PropertyError::AccessDenied`] if the property is read-only.
    /// * [`PropertyError::InvalidValue`] if the validator rejects `value`.
    ///
    /// On error the bag is unchanged and nothing is notified.
    ///
    /// # Panics
    ///
    /// Panics if `property` is not registered with type `T`.
    pub fn set<T: PropertyValue>(&self, property: Property<T>, value: T) -> Result<(), PropertyError> {
        self.check_writable(property.id())?;
        self.set_internal(property, value)
    }

    /// Assigns `value` to a read-only property through its write key.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::InvalidValue`] if the validator rejects `value`.
    pub fn set_with_key<T: PropertyValue>(
        &self,
        key: PropertyKey<T>,
        value: T,
    ) -> Result<(), PropertyError> {
        self.set_internal(key.property(), value)
    }

    /// Removes the explicit value of a writable property.
    ///
    /// A change notification is sent only if the effective value differs from
    /// the default it reverts to. Clearing an unset property does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::AccessDenied`] if the property is read-only.
    pub fn clear<T: PropertyValue>(&self, property: Property<T>) -> Result<(), PropertyError> {
        self.check_writable(property.id())?;
        self.clear_internal(property);
        Ok(())
    }

    /// Removes the explicit value of a read-only property through its write key.
    pub fn clear_with_key<T: PropertyValue>(&self, key: PropertyKey<T>) {
        self.clear_internal(key.property());
    }

    /// Subscribes to changes of any property in this bag.
    pub fn subscribe(&self, handler: impl Fn(&PropertyChanged) + 'static) -> SubscriptionId {
        self.changed.subscribe(handler)
    }

    /// Removes a subscription made with [`subscribe`](Self::subscribe).
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.changed.unsubscribe(id)
    }

    /// Returns the number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.changed.len()
    }

    /// Returns the number of explicitly set properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns `true` if no property is explicitly set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Returns the ids of explicitly set properties, in id order.
    #[must_use]
    pub fn property_ids(&self) -> SmallVec<[PropertyId; INLINE_CAPACITY]> {
        self.entries.borrow().iter().map(|(id, _)| *id).collect()
    }

    /// Writes without the read-only check; used for keyed writes and mirrors.
    pub(crate) fn set_internal<T: PropertyValue>(
        &self,
        property: Property<T>,
        value: T,
    ) -> Result<(), PropertyError> {
        let id = property.id();
        let metadata = self.metadata(property);
        if !metadata.is_valid(&value) {
            let name = self.name(id);
            tracing::debug!(property = name, "rejected invalid property value");
            return Err(PropertyError::InvalidValue { name });
        }
        let value = metadata.coerce(value);
        let old = self.get(property);

        if old == value {
            self.store(id, Box::new(value));
            return Ok(());
        }

        metadata.on_changing(self, &old, &value);
        self.store(id, Box::new(value.clone()));
        tracing::trace!(property = self.name(id), "property changed");
        self.notify(metadata, id, &old, &value);
        Ok(())
    }

    fn clear_internal<T: PropertyValue>(&self, property: Property<T>) {
        let id = property.id();
        let Some(old) = self.explicit(property) else {
            return;
        };
        let metadata = self.metadata(property);
        let new = self.default_value(property);

        if old == new {
            self.remove(id);
            return;
        }

        metadata.on_changing(self, &old, &new);
        self.remove(id);
        tracing::trace!(property = self.name(id), "property cleared");
        self.notify(metadata, id, &old, &new);
    }

    fn notify<T: PropertyValue>(&self, metadata: &PropertyMetadata<T>, id: PropertyId, old: &T, new: &T) {
        metadata.on_changed(self, old, new);
        self.changed.emit(&PropertyChanged {
            property: id,
            name: self.name(id),
        });
        self.registry.run_mirrors(self, id);
    }

    fn check_writable(&self, id: PropertyId) -> Result<(), PropertyError> {
        if self.registry.is_read_only(id) {
            let name = self.name(id);
            tracing::debug!(property = name, "rejected write to read-only property");
            return Err(PropertyError::AccessDenied { name });
        }
        Ok(())
    }

    fn metadata<T: PropertyValue>(&self, property: Property<T>) -> &PropertyMetadata<T> {
        match self.registry.get_metadata(property) {
            Some(metadata) => metadata,
            None => panic!(
                "property {:?} is not registered with type {}",
                property.id(),
                core::any::type_name::<T>()
            ),
        }
    }

    fn name(&self, id: PropertyId) -> &'static str {
        self.registry.name(id).unwrap_or("<unregistered>")
    }

    #[inline]
    fn find(&self, id: PropertyId) -> Result<usize, usize> {
        self.entries
            .borrow()
            .binary_search_by_key(&id, |(pid, _)| *pid)
    }

    fn explicit<T: PropertyValue>(&self, property: Property<T>) -> Option<T> {
        let id = property.id();
        let entries = self.entries.borrow();
        let idx = entries.binary_search_by_key(&id, |(pid, _)| *pid).ok()?;
        Some(downcast::<T>(&*entries[idx].1, id).clone())
    }

    fn store(&self, id: PropertyId, value: Box<dyn Any>) {
        let mut entries = self.entries.borrow_mut();
        match entries.binary_search_by_key(&id, |(pid, _)| *pid) {
            Ok(idx) => entries[idx].1 = value,
            Err(idx) => entries.insert(idx, (id, value)),
        }
    }

    fn remove(&self, id: PropertyId) {
        let mut entries = self.entries.borrow_mut();
        if let Ok(idx) = entries.binary_search_by_key(&id, |(pid, _)| *pid) {
            entries.remove(idx);
        }
    }
}

fn downcast<T: 'static>(value: &dyn Any, id: PropertyId) -> &T {
    match value.downcast_ref::<T>() {
        Some(value) => value,
        None => panic!(
            "property {id:?} holds a value that is not a {}",
            core::any::type_name::<T>()
        ),
    }
}

impl fmt::Debug for PropertyBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBag")
            .field("set", &self.property_ids())
            .field("subscribers", &self.changed.len())
            .field("has_owner", &self.owner.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PropertyMetadataBuilder;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::cell::Cell;

    type Log = Rc<RefCell<Vec<String>>>;

    fn push(log: &Log, entry: &str) {
        log.borrow_mut().push(String::from(entry));
    }

    #[test]
    fn get_returns_default_until_set() {
        let mut registry = PropertyRegistry::new();
        let width = registry
            .register("View", "Width", PropertyMetadata::new(10.0_f64))
            .unwrap();
        let bag = PropertyBag::new(Rc::new(registry));

        assert_eq!(bag.get(width), 10.0);
        assert!(!bag.is_set(width));
        assert!(bag.is_empty());

        bag.set(width, 20.0).unwrap();
        assert_eq!(bag.get(width), 20.0);
        assert!(bag.is_set(width));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn coercion_applies_before_storage() {
        let mut registry = PropertyRegistry::new();
        let opacity = registry
            .register(
                "View",
                "Opacity",
                PropertyMetadataBuilder::new(1.0_f64)
                    .coerce(|v| v.clamp(0.0, 1.0))
                    .build(),
            )
            .unwrap();
        let bag = PropertyBag::new(Rc::new(registry));

        bag.set(opacity, 3.0).unwrap();
        assert_eq!(bag.get(opacity), 1.0);
        bag.set(opacity, -3.0).unwrap();
        assert_eq!(bag.get(opacity), 0.0);
    }

    #[test]
    fn committed_change_runs_hooks_then_subscribers_in_order() {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let mut registry = PropertyRegistry::new();
        let text = {
            let (before, after) = (log.clone(), log.clone());
            registry
                .register(
                    "Button",
                    "Text",
                    PropertyMetadataBuilder::new(String::new())
                        .on_changing(move |bag, old: &String, _new| {
                            assert!(old.is_empty());
                            assert_eq!(bag.len(), 0);
                            push(&before, "changing");
                        })
                        .on_changed(move |bag, _old, new: &String| {
                            assert_eq!(new, "ok");
                            assert_eq!(bag.len(), 1);
                            push(&after, "changed");
                        })
                        .build(),
                )
                .unwrap()
        };
        let bag = PropertyBag::new(Rc::new(registry));
        for tag in ["first", "second"] {
            let log = log.clone();
            bag.subscribe(move |args| {
                assert_eq!(args.name, "Text");
                push(&log, tag);
            });
        }

        bag.set(text, String::from("ok")).unwrap();
        assert_eq!(*log.borrow(), vec!["changing", "changed", "first", "second"]);
    }

    #[test]
    fn equal_value_is_recorded_without_notification() {
        let mut registry = PropertyRegistry::new();
        let hooks = Rc::new(Cell::new(0));
        let width = {
            let hooks = hooks.clone();
            registry
                .register(
                    "View",
                    "Width",
                    PropertyMetadataBuilder::new(0.0_f64)
                        .on_changed(move |_, _, _| hooks.set(hooks.get() + 1))
                        .build(),
                )
                .unwrap()
        };
        let bag = PropertyBag::new(Rc::new(registry));
        let notified = Rc::new(Cell::new(0));
        {
            let notified = notified.clone();
            bag.subscribe(move |_| notified.set(notified.get() + 1));
        }

        bag.set(width, 0.0).unwrap();
        assert!(bag.is_set(width));
        assert_eq!((hooks.get(), notified.get()), (0, 0));

        bag.set(width, 5.0).unwrap();
        bag.set(width, 5.0).unwrap();
        assert_eq!((hooks.get(), notified.get()), (1, 1));
    }

    #[test]
    fn clear_notifies_only_when_effective_value_changes() {
        let mut registry = PropertyRegistry::new();
        let width = registry
            .register("View", "Width", PropertyMetadata::new(0.0_f64))
            .unwrap();
        let bag = PropertyBag::new(Rc::new(registry));
        let notified = Rc::new(Cell::new(0));
        {
            let notified = notified.clone();
            bag.subscribe(move |_| notified.set(notified.get() + 1));
        }

        bag.clear(width).unwrap();
        assert_eq!(notified.get(), 0);

        bag.set(width, 0.0).unwrap();
        bag.clear(width).unwrap();
        assert!(!bag.is_set(width));
        assert_eq!(notified.get(), 0);

        bag.set(width, 3.0).unwrap();
        bag.clear(width).unwrap();
        assert_eq!(bag.get(width), 0.0);
        assert_eq!(notified.get(), 2);
    }

    #[test]
    fn rejected_value_leaves_state_unchanged() {
        let mut registry = PropertyRegistry::new();
        let length = registry
            .register(
                "Entry",
                "SelectionLength",
                PropertyMetadataBuilder::new(0_i32).validate(|v| *v >= 0).build(),
            )
            .unwrap();
        let bag = PropertyBag::new(Rc::new(registry));
        let notified = Rc::new(Cell::new(0));
        {
            let notified = notified.clone();
            bag.subscribe(move |_| notified.set(notified.get() + 1));
        }

        bag.set(length, 12).unwrap();
        assert_eq!(
            bag.set(length, -2),
            Err(PropertyError::InvalidValue {
                name: "SelectionLength"
            })
        );
        assert_eq!(bag.get(length), 12);
        assert_eq!(notified.get(), 1);
    }

    #[test]
    fn read_only_requires_key() {
        let mut registry = PropertyRegistry::new();
        let (pressed, key) = registry
            .register_read_only("Button", "IsPressed", PropertyMetadata::new(false))
            .unwrap();
        let bag = PropertyBag::new(Rc::new(registry));

        assert_eq!(
            bag.set(pressed, true),
            Err(PropertyError::AccessDenied { name: "IsPressed" })
        );
        assert_eq!(
            bag.clear(pressed),
            Err(PropertyError::AccessDenied { name: "IsPressed" })
        );
        assert!(!bag.get(pressed));

        bag.set_with_key(key, true).unwrap();
        assert!(bag.get(pressed));
        bag.clear_with_key(key);
        assert!(!bag.is_set(pressed));
    }

    #[test]
    fn factory_default_runs_per_read_unless_cached() {
        let calls = Rc::new(Cell::new(0));
        let mut registry = PropertyRegistry::new();
        let uncached = {
            let calls = calls.clone();
            registry
                .register(
                    "Button",
                    "FontSize",
                    PropertyMetadataBuilder::with_factory(move |_| {
                        calls.set(calls.get() + 1);
                        14.0_f64
                    })
                    .build(),
                )
                .unwrap()
        };
        let cached_calls = Rc::new(Cell::new(0));
        let cached = {
            let calls = cached_calls.clone();
            registry
                .register(
                    "Label",
                    "FontSize",
                    PropertyMetadataBuilder::with_factory(move |_| {
                        calls.set(calls.get() + 1);
                        12.0_f64
                    })
                    .cache_default(true)
                    .build(),
                )
                .unwrap()
        };
        let bag = PropertyBag::new(Rc::new(registry));

        assert_eq!(bag.get(uncached), 14.0);
        assert_eq!(bag.get(uncached), 14.0);
        assert_eq!(calls.get(), 2);

        assert_eq!(bag.get(cached), 12.0);
        assert_eq!(bag.get(cached), 12.0);
        assert_eq!(cached_calls.get(), 1);
        assert!(!bag.is_set(cached));
    }

    #[test]
    fn mirrors_settle_after_one_hop() {
        let mut registry = PropertyRegistry::new();
        let border = registry
            .register("Button", "BorderRadius", PropertyMetadata::new(5_i32))
            .unwrap();
        let corner = registry
            .register("Button", "CornerRadius", PropertyMetadata::new(-1_i32))
            .unwrap();
        registry.mirror(border, corner, |v| if *v == 5 { -1 } else { *v });
        registry.mirror(corner, border, |v| if *v == -1 { 5 } else { *v });
        let bag = PropertyBag::new(Rc::new(registry));

        let log: Log = Rc::new(RefCell::new(Vec::new()));
        {
            let log = log.clone();
            bag.subscribe(move |args| push(&log, args.name));
        }

        bag.set(border, 8).unwrap();
        assert_eq!((bag.get(border), bag.get(corner)), (8, 8));
        assert_eq!(*log.borrow(), vec!["BorderRadius", "CornerRadius"]);

        bag.set(corner, -1).unwrap();
        assert_eq!((bag.get(border), bag.get(corner)), (5, -1));
    }

    #[test]
    fn hooks_reach_the_owner() {
        struct Widget {
            bag: PropertyBag,
            seen: Cell<i32>,
        }

        let mut registry = PropertyRegistry::new();
        let value = registry
            .register(
                "Widget",
                "Value",
                PropertyMetadataBuilder::new(0_i32)
                    .on_changed(|bag, _old, new| {
                        if let Some(widget) = bag.owner::<Widget>() {
                            widget.seen.set(*new);
                        }
                    })
                    .build(),
            )
            .unwrap();
        let registry = Rc::new(registry);
        let widget = Rc::new_cyclic(|weak| Widget {
            bag: PropertyBag::with_owner(registry.clone(), weak.clone()),
            seen: Cell::new(0),
        });

        widget.bag.set(value, 9).unwrap();
        assert_eq!(widget.seen.get(), 9);
        assert!(widget.bag.owner::<String>().is_none());
        assert!(PropertyBag::new(registry).owner::<Widget>().is_none());
    }

    #[test]
    fn subscribers_can_write_other_properties() {
        let mut registry = PropertyRegistry::new();
        let a = registry
            .register("View", "A", PropertyMetadata::new(0_i32))
            .unwrap();
        let b = registry
            .register("View", "B", PropertyMetadata::new(0_i32))
            .unwrap();
        let bag = Rc::new(PropertyBag::new(Rc::new(registry)));
        {
            let weak = Rc::downgrade(&bag);
            bag.subscribe(move |args| {
                if args.is(a) {
                    if let Some(bag) = weak.upgrade() {
                        bag.set(b, bag.get(a) * 2).unwrap();
                    }
                }
            });
        }

        bag.set(a, 21).unwrap();
        assert_eq!(bag.get(b), 42);
        assert_eq!(bag.property_ids().as_slice(), &[a.id(), b.id()]);
    }

    #[test]
    #[should_panic(expected = "is not registered with type")]
    fn mistyped_handle_panics() {
        let mut registry = PropertyRegistry::new();
        let width = registry
            .register("View", "Width", PropertyMetadata::new(0.0_f64))
            .unwrap();
        let bag = PropertyBag::new(Rc::new(registry));
        let wrong: Property<i32> = Property::from_id(width.id());
        let _ = bag.get(wrong);
    }
}
