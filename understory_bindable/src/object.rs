// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bindable object traits.
//!
//! [`BindableObject`] is implemented by anything that owns a [`PropertyBag`];
//! [`BindableObjectExt`] adds typed accessors to all such objects.

use crate::bag::{PropertyBag, PropertyChanged};
use crate::error::PropertyError;
use crate::handlers::SubscriptionId;
use crate::id::Property;
use crate::metadata::PropertyValue;

/// An object that stores its properties in a [`PropertyBag`].
///
/// Widgets implement capability traits by delegating to this bag; there is no
/// shared widget base type.
pub trait BindableObject {
    /// Returns the object's property bag.
    fn properties(&self) -> &PropertyBag;
}

/// Convenience accessors for every [`BindableObject`].
///
/// # Example
///
/// ```rust
/// use std::rc::Rc;
/// use understory_bindable::{
///     BindableObject, BindableObjectExt, PropertyBag, PropertyMetadata, PropertyRegistry,
/// };
///
/// struct Label {
///     properties: PropertyBag,
/// }
///
/// impl BindableObject for Label {
///     fn properties(&self) -> &PropertyBag {
///         &self.properties
///     }
/// }
///
/// let mut registry = PropertyRegistry::new();
/// let text = registry
///     .register("Label", "Text", PropertyMetadata::new(String::new()))
///     .unwrap();
///
/// let label = Label {
///     properties: PropertyBag::new(Rc::new(registry)),
/// };
/// label.set_value(text, "hello".to_string()).unwrap();
/// assert_eq!(label.get_value(text), "hello");
/// assert!(label.is_set(text));
/// ```
pub trait BindableObjectExt: BindableObject {
    /// Returns the effective value of `property`.
    fn get_value<T: PropertyValue>(&self, property: Property<T>) -> T {
        self.properties().get(property)
    }

    /// Assigns a writable property. See [`PropertyBag::set`].
    fn set_value<T: PropertyValue>(&self, property: Property<T>, value: T) -> Result<(), PropertyError> {
        self.properties().set(property, value)
    }

    /// Reverts a writable property to its default. See [`PropertyBag::clear`].
    fn clear_value<T: PropertyValue>(&self, property: Property<T>) -> Result<(), PropertyError> {
        self.properties().clear(property)
    }

    /// Returns `true` if `property` holds an explicit value.
    fn is_set<T>(&self, property: Property<T>) -> bool {
        self.properties().is_set(property)
    }

    /// Subscribes to changes of any property on this object.
    fn on_property_changed(&self, handler: impl Fn(&PropertyChanged) + 'static) -> SubscriptionId {
        self.properties().subscribe(handler)
    }
}

impl<O: BindableObject + ?Sized> BindableObjectExt for O {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::PropertyRegistry;
    use crate::metadata::PropertyMetadata;
    use alloc::rc::Rc;
    use core::cell::Cell;

    struct Counter {
        properties: PropertyBag,
    }

    impl BindableObject for Counter {
        fn properties(&self) -> &PropertyBag {
            &self.properties
        }
    }

    #[test]
    fn ext_methods_delegate_to_the_bag() {
        let mut registry = PropertyRegistry::new();
        let count = registry
            .register("Counter", "Count", PropertyMetadata::new(0_u32))
            .unwrap();
        let counter = Counter {
            properties: PropertyBag::new(Rc::new(registry)),
        };
        let changes = Rc::new(Cell::new(0));
        let id = {
            let changes = changes.clone();
            counter.on_property_changed(move |args| {
                assert!(args.is(count));
                changes.set(changes.get() + 1);
            })
        };

        counter.set_value(count, 3).unwrap();
        assert_eq!(counter.get_value(count), 3);
        counter.clear_value(count).unwrap();
        assert!(!counter.is_set(count));
        assert_eq!(changes.get(), 2);

        assert!(counter.properties().unsubscribe(id));
    }

    #[test]
    fn works_through_trait_objects() {
        let mut registry = PropertyRegistry::new();
        let flag = registry
            .register("Counter", "Flag", PropertyMetadata::new(false))
            .unwrap();
        let counter = Counter {
            properties: PropertyBag::new(Rc::new(registry)),
        };
        let object: &dyn BindableObject = &counter;

        object.set_value(flag, true).unwrap();
        assert!(object.get_value(flag));
    }
}
