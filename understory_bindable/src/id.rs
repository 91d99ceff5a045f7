// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property identification types.
//!
//! [`PropertyId`] identifies a registration at runtime, [`Property<T>`] is the
//! typed handle callers read and write through, and [`PropertyKey<T>`] is the
//! write capability for read-only properties.

use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// A runtime property identifier.
///
/// This is a lightweight handle (u16) that uniquely identifies a property
/// within a [`PropertyRegistry`](crate::PropertyRegistry). Identifiers are
/// assigned in registration order and never reused.
///
/// # Example
///
/// ```rust
/// use understory_bindable::PropertyId;
///
/// let id = PropertyId::new(42);
/// assert_eq!(id.index(), 42);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyId(u16);

impl PropertyId {
    /// Creates a new property ID from the given index.
    ///
    /// This is typically called by [`PropertyRegistry::register`](crate::PropertyRegistry::register)
    /// rather than directly.
    #[must_use]
    #[inline]
    pub const fn new(index: u16) -> Self {
        Self(index)
    }

    /// Returns the underlying index of this property ID.
    #[must_use]
    #[inline]
    pub const fn index(self) -> u16 {
        self.0
    }
}

impl fmt::Debug for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyId").field(&self.0).finish()
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyId({})", self.0)
    }
}

/// A type-safe property handle.
///
/// Wraps a [`PropertyId`] with a phantom value type so that reads and writes
/// through a [`PropertyBag`](crate::PropertyBag) are checked at compile time.
///
/// ```rust
/// use understory_bindable::{Property, PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::new();
/// let width: Property<f64> = registry
///     .register("View", "Width", PropertyMetadataBuilder::new(0.0_f64).build())
///     .unwrap();
///
/// // bag.set(width, "not a number"); // Would not compile!
/// # let _ = width;
/// ```
pub struct Property<T> {
    id: PropertyId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Property<T> {
    /// Creates a typed property from a property ID.
    ///
    /// The caller must ensure that the `PropertyId` was registered with the same
    /// type `T`. Reading through a mismatched handle panics.
    #[must_use]
    #[inline]
    pub const fn from_id(id: PropertyId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying property ID.
    #[must_use]
    #[inline]
    pub const fn id(self) -> PropertyId {
        self.id
    }
}

impl<T> Copy for Property<T> {}

impl<T> Clone for Property<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for Property<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Property<T> {}

impl<T> Hash for Property<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("id", &self.id)
            .field("type", &core::any::type_name::<T>())
            .finish()
    }
}

/// Write capability for a read-only property.
///
/// Only [`PropertyRegistry::register_read_only`](crate::PropertyRegistry::register_read_only)
/// hands these out, so the component that defined the property decides who
/// else may mutate it. Everyone else sees the public [`Property<T>`] and gets
/// [`PropertyError::AccessDenied`](crate::PropertyError::AccessDenied) from
/// [`PropertyBag::set`](crate::PropertyBag::set).
pub struct PropertyKey<T> {
    property: Property<T>,
}

impl<T> PropertyKey<T> {
    #[inline]
    pub(crate) const fn new(property: Property<T>) -> Self {
        Self { property }
    }

    /// Returns the public, read-only handle this key unlocks.
    #[must_use]
    #[inline]
    pub const fn property(&self) -> Property<T> {
        self.property
    }
}

impl<T> Copy for PropertyKey<T> {}

impl<T> Clone for PropertyKey<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> fmt::Debug for PropertyKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PropertyKey").field(&self.property.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::string::String;

    #[test]
    fn property_id_basics() {
        let id = PropertyId::new(42);
        assert_eq!(id.index(), 42);
        assert_eq!(id, PropertyId::new(42));
        assert_ne!(id, PropertyId::new(43));
    }

    #[test]
    fn property_id_formatting() {
        let id = PropertyId::new(7);
        assert_eq!(format!("{:?}", id), "PropertyId(7)");
        assert_eq!(format!("{}", id), "PropertyId(7)");
    }

    #[test]
    fn typed_handles_share_ids() {
        let id = PropertyId::new(1);
        let as_f64: Property<f64> = Property::from_id(id);
        let as_i32: Property<i32> = Property::from_id(id);
        assert_eq!(as_f64.id(), as_i32.id());
    }

    #[test]
    fn key_unlocks_its_property() {
        let property: Property<bool> = Property::from_id(PropertyId::new(3));
        let key = PropertyKey::new(property);
        assert_eq!(key.property(), property);
        assert_eq!(format!("{:?}", key), "PropertyKey(PropertyId(3))");
    }

    #[test]
    fn handle_size() {
        use core::mem::size_of;
        assert_eq!(size_of::<Property<String>>(), 2);
        assert_eq!(size_of::<PropertyKey<f64>>(), 2);
    }
}
