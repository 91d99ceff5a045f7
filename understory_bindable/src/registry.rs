// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property registry.
//!
//! This module provides [`PropertyRegistry`] for registering and looking up
//! property metadata, and for pairing properties that mirror each other.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::{Any, TypeId};
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::bag::PropertyBag;
use crate::error::PropertyError;
use crate::id::{Property, PropertyId, PropertyKey};
use crate::metadata::{PropertyMetadata, PropertyValue};

/// A registration entry for a property.
///
/// This stores the property's identity, type information, access mode and
/// metadata.
pub struct PropertyRegistration {
    owner: &'static str,
    name: &'static str,
    type_id: TypeId,
    read_only: bool,
    metadata: Box<dyn Any>,
}

impl PropertyRegistration {
    /// Returns the owning type tag.
    #[must_use]
    #[inline]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Returns the property name.
    #[must_use]
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Returns the [`TypeId`] of the property's value type.
    #[must_use]
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns `true` if writes require the property's [`PropertyKey`].
    #[must_use]
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

impl core::fmt::Debug for PropertyRegistration {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyRegistration")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("type_id", &self.type_id)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

/// A registry for bindable properties.
///
/// Properties are registered once at startup through `&mut self`; the
/// finished registry is then shared read-only (typically as an
/// `Rc<PropertyRegistry>`) by every [`PropertyBag`] built on it.
///
/// Identity is the pair `(owner, name)`: two owning types may each declare a
/// `"Command"` property, but one owner may not declare it twice.
///
/// # Example
///
/// ```rust
/// use understory_bindable::{PropertyError, PropertyMetadataBuilder, PropertyRegistry};
///
/// let mut registry = PropertyRegistry::new();
///
/// let width = registry
///     .register("View", "Width", PropertyMetadataBuilder::new(0.0_f64).build())
///     .unwrap();
///
/// assert_eq!(registry.name(width.id()), Some("Width"));
/// assert_eq!(registry.by_name("View", "Width"), Some(width.id()));
///
/// let again = registry.register("View", "Width", PropertyMetadataBuilder::new(1.0_f64).build());
/// assert_eq!(
///     again,
///     Err(PropertyError::DuplicateProperty { owner: "View", name: "Width" })
/// );
/// ```
#[derive(Default)]
pub struct PropertyRegistry {
    properties: Vec<PropertyRegistration>,
    by_name: HashMap<&'static str, HashMap<&'static str, PropertyId>>,
    mirrors: HashMap<PropertyId, SmallVec<[Box<dyn ErasedMirror>; 1]>>,
}

impl PropertyRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new property with the given owner, name and metadata.
    ///
    /// Returns a type-safe [`Property<T>`] handle for accessing the property.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::DuplicateProperty`] if `(owner, name)` is
    /// already registered.
    ///
    /// # Panics
    ///
    /// Panics if more than 65,535 properties are registered.
    pub fn register<T: PropertyValue>(
        &mut self,
        owner: &'static str,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Result<Property<T>, PropertyError> {
        self.insert(owner, name, false, metadata)
    }

    /// Registers a read-only property.
    ///
    /// The returned [`PropertyKey`] is the only way to write the property; hand
    /// it to the component that owns the state and publish the [`Property`].
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::DuplicateProperty`] if `(owner, name)` is
    /// already registered.
    pub fn register_read_only<T: PropertyValue>(
        &mut self,
        owner: &'static str,
        name: &'static str,
        metadata: PropertyMetadata<T>,
    ) -> Result<(Property<T>, PropertyKey<T>), PropertyError> {
        let property = self.insert(owner, name, true, metadata)?;
        Ok((property, PropertyKey::new(property)))
    }

    fn insert<T: PropertyValue>(
        &mut self,
        owner: &'static str,
        name: &'static str,
        read_only: bool,
        metadata: PropertyMetadata<T>,
    ) -> Result<Property<T>, PropertyError> {
        if self.by_name(owner, name).is_some() {
            return Err(PropertyError::DuplicateProperty { owner, name });
        }
        assert!(
            self.properties.len() < u16::MAX as usize,
            "Too many properties registered (max {})",
            u16::MAX
        );

        #[expect(clippy::cast_possible_truncation, reason = "checked above")]
        let id = PropertyId::new(self.properties.len() as u16);

        self.properties.push(PropertyRegistration {
            owner,
            name,
            type_id: TypeId::of::<T>(),
            read_only,
            metadata: Box::new(metadata),
        });
        self.by_name.entry(owner).or_default().insert(name, id);

        Ok(Property::from_id(id))
    }

    /// Keeps `target` in lockstep with `source`.
    ///
    /// After every committed change of `source`, once its hooks and instance
    /// subscribers have run, `map` computes the value `target` should hold. The
    /// target is written through the normal set path only when that value
    /// differs from the target's current value, so a pair of mirrors
    /// (`a → b` and `b → a`) settles after one hop.
    ///
    /// Mirror writes are issued on behalf of the defining component and
    /// therefore bypass the target's read-only check.
    ///
    /// # Panics
    ///
    /// Panics if either handle is not registered with the stated type.
    pub fn mirror<S, U, F>(&mut self, source: Property<S>, target: Property<U>, map: F)
    where
        S: PropertyValue,
        U: PropertyValue,
        F: Fn(&S) -> U + 'static,
    {
        assert!(
            self.get_metadata(source).is_some(),
            "mirror source {:?} is not registered with this type",
            source.id()
        );
        assert!(
            self.get_metadata(target).is_some(),
            "mirror target {:?} is not registered with this type",
            target.id()
        );
        self.mirrors
            .entry(source.id())
            .or_default()
            .push(Box::new(Mirror {
                source,
                target,
                map: Box::new(map),
            }));
    }

    /// Returns the number of registered properties.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if no properties are registered.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Looks up a property by owner and name.
    #[must_use]
    pub fn by_name(&self, owner: &str, name: &str) -> Option<PropertyId> {
        self.by_name.get(owner)?.get(name).copied()
    }

    /// Returns the name of a property.
    #[must_use]
    pub fn name(&self, id: PropertyId) -> Option<&'static str> {
        self.get(id).map(PropertyRegistration::name)
    }

    /// Returns the owning type tag of a property.
    #[must_use]
    pub fn owner(&self, id: PropertyId) -> Option<&'static str> {
        self.get(id).map(PropertyRegistration::owner)
    }

    /// Returns whether a property is read-only.
    #[must_use]
    pub fn is_read_only(&self, id: PropertyId) -> bool {
        self.get(id).is_some_and(PropertyRegistration::is_read_only)
    }

    /// Returns the registration for a property.
    #[must_use]
    pub fn get(&self, id: PropertyId) -> Option<&PropertyRegistration> {
        self.properties.get(id.index() as usize)
    }

    /// Returns the metadata for a typed property.
    ///
    /// Returns `None` if the property is not registered or the type doesn't match.
    #[must_use]
    pub fn get_metadata<T: PropertyValue>(
        &self,
        property: Property<T>,
    ) -> Option<&PropertyMetadata<T>> {
        self.get(property.id())
            .and_then(|r| r.metadata.downcast_ref())
    }

    /// Returns an iterator over all registered properties.
    pub fn iter(&self) -> impl Iterator<Item = (PropertyId, &PropertyRegistration)> {
        self.properties.iter().enumerate().map(|(i, r)| {
            #[expect(clippy::cast_possible_truncation, reason = "index < len < u16::MAX")]
            (PropertyId::new(i as u16), r)
        })
    }

    /// Runs the mirrors registered for `source` against `bag`.
    pub(crate) fn run_mirrors(&self, bag: &PropertyBag, source: PropertyId) {
        if let Some(mirrors) = self.mirrors.get(&source) {
            for mirror in mirrors {
                mirror.apply(bag);
            }
        }
    }
}

impl core::fmt::Debug for PropertyRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PropertyRegistry")
            .field("count", &self.properties.len())
            .field(
                "properties",
                &self
                    .properties
                    .iter()
                    .map(|r| (r.owner, r.name))
                    .collect::<Vec<_>>(),
            )
            .field("mirrors", &self.mirrors.len())
            .finish()
    }
}

/// Type-erased mirror so mirrors of different value types share one table.
trait ErasedMirror {
    fn apply(&self, bag: &PropertyBag);
}

struct Mirror<S: 'static, U: 'static> {
    source: Property<S>,
    target: Property<U>,
    map: Box<dyn Fn(&S) -> U>,
}

impl<S: PropertyValue, U: PropertyValue> ErasedMirror for Mirror<S, U> {
    fn apply(&self, bag: &PropertyBag) {
        let mapped = (self.map)(&bag.get(self.source));
        if bag.get(self.target) == mapped {
            return;
        }
        if let Err(err) = bag.set_internal(self.target, mapped) {
            tracing::debug!(%err, "mirrored property rejected the mapped value");
        }
    }
}
