// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property metadata definitions.
//!
//! This module provides [`PropertyMetadata`] for storing property configuration
//! and [`PropertyMetadataBuilder`] for ergonomic construction.

use alloc::boxed::Box;
use core::fmt;

use crate::bag::PropertyBag;

/// Values that can be stored in a [`PropertyBag`].
///
/// Equality decides whether an assignment is a change; handle-like values
/// (commands, shared images) should compare by identity.
pub trait PropertyValue: Clone + PartialEq + 'static {}

impl<T: Clone + PartialEq + 'static> PropertyValue for T {}

/// Computes a per-instance default from the owning bag.
pub type DefaultValueFactory<T> = Box<dyn Fn(&PropertyBag) -> T>;

/// Accepts or rejects a proposed value before coercion.
pub type ValidateValueCallback<T> = Box<dyn Fn(&T) -> bool>;

/// Normalizes a value before it is stored.
///
/// This can be used to clamp values, snap them to a grid, etc.
pub type CoerceValueCallback<T> = Box<dyn Fn(T) -> T>;

/// Invoked around a committed change with the owning bag, old and new value.
pub type PropertyChangedCallback<T> = Box<dyn Fn(&PropertyBag, &T, &T)>;

/// Where a property's default comes from.
pub(crate) enum DefaultValue<T> {
    Value(T),
    Factory(DefaultValueFactory<T>),
}

/// Metadata for a bindable property.
///
/// Immutable once built. Holds the default (or default factory), the optional
/// validator and coercer, and the hooks the defining type runs around every
/// committed change.
///
/// # Example
///
/// ```rust
/// use understory_bindable::PropertyMetadataBuilder;
///
/// let metadata = PropertyMetadataBuilder::new(100.0_f64)
///     .validate(|v| v.is_finite())
///     .coerce(|v| v.clamp(0.0, 200.0))
///     .build();
///
/// assert_eq!(metadata.default_value(), Some(&100.0));
/// assert!(!metadata.is_valid(&f64::NAN));
/// assert_eq!(metadata.coerce(500.0), 200.0);
/// ```
pub struct PropertyMetadata<T: 'static> {
    default: DefaultValue<T>,
    cache_default: bool,
    validate_callback: Option<ValidateValueCallback<T>>,
    coerce_callback: Option<CoerceValueCallback<T>>,
    changing_callback: Option<PropertyChangedCallback<T>>,
    changed_callback: Option<PropertyChangedCallback<T>>,
}

impl<T: PropertyValue> PropertyMetadata<T> {
    /// Creates metadata with a fixed default and no hooks.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        PropertyMetadataBuilder::new(default_value).build()
    }

    /// Returns the fixed default, or `None` when the default is computed per
    /// instance. Use [`PropertyBag::default_value`] for the effective default.
    #[must_use]
    #[inline]
    pub fn default_value(&self) -> Option<&T> {
        match &self.default {
            DefaultValue::Value(value) => Some(value),
            DefaultValue::Factory(_) => None,
        }
    }

    /// Returns `true` if the default is computed per instance.
    #[must_use]
    #[inline]
    pub fn has_default_factory(&self) -> bool {
        matches!(self.default, DefaultValue::Factory(_))
    }

    /// Returns `true` if a computed default is kept by the bag after its first
    /// use.
    #[must_use]
    #[inline]
    pub fn caches_default(&self) -> bool {
        self.cache_default
    }

    pub(crate) fn default_source(&self) -> &DefaultValue<T> {
        &self.default
    }

    /// Runs the validator. Properties without one accept every value.
    #[must_use]
    #[inline]
    pub fn is_valid(&self, value: &T) -> bool {
        self.validate_callback
            .as_ref()
            .is_none_or(|callback| callback(value))
    }

    /// Coerces a value using the coerce callback if one is set.
    #[inline]
    pub fn coerce(&self, value: T) -> T {
        if let Some(callback) = &self.coerce_callback {
            callback(value)
        } else {
            value
        }
    }

    #[inline]
    pub(crate) fn on_changing(&self, bag: &PropertyBag, old: &T, new: &T) {
        if let Some(callback) = &self.changing_callback {
            callback(bag, old, new);
        }
    }

    #[inline]
    pub(crate) fn on_changed(&self, bag: &PropertyBag, old: &T, new: &T) {
        if let Some(callback) = &self.changed_callback {
            callback(bag, old, new);
        }
    }

    /// Returns whether a validator is set.
    #[must_use]
    #[inline]
    pub fn has_validator(&self) -> bool {
        self.validate_callback.is_some()
    }

    /// Returns whether a coerce callback is set.
    #[must_use]
    #[inline]
    pub fn has_coerce_callback(&self) -> bool {
        self.coerce_callback.is_some()
    }

    /// Returns whether a changing or changed hook is set.
    #[must_use]
    #[inline]
    pub fn has_change_hooks(&self) -> bool {
        self.changing_callback.is_some() || self.changed_callback.is_some()
    }
}

impl<T: fmt::Debug + 'static> fmt::Debug for PropertyMetadata<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("PropertyMetadata");
        match &self.default {
            DefaultValue::Value(value) => s.field("default_value", value),
            DefaultValue::Factory(_) => s.field("default_value", &"<factory>"),
        };
        s.field("cache_default", &self.cache_default)
            .field("has_validator", &self.validate_callback.is_some())
            .field("has_coerce_callback", &self.coerce_callback.is_some())
            .field("has_changing_callback", &self.changing_callback.is_some())
            .field("has_changed_callback", &self.changed_callback.is_some())
            .finish()
    }
}

/// Builder for [`PropertyMetadata`].
///
/// # Example
///
/// ```rust
/// use understory_bindable::PropertyMetadataBuilder;
///
/// let metadata = PropertyMetadataBuilder::new(0_i32)
///     .validate(|v| *v >= 0)
///     .on_changed(|_bag, old, new| {
///         assert_ne!(old, new);
///     })
///     .build();
/// # let _ = metadata;
/// ```
pub struct PropertyMetadataBuilder<T: 'static> {
    default: DefaultValue<T>,
    cache_default: bool,
    validate_callback: Option<ValidateValueCallback<T>>,
    coerce_callback: Option<CoerceValueCallback<T>>,
    changing_callback: Option<PropertyChangedCallback<T>>,
    changed_callback: Option<PropertyChangedCallback<T>>,
}

impl<T: fmt::Debug + 'static> fmt::Debug for PropertyMetadataBuilder<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyMetadataBuilder")
            .field("has_default_factory", &matches!(self.default, DefaultValue::Factory(_)))
            .field("cache_default", &self.cache_default)
            .finish_non_exhaustive()
    }
}

impl<T: PropertyValue> PropertyMetadataBuilder<T> {
    /// Creates a new builder with a fixed default value.
    #[must_use]
    pub fn new(default_value: T) -> Self {
        Self::from_default(DefaultValue::Value(default_value))
    }

    /// Creates a new builder whose default is computed per instance.
    ///
    /// The factory runs on every read of an unset property unless
    /// [`cache_default`](Self::cache_default) is enabled.
    #[must_use]
    pub fn with_factory<F>(factory: F) -> Self
    where
        F: Fn(&PropertyBag) -> T + 'static,
    {
        Self::from_default(DefaultValue::Factory(Box::new(factory)))
    }

    fn from_default(default: DefaultValue<T>) -> Self {
        Self {
            default,
            cache_default: false,
            validate_callback: None,
            coerce_callback: None,
            changing_callback: None,
            changed_callback: None,
        }
    }

    /// Keeps a computed default in the bag after the first read.
    ///
    /// A cached default still does not count as an explicit value.
    #[must_use]
    pub fn cache_default(mut self, cache: bool) -> Self {
        self.cache_default = cache;
        self
    }

    /// Sets a validator; rejected values fail with
    /// [`PropertyError::InvalidValue`](crate::PropertyError::InvalidValue).
    #[must_use]
    pub fn validate<F>(mut self, callback: F) -> Self
    where
        F: Fn(&T) -> bool + 'static,
    {
        self.validate_callback = Some(Box::new(callback));
        self
    }

    /// Sets a callback to coerce values after validation and before storage.
    #[must_use]
    pub fn coerce<F>(mut self, callback: F) -> Self
    where
        F: Fn(T) -> T + 'static,
    {
        self.coerce_callback = Some(Box::new(callback));
        self
    }

    /// Sets a hook invoked before a committed change is stored.
    #[must_use]
    pub fn on_changing<F>(mut self, callback: F) -> Self
    where
        F: Fn(&PropertyBag, &T, &T) + 'static,
    {
        self.changing_callback = Some(Box::new(callback));
        self
    }

    /// Sets a hook invoked after a committed change is stored, before
    /// instance subscribers are notified.
    #[must_use]
    pub fn on_changed<F>(mut self, callback: F) -> Self
    where
        F: Fn(&PropertyBag, &T, &T) + 'static,
    {
        self.changed_callback = Some(Box::new(callback));
        self
    }

    /// Builds the [`PropertyMetadata`].
    #[must_use]
    pub fn build(self) -> PropertyMetadata<T> {
        PropertyMetadata {
            default: self.default,
            cache_default: self.cache_default,
            validate_callback: self.validate_callback,
            coerce_callback: self.coerce_callback,
            changing_callback: self.changing_callback,
            changed_callback: self.changed_callback,
        }
    }
}
