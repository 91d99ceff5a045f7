// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Bindable: observable properties for shared widget models.
//!
//! This crate provides the property layer that widgets are built on: typed
//! property handles, a registry of immutable descriptors, and a sparse
//! per-object [`PropertyBag`] that validates, coerces, stores and announces
//! changes.
//!
//! ## Core Concepts
//!
//! ### Descriptors
//!
//! A property is registered once in a [`PropertyRegistry`] under an owning
//! type tag and a name. Its [`PropertyMetadata`] carries:
//!
//! - a default value, or a factory computing a per-instance default
//! - an optional validator and coercer
//! - `on_changing` / `on_changed` hooks run around every committed change
//!
//! Read-only properties are registered with
//! [`PropertyRegistry::register_read_only`], which also returns the
//! [`PropertyKey`] needed to write them.
//!
//! ### Storage and notification
//!
//! [`PropertyBag`] stores explicit values only. Every committed change runs
//! the descriptor hooks, then instance subscribers, then any mirrors
//! registered with [`PropertyRegistry::mirror`].
//!
//! ### Events
//!
//! [`Handlers`] is the ordered subscribe/unsubscribe list behind property
//! subscriptions. Capability events in the behavior layer reuse it.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use understory_bindable::{PropertyBag, PropertyMetadataBuilder, PropertyRegistry};
//!
//! let mut registry = PropertyRegistry::new();
//! let border = registry
//!     .register("Button", "BorderRadius", PropertyMetadataBuilder::new(5_i32).build())
//!     .unwrap();
//! let corner = registry
//!     .register("Button", "CornerRadius", PropertyMetadataBuilder::new(-1_i32).build())
//!     .unwrap();
//! registry.mirror(border, corner, |v| if *v == 5 { -1 } else { *v });
//! registry.mirror(corner, border, |v| if *v == -1 { 5 } else { *v });
//!
//! let bag = PropertyBag::new(Rc::new(registry));
//! let changes = Rc::new(Cell::new(0));
//! let counter = changes.clone();
//! bag.subscribe(move |_| counter.set(counter.get() + 1));
//!
//! bag.set(corner, 12).unwrap();
//! assert_eq!(bag.get(border), 12);
//! assert_eq!(changes.get(), 2);
//!
//! // Equal values are not changes.
//! bag.set(border, 12).unwrap();
//! assert_eq!(changes.get(), 2);
//! ```
//!
//! ## Threading
//!
//! Bags, registries shared through `Rc`, and handler lists are confined to
//! one thread. None of them are `Send`.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.

#![no_std]

extern crate alloc;

mod bag;
mod error;
mod handlers;
mod id;
mod metadata;
mod object;
mod registry;

pub use bag::{PropertyBag, PropertyChanged};
pub use error::PropertyError;
pub use handlers::{Handlers, SubscriptionId};
pub use id::{Property, PropertyId, PropertyKey};
pub use metadata::{
    CoerceValueCallback, DefaultValueFactory, PropertyChangedCallback, PropertyMetadata,
    PropertyMetadataBuilder, PropertyValue, ValidateValueCallback,
};
pub use object::{BindableObject, BindableObjectExt};
pub use registry::{PropertyRegistration, PropertyRegistry};
