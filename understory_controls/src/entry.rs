// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single-line text input.

use std::rc::Rc;

use understory_bindable::{
    BindableObject, Property, PropertyBag, PropertyError, PropertyMetadata,
    PropertyMetadataBuilder, PropertyRegistry,
};

use crate::catalog::Catalog;

/// Properties of [`Entry`].
#[derive(Copy, Clone, Debug)]
pub struct EntryProperties {
    /// The text. Default empty.
    pub text: Property<String>,
    /// Caret position in characters. Default `0`, never negative.
    pub cursor_position: Property<i32>,
    /// Length of the selection starting at the caret. Default `0`, never
    /// negative.
    pub selection_length: Property<i32>,
}

impl EntryProperties {
    pub(crate) fn register(registry: &mut PropertyRegistry) -> Result<Self, PropertyError> {
        Ok(Self {
            text: registry.register("Entry", "Text", PropertyMetadata::new(String::new()))?,
            cursor_position: registry.register("Entry", "CursorPosition", non_negative())?,
            selection_length: registry.register("Entry", "SelectionLength", non_negative())?,
        })
    }
}

fn non_negative() -> PropertyMetadata<i32> {
    PropertyMetadataBuilder::new(0).validate(|v| *v >= 0).build()
}

/// A single-line text input.
///
/// # Example
///
/// ```rust
/// use understory_bindable::PropertyError;
/// use understory_controls::{Catalog, CatalogOptions, Entry};
///
/// let catalog = Catalog::new(CatalogOptions::default()).unwrap();
/// let entry = Entry::new(&catalog);
/// entry.set_text("Click Button");
/// entry.set_cursor_position(4).unwrap();
///
/// assert_eq!(
///     entry.set_selection_length(-2),
///     Err(PropertyError::InvalidValue { name: "SelectionLength" })
/// );
/// assert_eq!(entry.selection_length(), 0);
/// ```
pub struct Entry {
    properties: PropertyBag,
    catalog: Rc<Catalog>,
}

impl Entry {
    /// Creates an empty entry.
    #[must_use]
    pub fn new(catalog: &Rc<Catalog>) -> Self {
        Self {
            properties: PropertyBag::new(catalog.registry().clone()),
            catalog: catalog.clone(),
        }
    }

    fn props(&self) -> &EntryProperties {
        self.catalog.entry()
    }

    /// The text.
    #[must_use]
    pub fn text(&self) -> String {
        self.properties.get(self.props().text)
    }

    /// Sets the text.
    pub fn set_text(&self, text: impl Into<String>) {
        crate::visual_element::assign(&self.properties, self.props().text, text.into());
    }

    /// The caret position.
    #[must_use]
    pub fn cursor_position(&self) -> i32 {
        self.properties.get(self.props().cursor_position)
    }

    /// Moves the caret.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::InvalidValue`] for negative positions; the
    /// caret does not move.
    pub fn set_cursor_position(&self, position: i32) -> Result<(), PropertyError> {
        self.properties.set(self.props().cursor_position, position)
    }

    /// The selection length.
    #[must_use]
    pub fn selection_length(&self) -> i32 {
        self.properties.get(self.props().selection_length)
    }

    /// Sets the selection length.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::InvalidValue`] for negative lengths; the
    /// selection does not change.
    pub fn set_selection_length(&self, length: i32) -> Result<(), PropertyError> {
        self.properties.set(self.props().selection_length, length)
    }
}

impl core::fmt::Debug for Entry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Entry")
            .field("text", &self.text())
            .field("cursor_position", &self.cursor_position())
            .field("selection_length", &self.selection_length())
            .finish_non_exhaustive()
    }
}

impl BindableObject for Entry {
    fn properties(&self) -> &PropertyBag {
        &self.properties
    }
}
