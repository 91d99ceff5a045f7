// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shared registry of every control property.

use std::rc::Rc;

use understory_bindable::{PropertyError, PropertyRegistry};

use crate::button::ButtonProperties;
use crate::entry::EntryProperties;
use crate::image_button::ImageButtonProperties;
use crate::visual_element::{BorderElementProperties, VisualElementProperties};

/// Font size used when the platform does not report one.
pub const DEFAULT_FONT_SIZE: f64 = 14.0;

/// Platform facts the catalog's defaults depend on.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CatalogOptions {
    /// The platform's default font size, used as the default of `FontSize`.
    pub platform_font_size: f64,
}

impl CatalogOptions {
    /// Sets the platform's default font size.
    #[must_use]
    pub fn with_platform_font_size(mut self, size: f64) -> Self {
        self.platform_font_size = size;
        self
    }
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            platform_font_size: DEFAULT_FONT_SIZE,
        }
    }
}

/// Every control property, registered once and shared by all instances.
///
/// ```rust
/// use understory_controls::{Catalog, CatalogOptions};
///
/// let catalog = Catalog::new(CatalogOptions::default()).unwrap();
/// let registry = catalog.registry();
/// assert_eq!(
///     registry.by_name("Button", "CornerRadius"),
///     Some(catalog.button().corner_radius.id())
/// );
/// ```
#[derive(Debug)]
pub struct Catalog {
    registry: Rc<PropertyRegistry>,
    options: CatalogOptions,
    visual_element: VisualElementProperties,
    border_element: BorderElementProperties,
    button: ButtonProperties,
    image_button: ImageButtonProperties,
    entry: EntryProperties,
}

impl Catalog {
    /// Registers every control property.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::DuplicateProperty`] if two controls declare the
    /// same property, which indicates a bug in the catalog.
    pub fn new(options: CatalogOptions) -> Result<Rc<Self>, PropertyError> {
        let mut registry = PropertyRegistry::new();
        let visual_element = VisualElementProperties::register(&mut registry)?;
        let border_element = BorderElementProperties::register(&mut registry)?;
        let button = ButtonProperties::register(&mut registry, &options)?;
        let image_button = ImageButtonProperties::register(&mut registry)?;
        let entry = EntryProperties::register(&mut registry)?;
        tracing::debug!(properties = registry.len(), "control catalog registered");

        Ok(Rc::new(Self {
            registry: Rc::new(registry),
            options,
            visual_element,
            border_element,
            button,
            image_button,
            entry,
        }))
    }

    /// The registry every control's bag reads from.
    #[must_use]
    pub fn registry(&self) -> &Rc<PropertyRegistry> {
        &self.registry
    }

    /// The options the catalog was built with.
    #[must_use]
    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    /// Properties shared by all visual elements.
    #[must_use]
    pub fn visual_element(&self) -> &VisualElementProperties {
        &self.visual_element
    }

    /// Properties shared by bordered elements.
    #[must_use]
    pub fn border_element(&self) -> &BorderElementProperties {
        &self.border_element
    }

    /// [`Button`](crate::Button) properties.
    #[must_use]
    pub fn button(&self) -> &ButtonProperties {
        &self.button
    }

    /// [`ImageButton`](crate::ImageButton) properties.
    #[must_use]
    pub fn image_button(&self) -> &ImageButtonProperties {
        &self.image_button
    }

    /// [`Entry`](crate::Entry) properties.
    #[must_use]
    pub fn entry(&self) -> &EntryProperties {
        &self.entry
    }
}
