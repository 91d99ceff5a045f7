// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Properties every visual element carries, and the shared border colour.

use peniko::Color;
use understory_bindable::{
    Property, PropertyBag, PropertyError, PropertyKey, PropertyMetadata, PropertyRegistry,
    PropertyValue,
};

/// Properties shared by all visual elements.
#[derive(Copy, Clone, Debug)]
pub struct VisualElementProperties {
    /// User-controlled enabled flag. Default `true`.
    pub is_enabled: Property<bool>,
    /// Enabled flag driven by the bound command. Read-only, default `true`.
    pub is_enabled_core: Property<bool>,
    pub(crate) is_enabled_core_key: PropertyKey<bool>,
    /// Background colour. Default unset.
    pub background_color: Property<Option<Color>>,
}

impl VisualElementProperties {
    pub(crate) fn register(registry: &mut PropertyRegistry) -> Result<Self, PropertyError> {
        let (is_enabled_core, is_enabled_core_key) = registry.register_read_only(
            "VisualElement",
            "IsEnabledCore",
            PropertyMetadata::new(true),
        )?;
        Ok(Self {
            is_enabled: registry.register("VisualElement", "IsEnabled", PropertyMetadata::new(true))?,
            is_enabled_core,
            is_enabled_core_key,
            background_color: registry.register(
                "VisualElement",
                "BackgroundColor",
                PropertyMetadata::new(None),
            )?,
        })
    }
}

/// Properties of elements with a border.
#[derive(Copy, Clone, Debug)]
pub struct BorderElementProperties {
    /// Border colour. Default unset.
    pub border_color: Property<Option<Color>>,
}

impl BorderElementProperties {
    pub(crate) fn register(registry: &mut PropertyRegistry) -> Result<Self, PropertyError> {
        Ok(Self {
            border_color: registry.register(
                "BorderElement",
                "BorderColor",
                PropertyMetadata::new(None),
            )?,
        })
    }
}

/// Writes a property that has no validator.
///
/// Such writes cannot be rejected unless the property is read-only, which is a
/// bug in the calling control. A rejected write is logged and leaves the value
/// unchanged.
pub(crate) fn assign<T: PropertyValue>(bag: &PropertyBag, property: Property<T>, value: T) {
    if let Err(error) = bag.set(property, value) {
        tracing::warn!(%error, "control property write rejected");
    }
}

/// Writes a read-only property that has no validator through its key.
pub(crate) fn assign_with_key<T: PropertyValue>(bag: &PropertyBag, key: PropertyKey<T>, value: T) {
    if let Err(error) = bag.set_with_key(key, value) {
        tracing::warn!(%error, "control property write rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn rejected_write_keeps_the_value() {
        let mut registry = PropertyRegistry::new();
        let (locked, key) = registry
            .register_read_only("Test", "Locked", PropertyMetadata::new(3_i32))
            .unwrap();
        let bag = PropertyBag::new(Rc::new(registry));

        // Writing a read-only property without its key is refused, not fatal.
        assign(&bag, locked, 7);
        assert_eq!(bag.get(locked), 3);
        assert!(!bag.is_set(locked));

        assign_with_key(&bag, key, 7);
        assert_eq!(bag.get(locked), 7);
    }
}
