// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The border capability and the snapshot renderers rebuild from.

use peniko::Color;
use understory_bindable::{BindableObject, Property, PropertyBag, PropertyId, PropertyValue};

/// Corner radius the platform's own button drawable uses.
///
/// An element whose corner radius equals it does not need a custom drawable
/// for its corners alone.
pub const PLATFORM_CORNER_RADIUS: i32 = 2;

/// The capability of having a customisable border and background.
///
/// Implementors name the properties that hold each facet; the snapshot reads
/// them, together with whether they are set, from the element's bag.
pub trait BorderController: BindableObject {
    /// Corner radius in device-independent units; `-1` means unset.
    fn corner_radius_property(&self) -> Property<i32>;

    /// Border colour; `None` means the platform colour.
    fn border_color_property(&self) -> Property<Option<Color>>;

    /// Border width; `-1.0` means unset.
    fn border_width_property(&self) -> Property<f64>;

    /// Background colour; `None` means the platform colour.
    fn background_color_property(&self) -> Property<Option<Color>>;

    /// Whether to keep the platform's default padding.
    fn use_default_padding_property(&self) -> Option<Property<bool>> {
        None
    }

    /// Whether to keep the platform's default shadow.
    fn use_default_shadow_property(&self) -> Option<Property<bool>> {
        None
    }
}

bitflags::bitflags! {
    /// Border facets that differ from their defaults.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Customizations: u8 {
        /// The corner radius is customised.
        const CORNER_RADIUS    = 0b0000_0001;
        /// The background colour is customised.
        const BACKGROUND_COLOR = 0b0000_0010;
        /// The border colour is customised.
        const BORDER_COLOR     = 0b0000_0100;
        /// The border width is customised.
        const BORDER_WIDTH     = 0b0000_1000;
    }
}

/// The border-relevant state of an element at one instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BorderSnapshot {
    /// Effective corner radius.
    pub corner_radius: i32,
    /// Effective border colour.
    pub border_color: Option<Color>,
    /// Effective border width.
    pub border_width: f64,
    /// Effective background colour.
    pub background_color: Option<Color>,
    /// Whether the platform padding is kept.
    pub use_default_padding: bool,
    /// Whether the platform shadow is kept.
    pub use_default_shadow: bool,
    /// Facets that differ from their defaults.
    pub customizations: Customizations,
}

impl BorderSnapshot {
    /// Reads the element's border state.
    ///
    /// A facet counts as customised only if it is explicitly set to something
    /// other than its default. The corner radius is also left alone when it
    /// equals `platform_corner_radius`.
    #[must_use]
    pub fn capture(element: &dyn BorderController, platform_corner_radius: i32) -> Self {
        let bag = element.properties();
        let mut customizations = Customizations::empty();

        let corner = element.corner_radius_property();
        let corner_radius = bag.get(corner);
        if customized(bag, corner) && corner_radius != platform_corner_radius {
            customizations |= Customizations::CORNER_RADIUS;
        }
        let background = element.background_color_property();
        if customized(bag, background) {
            customizations |= Customizations::BACKGROUND_COLOR;
        }
        let border_color = element.border_color_property();
        if customized(bag, border_color) {
            customizations |= Customizations::BORDER_COLOR;
        }
        let border_width = element.border_width_property();
        if customized(bag, border_width) {
            customizations |= Customizations::BORDER_WIDTH;
        }

        Self {
            corner_radius,
            border_color: bag.get(border_color),
            border_width: bag.get(border_width),
            background_color: bag.get(background),
            use_default_padding: element
                .use_default_padding_property()
                .is_some_and(|p| bag.get(p)),
            use_default_shadow: element
                .use_default_shadow_property()
                .is_some_and(|p| bag.get(p)),
            customizations,
        }
    }

    /// Returns `true` if nothing is customised, so the platform's own
    /// background can be kept.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.customizations.is_empty()
    }
}

fn customized<T: PropertyValue>(bag: &PropertyBag, property: Property<T>) -> bool {
    bag.is_set(property) && bag.get(property) != bag.default_value(property)
}

/// Returns `true` if a change of `property` can change the element's border
/// or background.
#[must_use]
pub fn affects_border(element: &dyn BorderController, property: PropertyId) -> bool {
    property == element.corner_radius_property().id()
        || property == element.border_color_property().id()
        || property == element.border_width_property().id()
        || property == element.background_color_property().id()
        || element
            .use_default_padding_property()
            .is_some_and(|p| p.id() == property)
        || element
            .use_default_shadow_property()
            .is_some_and(|p| p.id() == property)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use understory_bindable::{PropertyMetadata, PropertyRegistry};

    struct Props {
        corner: Property<i32>,
        border_color: Property<Option<Color>>,
        border_width: Property<f64>,
        background: Property<Option<Color>>,
        padding: Property<bool>,
    }

    struct Framed {
        bag: PropertyBag,
        props: Rc<Props>,
    }

    impl BindableObject for Framed {
        fn properties(&self) -> &PropertyBag {
            &self.bag
        }
    }

    impl BorderController for Framed {
        fn corner_radius_property(&self) -> Property<i32> {
            self.props.corner
        }
        fn border_color_property(&self) -> Property<Option<Color>> {
            self.props.border_color
        }
        fn border_width_property(&self) -> Property<f64> {
            self.props.border_width
        }
        fn background_color_property(&self) -> Property<Option<Color>> {
            self.props.background
        }
        fn use_default_padding_property(&self) -> Option<Property<bool>> {
            Some(self.props.padding)
        }
    }

    fn framed() -> Framed {
        let mut registry = PropertyRegistry::new();
        let props = Props {
            corner: registry
                .register("Framed", "CornerRadius", PropertyMetadata::new(-1))
                .unwrap(),
            border_color: registry
                .register("Framed", "BorderColor", PropertyMetadata::new(None))
                .unwrap(),
            border_width: registry
                .register("Framed", "BorderWidth", PropertyMetadata::new(-1.0))
                .unwrap(),
            background: registry
                .register("Framed", "BackgroundColor", PropertyMetadata::new(None))
                .unwrap(),
            padding: registry
                .register("Framed", "UseDefaultPadding", PropertyMetadata::new(false))
                .unwrap(),
        };
        Framed {
            bag: PropertyBag::new(Rc::new(registry)),
            props: Rc::new(props),
        }
    }

    #[test]
    fn fresh_element_is_default() {
        let element = framed();
        let snapshot = BorderSnapshot::capture(&element, PLATFORM_CORNER_RADIUS);
        assert!(snapshot.is_default());
        assert_eq!(snapshot.corner_radius, -1);
        assert!(!snapshot.use_default_padding);
    }

    #[test]
    fn explicit_defaults_are_not_customisations() {
        let element = framed();
        element.bag.set(element.props.corner, -1).unwrap();
        element.bag.set(element.props.border_width, -1.0).unwrap();
        assert!(BorderSnapshot::capture(&element, PLATFORM_CORNER_RADIUS).is_default());

        element.bag.set(element.props.corner, PLATFORM_CORNER_RADIUS).unwrap();
        assert!(BorderSnapshot::capture(&element, PLATFORM_CORNER_RADIUS).is_default());
    }

    #[test]
    fn each_facet_is_reported() {
        let element = framed();
        element.bag.set(element.props.corner, 12).unwrap();
        element
            .bag
            .set(element.props.background, Some(Color::from_rgba8(255, 0, 0, 255)))
            .unwrap();
        let snapshot = BorderSnapshot::capture(&element, PLATFORM_CORNER_RADIUS);
        assert_eq!(
            snapshot.customizations,
            Customizations::CORNER_RADIUS | Customizations::BACKGROUND_COLOR
        );
        assert!(!snapshot.is_default());
    }

    #[test]
    fn relevant_properties() {
        let element = framed();
        assert!(affects_border(&element, element.props.corner.id()));
        assert!(affects_border(&element, element.props.padding.id()));
        assert!(!affects_border(&element, PropertyId::new(999)));
    }
}
