// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Custom border and background drawables, rebuilt from the element.
//!
//! [`BorderBackgroundManager`] follows a [`RendererBinding`]. Whenever the
//! bound element changes, or one of its border properties does, it resets and
//! rebuilds:
//!
//! - reset drops the cached [`BorderDrawable`],
//! - rebuild captures a [`BorderSnapshot`]; if nothing is customised the
//!   platform's original background is put back, otherwise a fresh drawable
//!   (optionally wrapped in a press ripple) is installed.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use kurbo::{Insets, RoundedRectRadii, Vec2};
use peniko::Color;
use understory_behavior::{BorderController, BorderSnapshot, PLATFORM_CORNER_RADIUS, affects_border};
use understory_bindable::{PropertyId, SubscriptionId};

use crate::binding::{ElementChanged, RendererBinding};
use crate::host::{Background, NativeHandle};

/// A drop shadow.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Shadow {
    /// Offset from the shape, in pixels.
    pub offset: Vec2,
    /// Blur radius, in pixels.
    pub radius: f64,
    /// Shadow colour.
    pub color: Color,
}

/// Platform look and feel for custom borders.
///
/// ```rust
/// use kurbo::Vec2;
/// use peniko::Color;
/// use understory_renderer::{BorderOptions, Shadow};
///
/// let options = BorderOptions::new()
///     .with_scale(2.0)
///     .with_ripple(false)
///     .with_shadow(Some(Shadow {
///         offset: Vec2::new(1.0, 1.0),
///         radius: 3.0,
///         color: Color::from_rgba8(0, 0, 0, 128),
///     }));
/// assert!(options.shadow_enabled());
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BorderOptions {
    scale: f64,
    ripple: bool,
    shadow_enabled: bool,
    custom_shadow: Shadow,
    normal_color: Color,
    pressed_color: Color,
    default_corner_radius: i32,
}

impl BorderOptions {
    /// Options for a density-1 platform with ripples and no shadow.
    #[must_use]
    pub fn new() -> Self {
        let pressed_color = Color::from_rgba8(0xa6, 0xa6, 0xa6, 0xff);
        Self {
            scale: 1.0,
            ripple: true,
            shadow_enabled: false,
            custom_shadow: Shadow {
                offset: Vec2::ZERO,
                radius: 0.0,
                color: pressed_color,
            },
            normal_color: Color::from_rgba8(0xd6, 0xd7, 0xd7, 0xff),
            pressed_color,
            default_corner_radius: PLATFORM_CORNER_RADIUS,
        }
    }

    /// Pixels per device-independent unit.
    #[must_use]
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Wraps custom drawables in a press ripple.
    #[must_use]
    pub fn with_ripple(mut self, ripple: bool) -> Self {
        self.ripple = ripple;
        self
    }

    /// Enables shadows. `Some` also sets the shadow used when the element
    /// does not keep the platform's default one.
    #[must_use]
    pub fn with_shadow(mut self, shadow: Option<Shadow>) -> Self {
        self.shadow_enabled = shadow.is_some();
        if let Some(shadow) = shadow {
            self.custom_shadow = shadow;
        }
        self
    }

    /// Background colour used when the element leaves it unset.
    #[must_use]
    pub fn with_normal_color(mut self, color: Color) -> Self {
        self.normal_color = color;
        self
    }

    /// Colour of the press ripple and of the default shadow.
    #[must_use]
    pub fn with_pressed_color(mut self, color: Color) -> Self {
        self.pressed_color = color;
        self
    }

    /// Corner radius of the platform's own background, in
    /// device-independent units.
    #[must_use]
    pub fn with_default_corner_radius(mut self, radius: i32) -> Self {
        self.default_corner_radius = radius;
        self
    }

    /// Returns whether shadows are drawn.
    #[must_use]
    pub fn shadow_enabled(&self) -> bool {
        self.shadow_enabled
    }

    /// Returns the platform corner radius.
    #[must_use]
    pub fn default_corner_radius(&self) -> i32 {
        self.default_corner_radius
    }

    fn default_shadow(&self) -> Shadow {
        Shadow {
            offset: Vec2::new(0.0, 4.0),
            radius: 2.0,
            color: self.pressed_color,
        }
    }
}

impl Default for BorderOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// A rounded, bordered background computed from a [`BorderSnapshot`].
///
/// Lengths are in pixels.
#[derive(Clone, Debug, PartialEq)]
pub struct BorderDrawable {
    /// Fill colour.
    pub background: Color,
    /// Stroke colour; `None` means no stroke.
    pub border_color: Option<Color>,
    /// Stroke width.
    pub border_width: f64,
    /// Corner radii.
    pub corner_radii: RoundedRectRadii,
    /// Content padding.
    pub padding: Insets,
    /// Drop shadow.
    pub shadow: Option<Shadow>,
}

impl BorderDrawable {
    /// Computes the drawable for `snapshot`.
    ///
    /// `view_padding` is the view's own padding, kept only when the element
    /// asks for the platform padding.
    #[must_use]
    pub fn new(snapshot: &BorderSnapshot, options: &BorderOptions, view_padding: Insets) -> Self {
        let scale = options.scale;
        let corner_radius = if snapshot.corner_radius < 0 {
            options.default_corner_radius
        } else {
            snapshot.corner_radius
        };
        let padding = if snapshot.use_default_padding {
            Insets::new(view_padding.x0, view_padding.y0, view_padding.x0, view_padding.y0)
        } else {
            Insets::ZERO
        };
        let shadow = options.shadow_enabled.then(|| {
            if snapshot.use_default_shadow {
                options.default_shadow()
            } else {
                options.custom_shadow
            }
        });

        Self {
            background: snapshot.background_color.unwrap_or(options.normal_color),
            border_color: snapshot.border_color,
            border_width: snapshot.border_width.max(0.0) * scale,
            corner_radii: RoundedRectRadii::from_single_radius(f64::from(corner_radius) * scale),
            padding,
            shadow,
        }
    }
}

/// A press ripple drawn over a [`BorderDrawable`].
#[derive(Clone, Debug, PartialEq)]
pub struct RippleDrawable {
    /// Ripple colour.
    pub color: Color,
    /// The drawable the ripple is drawn over.
    pub content: Rc<BorderDrawable>,
}

struct State<E> {
    element: Option<Rc<E>>,
    element_subscription: Option<SubscriptionId>,
    lifecycle_subscription: Option<SubscriptionId>,
    /// The view's background from before the first custom drawable.
    original: Option<Background>,
    drawable: Option<Rc<BorderDrawable>>,
    disposed: bool,
}

/// Keeps a view's background in step with its element's border properties.
///
/// See the [module docs](self).
pub struct BorderBackgroundManager<E> {
    this: Weak<Self>,
    binding: Weak<RendererBinding<E>>,
    handle: Rc<dyn NativeHandle>,
    options: BorderOptions,
    drawable_enabled: Cell<bool>,
    state: RefCell<State<E>>,
}

impl<E: BorderController + 'static> BorderBackgroundManager<E> {
    /// Starts following `binding`, adopting its current element if any.
    #[must_use]
    pub fn new(
        binding: &Rc<RendererBinding<E>>,
        handle: Rc<dyn NativeHandle>,
        options: BorderOptions,
    ) -> Rc<Self> {
        let manager = Rc::new_cyclic(|this: &Weak<Self>| Self {
            this: this.clone(),
            binding: Rc::downgrade(binding),
            handle,
            options,
            drawable_enabled: Cell::new(false),
            state: RefCell::new(State {
                element: None,
                element_subscription: None,
                lifecycle_subscription: None,
                original: None,
                drawable: None,
                disposed: false,
            }),
        });

        let this = Rc::downgrade(&manager);
        let lifecycle = binding
            .element_changed()
            .subscribe(move |change: &ElementChanged<E>| {
                if let Some(manager) = this.upgrade() {
                    manager.on_element_changed(change.new.clone());
                }
            });
        manager.state.borrow_mut().lifecycle_subscription = Some(lifecycle);
        if let Some(element) = binding.element() {
            manager.on_element_changed(Some(element));
        }
        manager
    }

    /// The drawable built by the last rebuild, if the element is customised.
    #[must_use]
    pub fn drawable(&self) -> Option<Rc<BorderDrawable>> {
        self.state.borrow().drawable.clone()
    }

    /// Returns `true` while a custom background is installed on the view.
    #[must_use]
    pub fn is_drawable_enabled(&self) -> bool {
        self.drawable_enabled.get()
    }

    /// Returns `true` after [`dispose`](Self::dispose).
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state.borrow().disposed
    }

    /// Drops the cached drawable.
    pub fn reset(&self) {
        self.state.borrow_mut().drawable = None;
    }

    /// Recomputes the view's background from the element.
    ///
    /// Without an element, or with nothing customised, the platform
    /// background is put back.
    pub fn rebuild(&self) {
        let (element, disposed) = {
            let state = self.state.borrow();
            (state.element.clone(), state.disposed)
        };
        if disposed {
            return;
        }

        let snapshot = element
            .map(|element| BorderSnapshot::capture(&*element, self.options.default_corner_radius))
            .filter(|snapshot| !snapshot.is_default());
        let Some(snapshot) = snapshot else {
            if !self.drawable_enabled.replace(false) {
                return;
            }
            let original = self.state.borrow().original.clone();
            tracing::trace!("restoring platform background");
            self.handle.set_background(original);
            self.handle.invalidate();
            return;
        };

        if !self.drawable_enabled.get() {
            let mut state = self.state.borrow_mut();
            if state.original.is_none() {
                state.original = self.handle.background();
            }
        }
        let drawable = Rc::new(BorderDrawable::new(
            &snapshot,
            &self.options,
            self.handle.padding(),
        ));
        self.state.borrow_mut().drawable = Some(drawable.clone());
        let background = if self.options.ripple {
            Background::Ripple(Rc::new(RippleDrawable {
                color: self.options.pressed_color,
                content: drawable,
            }))
        } else {
            Background::Border(drawable)
        };
        tracing::trace!(customizations = ?snapshot.customizations, "installing border drawable");
        self.handle.set_background(Some(background));
        self.drawable_enabled.set(true);
        self.handle.invalidate();
    }

    /// Releases the drawables and both subscriptions.
    ///
    /// The view is left as it is. Idempotent.
    pub fn dispose(&self) {
        let (element, element_subscription, lifecycle) = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.drawable = None;
            state.original = None;
            (
                state.element.take(),
                state.element_subscription.take(),
                state.lifecycle_subscription.take(),
            )
        };
        if let (Some(element), Some(id)) = (element, element_subscription) {
            element.properties().unsubscribe(id);
        }
        if let (Some(binding), Some(id)) = (self.binding.upgrade(), lifecycle) {
            binding.element_changed().unsubscribe(id);
        }
        tracing::debug!("border background manager disposed");
    }

    fn on_element_changed(&self, element: Option<Rc<E>>) {
        let previous = {
            let mut state = self.state.borrow_mut();
            if state.disposed {
                return;
            }
            (state.element.take(), state.element_subscription.take())
        };
        if let (Some(old), Some(id)) = previous {
            old.properties().unsubscribe(id);
        }

        if let Some(element) = &element {
            let this = self.this.clone();
            let id = element.properties().subscribe(move |change| {
                if let Some(manager) = this.upgrade() {
                    manager.on_property_changed(change.property);
                }
            });
            let mut state = self.state.borrow_mut();
            state.element = Some(element.clone());
            state.element_subscription = Some(id);
        }

        self.reset();
        self.rebuild();
    }

    fn on_property_changed(&self, property: PropertyId) {
        let relevant = self
            .state
            .borrow()
            .element
            .as_ref()
            .is_some_and(|element| affects_border(&**element, property));
        if relevant {
            self.reset();
            self.rebuild();
        }
    }
}

impl<E> fmt::Debug for BorderBackgroundManager<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("BorderBackgroundManager")
            .field("options", &self.options)
            .field("drawable_enabled", &self.drawable_enabled.get())
            .field("drawable", &state.drawable)
            .field("disposed", &state.disposed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use understory_behavior::Customizations;

    fn snapshot() -> BorderSnapshot {
        BorderSnapshot {
            corner_radius: -1,
            border_color: None,
            border_width: -1.0,
            background_color: None,
            use_default_padding: false,
            use_default_shadow: false,
            customizations: Customizations::BACKGROUND_COLOR,
        }
    }

    #[test]
    fn unset_facets_fall_back_to_the_platform() {
        let options = BorderOptions::new().with_scale(2.0);
        let drawable = BorderDrawable::new(&snapshot(), &options, Insets::uniform(8.0));
        assert_eq!(drawable.background, options.normal_color);
        assert_eq!(drawable.border_width, 0.0);
        assert_eq!(drawable.corner_radii, RoundedRectRadii::from_single_radius(4.0));
        assert_eq!(drawable.padding, Insets::ZERO);
        assert_eq!(drawable.shadow, None);
    }

    #[test]
    fn default_padding_and_shadow() {
        let options = BorderOptions::new().with_shadow(Some(Shadow {
            offset: Vec2::new(3.0, 3.0),
            radius: 6.0,
            color: Color::from_rgba8(0, 0, 0, 255),
        }));
        let mut snapshot = snapshot();
        snapshot.use_default_padding = true;
        snapshot.use_default_shadow = true;
        snapshot.corner_radius = 10;
        let drawable = BorderDrawable::new(&snapshot, &options, Insets::new(4.0, 2.0, 9.0, 9.0));
        assert_eq!(drawable.padding, Insets::new(4.0, 2.0, 4.0, 2.0));
        assert_eq!(drawable.corner_radii, RoundedRectRadii::from_single_radius(10.0));
        assert_eq!(
            drawable.shadow,
            Some(Shadow {
                offset: Vec2::new(0.0, 4.0),
                radius: 2.0,
                color: options.pressed_color,
            })
        );

        snapshot.use_default_shadow = false;
        let drawable = BorderDrawable::new(&snapshot, &options, Insets::ZERO);
        assert_eq!(drawable.shadow.map(|s| s.radius), Some(6.0));
    }
}
