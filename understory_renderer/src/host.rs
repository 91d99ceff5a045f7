// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The native view a renderer drives.

use std::fmt;
use std::rc::Rc;

use kurbo::Insets;
use understory_behavior::{Aspect, NativeImage, PlatformDrawable};

use crate::border::{BorderDrawable, RippleDrawable};

/// What a native view paints behind its content.
#[derive(Clone)]
pub enum Background {
    /// The platform's own drawable.
    Platform(Rc<PlatformDrawable>),
    /// A custom border drawable.
    Border(Rc<BorderDrawable>),
    /// A custom border drawable wrapped in a press ripple.
    Ripple(Rc<RippleDrawable>),
}

impl Background {
    /// Returns the border drawable painted by this background, if any.
    #[must_use]
    pub fn border(&self) -> Option<&Rc<BorderDrawable>> {
        match self {
            Self::Platform(_) => None,
            Self::Border(border) => Some(border),
            Self::Ripple(ripple) => Some(&ripple.content),
        }
    }
}

/// Backgrounds compare by identity.
impl PartialEq for Background {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Platform(a), Self::Platform(b)) => Rc::ptr_eq(a, b),
            (Self::Border(a), Self::Border(b)) => Rc::ptr_eq(a, b),
            (Self::Ripple(a), Self::Ripple(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Platform(drawable) => f.debug_tuple("Platform").field(&drawable.name).finish(),
            Self::Border(border) => f.debug_tuple("Border").field(border).finish(),
            Self::Ripple(ripple) => f.debug_tuple("Ripple").field(ripple).finish(),
        }
    }
}

/// A native view owned by one renderer.
///
/// Methods take `&self`: views live on the UI thread and are shared between a
/// renderer and the loads it has in flight. Renderers never call these after
/// they are disposed.
pub trait NativeHandle {
    /// The installed background.
    fn background(&self) -> Option<Background>;

    /// Installs a background.
    fn set_background(&self, background: Option<Background>);

    /// The view's own padding, in pixels.
    fn padding(&self) -> Insets;

    /// Shows an image, or nothing.
    fn set_image(&self, image: Option<NativeImage>);

    /// Applies the image scaling mode.
    fn set_aspect(&self, aspect: Aspect);

    /// Applies the image opacity hint.
    fn set_opaque(&self, opaque: bool);

    /// Schedules a repaint.
    fn invalidate(&self);
}
