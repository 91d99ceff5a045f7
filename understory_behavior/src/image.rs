// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Image sources, native images and the image capability.

use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;

use peniko::ImageData;
use understory_bindable::{PropertyId, SubscriptionId};

/// Where an image comes from.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageSource {
    /// A local file or bundled platform resource.
    File(PathBuf),
    /// A remote resource.
    Uri(String),
    /// A resource embedded in the application.
    Embedded(String),
}

impl ImageSource {
    /// Returns the kind used to pick a resolver.
    #[must_use]
    pub fn kind(&self) -> ImageSourceKind {
        match self {
            Self::File(_) => ImageSourceKind::File,
            Self::Uri(_) => ImageSourceKind::Uri,
            Self::Embedded(_) => ImageSourceKind::Embedded,
        }
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file:{}", path.display()),
            Self::Uri(uri) => f.write_str(uri),
            Self::Embedded(name) => write!(f, "resource:{name}"),
        }
    }
}

/// The kind of an [`ImageSource`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ImageSourceKind {
    /// [`ImageSource::File`].
    File,
    /// [`ImageSource::Uri`].
    Uri,
    /// [`ImageSource::Embedded`].
    Embedded,
}

impl fmt::Display for ImageSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::File => "file",
            Self::Uri => "uri",
            Self::Embedded => "embedded",
        })
    }
}

/// How an image is scaled into its bounds.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Aspect {
    /// Scale to fit, preserving the aspect ratio.
    #[default]
    AspectFit,
    /// Scale to fill, preserving the aspect ratio and clipping.
    AspectFill,
    /// Stretch to fill.
    Fill,
}

/// Kinds of platform drawables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DrawableKind {
    /// A vector drawable.
    Vector,
    /// A stretchable nine-patch bitmap.
    NinePatch,
}

/// A drawable the platform resolved from a resource name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlatformDrawable {
    /// Resource name.
    pub name: String,
    /// Drawable kind.
    pub kind: DrawableKind,
}

/// A resolved image, ready to hand to a native view.
///
/// Images are shared and compare by identity.
#[derive(Clone)]
pub enum NativeImage {
    /// A decoded bitmap.
    Bitmap(Rc<ImageData>),
    /// A platform drawable.
    Drawable(Rc<PlatformDrawable>),
}

impl NativeImage {
    /// Wraps decoded bitmap data.
    #[must_use]
    pub fn bitmap(data: ImageData) -> Self {
        Self::Bitmap(Rc::new(data))
    }

    /// Wraps a platform drawable.
    #[must_use]
    pub fn drawable(drawable: PlatformDrawable) -> Self {
        Self::Drawable(Rc::new(drawable))
    }

    /// Returns the pixel size of a bitmap. Drawables have no intrinsic size.
    #[must_use]
    pub fn pixel_size(&self) -> Option<(u32, u32)> {
        match self {
            Self::Bitmap(data) => Some((data.width, data.height)),
            Self::Drawable(_) => None,
        }
    }
}

impl PartialEq for NativeImage {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bitmap(a), Self::Bitmap(b)) => Rc::ptr_eq(a, b),
            (Self::Drawable(a), Self::Drawable(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for NativeImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bitmap(data) => f
                .debug_struct("Bitmap")
                .field("width", &data.width)
                .field("height", &data.height)
                .finish_non_exhaustive(),
            Self::Drawable(drawable) => f.debug_tuple("Drawable").field(drawable).finish(),
        }
    }
}

/// Handler for image capability events; receives the sender.
pub type ImageHandler = Rc<dyn Fn(&(dyn ImageController + 'static))>;

/// The capability of showing an image from an [`ImageSource`].
pub trait ImageController {
    /// The current source.
    fn source(&self) -> Option<ImageSource>;

    /// The scaling mode.
    fn aspect(&self) -> Aspect;

    /// Whether the image should be treated as opaque.
    fn is_opaque(&self) -> bool;

    /// Writes the read-only loading flag.
    fn set_is_loading(&self, loading: bool);

    /// Tells the element its native content size may have changed.
    fn native_size_changed(&self) {}

    /// Subscribes to source changes, raised after the new source is stored.
    fn subscribe_image_source_changed(&self, handler: ImageHandler) -> SubscriptionId;

    /// Removes a source-changed subscription.
    fn unsubscribe_image_source_changed(&self, id: SubscriptionId) -> bool;

    /// Subscribes to source changes, raised before the new source is stored.
    fn subscribe_image_source_changing(&self, handler: ImageHandler) -> SubscriptionId;

    /// Removes a source-changing subscription.
    fn unsubscribe_image_source_changing(&self, id: SubscriptionId) -> bool;

    /// The property holding the source, if the element exposes one.
    fn source_property(&self) -> Option<PropertyId>;

    /// The property holding the aspect, if the element exposes one.
    fn aspect_property(&self) -> Option<PropertyId> {
        None
    }

    /// The property holding the opacity flag, if the element exposes one.
    fn is_opaque_property(&self) -> Option<PropertyId> {
        None
    }
}
