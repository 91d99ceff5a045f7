// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolving image sources into native images.

use std::fmt;
use std::rc::Rc;

use futures::future::{self, FutureExt, LocalBoxFuture};

use crate::image::{ImageSource, ImageSourceKind, NativeImage};

/// Why an image source could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The backend gave up because the request was cancelled.
    ///
    /// Not a failure; never logged as one.
    #[error("image request was cancelled")]
    Cancelled,
    /// No resolver is registered for this kind of source.
    #[error("no image handler registered for {kind} sources")]
    NoHandler {
        /// The unhandled source kind.
        kind: ImageSourceKind,
    },
    /// The source does not exist.
    #[error("image source `{image}` not found")]
    NotFound {
        /// The missing source.
        image: ImageSource,
    },
    /// The data could not be decoded.
    #[error("failed to decode image: {reason}")]
    Decode {
        /// Backend-specific detail.
        reason: String,
    },
    /// Fetching the data failed.
    #[error("failed to fetch image: {reason}")]
    Io {
        /// Backend-specific detail.
        reason: String,
    },
}

/// Result of resolving one image source.
pub type ResolveResult = Result<NativeImage, ResolveError>;

/// An asynchronous image decode/fetch backend.
///
/// The returned future owns everything it needs and runs on the UI thread's
/// local executor; backends that do blocking work hand it off themselves and
/// complete the future from their own continuation.
pub trait ImageSourceResolver {
    /// Starts resolving `source`.
    fn resolve(&self, source: &ImageSource) -> LocalBoxFuture<'static, ResolveResult>;
}

impl<F> ImageSourceResolver for F
where
    F: Fn(&ImageSource) -> LocalBoxFuture<'static, ResolveResult>,
{
    fn resolve(&self, source: &ImageSource) -> LocalBoxFuture<'static, ResolveResult> {
        self(source)
    }
}

/// Dispatches each source to the resolver registered for its kind.
///
/// # Example
///
/// ```rust
/// use futures::FutureExt;
/// use futures::executor::block_on;
/// use understory_behavior::{
///     ImageSource, ImageSourceHandlers, ImageSourceKind, ImageSourceResolver, ResolveError,
/// };
///
/// let handlers = ImageSourceHandlers::new().with_handler(ImageSourceKind::File, |source: &ImageSource| {
///     let image = source.clone();
///     async move { Err(ResolveError::NotFound { image }) }.boxed_local()
/// });
///
/// let uri = ImageSource::Uri("https://example.com/cat.png".into());
/// assert_eq!(
///     block_on(handlers.resolve(&uri)),
///     Err(ResolveError::NoHandler { kind: ImageSourceKind::Uri })
/// );
/// ```
#[derive(Clone, Default)]
pub struct ImageSourceHandlers {
    file: Option<Rc<dyn ImageSourceResolver>>,
    uri: Option<Rc<dyn ImageSourceResolver>>,
    embedded: Option<Rc<dyn ImageSourceResolver>>,
}

impl ImageSourceHandlers {
    /// Creates a dispatcher with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the resolver for `kind`, replacing any previous one.
    #[must_use]
    pub fn with_handler(mut self, kind: ImageSourceKind, resolver: impl ImageSourceResolver + 'static) -> Self {
        self.set_handler(kind, Rc::new(resolver));
        self
    }

    /// Registers a shared resolver for `kind`, replacing any previous one.
    pub fn set_handler(&mut self, kind: ImageSourceKind, resolver: Rc<dyn ImageSourceResolver>) {
        *self.slot_mut(kind) = Some(resolver);
    }

    /// Returns the resolver registered for `kind`.
    #[must_use]
    pub fn handler(&self, kind: ImageSourceKind) -> Option<&Rc<dyn ImageSourceResolver>> {
        match kind {
            ImageSourceKind::File => self.file.as_ref(),
            ImageSourceKind::Uri => self.uri.as_ref(),
            ImageSourceKind::Embedded => self.embedded.as_ref(),
        }
    }

    fn slot_mut(&mut self, kind: ImageSourceKind) -> &mut Option<Rc<dyn ImageSourceResolver>> {
        match kind {
            ImageSourceKind::File => &mut self.file,
            ImageSourceKind::Uri => &mut self.uri,
            ImageSourceKind::Embedded => &mut self.embedded,
        }
    }
}

impl ImageSourceResolver for ImageSourceHandlers {
    fn resolve(&self, source: &ImageSource) -> LocalBoxFuture<'static, ResolveResult> {
        let kind = source.kind();
        match self.handler(kind) {
            Some(resolver) => resolver.resolve(source),
            None => future::ready(Err(ResolveError::NoHandler { kind })).boxed_local(),
        }
    }
}

impl fmt::Debug for ImageSourceHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageSourceHandlers")
            .field("file", &self.file.is_some())
            .field("uri", &self.uri.is_some())
            .field("embedded", &self.embedded.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::{DrawableKind, PlatformDrawable};
    use futures::executor::block_on;

    fn drawable_resolver(source: &ImageSource) -> LocalBoxFuture<'static, ResolveResult> {
        let name = source.to_string();
        async move {
            Ok(NativeImage::drawable(PlatformDrawable {
                name,
                kind: DrawableKind::NinePatch,
            }))
        }
        .boxed_local()
    }

    #[test]
    fn dispatches_by_kind() {
        let handlers = ImageSourceHandlers::new().with_handler(ImageSourceKind::Embedded, drawable_resolver);
        assert!(handlers.handler(ImageSourceKind::Embedded).is_some());
        assert!(handlers.handler(ImageSourceKind::File).is_none());

        let resolved = block_on(handlers.resolve(&ImageSource::Embedded("logo".into())));
        match resolved {
            Ok(NativeImage::Drawable(drawable)) => assert_eq!(drawable.name, "resource:logo"),
            other => panic!("unexpected resolution: {other:?}"),
        }

        let missing = block_on(handlers.resolve(&ImageSource::File("a.png".into())));
        assert_eq!(
            missing,
            Err(ResolveError::NoHandler {
                kind: ImageSourceKind::File
            })
        );
    }

    #[test]
    fn error_messages() {
        let err = ResolveError::NotFound {
            image: ImageSource::Uri("https://example.com/x.png".into()),
        };
        assert_eq!(
            err.to_string(),
            "image source `https://example.com/x.png` not found"
        );
        assert_eq!(
            ResolveError::NoHandler {
                kind: ImageSourceKind::Embedded
            }
            .to_string(),
            "no image handler registered for embedded sources"
        );
    }
}
