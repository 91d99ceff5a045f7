// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fakes for renderer integration tests.

#![allow(
    missing_docs,
    dead_code,
    reason = "Integration-test helper module; each test file uses a subset."
)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use futures::FutureExt;
use futures::channel::oneshot;
use futures::executor::LocalPool;
use futures::future::LocalBoxFuture;
use kurbo::Insets;
use understory_behavior::{
    Aspect, DrawableKind, ImageSource, ImageSourceResolver, NativeImage, PlatformDrawable,
    ResolveError, ResolveResult,
};
use understory_controls::{Catalog, CatalogOptions, ImageButton};
use understory_renderer::{Background, BorderOptions, ImageButtonRenderer, NativeHandle};

/// A native view that records what the renderer does to it.
#[derive(Default)]
pub(crate) struct FakeHandle {
    pub(crate) background: RefCell<Option<Background>>,
    pub(crate) image: RefCell<Option<NativeImage>>,
    pub(crate) aspect: Cell<Option<Aspect>>,
    pub(crate) opaque: Cell<Option<bool>>,
    pub(crate) padding: Cell<Insets>,
    pub(crate) background_writes: Cell<usize>,
    pub(crate) image_writes: Cell<usize>,
    pub(crate) invalidations: Cell<usize>,
}

impl FakeHandle {
    /// A view showing the platform's own button background.
    pub(crate) fn with_platform_background() -> Rc<Self> {
        let handle = Self::default();
        *handle.background.borrow_mut() = Some(platform_background());
        Rc::new(handle)
    }

    pub(crate) fn image_name(&self) -> Option<String> {
        match &*self.image.borrow() {
            Some(NativeImage::Drawable(drawable)) => Some(drawable.name.clone()),
            _ => None,
        }
    }

    /// Number of mutations of any kind, for checking nothing happens.
    pub(crate) fn writes(&self) -> usize {
        self.background_writes.get() + self.image_writes.get() + self.invalidations.get()
    }
}

impl NativeHandle for FakeHandle {
    fn background(&self) -> Option<Background> {
        self.background.borrow().clone()
    }

    fn set_background(&self, background: Option<Background>) {
        self.background_writes.set(self.background_writes.get() + 1);
        *self.background.borrow_mut() = background;
    }

    fn padding(&self) -> Insets {
        self.padding.get()
    }

    fn set_image(&self, image: Option<NativeImage>) {
        self.image_writes.set(self.image_writes.get() + 1);
        *self.image.borrow_mut() = image;
    }

    fn set_aspect(&self, aspect: Aspect) {
        self.aspect.set(Some(aspect));
    }

    fn set_opaque(&self, opaque: bool) {
        self.opaque.set(Some(opaque));
    }

    fn invalidate(&self) {
        self.invalidations.set(self.invalidations.get() + 1);
    }
}

pub(crate) fn platform_background() -> Background {
    Background::Platform(Rc::new(PlatformDrawable {
        name: "btn_default".into(),
        kind: DrawableKind::NinePatch,
    }))
}

/// A resolver whose requests complete only when the test says so.
#[derive(Default)]
pub(crate) struct ManualResolver {
    pending: RefCell<Vec<(ImageSource, oneshot::Sender<ResolveResult>)>>,
}

impl ManualResolver {
    pub(crate) fn pending(&self) -> Vec<ImageSource> {
        self.pending
            .borrow()
            .iter()
            .map(|(source, _)| source.clone())
            .collect()
    }

    /// Completes the oldest request for `source` with a drawable named after it.
    pub(crate) fn succeed(&self, source: &ImageSource) {
        let name = source.to_string();
        self.complete(
            source,
            Ok(NativeImage::drawable(PlatformDrawable {
                name,
                kind: DrawableKind::Vector,
            })),
        );
    }

    pub(crate) fn complete(&self, source: &ImageSource, result: ResolveResult) {
        let sender = {
            let mut pending = self.pending.borrow_mut();
            let index = pending
                .iter()
                .position(|(s, _)| s == source)
                .expect("no pending request for source");
            pending.remove(index).1
        };
        // The load may already have been dropped.
        let _ = sender.send(result);
    }
}

impl ImageSourceResolver for ManualResolver {
    fn resolve(&self, source: &ImageSource) -> LocalBoxFuture<'static, ResolveResult> {
        let (sender, receiver) = oneshot::channel();
        self.pending.borrow_mut().push((source.clone(), sender));
        async move { receiver.await.unwrap_or(Err(ResolveError::Cancelled)) }.boxed_local()
    }
}

pub(crate) struct Fixture {
    pub(crate) pool: LocalPool,
    pub(crate) catalog: Rc<Catalog>,
    pub(crate) handle: Rc<FakeHandle>,
    pub(crate) resolver: Rc<ManualResolver>,
    pub(crate) renderer: Rc<ImageButtonRenderer<ImageButton>>,
}

impl Fixture {
    pub(crate) fn new(options: BorderOptions) -> Self {
        let pool = LocalPool::new();
        let catalog = Catalog::new(CatalogOptions::default()).unwrap();
        let handle = FakeHandle::with_platform_background();
        let resolver = Rc::new(ManualResolver::default());
        let renderer = ImageButtonRenderer::new(
            handle.clone(),
            resolver.clone(),
            Rc::new(pool.spawner()),
            options,
        );
        Self {
            pool,
            catalog,
            handle,
            resolver,
            renderer,
        }
    }

    pub(crate) fn button(&self) -> Rc<ImageButton> {
        ImageButton::new(&self.catalog)
    }

    pub(crate) fn run(&mut self) {
        self.pool.run_until_stalled();
    }
}

pub(crate) fn embedded(name: &str) -> ImageSource {
    ImageSource::Embedded(name.into())
}
