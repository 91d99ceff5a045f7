// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A renderer for image buttons.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use futures::FutureExt;
use futures::task::{LocalSpawn, LocalSpawnExt};
use understory_behavior::{
    Aspect, BorderController, ButtonController, ButtonElementManager, ImageController,
    ImageElementManager, ImageSourceResolver, ImageVisualElementRenderer, LoadTracker, NativeImage,
};
use understory_bindable::{BindableObject, PropertyChanged, SubscriptionId};

use crate::binding::{ElementChanged, RendererBinding};
use crate::border::{BorderBackgroundManager, BorderOptions};
use crate::host::NativeHandle;

/// Drives a native image view from a clickable image element.
///
/// The renderer composes a [`RendererBinding`], a
/// [`BorderBackgroundManager`] and a [`LoadTracker`]:
///
/// - binding an element loads its source and applies its aspect and opacity,
/// - a source change starts a new load, superseding the one in flight,
/// - aspect and opacity changes are applied as they happen,
/// - border properties are handled by the border manager.
///
/// Loads run on the host's [`LocalSpawn`] executor. Once the renderer is
/// disposed, nothing reaches the native handle, including loads that
/// complete afterwards.
pub struct ImageButtonRenderer<E> {
    this: Weak<Self>,
    binding: Rc<RendererBinding<E>>,
    border: Rc<BorderBackgroundManager<E>>,
    handle: Rc<dyn NativeHandle>,
    loads: LoadTracker,
    resolver: Rc<dyn ImageSourceResolver>,
    spawner: Rc<dyn LocalSpawn>,
    disposed: Cell<bool>,
    has_image: Cell<bool>,
    subscriptions: Cell<Option<(SubscriptionId, SubscriptionId)>>,
}

impl<E> ImageButtonRenderer<E>
where
    E: ButtonController + ImageController + BorderController + BindableObject + 'static,
{
    /// Creates an unbound renderer for `handle`.
    #[must_use]
    pub fn new(
        handle: Rc<dyn NativeHandle>,
        resolver: Rc<dyn ImageSourceResolver>,
        spawner: Rc<dyn LocalSpawn>,
        options: BorderOptions,
    ) -> Rc<Self> {
        let binding = RendererBinding::new();
        let border = BorderBackgroundManager::new(&binding, handle.clone(), options);
        let renderer = Rc::new_cyclic(|this: &Weak<Self>| Self {
            this: this.clone(),
            binding,
            border,
            handle,
            loads: LoadTracker::new(),
            resolver,
            spawner,
            disposed: Cell::new(false),
            has_image: Cell::new(false),
            subscriptions: Cell::new(None),
        });

        let this = Rc::downgrade(&renderer);
        let lifecycle = renderer
            .binding
            .element_changed()
            .subscribe(move |change: &ElementChanged<E>| {
                if let Some(renderer) = this.upgrade() {
                    renderer.on_element_changed(change);
                }
            });
        let this = Rc::downgrade(&renderer);
        let properties = renderer
            .binding
            .property_changed()
            .subscribe(move |change: &PropertyChanged| {
                if let Some(renderer) = this.upgrade() {
                    renderer.on_property_changed(change);
                }
            });
        renderer.subscriptions.set(Some((lifecycle, properties)));
        renderer
    }

    /// Binds `element`, or unbinds with `None`.
    pub fn set_element(&self, element: Option<Rc<E>>) {
        self.binding.set_element(element);
    }

    /// The renderer's binding.
    #[must_use]
    pub fn binding(&self) -> &Rc<RendererBinding<E>> {
        &self.binding
    }

    /// The renderer's border manager.
    #[must_use]
    pub fn border(&self) -> &Rc<BorderBackgroundManager<E>> {
        &self.border
    }

    /// The native pointer went down on the view.
    pub fn pointer_pressed(&self) {
        if let Some(element) = self.live_element() {
            ButtonElementManager::send_pressed(&*element);
        }
    }

    /// The native pointer went up without completing a click.
    pub fn pointer_released(&self) {
        if let Some(element) = self.live_element() {
            ButtonElementManager::send_released(&*element);
        }
    }

    /// The native view reported a click.
    pub fn click(&self) {
        if let Some(element) = self.live_element() {
            ButtonElementManager::send_released(&*element);
            ButtonElementManager::send_clicked(&*element);
        }
    }

    /// Tears the renderer down.
    ///
    /// Aborts the load in flight, drops every subscription and disposes the
    /// border manager and the binding. Idempotent.
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.loads.cancel();
        if let Some((lifecycle, properties)) = self.subscriptions.take() {
            self.binding.element_changed().unsubscribe(lifecycle);
            self.binding.property_changed().unsubscribe(properties);
        }
        self.border.dispose();
        self.binding.dispose();
        tracing::debug!("image button renderer disposed");
    }

    fn live_element(&self) -> Option<Rc<E>> {
        if self.disposed.get() {
            return None;
        }
        self.binding.element()
    }

    fn on_element_changed(&self, change: &ElementChanged<E>) {
        if self.disposed.get() {
            return;
        }
        if change.new.is_none() {
            self.loads.cancel();
            self.handle.set_image(None);
            self.has_image.set(false);
            return;
        }
        // Only an image that was actually applied can be kept across a rebind.
        let previous = change
            .old
            .as_deref()
            .filter(|_| self.has_image.get())
            .map(|old| old as &dyn ImageController);
        self.load(previous);
        ImageElementManager::apply_aspect(self);
        ImageElementManager::apply_opaque(self);
    }

    fn on_property_changed(&self, change: &PropertyChanged) {
        let Some(element) = self.live_element() else {
            return;
        };
        let property = Some(change.property);
        if property == element.source_property() {
            self.load(None);
        } else if property == element.aspect_property() {
            ImageElementManager::apply_aspect(self);
        } else if property == element.is_opaque_property() {
            ImageElementManager::apply_opaque(self);
        }
    }

    fn load(&self, previous: Option<&dyn ImageController>) {
        let Some(this) = self.this.upgrade() else {
            return;
        };
        let load = ImageElementManager::update_source(&this, previous, &*self.resolver)
            .map(|outcome| tracing::trace!(?outcome, "image load finished"));
        if let Err(error) = self.spawner.spawn_local(load) {
            tracing::warn!(%error, "failed to spawn image load");
        }
    }
}

impl<E> ImageVisualElementRenderer for ImageButtonRenderer<E>
where
    E: ImageController + 'static,
{
    fn element(&self) -> Option<Rc<dyn ImageController>> {
        let element = self.binding.element()?;
        Some(element)
    }

    fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    fn set_image(&self, image: Option<NativeImage>) {
        if !self.disposed.get() {
            self.has_image.set(image.is_some());
            self.handle.set_image(image);
            self.handle.invalidate();
        }
    }

    fn set_aspect(&self, aspect: Aspect) {
        if !self.disposed.get() {
            self.handle.set_aspect(aspect);
        }
    }

    fn set_opaque(&self, opaque: bool) {
        if !self.disposed.get() {
            self.handle.set_opaque(opaque);
        }
    }

    fn image_loads(&self) -> &LoadTracker {
        &self.loads
    }
}

impl<E> fmt::Debug for ImageButtonRenderer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageButtonRenderer")
            .field("binding", &self.binding)
            .field("border", &self.border)
            .field("loads", &self.loads)
            .field("disposed", &self.disposed.get())
            .finish_non_exhaustive()
    }
}
