// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Asynchronous image loading into a renderer.
//!
//! [`ImageElementManager::update_source`] starts a load and returns a future
//! to run on the UI thread's local executor. Each renderer owns a
//! [`LoadTracker`], which numbers loads with a generation counter and keeps the
//! abort handle of the one in flight:
//!
//! - starting a load aborts the previous one,
//! - a completed load touches the renderer only if it is still the current
//!   generation, the renderer is alive and not disposed, and the element and
//!   its source are the ones the load started with,
//! - the element's loading flag is set when a load starts and cleared when it
//!   ends in any way, unless a newer load for the same element has taken over.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use futures::future::{self, AbortHandle, FutureExt, LocalBoxFuture};

use crate::image::{Aspect, ImageController, ImageSource, NativeImage};
use crate::resolve::{ImageSourceResolver, ResolveError};

/// What happened to one load.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LoadOutcome {
    /// The resolved image (or the absence of a source) was applied.
    Applied,
    /// The element's source did not change across a rebind; nothing was done.
    Unchanged,
    /// A newer load, a new element or a new source made this result obsolete.
    Stale,
    /// The load was superseded before it resolved, or the backend cancelled it.
    Cancelled,
    /// The backend failed; the failure was logged.
    Failed,
    /// The renderer was disposed or dropped.
    Disposed,
    /// The renderer had no element.
    NoElement,
}

/// A native view that can show an element's image.
pub trait ImageVisualElementRenderer {
    /// The element currently bound to the renderer.
    fn element(&self) -> Option<Rc<dyn ImageController>>;

    /// Whether the renderer has been disposed.
    fn is_disposed(&self) -> bool;

    /// Shows `image`, or nothing.
    fn set_image(&self, image: Option<NativeImage>);

    /// Applies the scaling mode.
    fn set_aspect(&self, aspect: Aspect);

    /// Applies the opacity hint.
    fn set_opaque(&self, opaque: bool);

    /// The renderer's load bookkeeping.
    fn image_loads(&self) -> &LoadTracker;
}

struct ActiveLoad {
    generation: u64,
    element: Weak<dyn ImageController>,
    abort: AbortHandle,
}

#[derive(Default)]
struct TrackerState {
    generation: Cell<u64>,
    active: RefCell<Option<ActiveLoad>>,
}

/// Identifies one load started through a [`LoadTracker`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    /// Returns the load's generation.
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

/// Generation counter and in-flight abort handle for a renderer's image loads.
///
/// Clones share state.
#[derive(Clone, Default)]
pub struct LoadTracker {
    state: Rc<TrackerState>,
}

impl LoadTracker {
    /// Creates a tracker with nothing in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation for `element`, aborting the load in flight.
    pub fn begin(&self, element: &Rc<dyn ImageController>, abort: AbortHandle) -> LoadTicket {
        self.cancel();
        let generation = self.state.generation.get() + 1;
        self.state.generation.set(generation);
        *self.state.active.borrow_mut() = Some(ActiveLoad {
            generation,
            element: Rc::downgrade(element),
            abort,
        });
        LoadTicket { generation }
    }

    /// Aborts the load in flight, if any.
    ///
    /// The aborted load's future still runs to completion and clears its
    /// element's loading flag.
    pub fn cancel(&self) {
        let active = self.state.active.borrow_mut().take();
        if let Some(active) = active {
            tracing::trace!(generation = active.generation, "superseding in-flight image load");
            active.abort.abort();
        }
    }

    /// Returns `true` if `ticket` belongs to the newest load.
    #[must_use]
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        self.state.generation.get() == ticket.generation
    }

    /// Returns `true` if a load is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.active.borrow().is_some()
    }

    /// Returns the newest generation handed out.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.generation.get()
    }

    /// Ends the load identified by `ticket`.
    ///
    /// Returns `true` if the load's element should stop reporting loading:
    /// always, unless a newer load for the same element is in flight.
    fn finish(&self, ticket: LoadTicket, element: &Rc<dyn ImageController>) -> bool {
        let mut active = self.state.active.borrow_mut();
        match active.as_ref() {
            Some(current) if current.generation == ticket.generation => {
                *active = None;
                true
            }
            Some(current) => match current.element.upgrade() {
                Some(newer) => !Rc::ptr_eq(&newer, element),
                None => true,
            },
            None => true,
        }
    }
}

impl fmt::Debug for LoadTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadTracker")
            .field("generation", &self.generation())
            .field("loading", &self.is_loading())
            .finish()
    }
}

/// Clears the loading flag when a load ends, including when its future is
/// dropped before completion.
struct LoadingGuard {
    tracker: LoadTracker,
    ticket: LoadTicket,
    element: Rc<dyn ImageController>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if self.tracker.finish(self.ticket, &self.element) {
            self.element.set_is_loading(false);
        }
    }
}

/// Shared image logic for renderers.
#[derive(Copy, Clone, Debug)]
pub struct ImageElementManager;

impl ImageElementManager {
    /// Loads the bound element's source into `renderer`.
    ///
    /// The synchronous part runs before this returns: it supersedes any load
    /// in flight, sets the element's loading flag and clears the native image.
    /// If a subscriber to the loading flag starts another load, this one is
    /// reported as [`LoadOutcome::Stale`] without touching the renderer.
    /// The returned future resolves the source and applies it if the result is
    /// still wanted.
    ///
    /// `previous` is the element being replaced on a rebind; if its source
    /// equals the new element's, nothing is reloaded.
    ///
    /// Resolution failures are logged and reported as
    /// [`LoadOutcome::Failed`]; they never surface as errors.
    pub fn update_source<R>(
        renderer: &Rc<R>,
        previous: Option<&dyn ImageController>,
        resolver: &dyn ImageSourceResolver,
    ) -> LocalBoxFuture<'static, LoadOutcome>
    where
        R: ImageVisualElementRenderer + ?Sized + 'static,
    {
        if renderer.is_disposed() {
            return future::ready(LoadOutcome::Disposed).boxed_local();
        }
        let Some(element) = renderer.element() else {
            return future::ready(LoadOutcome::NoElement).boxed_local();
        };
        let source = element.source();
        if let Some(previous) = previous {
            if previous.source() == source {
                return future::ready(LoadOutcome::Unchanged).boxed_local();
            }
        }

        // Become current before notifying: a load started by a loading
        // subscriber must supersede this one.
        let tracker = renderer.image_loads().clone();
        let Some(source) = source else {
            tracker.cancel();
            renderer.set_image(None);
            element.set_is_loading(false);
            return future::ready(LoadOutcome::Applied).boxed_local();
        };

        let (resolution, abort) = future::abortable(resolver.resolve(&source));
        let ticket = tracker.begin(&element, abort);
        let guard = LoadingGuard {
            tracker,
            ticket,
            element,
        };
        guard.element.set_is_loading(true);
        if !guard.tracker.is_current(ticket) {
            tracing::trace!(
                generation = ticket.generation(),
                %source,
                "image load superseded while starting"
            );
            drop(guard);
            return future::ready(LoadOutcome::Stale).boxed_local();
        }
        renderer.set_image(None);
        let renderer = Rc::downgrade(renderer);

        async move {
            let resolved = resolution.await;
            let outcome = Self::complete(&renderer, &guard, &source, resolved);
            drop(guard);
            outcome
        }
        .boxed_local()
    }

    fn complete<R>(
        renderer: &Weak<R>,
        guard: &LoadingGuard,
        source: &ImageSource,
        resolved: Result<Result<NativeImage, ResolveError>, future::Aborted>,
    ) -> LoadOutcome
    where
        R: ImageVisualElementRenderer + ?Sized,
    {
        let generation = guard.ticket.generation();
        let image = match resolved {
            Err(future::Aborted) | Ok(Err(ResolveError::Cancelled)) => {
                tracing::trace!(generation, %source, "image load cancelled");
                return LoadOutcome::Cancelled;
            }
            Ok(Err(error)) => {
                tracing::warn!(%error, %source, "error loading image");
                return LoadOutcome::Failed;
            }
            Ok(Ok(image)) => image,
        };

        let Some(renderer) = renderer.upgrade() else {
            return LoadOutcome::Disposed;
        };
        if renderer.is_disposed() {
            tracing::trace!(generation, "renderer disposed during image load");
            return LoadOutcome::Disposed;
        }
        let still_bound = renderer
            .element()
            .is_some_and(|current| Rc::ptr_eq(&current, &guard.element));
        if !guard.tracker.is_current(guard.ticket)
            || !still_bound
            || guard.element.source().as_ref() != Some(source)
        {
            tracing::trace!(generation, %source, "dropping stale image result");
            return LoadOutcome::Stale;
        }

        renderer.set_image(Some(image));
        guard.element.native_size_changed();
        LoadOutcome::Applied
    }

    /// Applies the element's aspect to the renderer.
    pub fn apply_aspect<R>(renderer: &R)
    where
        R: ImageVisualElementRenderer + ?Sized,
    {
        if renderer.is_disposed() {
            return;
        }
        if let Some(element) = renderer.element() {
            renderer.set_aspect(element.aspect());
        }
    }

    /// Applies the element's opacity hint to the renderer.
    pub fn apply_opaque<R>(renderer: &R)
    where
        R: ImageVisualElementRenderer + ?Sized,
    {
        if renderer.is_disposed() {
            return;
        }
        if let Some(element) = renderer.element() {
            renderer.set_opaque(element.is_opaque());
        }
    }
}
