// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Renderer: keeping native views in sync with bindable elements.
//!
//! A renderer never owns the element it shows. It observes it through a
//! [`RendererBinding`] and derives the state of its [`NativeHandle`] from the
//! element's properties:
//!
//! - [`RendererBinding`] tracks the current element, moving its subscription
//!   on rebind and re-raising property changes.
//! - [`BorderBackgroundManager`] resets and rebuilds the view's background
//!   whenever a border facet changes, keeping the platform drawable when
//!   nothing is customised.
//! - [`ImageButtonRenderer`] puts both together with asynchronous image
//!   loading and pointer input for clickable image elements.
//!
//! Disposal is terminal. After [`ImageButtonRenderer::dispose`] the native
//! handle is never touched again, even by image loads that were in flight.
//!
//! ## Threading
//!
//! Renderers live on the UI thread. Image loads are spawned on a
//! [`LocalSpawn`](futures::task::LocalSpawn) executor supplied by the host.

mod binding;
mod border;
mod host;
mod image_button;

pub use binding::{BindingPhase, ElementChanged, RendererBinding};
pub use border::{BorderBackgroundManager, BorderDrawable, BorderOptions, RippleDrawable, Shadow};
pub use host::{Background, NativeHandle};
pub use image_button::ImageButtonRenderer;
