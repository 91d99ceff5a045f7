// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Behavior: shared widget behavior through capability traits.
//!
//! Unrelated widgets opt into the same behavior by implementing a small
//! capability trait over their own property bag. The managers in this crate
//! are stateless: every function takes the widget (or its renderer) as a trait
//! object and reads and writes state through it.
//!
//! | Capability | Manager | Behavior |
//! |---|---|---|
//! | [`ButtonController`] | [`ButtonElementManager`] | press, release, click, command gating |
//! | [`ImageController`] | [`ImageElementManager`] | async image loading into a renderer |
//! | [`BorderController`] | [`BorderSnapshot`] | deciding whether a custom border is needed |
//!
//! ## Commands
//!
//! A [`Command`] bound to a clickable element decides whether clicks go
//! through. [`CommandSlot`] keeps the element subscribed to exactly one
//! command's can-execute notifications across rebinding.
//!
//! ## Image loading
//!
//! [`ImageElementManager::update_source`] resolves a source through an
//! [`ImageSourceResolver`] and applies the result only if it is still wanted.
//! Superseded, stale and post-dispose results are dropped; the element's
//! loading flag always ends up `false`. See the [`LoadTracker`] docs.
//!
//! ## Threading
//!
//! Everything here runs on the UI thread. Futures returned by this crate are
//! `!Send` and belong on a local executor.

mod border;
mod button;
mod command;
mod image;
mod load;
mod resolve;

pub use border::{
    BorderController, BorderSnapshot, Customizations, PLATFORM_CORNER_RADIUS, affects_border,
};
pub use button::{ButtonBehavior, ButtonController, ButtonElementManager, ButtonHandler, VisualState};
pub use command::{Command, CommandParameter, CommandRef, CommandSlot, RelayCommand};
pub use image::{
    Aspect, DrawableKind, ImageController, ImageHandler, ImageSource, ImageSourceKind,
    NativeImage, PlatformDrawable,
};
pub use load::{ImageElementManager, ImageVisualElementRenderer, LoadOutcome, LoadTicket, LoadTracker};
pub use resolve::{ImageSourceHandlers, ImageSourceResolver, ResolveError, ResolveResult};
