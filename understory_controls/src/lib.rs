// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Controls: a small widget catalog over bindable properties.
//!
//! Every control stores its state in a
//! [`PropertyBag`](understory_bindable::PropertyBag) backed by one shared
//! [`Catalog`], and gets its behavior by implementing the capability traits of
//! [`understory_behavior`]:
//!
//! | Control | Capabilities |
//! |---|---|
//! | [`Button`] | `ButtonController`, `ImageController`, `BorderController` |
//! | [`ImageButton`] | `ButtonController`, `ImageController`, `BorderController` |
//! | [`Entry`] | none; validated caret and selection |
//!
//! Controls are created as `Rc`s so property hooks can reach them. Nothing
//! here is thread-safe; controls live on the UI thread.
//!
//! ```rust
//! use std::rc::Rc;
//! use understory_behavior::{ButtonController, CommandRef, RelayCommand, VisualState};
//! use understory_controls::{Catalog, CatalogOptions, ImageButton};
//!
//! let catalog = Catalog::new(CatalogOptions::default()).unwrap();
//! let button = ImageButton::new(&catalog);
//!
//! let command = Rc::new(RelayCommand::with_can_execute(|_| {}, |_| false));
//! button.set_command(CommandRef::from(command));
//! assert!(!button.is_enabled());
//! assert_eq!(button.visual_state(), VisualState::Disabled);
//! ```

mod button;
mod catalog;
mod clickable;
mod content_layout;
mod entry;
mod image_button;
mod visual_element;

pub use button::{Button, ButtonProperties, DEFAULT_BORDER_RADIUS, DEFAULT_CORNER_RADIUS};
pub use catalog::{Catalog, CatalogOptions, DEFAULT_FONT_SIZE};
pub use content_layout::{ButtonContentLayout, ContentLayoutParseError, DEFAULT_SPACING, ImagePosition};
pub use entry::{Entry, EntryProperties};
pub use image_button::{ImageButton, ImageButtonProperties};
pub use visual_element::{BorderElementProperties, VisualElementProperties};
