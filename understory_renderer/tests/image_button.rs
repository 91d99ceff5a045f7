// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for `ImageButtonRenderer`: image loads racing rebinds, source
//! changes and disposal.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use understory_behavior::{Aspect, ButtonController, ImageController, ResolveError, VisualState};
use understory_bindable::BindableObject;
use understory_renderer::{Background, BindingPhase, BorderOptions, NativeHandle};

use common::{Fixture, embedded};

#[test]
fn binding_loads_the_source_and_applies_the_image_facets() {
    let mut f = Fixture::new(BorderOptions::new());
    let button = f.button();
    button.set_source(Some(embedded("play")));
    button.set_aspect(Aspect::Fill);
    button.set_is_opaque(true);
    let measured = Rc::new(Cell::new(0));
    let count = measured.clone();
    button
        .measure_invalidated()
        .subscribe(move |_| count.set(count.get() + 1));

    f.renderer.set_element(Some(button.clone()));
    assert!(button.is_loading());
    assert_eq!(f.handle.aspect.get(), Some(Aspect::Fill));
    assert_eq!(f.handle.opaque.get(), Some(true));
    assert_eq!(f.resolver.pending(), [embedded("play")]);

    f.run();
    assert!(button.is_loading());
    assert_eq!(f.handle.image_name(), None);

    f.resolver.succeed(&embedded("play"));
    f.run();
    assert!(!button.is_loading());
    assert_eq!(f.handle.image_name().as_deref(), Some("resource:play"));
    assert_eq!(measured.get(), 1);
}

#[test]
fn a_new_source_supersedes_the_load_in_flight() {
    let mut f = Fixture::new(BorderOptions::new());
    let button = f.button();
    button.set_source(Some(embedded("a")));
    f.renderer.set_element(Some(button.clone()));

    button.set_source(Some(embedded("b")));
    assert_eq!(f.resolver.pending(), [embedded("a"), embedded("b")]);

    // The first answer arrives late and is dropped.
    f.resolver.succeed(&embedded("a"));
    f.run();
    assert_eq!(f.handle.image_name(), None);
    assert!(button.is_loading());

    f.resolver.succeed(&embedded("b"));
    f.run();
    assert_eq!(f.handle.image_name().as_deref(), Some("resource:b"));
    assert!(!button.is_loading());
}

#[test]
fn clearing_the_source_clears_the_image() {
    let mut f = Fixture::new(BorderOptions::new());
    let button = f.button();
    button.set_source(Some(embedded("a")));
    f.renderer.set_element(Some(button.clone()));
    f.resolver.succeed(&embedded("a"));
    f.run();
    assert!(f.handle.image_name().is_some());

    button.set_source(None);
    f.run();
    assert!(f.handle.image.borrow().is_none());
    assert!(!button.is_loading());
    assert!(f.resolver.pending().is_empty());
}

#[test]
fn failed_loads_still_clear_loading() {
    let mut f = Fixture::new(BorderOptions::new());
    let button = f.button();
    button.set_source(Some(embedded("missing")));
    f.renderer.set_element(Some(button.clone()));

    f.resolver.complete(
        &embedded("missing"),
        Err(ResolveError::Io {
            reason: "connection reset".into(),
        }),
    );
    f.run();
    assert!(!button.is_loading());
    assert!(f.handle.image.borrow().is_none());
}

#[test]
fn dispose_mid_flight_leaves_the_view_untouched() {
    let mut f = Fixture::new(BorderOptions::new());
    let button = f.button();
    let baseline = button.properties().subscriber_count();
    button.set_source(Some(embedded("slow")));
    button.set_corner_radius(6);
    f.renderer.set_element(Some(button.clone()));
    assert!(button.is_loading());

    f.renderer.dispose();
    let writes = f.handle.writes();
    assert_eq!(f.renderer.binding().phase(), BindingPhase::Disposed);
    assert!(f.renderer.border().is_disposed());
    assert_eq!(button.properties().subscriber_count(), baseline);

    f.resolver.succeed(&embedded("slow"));
    f.run();
    button.set_source(Some(embedded("other")));
    button.set_corner_radius(12);
    f.renderer.pointer_pressed();
    f.run();

    assert_eq!(f.handle.writes(), writes);
    assert!(f.handle.image.borrow().is_none());
    assert!(!button.is_loading());
    assert!(!button.is_pressed());
    assert!(f.resolver.pending().is_empty());
    f.renderer.dispose();
}

#[test]
fn dropping_the_executor_clears_loading() {
    let f = Fixture::new(BorderOptions::new());
    let button = f.button();
    button.set_source(Some(embedded("never")));
    f.renderer.set_element(Some(button.clone()));
    assert!(button.is_loading());

    drop(f.pool);
    assert!(!button.is_loading());
}

#[test]
fn rebinding_with_the_same_source_keeps_the_image() {
    let mut f = Fixture::new(BorderOptions::new());
    let first = f.button();
    first.set_source(Some(embedded("logo")));
    f.renderer.set_element(Some(first.clone()));
    f.resolver.succeed(&embedded("logo"));
    f.run();
    let image_writes = f.handle.image_writes.get();

    let second = f.button();
    second.set_source(Some(embedded("logo")));
    f.renderer.set_element(Some(second.clone()));
    f.run();

    assert_eq!(f.handle.image_writes.get(), image_writes);
    assert_eq!(f.handle.image_name().as_deref(), Some("resource:logo"));
    assert!(!second.is_loading());
    assert!(f.resolver.pending().is_empty());
}

#[test]
fn rebinding_mid_flight_restarts_the_load() {
    let mut f = Fixture::new(BorderOptions::new());
    let first = f.button();
    first.set_source(Some(embedded("logo")));
    f.renderer.set_element(Some(first.clone()));

    let second = f.button();
    second.set_source(Some(embedded("logo")));
    f.renderer.set_element(Some(second.clone()));
    assert_eq!(f.resolver.pending().len(), 2);

    // The first request belongs to the old element.
    f.resolver.succeed(&embedded("logo"));
    f.run();
    assert!(!first.is_loading());
    assert!(second.is_loading());
    assert_eq!(f.handle.image_name(), None);

    f.resolver.succeed(&embedded("logo"));
    f.run();
    assert!(!second.is_loading());
    assert_eq!(f.handle.image_name().as_deref(), Some("resource:logo"));
}

#[test]
fn rebinding_after_a_failed_load_retries_the_same_source() {
    let mut f = Fixture::new(BorderOptions::new());
    let first = f.button();
    first.set_source(Some(embedded("logo")));
    f.renderer.set_element(Some(first.clone()));
    f.resolver.complete(
        &embedded("logo"),
        Err(ResolveError::Io {
            reason: "timed out".into(),
        }),
    );
    f.run();
    assert_eq!(f.handle.image_name(), None);

    let second = f.button();
    second.set_source(Some(embedded("logo")));
    f.renderer.set_element(Some(second.clone()));
    assert_eq!(f.resolver.pending(), [embedded("logo")]);
    assert!(second.is_loading());

    f.resolver.succeed(&embedded("logo"));
    f.run();
    assert!(!second.is_loading());
    assert_eq!(f.handle.image_name().as_deref(), Some("resource:logo"));
}

#[test]
fn source_set_while_loading_starts_wins() {
    let mut f = Fixture::new(BorderOptions::new());
    let button = f.button();
    button.set_source(Some(embedded("a")));
    let is_loading = f.catalog.image_button().is_loading;
    let fired = Rc::new(Cell::new(false));
    let weak = Rc::downgrade(&button);
    button.properties().subscribe(move |change| {
        if change.is(is_loading) && !fired.replace(true) {
            if let Some(button) = weak.upgrade() {
                button.set_source(Some(embedded("b")));
            }
        }
    });

    f.renderer.set_element(Some(button.clone()));
    for source in f.resolver.pending() {
        f.resolver.succeed(&source);
    }
    f.run();

    assert_eq!(button.source(), Some(embedded("b")));
    assert_eq!(f.handle.image_name().as_deref(), Some("resource:b"));
    assert!(!button.is_loading());
}

#[test]
fn subscribers_changing_source_and_aspect_mid_load_settle_on_the_final_state() {
    let mut f = Fixture::new(BorderOptions::new());
    let button = f.button();
    button.set_source(Some(embedded("a")));
    let source = f.catalog.image_button().source;
    let weak = Rc::downgrade(&button);
    button.properties().subscribe(move |change| {
        let Some(button) = weak.upgrade() else {
            return;
        };
        if change.is(source) && button.source() == Some(embedded("b")) {
            button.set_aspect(Aspect::Fill);
            button.set_source(Some(embedded("c")));
        }
    });
    f.renderer.set_element(Some(button.clone()));
    assert!(button.is_loading());

    button.set_source(Some(embedded("b")));
    assert_eq!(button.source(), Some(embedded("c")));
    assert_eq!(f.handle.aspect.get(), Some(Aspect::Fill));

    for source in f.resolver.pending() {
        f.resolver.succeed(&source);
    }
    f.run();

    assert_eq!(f.handle.image_name().as_deref(), Some("resource:c"));
    assert_eq!(f.handle.aspect.get(), Some(Aspect::Fill));
    assert!(!button.is_loading());
    assert!(f.resolver.pending().is_empty());
}

#[test]
fn unbinding_drops_the_image_and_the_load() {
    let mut f = Fixture::new(BorderOptions::new());
    let button = f.button();
    button.set_source(Some(embedded("a")));
    f.renderer.set_element(Some(button.clone()));

    f.renderer.set_element(None);
    f.resolver.succeed(&embedded("a"));
    f.run();
    assert!(!button.is_loading());
    assert!(f.handle.image.borrow().is_none());
    assert_eq!(f.renderer.binding().phase(), BindingPhase::Unbound);
}

#[test]
fn facet_changes_are_applied_live() {
    let f = Fixture::new(BorderOptions::new());
    let button = f.button();
    f.renderer.set_element(Some(button.clone()));
    assert_eq!(f.handle.aspect.get(), Some(Aspect::AspectFit));
    assert_eq!(f.handle.opaque.get(), Some(false));

    button.set_aspect(Aspect::AspectFill);
    button.set_is_opaque(true);
    assert_eq!(f.handle.aspect.get(), Some(Aspect::AspectFill));
    assert_eq!(f.handle.opaque.get(), Some(true));
    assert_eq!(button.aspect(), Aspect::AspectFill);
}

#[test]
fn pointer_input_reaches_the_element() {
    let f = Fixture::new(BorderOptions::new());
    let button = f.button();
    let clicks = Rc::new(Cell::new(0));
    let count = clicks.clone();
    button
        .clicked()
        .subscribe(move |_| count.set(count.get() + 1));
    f.renderer.set_element(Some(button.clone()));

    f.renderer.pointer_pressed();
    assert!(button.is_pressed());
    assert_eq!(button.visual_state(), VisualState::Pressed);

    f.renderer.click();
    assert!(!button.is_pressed());
    assert_eq!(clicks.get(), 1);

    f.renderer.pointer_pressed();
    f.renderer.pointer_released();
    assert_eq!(clicks.get(), 1);
    assert_eq!(button.visual_state(), VisualState::Normal);
}

#[test]
fn border_properties_reach_the_background() {
    let f = Fixture::new(BorderOptions::new().with_ripple(false));
    let button = f.button();
    f.renderer.set_element(Some(button.clone()));
    assert!(matches!(f.handle.background(), Some(Background::Platform(_))));

    button.set_border_width(2.0);
    let installed = f.handle.background();
    assert!(matches!(installed, Some(Background::Border(_))));
    assert_eq!(f.renderer.border().drawable().unwrap().border_width, 2.0);
}
