// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tests for `BorderBackgroundManager` driven by real `Button`s.

mod common;

use std::rc::Rc;

use kurbo::{Insets, RoundedRectRadii, Vec2};
use peniko::Color;
use understory_behavior::PLATFORM_CORNER_RADIUS;
use understory_bindable::BindableObject;
use understory_controls::{Button, Catalog, CatalogOptions};
use understory_renderer::{
    Background, BorderBackgroundManager, BorderOptions, NativeHandle, RendererBinding, Shadow,
};

use common::FakeHandle;

fn red() -> Color {
    Color::from_rgba8(255, 0, 0, 255)
}

struct Harness {
    catalog: Rc<Catalog>,
    handle: Rc<FakeHandle>,
    binding: Rc<RendererBinding<Button>>,
    manager: Rc<BorderBackgroundManager<Button>>,
}

fn harness(options: BorderOptions) -> Harness {
    let catalog = Catalog::new(CatalogOptions::default()).unwrap();
    let handle = FakeHandle::with_platform_background();
    let binding = RendererBinding::new();
    let manager = BorderBackgroundManager::new(&binding, handle.clone(), options);
    Harness {
        catalog,
        handle,
        binding,
        manager,
    }
}

impl Harness {
    fn bind(&self) -> Rc<Button> {
        let button = Button::new(&self.catalog);
        self.binding.set_element(Some(button.clone()));
        button
    }
}

#[test]
fn default_button_keeps_the_platform_background() {
    let h = harness(BorderOptions::new());
    let button = h.bind();
    button.set_text("OK");
    button.set_corner_radius(-1);
    button.set_border_width(-1.0);

    assert!(!h.manager.is_drawable_enabled());
    assert!(h.manager.drawable().is_none());
    assert_eq!(h.handle.writes(), 0);
}

#[test]
fn platform_corner_radius_is_not_a_customisation() {
    let h = harness(BorderOptions::new());
    let button = h.bind();
    button.set_corner_radius(PLATFORM_CORNER_RADIUS);
    assert!(!h.manager.is_drawable_enabled());
    assert_eq!(h.handle.background_writes.get(), 0);
}

#[test]
fn customising_installs_a_ripple_and_reverting_restores_the_original() {
    let h = harness(BorderOptions::new());
    let original = h.handle.background();
    let button = h.bind();

    button.set_background_color(Some(red()));
    assert!(h.manager.is_drawable_enabled());
    let installed = h.handle.background().unwrap();
    assert!(matches!(installed, Background::Ripple(_)));
    let drawable = installed.border().unwrap().clone();
    assert_eq!(drawable.background, red());
    assert!(Rc::ptr_eq(&drawable, &h.manager.drawable().unwrap()));
    assert_eq!(h.handle.invalidations.get(), 1);

    button.set_background_color(None);
    assert!(!h.manager.is_drawable_enabled());
    assert!(h.manager.drawable().is_none());
    assert_eq!(h.handle.background(), original);
    assert_eq!(h.handle.background_writes.get(), 2);
}

#[test]
fn each_change_rebuilds_from_scratch() {
    let h = harness(BorderOptions::new().with_ripple(false).with_scale(2.0));
    let button = h.bind();

    button.set_corner_radius(12);
    let first = h.manager.drawable().unwrap();
    assert_eq!(first.corner_radii, RoundedRectRadii::from_single_radius(24.0));
    assert!(matches!(h.handle.background(), Some(Background::Border(_))));

    button.set_border_width(1.5);
    let second = h.manager.drawable().unwrap();
    assert!(!Rc::ptr_eq(&first, &second));
    assert_eq!(second.border_width, 3.0);
    assert_eq!(second.corner_radii, first.corner_radii);

    // Unrelated properties leave the drawable alone.
    button.set_text("Go");
    assert!(Rc::ptr_eq(&second, &h.manager.drawable().unwrap()));
}

#[test]
fn deprecated_border_radius_reaches_the_drawable() {
    let h = harness(BorderOptions::new().with_ripple(false));
    let button = h.bind();
    button.set_border_radius(8);
    assert_eq!(button.corner_radius(), 8);
    assert_eq!(
        h.manager.drawable().unwrap().corner_radii,
        RoundedRectRadii::from_single_radius(8.0)
    );
}

#[test]
fn padding_and_shadow_follow_the_element() {
    let shadow = Shadow {
        offset: Vec2::new(2.0, 2.0),
        radius: 5.0,
        color: Color::from_rgba8(0, 0, 0, 64),
    };
    let h = harness(BorderOptions::new().with_shadow(Some(shadow)));
    h.handle.padding.set(Insets::new(16.0, 6.0, 12.0, 10.0));
    let button = h.bind();

    button.set_background_color(Some(red()));
    let drawable = h.manager.drawable().unwrap();
    assert_eq!(drawable.padding, Insets::ZERO);
    assert_eq!(drawable.shadow, Some(shadow));

    button.set_use_default_padding(true);
    button.set_use_default_shadow(true);
    let drawable = h.manager.drawable().unwrap();
    assert_eq!(drawable.padding, Insets::new(16.0, 6.0, 16.0, 6.0));
    assert_eq!(drawable.shadow.map(|s| (s.offset, s.radius)), Some((Vec2::new(0.0, 4.0), 2.0)));
}

#[test]
fn binding_an_element_adopts_its_border() {
    let catalog = Catalog::new(CatalogOptions::default()).unwrap();
    let handle = FakeHandle::with_platform_background();
    let binding = RendererBinding::new();
    let button = Button::new(&catalog);
    button.set_border_color(Some(red()));
    binding.set_element(Some(button.clone()));

    // The manager picks up an element bound before it was created.
    let manager = BorderBackgroundManager::new(&binding, handle.clone(), BorderOptions::new());
    assert_eq!(manager.drawable().unwrap().border_color, Some(red()));
}

#[test]
fn rebinding_follows_only_the_new_element() {
    let h = harness(BorderOptions::new());
    let original = h.handle.background();
    let old = h.bind();
    old.set_background_color(Some(red()));
    assert!(h.manager.is_drawable_enabled());

    let new = h.bind();
    assert!(!h.manager.is_drawable_enabled());
    assert_eq!(h.handle.background(), original);

    let writes = h.handle.background_writes.get();
    old.set_corner_radius(20);
    assert_eq!(h.handle.background_writes.get(), writes);
    new.set_corner_radius(20);
    assert_eq!(h.handle.background_writes.get(), writes + 1);
}

#[test]
fn dispose_releases_everything() {
    let h = harness(BorderOptions::new());
    let button = h.bind();
    button.set_background_color(Some(red()));
    let subscribers = button.properties().subscriber_count();

    h.manager.dispose();
    assert!(h.manager.is_disposed());
    assert!(h.manager.drawable().is_none());
    assert_eq!(button.properties().subscriber_count(), subscribers - 1);

    let writes = h.handle.writes();
    button.set_corner_radius(30);
    button.set_background_color(None);
    h.binding.set_element(Some(Button::new(&h.catalog)));
    h.manager.rebuild();
    assert_eq!(h.handle.writes(), writes);
    h.manager.dispose();
}
