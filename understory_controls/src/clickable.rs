// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! State and property hooks shared by the clickable controls.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use understory_behavior::{
    ButtonBehavior, ButtonController, ButtonElementManager, ButtonHandler, CommandParameter,
    CommandRef, CommandSlot, ImageController, ImageHandler, VisualState,
};
use understory_bindable::{
    BindableObject, Handlers, PropertyMetadata, PropertyMetadataBuilder, PropertyValue,
    SubscriptionId,
};

use crate::catalog::Catalog;

/// A control that owns a [`ClickState`].
pub(crate) trait Clickable: ButtonController + BindableObject + Sized + 'static {
    fn click_state(&self) -> &ClickState<Self>;

    fn catalog(&self) -> &Catalog;
}

/// Events and bookkeeping behind [`ButtonController`] for one control.
pub(crate) struct ClickState<W> {
    command: CommandSlot,
    command_changed: Handlers<dyn ButtonController>,
    command_changing: Handlers<dyn ButtonController>,
    can_execute_changed: Handlers<dyn ButtonController>,
    pub(crate) clicked: Handlers<W>,
    pub(crate) pressed: Handlers<W>,
    pub(crate) released: Handlers<W>,
    visual_state: Cell<VisualState>,
    behavior: RefCell<Option<ButtonBehavior>>,
    enabled_subscription: Cell<Option<SubscriptionId>>,
}

impl<W: Clickable> ClickState<W> {
    pub(crate) fn new() -> Self {
        Self {
            command: CommandSlot::new(),
            command_changed: Handlers::new(),
            command_changing: Handlers::new(),
            can_execute_changed: Handlers::new(),
            clicked: Handlers::new(),
            pressed: Handlers::new(),
            released: Handlers::new(),
            visual_state: Cell::new(VisualState::Normal),
            behavior: RefCell::new(None),
            enabled_subscription: Cell::new(None),
        }
    }

    /// Wires the button manager to a freshly built control.
    pub(crate) fn attach(element: &Rc<W>) {
        let behavior = ButtonElementManager::init(&**element);
        let state = element.click_state();
        *state.behavior.borrow_mut() = Some(behavior);

        let visual = *element.catalog().visual_element();
        let weak = Rc::downgrade(element);
        let id = element.properties().subscribe(move |change| {
            if !(change.is(visual.is_enabled) || change.is(visual.is_enabled_core)) {
                return;
            }
            if let Some(element) = weak.upgrade() {
                element.change_visual_state(ButtonElementManager::visual_state(&*element));
            }
        });
        state.enabled_subscription.set(Some(id));
        state
            .visual_state
            .set(ButtonElementManager::visual_state(&**element));
    }

    /// Undoes [`attach`](Self::attach) and drops the command binding.
    pub(crate) fn detach(element: &W) {
        let state = element.click_state();
        if let Some(behavior) = state.behavior.borrow_mut().take() {
            ButtonElementManager::dispose(element, behavior);
        }
        if let Some(id) = state.enabled_subscription.take() {
            element.properties().unsubscribe(id);
        }
        state.command.release();
    }

    pub(crate) fn is_attached(&self) -> bool {
        self.behavior.borrow().is_some()
    }

    pub(crate) fn visual_state(&self) -> VisualState {
        self.visual_state.get()
    }

    pub(crate) fn change_visual_state(&self, state: VisualState) {
        if self.visual_state.replace(state) != state {
            tracing::trace!(state = state.name(), "visual state changed");
        }
    }

    pub(crate) fn subscribe_command_changed(&self, handler: ButtonHandler) -> SubscriptionId {
        self.command_changed.subscribe_rc(handler)
    }

    pub(crate) fn unsubscribe_command_changed(&self, id: SubscriptionId) -> bool {
        self.command_changed.unsubscribe(id)
    }

    pub(crate) fn subscribe_command_changing(&self, handler: ButtonHandler) -> SubscriptionId {
        self.command_changing.subscribe_rc(handler)
    }

    pub(crate) fn unsubscribe_command_changing(&self, id: SubscriptionId) -> bool {
        self.command_changing.unsubscribe(id)
    }

    pub(crate) fn subscribe_can_execute_changed(&self, handler: ButtonHandler) -> SubscriptionId {
        self.can_execute_changed.subscribe_rc(handler)
    }

    pub(crate) fn unsubscribe_can_execute_changed(&self, id: SubscriptionId) -> bool {
        self.can_execute_changed.unsubscribe(id)
    }
}

/// Metadata of a `Command` property.
///
/// The changing hook detaches from the old command and raises
/// `CommandChanging`; the changed hook attaches to the new command's
/// can-execute notifications and raises `CommandChanged`.
pub(crate) fn command_metadata<W: Clickable>() -> PropertyMetadata<CommandRef> {
    PropertyMetadataBuilder::new(CommandRef::none())
        .on_changing(|bag, _old, _new| {
            if let Some(element) = bag.owner::<W>() {
                let state = element.click_state();
                state.command.release();
                state.command_changing.emit(&*element);
            }
        })
        .on_changed(|bag, _old, new| {
            let Some(element) = bag.owner::<W>() else {
                return;
            };
            let weak = Rc::downgrade(&element);
            let state = element.click_state();
            state.command.bind(
                new,
                Rc::new(move |_: &()| {
                    if let Some(element) = weak.upgrade() {
                        element.click_state().can_execute_changed.emit(&*element);
                    }
                }),
            );
            state.command_changed.emit(&*element);
        })
        .build()
}

/// Metadata of a `CommandParameter` property; a new parameter re-evaluates
/// whether the command can run.
pub(crate) fn command_parameter_metadata<W: Clickable>() -> PropertyMetadata<CommandParameter> {
    PropertyMetadataBuilder::new(CommandParameter::none())
        .on_changed(|bag, _old, _new| {
            if let Some(element) = bag.owner::<W>() {
                ButtonElementManager::command_can_execute_changed(&*element);
            }
        })
        .build()
}

/// A control that raises image-source events.
pub(crate) trait ImageEventSource: ImageController + Sized + 'static {
    fn image_events(&self) -> &ImageEvents;

    /// Runs after `ImageSourceChanged` has been raised.
    fn source_changed(&self) {}
}

/// `ImageSourceChanging` / `ImageSourceChanged` subscriber lists.
#[derive(Default)]
pub(crate) struct ImageEvents {
    changed: Handlers<dyn ImageController>,
    changing: Handlers<dyn ImageController>,
}

impl ImageEvents {
    pub(crate) fn subscribe_changed(&self, handler: ImageHandler) -> SubscriptionId {
        self.changed.subscribe_rc(handler)
    }

    pub(crate) fn unsubscribe_changed(&self, id: SubscriptionId) -> bool {
        self.changed.unsubscribe(id)
    }

    pub(crate) fn subscribe_changing(&self, handler: ImageHandler) -> SubscriptionId {
        self.changing.subscribe_rc(handler)
    }

    pub(crate) fn unsubscribe_changing(&self, id: SubscriptionId) -> bool {
        self.changing.unsubscribe(id)
    }
}

/// Adds the image-source event hooks to a source property's metadata.
pub(crate) fn image_source_hooks<W: ImageEventSource, T: PropertyValue>(
    builder: PropertyMetadataBuilder<T>,
) -> PropertyMetadataBuilder<T> {
    builder
        .on_changing(|bag, _old, _new| {
            if let Some(element) = bag.owner::<W>() {
                element.image_events().changing.emit(&*element);
            }
        })
        .on_changed(|bag, _old, _new| {
            if let Some(element) = bag.owner::<W>() {
                element.image_events().changed.emit(&*element);
                element.source_changed();
            }
        })
}
