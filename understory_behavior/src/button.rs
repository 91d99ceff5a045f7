// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Press, release and click behavior for anything clickable.
//!
//! [`ButtonController`] is the capability a widget implements; the
//! [`ButtonElementManager`] functions hold the shared logic and keep no state of
//! their own.

use std::rc::Rc;

use understory_bindable::SubscriptionId;

use crate::command::{CommandParameter, CommandRef};

/// Handler for button capability events; receives the sender.
pub type ButtonHandler = Rc<dyn Fn(&(dyn ButtonController + 'static))>;

/// Named visual states of a clickable element.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum VisualState {
    /// Enabled and not pressed.
    Normal,
    /// Enabled and pressed.
    Pressed,
    /// Not enabled.
    Disabled,
}

impl VisualState {
    /// Returns the state's name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Pressed => "Pressed",
            Self::Disabled => "Disabled",
        }
    }
}

/// The capability of being pressed, released and clicked.
///
/// Implementors delegate every member to their own property bag and event
/// lists.
pub trait ButtonController {
    /// The effective enabled state: the user-facing flag combined with the
    /// command-driven one.
    fn is_enabled(&self) -> bool;

    /// Sets the command-driven part of the enabled state.
    fn set_is_enabled_core(&self, enabled: bool);

    /// The bound command.
    fn command(&self) -> CommandRef;

    /// The bound command parameter.
    fn command_parameter(&self) -> CommandParameter;

    /// Whether the element is currently pressed.
    fn is_pressed(&self) -> bool;

    /// Writes the read-only pressed state.
    fn set_is_pressed(&self, pressed: bool);

    /// Raises the element's public `Clicked` event.
    fn propagate_up_clicked(&self);

    /// Raises the element's public `Pressed` event.
    fn propagate_up_pressed(&self);

    /// Raises the element's public `Released` event.
    fn propagate_up_released(&self);

    /// Subscribes to command changes, raised after the new command is stored.
    fn subscribe_command_changed(&self, handler: ButtonHandler) -> SubscriptionId;

    /// Removes a command-changed subscription.
    fn unsubscribe_command_changed(&self, id: SubscriptionId) -> bool;

    /// Subscribes to command changes, raised before the new command is stored.
    fn subscribe_command_changing(&self, handler: ButtonHandler) -> SubscriptionId;

    /// Removes a command-changing subscription.
    fn unsubscribe_command_changing(&self, id: SubscriptionId) -> bool;

    /// Subscribes to can-execute changes of the bound command.
    fn subscribe_command_can_execute_changed(&self, handler: ButtonHandler) -> SubscriptionId;

    /// Removes a can-execute-changed subscription.
    fn unsubscribe_command_can_execute_changed(&self, id: SubscriptionId) -> bool;

    /// Moves the element to a visual state.
    fn change_visual_state(&self, state: VisualState);
}

/// Subscriptions made by [`ButtonElementManager::init`].
///
/// Hand it back to [`ButtonElementManager::dispose`] when the element is torn
/// down.
#[must_use = "dropping the token leaks the manager's subscriptions"]
#[derive(Debug, PartialEq, Eq)]
pub struct ButtonBehavior {
    command_changed: SubscriptionId,
    can_execute_changed: SubscriptionId,
}

/// Shared press/release/click logic.
///
/// All functions take the element as `&dyn ButtonController`; state lives in
/// the element.
///
/// # Example
///
/// ```rust
/// use understory_behavior::{ButtonElementManager, VisualState};
/// # use std::cell::Cell;
/// # use understory_behavior::{ButtonController, ButtonHandler, CommandParameter, CommandRef};
/// # use understory_bindable::{Handlers, SubscriptionId};
/// # #[derive(Default)]
/// # struct Plain { pressed: Cell<bool>, clicks: Cell<u32>, changed: Handlers<dyn ButtonController>, can: Handlers<dyn ButtonController> }
/// # impl ButtonController for Plain {
/// #     fn is_enabled(&self) -> bool { true }
/// #     fn set_is_enabled_core(&self, _: bool) {}
/// #     fn command(&self) -> CommandRef { CommandRef::none() }
/// #     fn command_parameter(&self) -> CommandParameter { CommandParameter::none() }
/// #     fn is_pressed(&self) -> bool { self.pressed.get() }
/// #     fn set_is_pressed(&self, p: bool) { self.pressed.set(p) }
/// #     fn propagate_up_clicked(&self) { self.clicks.set(self.clicks.get() + 1) }
/// #     fn propagate_up_pressed(&self) {}
/// #     fn propagate_up_released(&self) {}
/// #     fn subscribe_command_changed(&self, h: ButtonHandler) -> SubscriptionId { self.changed.subscribe_rc(h) }
/// #     fn unsubscribe_command_changed(&self, id: SubscriptionId) -> bool { self.changed.unsubscribe(id) }
/// #     fn subscribe_command_changing(&self, h: ButtonHandler) -> SubscriptionId { self.changed.subscribe_rc(h) }
/// #     fn unsubscribe_command_changing(&self, id: SubscriptionId) -> bool { self.changed.unsubscribe(id) }
/// #     fn subscribe_command_can_execute_changed(&self, h: ButtonHandler) -> SubscriptionId { self.can.subscribe_rc(h) }
/// #     fn unsubscribe_command_can_execute_changed(&self, id: SubscriptionId) -> bool { self.can.unsubscribe(id) }
/// #     fn change_visual_state(&self, _: VisualState) {}
/// # }
/// let button = Plain::default();
/// let behavior = ButtonElementManager::init(&button);
///
/// ButtonElementManager::send_pressed(&button);
/// assert_eq!(ButtonElementManager::visual_state(&button), VisualState::Pressed);
/// ButtonElementManager::send_released(&button);
/// ButtonElementManager::send_clicked(&button);
/// assert_eq!(button.clicks.get(), 1);
///
/// ButtonElementManager::dispose(&button, behavior);
/// ```
#[derive(Copy, Clone, Debug)]
pub struct ButtonElementManager;

impl ButtonElementManager {
    /// Wires the manager to `element`.
    ///
    /// Call once per element. The enabled state is evaluated against the
    /// currently bound command immediately.
    pub fn init(element: &dyn ButtonController) -> ButtonBehavior {
        let command_changed = element.subscribe_command_changed(Rc::new(Self::on_command_changed));
        let can_execute_changed =
            element.subscribe_command_can_execute_changed(Rc::new(Self::on_can_execute_changed));
        Self::command_can_execute_changed(element);
        ButtonBehavior {
            command_changed,
            can_execute_changed,
        }
    }

    /// Removes the subscriptions made by [`init`](Self::init).
    pub fn dispose(element: &dyn ButtonController, behavior: ButtonBehavior) {
        element.unsubscribe_command_changed(behavior.command_changed);
        element.unsubscribe_command_can_execute_changed(behavior.can_execute_changed);
    }

    /// Handles a press: sets the pressed state and raises `Pressed`.
    ///
    /// Ignored while the element is disabled.
    pub fn send_pressed(element: &dyn ButtonController) {
        if !element.is_enabled() {
            return;
        }
        element.set_is_pressed(true);
        element.change_visual_state(Self::visual_state(element));
        element.propagate_up_pressed();
    }

    /// Handles a release: clears the pressed state and raises `Released`.
    ///
    /// Ignored while the element is disabled.
    pub fn send_released(element: &dyn ButtonController) {
        if !element.is_enabled() {
            return;
        }
        element.set_is_pressed(false);
        element.change_visual_state(Self::visual_state(element));
        element.propagate_up_released();
    }

    /// Handles a click.
    ///
    /// A disabled element, or one whose bound command refuses to execute,
    /// absorbs the click: no command runs and `Clicked` is not raised.
    pub fn send_clicked(element: &dyn ButtonController) {
        if !element.is_enabled() {
            return;
        }
        let command = element.command();
        if let Some(command) = command.get() {
            let parameter = element.command_parameter();
            if !command.can_execute(&parameter) {
                tracing::trace!("click absorbed by a command that cannot execute");
                return;
            }
            command.execute(&parameter);
        }
        element.propagate_up_clicked();
    }

    /// Re-evaluates the command-driven enabled state.
    ///
    /// With no command bound the element is enabled as far as commands are
    /// concerned.
    pub fn command_can_execute_changed(element: &dyn ButtonController) {
        let enabled = match element.command().get() {
            Some(command) => command.can_execute(&element.command_parameter()),
            None => true,
        };
        element.set_is_enabled_core(enabled);
    }

    /// Computes the visual state from the enabled and pressed states.
    #[must_use]
    pub fn visual_state(element: &dyn ButtonController) -> VisualState {
        if !element.is_enabled() {
            VisualState::Disabled
        } else if element.is_pressed() {
            VisualState::Pressed
        } else {
            VisualState::Normal
        }
    }

    fn on_command_changed(element: &(dyn ButtonController + 'static)) {
        Self::command_can_execute_changed(element);
    }

    fn on_can_execute_changed(element: &(dyn ButtonController + 'static)) {
        Self::command_can_execute_changed(element);
    }
}
