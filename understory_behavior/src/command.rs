// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Commands bound to clickable elements.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use understory_bindable::{Handlers, SubscriptionId};

/// An action an element invokes when clicked.
///
/// A command may refuse to run; elements bound to it mirror that refusal in
/// their enabled state and absorb clicks while it lasts.
pub trait Command {
    /// Returns `true` if the command can run with `parameter`.
    fn can_execute(&self, parameter: &CommandParameter) -> bool;

    /// Runs the command.
    fn execute(&self, parameter: &CommandParameter);

    /// Subscribes to "can execute may have changed" notifications.
    fn subscribe_can_execute_changed(&self, handler: Rc<dyn Fn(&())>) -> SubscriptionId;

    /// Removes a subscription made with
    /// [`subscribe_can_execute_changed`](Self::subscribe_can_execute_changed).
    fn unsubscribe_can_execute_changed(&self, id: SubscriptionId) -> bool;
}

/// An opaque, shared command argument.
///
/// Compares by identity, so assigning a clone of the current parameter is not
/// a change.
#[derive(Clone, Default)]
pub struct CommandParameter(Option<Rc<dyn Any>>);

impl CommandParameter {
    /// Wraps `value`.
    #[must_use]
    pub fn new<T: Any>(value: T) -> Self {
        Self(Some(Rc::new(value)))
    }

    /// The absent parameter.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// Returns `true` if no parameter is bound.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the parameter if it has type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_deref()?.downcast_ref()
    }
}

impl PartialEq for CommandParameter {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for CommandParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("CommandParameter(None)"),
            Some(value) => write!(f, "CommandParameter({:p})", Rc::as_ptr(value)),
        }
    }
}

/// A nullable, shared command handle that compares by identity.
#[derive(Clone, Default)]
pub struct CommandRef(Option<Rc<dyn Command>>);

impl CommandRef {
    /// Wraps a shared command.
    #[must_use]
    pub fn new(command: Rc<dyn Command>) -> Self {
        Self(Some(command))
    }

    /// No command.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// Returns the bound command.
    #[must_use]
    pub fn get(&self) -> Option<&Rc<dyn Command>> {
        self.0.as_ref()
    }

    /// Returns `true` if no command is bound.
    #[must_use]
    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }
}

impl<C: Command + 'static> From<Rc<C>> for CommandRef {
    fn from(command: Rc<C>) -> Self {
        Self(Some(command))
    }
}

impl PartialEq for CommandRef {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for CommandRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("CommandRef(None)"),
            Some(command) => write!(f, "CommandRef({:p})", Rc::as_ptr(command)),
        }
    }
}

type ExecuteFn = Box<dyn Fn(&CommandParameter)>;
type CanExecuteFn = Box<dyn Fn(&CommandParameter) -> bool>;

/// A [`Command`] built from closures.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use understory_behavior::{Command, CommandParameter, RelayCommand};
///
/// let allowed = Rc::new(Cell::new(false));
/// let gate = allowed.clone();
/// let command = RelayCommand::with_can_execute(|_| {}, move |_| gate.get());
///
/// assert!(!command.can_execute(&CommandParameter::none()));
/// allowed.set(true);
/// command.change_can_execute();
/// assert!(command.can_execute(&CommandParameter::none()));
/// ```
pub struct RelayCommand {
    execute: ExecuteFn,
    can_execute: Option<CanExecuteFn>,
    can_execute_changed: Handlers<()>,
}

impl RelayCommand {
    /// Creates a command that can always execute.
    pub fn new(execute: impl Fn(&CommandParameter) + 'static) -> Self {
        Self {
            execute: Box::new(execute),
            can_execute: None,
            can_execute_changed: Handlers::new(),
        }
    }

    /// Creates a command whose availability is decided by `can_execute`.
    pub fn with_can_execute(
        execute: impl Fn(&CommandParameter) + 'static,
        can_execute: impl Fn(&CommandParameter) -> bool + 'static,
    ) -> Self {
        Self {
            can_execute: Some(Box::new(can_execute)),
            ..Self::new(execute)
        }
    }

    /// Tells subscribers that [`can_execute`](Command::can_execute) may now
    /// answer differently.
    pub fn change_can_execute(&self) {
        self.can_execute_changed.emit(&());
    }
}

impl Command for RelayCommand {
    fn can_execute(&self, parameter: &CommandParameter) -> bool {
        self.can_execute
            .as_ref()
            .is_none_or(|can_execute| can_execute(parameter))
    }

    fn execute(&self, parameter: &CommandParameter) {
        (self.execute)(parameter);
    }

    fn subscribe_can_execute_changed(&self, handler: Rc<dyn Fn(&())>) -> SubscriptionId {
        self.can_execute_changed.subscribe_rc(handler)
    }

    fn unsubscribe_can_execute_changed(&self, id: SubscriptionId) -> bool {
        self.can_execute_changed.unsubscribe(id)
    }
}

impl fmt::Debug for RelayCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayCommand")
            .field("has_can_execute", &self.can_execute.is_some())
            .field("subscribers", &self.can_execute_changed.len())
            .finish_non_exhaustive()
    }
}

/// The element-side end of a command binding.
///
/// An element keeps one slot per command property. When the property changes,
/// the element calls [`release`](Self::release) from its changing hook and
/// [`bind`](Self::bind) from its changed hook, so the old command's listener is
/// gone before the new one is attached.
#[derive(Default)]
pub struct CommandSlot {
    bound: RefCell<Option<(Rc<dyn Command>, SubscriptionId)>>,
}

impl CommandSlot {
    /// Creates an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Detaches from the currently bound command, if any.
    pub fn release(&self) {
        if let Some((command, id)) = self.bound.borrow_mut().take() {
            command.unsubscribe_can_execute_changed(id);
        }
    }

    /// Attaches `on_can_execute_changed` to `command`, replacing any previous
    /// binding.
    pub fn bind(&self, command: &CommandRef, on_can_execute_changed: Rc<dyn Fn(&())>) {
        self.release();
        if let Some(command) = command.get() {
            let id = command.subscribe_can_execute_changed(on_can_execute_changed);
            *self.bound.borrow_mut() = Some((command.clone(), id));
        }
    }

    /// Returns `true` if a command is attached.
    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.bound.borrow().is_some()
    }
}

impl fmt::Debug for CommandSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSlot")
            .field("bound", &self.is_bound())
            .finish()
    }
}
