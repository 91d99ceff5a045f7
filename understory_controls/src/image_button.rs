// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A clickable control that shows only an image.

use std::fmt;
use std::rc::Rc;

use peniko::Color;
use understory_behavior::{
    Aspect, BorderController, ButtonController, ButtonElementManager, ButtonHandler,
    CommandParameter, CommandRef, ImageController, ImageHandler, ImageSource, VisualState,
};
use understory_bindable::{
    BindableObject, Handlers, Property, PropertyBag, PropertyError, PropertyId, PropertyKey,
    PropertyMetadata, PropertyMetadataBuilder, PropertyRegistry, SubscriptionId,
};

use crate::button::DEFAULT_CORNER_RADIUS;
use crate::catalog::Catalog;
use crate::clickable::{
    ClickState, Clickable, ImageEventSource, ImageEvents, command_metadata,
    command_parameter_metadata, image_source_hooks,
};
use crate::visual_element::{assign, assign_with_key};

/// Properties of [`ImageButton`].
#[derive(Copy, Clone, Debug)]
pub struct ImageButtonProperties {
    /// The image. Default none.
    pub source: Property<Option<ImageSource>>,
    /// Scaling mode. Default [`Aspect::AspectFit`].
    pub aspect: Property<Aspect>,
    /// Opacity hint. Default `false`.
    pub is_opaque: Property<bool>,
    /// Whether the image is being resolved. Read-only.
    pub is_loading: Property<bool>,
    is_loading_key: PropertyKey<bool>,
    /// Whether the button is held down. Read-only.
    pub is_pressed: Property<bool>,
    is_pressed_key: PropertyKey<bool>,
    /// Command run on click. Default none.
    pub command: Property<CommandRef>,
    /// Argument passed to the command. Default none.
    pub command_parameter: Property<CommandParameter>,
    /// Corner radius; `-1` means the platform radius.
    pub corner_radius: Property<i32>,
    /// Border width; `-1` means the platform width.
    pub border_width: Property<f64>,
}

impl ImageButtonProperties {
    pub(crate) fn register(registry: &mut PropertyRegistry) -> Result<Self, PropertyError> {
        let (is_loading, is_loading_key) = registry.register_read_only(
            "ImageButton",
            "IsLoading",
            PropertyMetadata::new(false),
        )?;
        let (is_pressed, is_pressed_key) = registry.register_read_only(
            "ImageButton",
            "IsPressed",
            PropertyMetadata::new(false),
        )?;
        Ok(Self {
            source: registry.register(
                "ImageButton",
                "Source",
                image_source_hooks::<ImageButton, _>(
                    PropertyMetadataBuilder::<Option<ImageSource>>::new(None),
                )
                .build(),
            )?,
            aspect: registry.register("ImageButton", "Aspect", PropertyMetadata::new(Aspect::AspectFit))?,
            is_opaque: registry.register("ImageButton", "IsOpaque", PropertyMetadata::new(false))?,
            is_loading,
            is_loading_key,
            is_pressed,
            is_pressed_key,
            command: registry.register("ImageButton", "Command", command_metadata::<ImageButton>())?,
            command_parameter: registry.register(
                "ImageButton",
                "CommandParameter",
                command_parameter_metadata::<ImageButton>(),
            )?,
            corner_radius: registry.register(
                "ImageButton",
                "CornerRadius",
                PropertyMetadata::new(DEFAULT_CORNER_RADIUS),
            )?,
            border_width: registry.register("ImageButton", "BorderWidth", PropertyMetadata::new(-1.0))?,
        })
    }
}

/// A clickable image.
///
/// Shares its press and command behavior with [`Button`](crate::Button)
/// through [`ButtonElementManager`], and its image loading with any other
/// [`ImageController`].
pub struct ImageButton {
    properties: PropertyBag,
    catalog: Rc<Catalog>,
    click: ClickState<ImageButton>,
    image_events: ImageEvents,
    measure_invalidated: Handlers<ImageButton>,
}

impl ImageButton {
    /// Creates an image button and wires its press and command behavior.
    #[must_use]
    pub fn new(catalog: &Rc<Catalog>) -> Rc<Self> {
        let button = Rc::new_cyclic(|this| Self {
            properties: PropertyBag::with_owner(catalog.registry().clone(), this.clone()),
            catalog: catalog.clone(),
            click: ClickState::new(),
            image_events: ImageEvents::default(),
            measure_invalidated: Handlers::new(),
        });
        ClickState::attach(&button);
        button
    }

    /// Detaches the press and command behavior.
    pub fn dispose(&self) {
        ClickState::detach(self);
    }

    /// Returns `true` after [`dispose`](Self::dispose).
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        !self.click.is_attached()
    }

    fn props(&self) -> &ImageButtonProperties {
        self.catalog.image_button()
    }

    /// Sets the image.
    pub fn set_source(&self, source: Option<ImageSource>) {
        assign(&self.properties, self.props().source, source);
    }

    /// Sets the scaling mode.
    pub fn set_aspect(&self, aspect: Aspect) {
        assign(&self.properties, self.props().aspect, aspect);
    }

    /// Sets the opacity hint.
    pub fn set_is_opaque(&self, opaque: bool) {
        assign(&self.properties, self.props().is_opaque, opaque);
    }

    /// Whether the image is being resolved.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.properties.get(self.props().is_loading)
    }

    /// The corner radius; `-1` means the platform radius.
    #[must_use]
    pub fn corner_radius(&self) -> i32 {
        self.properties.get(self.props().corner_radius)
    }

    /// Sets the corner radius.
    pub fn set_corner_radius(&self, radius: i32) {
        assign(&self.properties, self.props().corner_radius, radius);
    }

    /// Sets the border width.
    pub fn set_border_width(&self, width: f64) {
        assign(&self.properties, self.props().border_width, width);
    }

    /// Sets the border colour.
    pub fn set_border_color(&self, color: Option<Color>) {
        assign(&self.properties, self.catalog.border_element().border_color, color);
    }

    /// Sets the background colour.
    pub fn set_background_color(&self, color: Option<Color>) {
        assign(&self.properties, self.catalog.visual_element().background_color, color);
    }

    /// Sets the user-controlled enabled flag.
    pub fn set_is_enabled(&self, enabled: bool) {
        assign(&self.properties, self.catalog.visual_element().is_enabled, enabled);
    }

    /// Binds a command.
    pub fn set_command(&self, command: CommandRef) {
        assign(&self.properties, self.props().command, command);
    }

    /// Sets the argument passed to the command.
    pub fn set_command_parameter(&self, parameter: CommandParameter) {
        assign(&self.properties, self.props().command_parameter, parameter);
    }

    /// The current visual state.
    #[must_use]
    pub fn visual_state(&self) -> VisualState {
        self.click.visual_state()
    }

    /// Raised after a click that was not absorbed.
    #[must_use]
    pub fn clicked(&self) -> &Handlers<ImageButton> {
        &self.click.clicked
    }

    /// Raised when the button is pressed.
    #[must_use]
    pub fn pressed(&self) -> &Handlers<ImageButton> {
        &self.click.pressed
    }

    /// Raised when the button is released.
    #[must_use]
    pub fn released(&self) -> &Handlers<ImageButton> {
        &self.click.released
    }

    /// Raised when the loaded image changes the button's natural size.
    #[must_use]
    pub fn measure_invalidated(&self) -> &Handlers<ImageButton> {
        &self.measure_invalidated
    }

    /// Feeds a native press.
    pub fn send_pressed(&self) {
        ButtonElementManager::send_pressed(self);
    }

    /// Feeds a native release.
    pub fn send_released(&self) {
        ButtonElementManager::send_released(self);
    }

    /// Feeds a native click.
    pub fn send_clicked(&self) {
        ButtonElementManager::send_clicked(self);
    }
}

impl fmt::Debug for ImageButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageButton")
            .field("source", &self.source())
            .field("is_loading", &self.is_loading())
            .field("visual_state", &self.visual_state())
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

impl BindableObject for ImageButton {
    fn properties(&self) -> &PropertyBag {
        &self.properties
    }
}

impl Clickable for ImageButton {
    fn click_state(&self) -> &ClickState<Self> {
        &self.click
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl ButtonController for ImageButton {
    fn is_enabled(&self) -> bool {
        let visual = self.catalog.visual_element();
        self.properties.get(visual.is_enabled) && self.properties.get(visual.is_enabled_core)
    }

    fn set_is_enabled_core(&self, enabled: bool) {
        let key = self.catalog.visual_element().is_enabled_core_key;
        assign_with_key(&self.properties, key, enabled);
    }

    fn command(&self) -> CommandRef {
        self.properties.get(self.props().command)
    }

    fn command_parameter(&self) -> CommandParameter {
        self.properties.get(self.props().command_parameter)
    }

    fn is_pressed(&self) -> bool {
        self.properties.get(self.props().is_pressed)
    }

    fn set_is_pressed(&self, pressed: bool) {
        assign_with_key(&self.properties, self.props().is_pressed_key, pressed);
    }

    fn propagate_up_clicked(&self) {
        self.click.clicked.emit(self);
    }

    fn propagate_up_pressed(&self) {
        self.click.pressed.emit(self);
    }

    fn propagate_up_released(&self) {
        self.click.released.emit(self);
    }

    fn subscribe_command_changed(&self, handler: ButtonHandler) -> SubscriptionId {
        self.click.subscribe_command_changed(handler)
    }

    fn unsubscribe_command_changed(&self, id: SubscriptionId) -> bool {
        self.click.unsubscribe_command_changed(id)
    }

    fn subscribe_command_changing(&self, handler: ButtonHandler) -> SubscriptionId {
        self.click.subscribe_command_changing(handler)
    }

    fn unsubscribe_command_changing(&self, id: SubscriptionId) -> bool {
        self.click.unsubscribe_command_changing(id)
    }

    fn subscribe_command_can_execute_changed(&self, handler: ButtonHandler) -> SubscriptionId {
        self.click.subscribe_can_execute_changed(handler)
    }

    fn unsubscribe_command_can_execute_changed(&self, id: SubscriptionId) -> bool {
        self.click.unsubscribe_can_execute_changed(id)
    }

    fn change_visual_state(&self, state: VisualState) {
        self.click.change_visual_state(state);
    }
}

impl ImageController for ImageButton {
    fn source(&self) -> Option<ImageSource> {
        self.properties.get(self.props().source)
    }

    fn aspect(&self) -> Aspect {
        self.properties.get(self.props().aspect)
    }

    fn is_opaque(&self) -> bool {
        self.properties.get(self.props().is_opaque)
    }

    fn set_is_loading(&self, loading: bool) {
        assign_with_key(&self.properties, self.props().is_loading_key, loading);
    }

    fn native_size_changed(&self) {
        self.measure_invalidated.emit(self);
    }

    fn subscribe_image_source_changed(&self, handler: ImageHandler) -> SubscriptionId {
        self.image_events.subscribe_changed(handler)
    }

    fn unsubscribe_image_source_changed(&self, id: SubscriptionId) -> bool {
        self.image_events.unsubscribe_changed(id)
    }

    fn subscribe_image_source_changing(&self, handler: ImageHandler) -> SubscriptionId {
        self.image_events.subscribe_changing(handler)
    }

    fn unsubscribe_image_source_changing(&self, id: SubscriptionId) -> bool {
        self.image_events.unsubscribe_changing(id)
    }

    fn source_property(&self) -> Option<PropertyId> {
        Some(self.props().source.id())
    }

    fn aspect_property(&self) -> Option<PropertyId> {
        Some(self.props().aspect.id())
    }

    fn is_opaque_property(&self) -> Option<PropertyId> {
        Some(self.props().is_opaque.id())
    }
}

impl ImageEventSource for ImageButton {
    fn image_events(&self) -> &ImageEvents {
        &self.image_events
    }
}

impl BorderController for ImageButton {
    fn corner_radius_property(&self) -> Property<i32> {
        self.props().corner_radius
    }

    fn border_color_property(&self) -> Property<Option<Color>> {
        self.catalog.border_element().border_color
    }

    fn border_width_property(&self) -> Property<f64> {
        self.props().border_width
    }

    fn background_color_property(&self) -> Property<Option<Color>> {
        self.catalog.visual_element().background_color
    }
}
