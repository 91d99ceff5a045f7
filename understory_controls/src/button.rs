// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A clickable control with text and an optional image.

use std::fmt;
use std::rc::Rc;

use peniko::Color;
use understory_behavior::{
    Aspect, BorderController, ButtonController, ButtonElementManager, ButtonHandler,
    CommandParameter, CommandRef, ImageController, ImageHandler, ImageSource, VisualState,
};
use understory_bindable::{
    BindableObject, Handlers, Property, PropertyBag, PropertyError, PropertyId, PropertyKey,
    PropertyMetadata, PropertyMetadataBuilder, PropertyRegistry, PropertyValue, SubscriptionId,
};

use crate::catalog::{Catalog, CatalogOptions};
use crate::clickable::{
    ClickState, Clickable, ImageEventSource, ImageEvents, command_metadata,
    command_parameter_metadata, image_source_hooks,
};
use crate::content_layout::ButtonContentLayout;
use crate::visual_element::{assign, assign_with_key};

/// `BorderRadius` value meaning "not customised".
pub const DEFAULT_BORDER_RADIUS: i32 = 5;

/// `CornerRadius` value meaning "not customised".
pub const DEFAULT_CORNER_RADIUS: i32 = -1;

/// Properties of [`Button`].
#[derive(Copy, Clone, Debug)]
pub struct ButtonProperties {
    /// Caption. Default empty.
    pub text: Property<String>,
    /// Image shown next to the caption. Default none.
    pub image: Property<Option<ImageSource>>,
    /// Placement of the image. Default `Left, 10`.
    pub content_layout: Property<ButtonContentLayout>,
    /// Font size. Defaults to the platform size from [`CatalogOptions`].
    pub font_size: Property<f64>,
    /// Border width; `-1` means the platform width.
    pub border_width: Property<f64>,
    /// Legacy corner radius, kept in step with
    /// [`corner_radius`](Self::corner_radius). Default `5`.
    pub border_radius: Property<i32>,
    /// Corner radius; `-1` means the platform radius.
    pub corner_radius: Property<i32>,
    /// Command run on click. Default none.
    pub command: Property<CommandRef>,
    /// Argument passed to the command. Default none.
    pub command_parameter: Property<CommandParameter>,
    /// Whether the button is held down. Read-only.
    pub is_pressed: Property<bool>,
    is_pressed_key: PropertyKey<bool>,
    /// Whether the platform padding is kept. Default `false`.
    pub use_default_padding: Property<bool>,
    /// Whether the platform shadow is kept. Default `false`.
    pub use_default_shadow: Property<bool>,
}

impl ButtonProperties {
    pub(crate) fn register(
        registry: &mut PropertyRegistry,
        options: &CatalogOptions,
    ) -> Result<Self, PropertyError> {
        let platform_font_size = options.platform_font_size;
        let (is_pressed, is_pressed_key) =
            registry.register_read_only("Button", "IsPressed", PropertyMetadata::new(false))?;

        let properties = Self {
            text: registry.register("Button", "Text", invalidates_measure(String::new()))?,
            image: registry.register(
                "Button",
                "Image",
                image_source_hooks::<Button, _>(PropertyMetadataBuilder::<Option<ImageSource>>::new(
                    None,
                ))
                .build(),
            )?,
            content_layout: registry.register(
                "Button",
                "ContentLayout",
                invalidates_measure(ButtonContentLayout::default()),
            )?,
            font_size: registry.register(
                "Button",
                "FontSize",
                PropertyMetadataBuilder::with_factory(move |_| platform_font_size)
                    .cache_default(true)
                    .validate(|size: &f64| *size >= 0.0)
                    .on_changed(|bag, _, _| invalidate_measure(bag))
                    .build(),
            )?,
            border_width: registry.register("Button", "BorderWidth", PropertyMetadata::new(-1.0))?,
            border_radius: registry.register(
                "Button",
                "BorderRadius",
                PropertyMetadata::new(DEFAULT_BORDER_RADIUS),
            )?,
            corner_radius: registry.register(
                "Button",
                "CornerRadius",
                PropertyMetadata::new(DEFAULT_CORNER_RADIUS),
            )?,
            command: registry.register("Button", "Command", command_metadata::<Button>())?,
            command_parameter: registry.register(
                "Button",
                "CommandParameter",
                command_parameter_metadata::<Button>(),
            )?,
            is_pressed,
            is_pressed_key,
            use_default_padding: registry.register(
                "Button",
                "UseDefaultPadding",
                PropertyMetadata::new(false),
            )?,
            use_default_shadow: registry.register(
                "Button",
                "UseDefaultShadow",
                PropertyMetadata::new(false),
            )?,
        };

        // Each radius's "not customised" value maps onto the other's.
        registry.mirror(properties.border_radius, properties.corner_radius, |radius| {
            if *radius == DEFAULT_BORDER_RADIUS {
                DEFAULT_CORNER_RADIUS
            } else {
                *radius
            }
        });
        registry.mirror(properties.corner_radius, properties.border_radius, |radius| {
            if *radius == DEFAULT_CORNER_RADIUS {
                DEFAULT_BORDER_RADIUS
            } else {
                *radius
            }
        });

        Ok(properties)
    }
}

fn invalidates_measure<T: PropertyValue>(default: T) -> PropertyMetadata<T> {
    PropertyMetadataBuilder::new(default)
        .on_changed(|bag, _, _| invalidate_measure(bag))
        .build()
}

fn invalidate_measure(bag: &PropertyBag) {
    if let Some(button) = bag.owner::<Button>() {
        button.measure_invalidated.emit(&button);
    }
}

/// A clickable control with a caption and an optional image.
///
/// Press, release and click handling, command gating and visual states come
/// from [`ButtonElementManager`]; the button only stores state and raises
/// events.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use understory_behavior::{CommandRef, RelayCommand};
/// use understory_controls::{Button, Catalog, CatalogOptions};
///
/// let catalog = Catalog::new(CatalogOptions::default()).unwrap();
/// let button = Button::new(&catalog);
///
/// let runs = Rc::new(Cell::new(0));
/// let counter = runs.clone();
/// button.set_command(CommandRef::from(Rc::new(RelayCommand::new(move |_| {
///     counter.set(counter.get() + 1);
/// }))));
///
/// button.send_clicked();
/// assert_eq!(runs.get(), 1);
///
/// button.set_border_radius(5);
/// assert_eq!(button.corner_radius(), -1);
/// ```
pub struct Button {
    properties: PropertyBag,
    catalog: Rc<Catalog>,
    click: ClickState<Button>,
    image_events: ImageEvents,
    measure_invalidated: Handlers<Button>,
}

impl Button {
    /// Creates a button and wires its press and command behavior.
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
    ///
    /// The button keeps its values but no longer follows its command.
    pub fn dispose(&self) {
        ClickState::detach(self);
    }

    /// Returns `true` after [`dispose`](Self::dispose).
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        !self.click.is_attached()
    }

    fn props(&self) -> &ButtonProperties {
        self.catalog.button()
    }

    /// The caption.
    #[must_use]
    pub fn text(&self) -> String {
        self.properties.get(self.props().text)
    }

    /// Sets the caption.
    pub fn set_text(&self, text: impl Into<String>) {
        assign(&self.properties, self.props().text, text.into());
    }

    /// The image shown next to the caption.
    #[must_use]
    pub fn image(&self) -> Option<ImageSource> {
        self.properties.get(self.props().image)
    }

    /// Sets the image.
    pub fn set_image(&self, image: Option<ImageSource>) {
        assign(&self.properties, self.props().image, image);
    }

    /// Placement of the image relative to the caption.
    #[must_use]
    pub fn content_layout(&self) -> ButtonContentLayout {
        self.properties.get(self.props().content_layout)
    }

    /// Sets the image placement.
    pub fn set_content_layout(&self, layout: ButtonContentLayout) {
        assign(&self.properties, self.props().content_layout, layout);
    }

    /// The font size.
    #[must_use]
    pub fn font_size(&self) -> f64 {
        self.properties.get(self.props().font_size)
    }

    /// Sets the font size.
    ///
    /// # Errors
    ///
    /// Returns [`PropertyError::InvalidValue`] for negative or NaN sizes.
    pub fn set_font_size(&self, size: f64) -> Result<(), PropertyError> {
        self.properties.set(self.props().font_size, size)
    }

    /// The border width; `-1` means the platform width.
    #[must_use]
    pub fn border_width(&self) -> f64 {
        self.properties.get(self.props().border_width)
    }

    /// Sets the border width.
    pub fn set_border_width(&self, width: f64) {
        assign(&self.properties, self.props().border_width, width);
    }

    /// The corner radius; `-1` means the platform radius.
    #[must_use]
    pub fn corner_radius(&self) -> i32 {
        self.properties.get(self.props().corner_radius)
    }

    /// Sets the corner radius. `BorderRadius` follows.
    pub fn set_corner_radius(&self, radius: i32) {
        assign(&self.properties, self.props().corner_radius, radius);
    }

    /// The legacy corner radius; `5` means the platform radius.
    #[must_use]
    pub fn border_radius(&self) -> i32 {
        self.properties.get(self.props().border_radius)
    }

    /// Sets the legacy corner radius. `CornerRadius` follows.
    pub fn set_border_radius(&self, radius: i32) {
        assign(&self.properties, self.props().border_radius, radius);
    }

    /// The border colour.
    #[must_use]
    pub fn border_color(&self) -> Option<Color> {
        self.properties.get(self.catalog.border_element().border_color)
    }

    /// Sets the border colour.
    pub fn set_border_color(&self, color: Option<Color>) {
        assign(&self.properties, self.catalog.border_element().border_color, color);
    }

    /// The background colour.
    #[must_use]
    pub fn background_color(&self) -> Option<Color> {
        self.properties.get(self.catalog.visual_element().background_color)
    }

    /// Sets the background colour.
    pub fn set_background_color(&self, color: Option<Color>) {
        assign(&self.properties, self.catalog.visual_element().background_color, color);
    }

    /// Sets the user-controlled enabled flag.
    ///
    /// The button is effectively enabled only while its command can also run;
    /// see [`ButtonController::is_enabled`].
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

    /// Keeps or drops the platform padding.
    pub fn set_use_default_padding(&self, keep: bool) {
        assign(&self.properties, self.props().use_default_padding, keep);
    }

    /// Keeps or drops the platform shadow.
    pub fn set_use_default_shadow(&self, keep: bool) {
        assign(&self.properties, self.props().use_default_shadow, keep);
    }

    /// The current visual state.
    #[must_use]
    pub fn visual_state(&self) -> VisualState {
        self.click.visual_state()
    }

    /// Raised after a click that was not absorbed.
    #[must_use]
    pub fn clicked(&self) -> &Handlers<Button> {
        &self.click.clicked
    }

    /// Raised when the button is pressed.
    #[must_use]
    pub fn pressed(&self) -> &Handlers<Button> {
        &self.click.pressed
    }

    /// Raised when the button is released.
    #[must_use]
    pub fn released(&self) -> &Handlers<Button> {
        &self.click.released
    }

    /// Raised when a change affects the button's measured size.
    #[must_use]
    pub fn measure_invalidated(&self) -> &Handlers<Button> {
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

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("text", &self.text())
            .field("is_pressed", &self.is_pressed())
            .field("visual_state", &self.visual_state())
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

impl BindableObject for Button {
    fn properties(&self) -> &PropertyBag {
        &self.properties
    }
}

impl Clickable for Button {
    fn click_state(&self) -> &ClickState<Self> {
        &self.click
    }

    fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl ButtonController for Button {
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

/// A button's image never reports loading and is drawn aspect-fit.
impl ImageController for Button {
    fn source(&self) -> Option<ImageSource> {
        self.image()
    }

    fn aspect(&self) -> Aspect {
        Aspect::AspectFit
    }

    fn is_opaque(&self) -> bool {
        false
    }

    fn set_is_loading(&self, _loading: bool) {}

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
        Some(self.props().image.id())
    }
}

impl ImageEventSource for Button {
    fn image_events(&self) -> &ImageEvents {
        &self.image_events
    }

    fn source_changed(&self) {
        self.measure_invalidated.emit(self);
    }
}

impl BorderController for Button {
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

    fn use_default_padding_property(&self) -> Option<Property<bool>> {
        Some(self.props().use_default_padding)
    }

    fn use_default_shadow_property(&self) -> Option<Property<bool>> {
        Some(self.props().use_default_shadow)
    }
}
