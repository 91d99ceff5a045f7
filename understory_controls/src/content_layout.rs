// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement of a button's image relative to its text.

use core::fmt;
use core::str::FromStr;

/// Spacing between image and text when none is given.
pub const DEFAULT_SPACING: f64 = 10.0;

/// Where a button's image sits relative to its text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ImagePosition {
    /// Image before the text.
    #[default]
    Left,
    /// Image above the text.
    Top,
    /// Image after the text.
    Right,
    /// Image below the text.
    Bottom,
}

impl ImagePosition {
    fn parse(s: &str) -> Option<Self> {
        [Self::Left, Self::Top, Self::Right, Self::Bottom]
            .into_iter()
            .find(|position| position.name().eq_ignore_ascii_case(s))
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Top => "Top",
            Self::Right => "Right",
            Self::Bottom => "Bottom",
        }
    }
}

impl fmt::Display for ImagePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Image position and spacing of a button's content.
///
/// Parses from the markup shorthand: a position, a spacing, or both in either
/// order separated by a comma.
///
/// ```rust
/// use understory_controls::{ButtonContentLayout, ImagePosition};
///
/// let layout: ButtonContentLayout = "Right, 5".parse().unwrap();
/// assert_eq!(layout, ButtonContentLayout::new(ImagePosition::Right, 5.0));
///
/// let layout: ButtonContentLayout = "20".parse().unwrap();
/// assert_eq!(layout.position, ImagePosition::Left);
/// assert_eq!(layout.spacing, 20.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ButtonContentLayout {
    /// Image position.
    pub position: ImagePosition,
    /// Distance between image and text.
    pub spacing: f64,
}

impl ButtonContentLayout {
    /// Creates a layout.
    #[must_use]
    pub const fn new(position: ImagePosition, spacing: f64) -> Self {
        Self { position, spacing }
    }
}

impl Default for ButtonContentLayout {
    fn default() -> Self {
        Self::new(ImagePosition::Left, DEFAULT_SPACING)
    }
}

impl fmt::Display for ButtonContentLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Image Position = {}, Spacing = {}",
            self.position, self.spacing
        )
    }
}

/// Why a string is not a [`ButtonContentLayout`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContentLayoutParseError {
    /// Empty input, or more than two comma-separated parts.
    #[error("cannot convert \"{input}\" into a button content layout")]
    Malformed {
        /// The rejected input.
        input: String,
    },
    /// The position part is not one of `Left`, `Top`, `Right`, `Bottom`.
    #[error("unknown image position \"{part}\"")]
    Position {
        /// The rejected part.
        part: String,
    },
    /// The spacing part is not a number.
    #[error("invalid spacing \"{part}\"")]
    Spacing {
        /// The rejected part.
        part: String,
    },
}

impl FromStr for ButtonContentLayout {
    type Err = ContentLayoutParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect();
        let (position, spacing) = match parts.as_slice() {
            [only] if starts_with_digit(only) => (None, Some(*only)),
            [only] => (Some(*only), None),
            [first, second] if starts_with_digit(first) => (Some(*second), Some(*first)),
            [first, second] => (Some(*first), Some(*second)),
            _ => {
                return Err(ContentLayoutParseError::Malformed {
                    input: s.to_owned(),
                });
            }
        };

        let mut layout = Self::default();
        if let Some(part) = spacing {
            layout.spacing = part
                .parse()
                .map_err(|_| ContentLayoutParseError::Spacing {
                    part: part.to_owned(),
                })?;
        }
        if let Some(part) = position {
            layout.position =
                ImagePosition::parse(part).ok_or_else(|| ContentLayoutParseError::Position {
                    part: part.to_owned(),
                })?;
        }
        Ok(layout)
    }
}

fn starts_with_digit(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_digit())
}
