// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Property errors.

/// Errors produced by registration and by writes through a
/// [`PropertyBag`](crate::PropertyBag).
///
/// Write errors are local to the failing call: the bag is left exactly as it
/// was and no notification is sent.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// A property with the same owner and name was already registered.
    ///
    /// This is a programming error surfaced at registration time.
    #[error("property `{owner}.{name}` is already registered")]
    DuplicateProperty {
        /// Owning type tag.
        owner: &'static str,
        /// Property name.
        name: &'static str,
    },
    /// The property's validator rejected the assigned value.
    #[error("invalid value for property `{name}`")]
    InvalidValue {
        /// Property name.
        name: &'static str,
    },
    /// A read-only property was written without its [`PropertyKey`](crate::PropertyKey).
    #[error("property `{name}` is read-only")]
    AccessDenied {
        /// Property name.
        name: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn messages_name_the_property() {
        let duplicate = PropertyError::DuplicateProperty {
            owner: "Button",
            name: "Text",
        };
        assert_eq!(
            duplicate.to_string(),
            "property `Button.Text` is already registered"
        );
        assert_eq!(
            PropertyError::InvalidValue { name: "SelectionLength" }.to_string(),
            "invalid value for property `SelectionLength`"
        );
        assert_eq!(
            PropertyError::AccessDenied { name: "IsPressed" }.to_string(),
            "property `IsPressed` is read-only"
        );
    }
}
