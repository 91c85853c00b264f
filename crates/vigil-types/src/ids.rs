//! Type-safe string wrappers for identifiers assigned outside this process.
//!
//! Camera names come from configuration and event ids are minted by the
//! upstream source system, so both are opaque strings. Wrapping them in
//! newtypes prevents accidental mixing at compile time.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around [`String`] with standard derives.
macro_rules! define_name {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier from any string-like value.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the identifier and return the inner [`String`].
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_name! {
    /// Name of a camera as configured for the process.
    ///
    /// The camera list is fixed for the process lifetime; cameras have no
    /// independent lifecycle inside the synchronizer.
    CameraName
}

define_name! {
    /// Identifier of a motion event, assigned by the upstream source.
    ///
    /// Globally unique per source. Collisions across sources are not
    /// expected but are tolerated by first-writer-wins persistence.
    EventId
}
