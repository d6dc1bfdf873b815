//! Newtype IDs for type-safe references to remote records.
//!
//! Schema record IDs are opaque strings (usually 24-character hex object IDs,
//! but slugs are accepted wherever the API resolves them). Use the
//! `define_id!` macro to create wrappers that prevent accidentally mixing IDs
//! from different record types.

/// Macro to define a type-safe remote record ID.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_str()`, `into_inner()`
/// - `From<String>`, `From<&str>` and `Display` implementations
///
/// # Example
///
/// ```rust
/// # use schema_storefront_core::define_id;
/// define_id!(AccountId);
/// define_id!(CartId);
///
/// let account_id = AccountId::new("5f1a");
/// let cart_id = CartId::new("5f1a");
///
/// // These are different types, so this won't compile:
/// // let _: AccountId = cart_id;
/// assert_eq!(account_id.as_str(), cart_id.as_str());
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from anything string-like.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(AccountId);
define_id!(CartId);
define_id!(OrderId);
define_id!(ProductId);
define_id!(VariantId);
define_id!(CategoryId);
define_id!(AddressId);
define_id!(CardId);
