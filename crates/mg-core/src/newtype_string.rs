//! Macro for defining validated string newtypes.
//!
//! Every newtype wraps a `String` that passed a per-type check at
//! construction time. The macro generates the struct and the shared
//! trait impls; the check itself is supplied by the invocation.

/// Define a strongly-typed string newtype guarded by `$check`.
///
/// `$check` is a `fn(&str) -> bool`; `$what` describes the accepted
/// form and is used in the error returned by `TryFrom` and serde.
///
/// Generates:
/// - The struct with `Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize`
/// - Custom `Deserialize` (runs the check)
/// - `try_new()`, `as_str()`
/// - `Display`, `AsRef<str>`, `Deref<Target=str>`, `Borrow<str>`
/// - `TryFrom<String>`, `TryFrom<&str>`, `PartialEq<str>`, `PartialEq<&str>`
macro_rules! define_checked_string {
    (
        $(#[$meta:meta])*
        $vis:vis struct $Name:ident where $check:path, $what:literal;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
        #[serde(transparent)]
        $vis struct $Name(String);

        impl $Name {
            /// Build the value, returning `None` when the check rejects it.
            pub fn try_new(value: impl Into<String>) -> Option<Self> {
                let s = value.into();
                if $check(&s) { Some(Self(s)) } else { None }
            }

            /// Return the underlying value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl<'de> serde::Deserialize<'de> for $Name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                $Name::try_new(s).ok_or_else(|| {
                    serde::de::Error::custom(concat!(stringify!($Name), " must be ", $what))
                })
            }
        }

        impl std::fmt::Display for $Name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $Name {
            fn as_ref(&self) -> &str { &self.0 }
        }

        impl std::ops::Deref for $Name {
            type Target = str;
            fn deref(&self) -> &str { &self.0 }
        }

        impl std::borrow::Borrow<str> for $Name {
            fn borrow(&self) -> &str { &self.0 }
        }

        impl TryFrom<String> for $Name {
            type Error = String;
            fn try_from(s: String) -> Result<Self, Self::Error> {
                if $check(&s) {
                    Ok(Self(s))
                } else {
                    Err(format!(concat!("'{}' is not a valid ", stringify!($Name), ": expected ", $what), s))
                }
            }
        }

        impl TryFrom<&str> for $Name {
            type Error = String;
            fn try_from(s: &str) -> Result<Self, Self::Error> {
                Self::try_from(s.to_string())
            }
        }

        impl PartialEq<str> for $Name {
            fn eq(&self, other: &str) -> bool { self.0 == other }
        }

        impl PartialEq<&str> for $Name {
            fn eq(&self, other: &&str) -> bool { self.0 == *other }
        }
    };
}

pub(crate) use define_checked_string;
