//! Macro for implementing Display and FromStr for plain domain enums
//!
//! Keeps the string form of an enum in one place. Parsing is
//! case-insensitive; display uses the string exactly as declared.
//!
//! # Example
//!
//! ```rust
//! use gametest_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Weather {
//!     Clear,
//!     Rain,
//! }
//!
//! impl_domain_enum_conversions!(Weather {
//!     Clear => "clear",
//!     Rain => "rain",
//! });
//!
//! assert_eq!("RAIN".parse::<Weather>().unwrap(), Weather::Rain);
//! ```

/// Implements Display and FromStr traits for fieldless enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their string
///   representations
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Canonical string form of this value.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                let trimmed = s.trim();
                $(
                    if trimmed.eq_ignore_ascii_case($str) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("Invalid {}: {}", stringify!($enum_name), s))
            }
        }
    };
}
