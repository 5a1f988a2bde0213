// src/config.rs

use std::str::FromStr;

use crate::error::FormatError;

/// How much of the markup's whitespace is treated as significant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WhitespaceSensitivity {
    /// Defer to the static per-tag display tables.
    #[default]
    Css,
    /// Every element and Liquid tag is inline, so all whitespace counts.
    Strict,
    /// Every element and Liquid tag is block, so no whitespace counts.
    Ignore,
}

impl FromStr for WhitespaceSensitivity {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "css" => Ok(WhitespaceSensitivity::Css),
            "strict" => Ok(WhitespaceSensitivity::Strict),
            "ignore" => Ok(WhitespaceSensitivity::Ignore),
            other => Err(FormatError::InvalidOption {
                name: "whitespace-sensitivity",
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatOptions {
    pub print_width: usize,
    pub indent_width: usize,
    pub use_tabs: bool,
    pub whitespace_sensitivity: WhitespaceSensitivity,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            print_width: 80,
            indent_width: 2,
            use_tabs: false,
            whitespace_sensitivity: WhitespaceSensitivity::Css,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_three_modes() {
        assert_eq!("css".parse(), Ok(WhitespaceSensitivity::Css));
        assert_eq!("strict".parse(), Ok(WhitespaceSensitivity::Strict));
        assert_eq!("ignore".parse(), Ok(WhitespaceSensitivity::Ignore));
    }

    #[test]
    fn rejects_unknown_mode() {
        let err = "loose".parse::<WhitespaceSensitivity>().unwrap_err();
        assert_eq!(
            err,
            FormatError::InvalidOption {
                name: "whitespace-sensitivity",
                value: "loose".to_string(),
            }
        );
    }
}
