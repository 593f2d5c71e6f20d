//! T-shirt sizes and their `size: X` label form

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Prefix shared by every size label
pub const SIZE_LABEL_PREFIX: &str = "size:";

/// Estimated effort for an issue, smallest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Size {
    XS,
    S,
    M,
    L,
    XL,
}

impl Size {
    pub const ALL: [Size; 5] = [Size::XS, Size::S, Size::M, Size::L, Size::XL];

    pub fn as_str(self) -> &'static str {
        match self {
            Size::XS => "XS",
            Size::S => "S",
            Size::M => "M",
            Size::L => "L",
            Size::XL => "XL",
        }
    }

    /// The GitHub label for this size, e.g. `size: M`
    pub fn label(self) -> String {
        format!("{} {}", SIZE_LABEL_PREFIX, self.as_str())
    }

    /// Colour used when the label has to be created (hex, no `#`)
    pub fn color(self) -> &'static str {
        match self {
            Size::XS => "0e8a16",
            Size::S => "7bc96f",
            Size::M => "fef2c0",
            Size::L => "f9a03f",
            Size::XL => "d93f0b",
        }
    }

    pub fn guide(self) -> &'static str {
        match self {
            Size::XS => "Trivial change, <30 min (typo fix, config change, small tweak)",
            Size::S => "Small task, 1-2 hours (simple bug fix, small feature, single file change)",
            Size::M => "Medium task, half day to 1 day (moderate feature, multiple files, some testing)",
            Size::L => "Large task, 2-3 days (significant feature, refactoring, multiple components)",
            Size::XL => "Very large, 1+ week (major feature, architectural change, needs breakdown)",
        }
    }

    /// Parse a label name like `size: M`. Returns `None` for non-size labels.
    pub fn from_label(label: &str) -> Option<Size> {
        label
            .strip_prefix(SIZE_LABEL_PREFIX)
            .and_then(|rest| rest.parse().ok())
    }
}

/// Whether a label belongs to the `size:` family, valid size or not
pub fn is_size_label(label: &str) -> bool {
    label.starts_with(SIZE_LABEL_PREFIX)
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of XS, S, M, L, XL
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid size '{0}': must be one of XS, S, M, L, XL")]
pub struct InvalidSize(pub String);

impl FromStr for Size {
    type Err = InvalidSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "XS" => Ok(Size::XS),
            "S" => Ok(Size::S),
            "M" => Ok(Size::M),
            "L" => Ok(Size::L),
            "XL" => Ok(Size::XL),
            _ => Err(InvalidSize(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("m".parse::<Size>().unwrap(), Size::M);
        assert_eq!(" xl ".parse::<Size>().unwrap(), Size::XL);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!("XXL".parse::<Size>().is_err());
        assert!("".parse::<Size>().is_err());
        assert!("medium".parse::<Size>().is_err());
    }

    #[test]
    fn test_label_form() {
        assert_eq!(Size::XS.label(), "size: XS");
        assert_eq!(Size::from_label("size: L"), Some(Size::L));
        assert_eq!(Size::from_label("bug"), None);
        assert_eq!(Size::from_label("size: huge"), None);
        assert!(is_size_label("size: huge"));
    }

    #[test]
    fn test_ordering() {
        assert!(Size::XS < Size::S);
        assert!(Size::L < Size::XL);
    }
}
