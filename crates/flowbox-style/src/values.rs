//! CSS length values.
//!
//! [§ 5 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
//!
//! Only the units that survive to computed values matter here: absolute
//! pixels and percentages (which are resolved against the containing block
//! during layout).

use std::fmt;

use serde::Deserialize;

use crate::writing_mode::PhysicalSide;

/// [§ 5 Distance Units](https://www.w3.org/TR/css-values-4/#lengths)
///
/// A computed length: either absolute or a percentage of some base that is
/// only known during layout.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "LengthRepr")]
pub enum Length {
    /// [§ 6.1 Absolute lengths](https://www.w3.org/TR/css-values-4/#absolute-lengths)
    /// "1px = 1/96th of 1in"
    Px(f32),
    /// [§ 4.3 Percentages](https://www.w3.org/TR/css-values-4/#percentages)
    ///
    /// "Percentage values are always relative to another quantity"
    Percent(f32),
}

impl Default for Length {
    fn default() -> Self {
        Self::Px(0.0)
    }
}

impl Length {
    /// Zero pixels.
    pub const ZERO: Self = Self::Px(0.0);

    /// Resolve against `base` (the containing block's relevant size).
    #[must_use]
    pub fn resolve(self, base: f32) -> f32 {
        match self {
            Self::Px(px) => px,
            Self::Percent(pct) => base * pct / 100.0,
        }
    }

    /// Whether the length is exactly zero (in any unit).
    #[must_use]
    pub fn is_zero(self) -> bool {
        match self {
            Self::Px(v) | Self::Percent(v) => v == 0.0,
        }
    }

    /// Whether the length resolves to something strictly positive.
    #[must_use]
    pub fn is_positive(self) -> bool {
        match self {
            Self::Px(v) | Self::Percent(v) => v > 0.0,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Px(v) => write!(f, "{v}px"),
            Self::Percent(v) => write!(f, "{v}%"),
        }
    }
}

/// [§ 4.4](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// "The keyword 'auto'... allows the user agent to compute the value
/// based on other properties."
///
/// Defaults to `0px`, the initial value of the margin properties, so that a
/// partially specified [`Sides`] leaves its other margins at zero.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "LengthRepr")]
pub enum LengthOrAuto {
    /// The value is 'auto' and will be resolved during layout.
    Auto,
    /// A specific length value.
    Length(Length),
}

impl Default for LengthOrAuto {
    fn default() -> Self {
        Self::Length(Length::ZERO)
    }
}

impl LengthOrAuto {
    /// Shorthand for a pixel length.
    #[must_use]
    pub const fn px(value: f32) -> Self {
        Self::Length(Length::Px(value))
    }

    /// Check if the value is 'auto'.
    #[must_use]
    pub const fn is_auto(self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Resolve against `base`; `None` for 'auto'.
    #[must_use]
    pub fn resolve(self, base: f32) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Length(length) => Some(length.resolve(base)),
        }
    }

    /// Resolve against `base`, treating 'auto' as zero.
    ///
    /// [§ 10.6.3](https://www.w3.org/TR/CSS2/visudet.html#normal-block)
    ///
    /// "If 'margin-top', or 'margin-bottom' are 'auto', their used value is 0."
    #[must_use]
    pub fn resolve_or_zero(self, base: f32) -> f32 {
        self.resolve(base).unwrap_or(0.0)
    }
}

impl fmt::Display for LengthOrAuto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Length(length) => length.fmt(f),
        }
    }
}

/// What a length looks like in a scene file: a bare number of pixels, or a
/// string such as `"12px"`, `"50%"` or `"auto"`.
#[derive(Deserialize)]
#[serde(untagged)]
enum LengthRepr {
    Number(f32),
    Text(String),
}

fn parse_length(text: &str) -> Result<Length, String> {
    let text = text.trim();
    let (number, make): (&str, fn(f32) -> Length) = if let Some(n) = text.strip_suffix('%') {
        (n, Length::Percent)
    } else if let Some(n) = text.strip_suffix("px") {
        (n, Length::Px)
    } else {
        (text, Length::Px)
    };
    number
        .trim()
        .parse::<f32>()
        .map(make)
        .map_err(|_| format!("invalid length '{text}'"))
}

impl TryFrom<LengthRepr> for Length {
    type Error = String;

    fn try_from(repr: LengthRepr) -> Result<Self, Self::Error> {
        match repr {
            LengthRepr::Number(px) => Ok(Self::Px(px)),
            LengthRepr::Text(text) => parse_length(&text),
        }
    }
}

impl TryFrom<LengthRepr> for LengthOrAuto {
    type Error = String;

    fn try_from(repr: LengthRepr) -> Result<Self, Self::Error> {
        match repr {
            LengthRepr::Text(text) if text.trim().eq_ignore_ascii_case("auto") => Ok(Self::Auto),
            other => Length::try_from(other).map(Self::Length),
        }
    }
}

/// Per-side values for margin, padding and border widths.
///
/// [§ 3 The CSS Box Model](https://www.w3.org/TR/css-box-3/#box-model)
///
/// In scene files a single value applies to all four sides; an object sets
/// sides individually and leaves the rest at their default.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(
    from = "SidesRepr<T>",
    bound(deserialize = "T: Deserialize<'de> + Default + Copy")
)]
pub struct Sides<T> {
    /// Top edge value.
    pub top: T,
    /// Right edge value.
    pub right: T,
    /// Bottom edge value.
    pub bottom: T,
    /// Left edge value.
    pub left: T,
}

impl<T: Copy> Sides<T> {
    /// The same value on every side.
    #[must_use]
    pub const fn all(value: T) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    /// The value on one physical side.
    #[must_use]
    pub const fn side(&self, side: PhysicalSide) -> T {
        match side {
            PhysicalSide::Top => self.top,
            PhysicalSide::Right => self.right,
            PhysicalSide::Bottom => self.bottom,
            PhysicalSide::Left => self.left,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SidesRepr<T> {
    All(T),
    Each {
        #[serde(default)]
        top: T,
        #[serde(default)]
        right: T,
        #[serde(default)]
        bottom: T,
        #[serde(default)]
        left: T,
    },
}

impl<T: Copy> From<SidesRepr<T>> for Sides<T> {
    fn from(repr: SidesRepr<T>) -> Self {
        match repr {
            SidesRepr::All(value) => Self::all(value),
            SidesRepr::Each {
                top,
                right,
                bottom,
                left,
            } => Self {
                top,
                right,
                bottom,
                left,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_from_number_and_strings() {
        let lengths: Vec<Length> = serde_json::from_str(r#"[12, "8px", "50%"]"#).unwrap();
        assert_eq!(lengths, [Length::Px(12.0), Length::Px(8.0), Length::Percent(50.0)]);
    }

    #[test]
    fn test_auto_is_only_valid_where_allowed() {
        let auto: LengthOrAuto = serde_json::from_str(r#""auto""#).unwrap();
        assert!(auto.is_auto());
        assert!(serde_json::from_str::<Length>(r#""auto""#).is_err());
    }

    #[test]
    fn test_percentages_resolve_against_base() {
        assert_eq!(Length::Percent(25.0).resolve(400.0), 100.0);
        assert_eq!(LengthOrAuto::Auto.resolve_or_zero(400.0), 0.0);
    }

    #[test]
    fn test_sides_shorthand_and_partial_object() {
        let all: Sides<f32> = serde_json::from_str("4").unwrap();
        assert_eq!(all, Sides::all(4.0));

        let partial: Sides<f32> = serde_json::from_str(r#"{"top": 2}"#).unwrap();
        assert_eq!(partial.top, 2.0);
        assert_eq!(partial.left, 0.0);
    }
}
