//! Fragmentation break properties.
//!
//! [CSS Fragmentation Module Level 3](https://www.w3.org/TR/css-break-3/)

use serde::{Deserialize, Serialize};

/// The kind of fragmentation context content is being laid out in.
///
/// [§ 2 Fragmentation Model](https://www.w3.org/TR/css-break-3/#fragmentation-model)
///
/// "A fragmentation container (fragmentainer) is a box, such as a page box,
/// column box, or region, that contains a portion (or all) of a fragmented
/// flow."
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum FragmentationType {
    /// Paged media: each fragmentainer is a page.
    Page,
    /// Multi-column layout: each fragmentainer is a column box.
    Column,
}

/// [§ 3.1 Breaks Between Boxes](https://www.w3.org/TR/css-break-3/#break-between)
///
/// "These properties specify page/column/region break behavior before/after
/// the generated box."
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BreakBetween {
    /// "Neither force nor forbid a break before/after the principal box."
    #[default]
    Auto,
    /// "Avoid a break before/after the principal box."
    Avoid,
    /// "Avoid a page break before/after the principal box."
    AvoidPage,
    /// "Avoid a column break before/after the principal box."
    AvoidColumn,
    /// "Always force a page break before/after the principal box."
    Page,
    /// "Always force a column break before/after the principal box."
    Column,
    /// "Force one or two page breaks ... so that the next page is formatted
    /// as a left page."
    Left,
    /// "... so that the next page is formatted as a right page."
    Right,
    /// "... so that the next page is formatted as a recto page."
    Recto,
    /// "... so that the next page is formatted as a verso page."
    Verso,
}

impl BreakBetween {
    /// Rank used when several break values meet at one break point.
    ///
    /// [§ 3.1](https://www.w3.org/TR/css-break-3/#forced-breaks)
    ///
    /// "When multiple forced break values apply to a single break point, they
    /// combine such that a break is forced if any of the values forces a
    /// break." Stronger values win; more specific page values outrank generic
    /// ones.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Auto => 0,
            Self::AvoidColumn => 1,
            Self::AvoidPage => 2,
            Self::Avoid => 3,
            Self::Column => 4,
            Self::Page => 5,
            Self::Left | Self::Right | Self::Recto | Self::Verso => 6,
        }
    }

    /// Combine the `break-after` of the box before a class A break point
    /// with the `break-before` of the box after it. The later value wins
    /// ties.
    #[must_use]
    pub const fn join(self, later: Self) -> Self {
        if later.precedence() >= self.precedence() {
            later
        } else {
            self
        }
    }

    /// Whether this value forces a break in a fragmentation context of the
    /// given type.
    ///
    /// "column: Always force a column break" only applies inside multicol;
    /// page values force a break only in paged media.
    #[must_use]
    pub const fn is_forced_for(self, fragmentation: FragmentationType) -> bool {
        matches!(
            (self, fragmentation),
            (Self::Column, FragmentationType::Column)
                | (
                    Self::Page | Self::Left | Self::Right | Self::Recto | Self::Verso,
                    FragmentationType::Page
                )
        )
    }
}

/// [§ 3.2 Breaks Within Boxes](https://www.w3.org/TR/css-break-3/#break-within)
///
/// "This property specifies page/column/region break behavior within the
/// element's principal box."
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BreakInside {
    /// "Impose no additional breaking constraints within the box."
    #[default]
    Auto,
    /// "Avoid breaks within the box."
    Avoid,
    /// "Avoid a page break within the box."
    AvoidPage,
    /// "Avoid a column break within the box."
    AvoidColumn,
}

impl BreakInside {
    /// Whether the box should be treated as unsplittable in a fragmentation
    /// context of the given type.
    #[must_use]
    pub const fn avoids(self, fragmentation: FragmentationType) -> bool {
        matches!(
            (self, fragmentation),
            (Self::Avoid, _)
                | (Self::AvoidPage, FragmentationType::Page)
                | (Self::AvoidColumn, FragmentationType::Column)
        )
    }
}
