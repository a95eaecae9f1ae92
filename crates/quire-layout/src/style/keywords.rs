//! Keyword-valued properties.
//!
//! Every enum parses from and prints as its CSS keyword (`strum`), and
//! (de)serializes the same way (`serde`). The `#[default]` variant is the CSS
//! initial value.

use serde::{Deserialize, Serialize};
use strum_macros::EnumString;

use super::values::Length;

/// [§ 9.2.4 The 'display' property](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Display {
    /// "This value causes an element to generate one or more inline boxes."
    #[default]
    Inline,
    /// "This value causes an element to generate a block box."
    Block,
    /// "This value causes an element to generate an inline-level block container."
    InlineBlock,
    /// "This value causes an element to generate a principal block box and a
    /// marker box."
    ListItem,
    /// A block-level table.
    Table,
    /// A group of one or more rows.
    TableRowGroup,
    /// Rows repeated at the top of each page fragment.
    TableHeaderGroup,
    /// Rows repeated at the bottom of each page fragment.
    TableFooterGroup,
    /// A row of cells.
    TableRow,
    /// A table cell.
    TableCell,
    /// "This value causes an element to not appear in the formatting structure."
    None,
}

impl Display {
    /// Block-level boxes participate in a block formatting context.
    #[must_use]
    pub const fn is_block_level(self) -> bool {
        matches!(self, Self::Block | Self::ListItem | Self::Table)
    }

    /// Parts that only make sense inside a table.
    #[must_use]
    pub const fn is_table_part(self) -> bool {
        matches!(
            self,
            Self::TableRowGroup
                | Self::TableHeaderGroup
                | Self::TableFooterGroup
                | Self::TableRow
                | Self::TableCell
        )
    }

    /// Row-group variants.
    #[must_use]
    pub const fn is_row_group(self) -> bool {
        matches!(
            self,
            Self::TableRowGroup | Self::TableHeaderGroup | Self::TableFooterGroup
        )
    }
}

/// [§ 9.3.1 Choosing a positioning scheme](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Position {
    /// Normal flow.
    #[default]
    Static,
    /// Laid out in flow, then offset.
    Relative,
    /// Removed from flow; positioned against the nearest positioned ancestor.
    Absolute,
    /// Removed from flow; positioned against the page area, repeated per page.
    Fixed,
}

impl Position {
    /// Absolute or fixed.
    #[must_use]
    pub const fn is_out_of_flow(self) -> bool {
        matches!(self, Self::Absolute | Self::Fixed)
    }

    /// Anything but static establishes a containing block for absolute boxes.
    #[must_use]
    pub const fn is_positioned(self) -> bool {
        !matches!(self, Self::Static)
    }
}

/// [§ 9.5.1 'float'](https://www.w3.org/TR/CSS2/visuren.html#float-position)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Float {
    /// Not floated.
    #[default]
    None,
    /// Shifted to the left edge.
    Left,
    /// Shifted to the right edge.
    Right,
}

/// [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Clear {
    /// No constraint.
    #[default]
    None,
    /// Below left floats.
    Left,
    /// Below right floats.
    Right,
    /// Below all floats.
    Both,
}

/// [§ 11.1.1 'overflow'](https://www.w3.org/TR/CSS2/visufx.html#overflow)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Overflow {
    /// Content may render outside the box.
    #[default]
    Visible,
    /// Content is clipped to the padding box.
    Hidden,
    /// Paged media cannot scroll; clipped like `hidden`.
    Scroll,
    /// Clipped like `hidden`.
    Auto,
}

impl Overflow {
    /// Any value other than `visible` clips.
    #[must_use]
    pub const fn clips(self) -> bool {
        !matches!(self, Self::Visible)
    }
}

/// [§ 11.2 'visibility'](https://www.w3.org/TR/CSS2/visufx.html#visibility)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Visibility {
    /// Painted.
    #[default]
    Visible,
    /// Laid out but not painted.
    Hidden,
    /// Same as hidden outside tables.
    Collapse,
}

/// [§ 16.2 'text-align'](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Flush right.
    Right,
    /// Centered.
    Center,
    /// Stretched to both edges by inter-word spacing.
    Justify,
}

/// [§ 16.6 'white-space'](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WhiteSpace {
    /// Collapse whitespace, wrap lines.
    #[default]
    Normal,
    /// Collapse whitespace, never wrap.
    Nowrap,
    /// Preserve whitespace, break only at newlines.
    Pre,
    /// Preserve whitespace, wrap lines.
    PreWrap,
    /// Collapse spaces, keep newlines, wrap lines.
    PreLine,
}

impl WhiteSpace {
    /// Runs of spaces and tabs collapse to one space.
    #[must_use]
    pub const fn collapses_spaces(self) -> bool {
        matches!(self, Self::Normal | Self::Nowrap | Self::PreLine)
    }

    /// Newlines force a line break.
    #[must_use]
    pub const fn preserves_newlines(self) -> bool {
        matches!(self, Self::Pre | Self::PreWrap | Self::PreLine)
    }

    /// Lines may wrap at soft break opportunities.
    #[must_use]
    pub const fn wraps(self) -> bool {
        matches!(self, Self::Normal | Self::PreWrap | Self::PreLine)
    }
}

/// [CSS Text 3 § 5.5 'overflow-wrap'](https://www.w3.org/TR/css-text-3/#overflow-wrap-property)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WordWrap {
    /// Break only at allowed break points.
    #[default]
    Normal,
    /// An otherwise unbreakable word may be broken at an arbitrary point.
    BreakWord,
}

/// [§ 16.5 'text-transform'](https://www.w3.org/TR/CSS2/text.html#caps-prop)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TextTransform {
    /// No effect.
    #[default]
    None,
    /// First character of each word uppercased.
    Capitalize,
    /// All characters uppercased.
    Uppercase,
    /// All characters lowercased.
    Lowercase,
}

/// [§ 16.3.1 'text-decoration'](https://www.w3.org/TR/CSS2/text.html#lining-striking-props)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TextDecoration {
    /// No decoration.
    #[default]
    None,
    /// A line below the baseline.
    Underline,
    /// A line above the text.
    Overline,
    /// A line through the middle.
    LineThrough,
}

/// [§ 8.5.3 Border style](https://www.w3.org/TR/CSS2/box.html#border-style-properties)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BorderStyle {
    /// No border; width computes to zero.
    #[default]
    None,
    /// Like none, but wins every conflict in the collapsing border model.
    Hidden,
    /// A series of dots.
    Dotted,
    /// A series of short line segments.
    Dashed,
    /// A single line segment.
    Solid,
    /// Two solid lines.
    Double,
    /// Looks as if carved into the canvas.
    Groove,
    /// Looks as if coming out of the canvas.
    Ridge,
    /// The box looks embedded.
    Inset,
    /// The box looks embossed.
    Outset,
}

impl BorderStyle {
    /// Whether the border draws anything.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::None | Self::Hidden)
    }

    /// [§ 17.6.2.1 Border conflict resolution](https://www.w3.org/TR/CSS2/tables.html#border-conflict-resolution)
    ///
    /// "If border styles differ only in color ... in this order: 'double',
    /// 'solid', 'dashed', 'dotted', 'ridge', 'outset', 'groove', and the lowest:
    /// 'inset'."
    #[must_use]
    pub const fn conflict_rank(self) -> u8 {
        match self {
            Self::Double => 8,
            Self::Solid => 7,
            Self::Dashed => 6,
            Self::Dotted => 5,
            Self::Ridge => 4,
            Self::Outset => 3,
            Self::Groove => 2,
            Self::Inset => 1,
            Self::None | Self::Hidden => 0,
        }
    }
}

/// [§ 17.6 Borders](https://www.w3.org/TR/CSS2/tables.html#borders)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BorderCollapse {
    /// Each cell has its own borders, separated by `border-spacing`.
    #[default]
    Separate,
    /// Adjacent borders are merged by conflict resolution.
    Collapse,
}

/// [§ 17.5.2 Table width algorithms](https://www.w3.org/TR/CSS2/tables.html#width-layout)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum TableLayout {
    /// Column widths follow cell content.
    #[default]
    Auto,
    /// Column widths come from the table width and the first row.
    Fixed,
}

/// [§ 12.6.2 'list-style-type'](https://www.w3.org/TR/CSS2/generate.html#lists)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ListStyleType {
    /// Filled circle.
    #[default]
    Disc,
    /// Hollow circle.
    Circle,
    /// Filled square.
    Square,
    /// 1, 2, 3
    Decimal,
    /// 01, 02, 03
    DecimalLeadingZero,
    /// i, ii, iii
    LowerRoman,
    /// I, II, III
    UpperRoman,
    /// a, b, c
    LowerAlpha,
    /// A, B, C
    UpperAlpha,
    /// No marker.
    None,
}

impl ListStyleType {
    /// Glyph-style markers painted as shapes rather than text.
    #[must_use]
    pub const fn is_bullet(self) -> bool {
        matches!(self, Self::Disc | Self::Circle | Self::Square)
    }
}

/// [§ 12.6.2 'list-style-position'](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style-position)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ListStylePosition {
    /// The marker sits outside the principal box.
    #[default]
    Outside,
    /// The marker is the first inline box of the principal box.
    Inside,
}

/// [§ 13.3.1 Page break properties](https://www.w3.org/TR/CSS2/page.html#page-break-props)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum PageBreak {
    /// Neither force nor forbid.
    #[default]
    Auto,
    /// Always force a page break.
    Always,
    /// Avoid a page break.
    Avoid,
}

/// [CSS UI 3 § 4.1 'box-sizing'](https://www.w3.org/TR/css-ui-3/#box-sizing)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum BoxSizing {
    /// `width` sets the content box.
    #[default]
    ContentBox,
    /// `width` sets the border box.
    BorderBox,
}

/// [§ 10.8.1 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VerticalAlign {
    /// "Align the baseline of the box with the baseline of the parent box."
    #[default]
    Baseline,
    /// "Lower the baseline of the box to the proper position for subscripts."
    Sub,
    /// "Raise the baseline of the box to the proper position for superscripts."
    Super,
    /// "Align the top of the box with the top of the parent's content area."
    TextTop,
    /// "Align the bottom of the box with the bottom of the parent's content area."
    TextBottom,
    /// "Align the vertical midpoint of the box with the baseline of the parent
    /// box plus half the x-height of the parent."
    Middle,
    /// "Align the top of the aligned subtree with the top of the line box."
    Top,
    /// "Align the bottom of the aligned subtree with the bottom of the line box."
    Bottom,
    /// "Raise (positive value) or lower (negative value) the box by this distance."
    Length(Length),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_round_trip_through_strum() {
        assert_eq!("inline-block".parse::<Display>(), Ok(Display::InlineBlock));
        assert_eq!(Display::TableRowGroup.to_string(), "table-row-group");
        assert_eq!("pre-wrap".parse::<WhiteSpace>(), Ok(WhiteSpace::PreWrap));
        assert_eq!(BorderStyle::Double.to_string(), "double");
    }

    #[test]
    fn test_border_style_rank_order() {
        let order = [
            BorderStyle::Double,
            BorderStyle::Solid,
            BorderStyle::Dashed,
            BorderStyle::Dotted,
            BorderStyle::Ridge,
            BorderStyle::Outset,
            BorderStyle::Groove,
            BorderStyle::Inset,
            BorderStyle::None,
        ];
        for pair in order.windows(2) {
            assert!(pair[0].conflict_rank() > pair[1].conflict_rank(), "{pair:?}");
        }
    }
}
