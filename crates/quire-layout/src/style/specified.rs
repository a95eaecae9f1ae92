//! The specified (computed-by-cascade) style of a frame.
//!
//! [§ 6.1 Specified, computed, and actual values](https://www.w3.org/TR/CSS2/cascade.html#value-stages)
//!
//! A `SpecifiedStyle` is immutable once attached to a frame and shared by
//! `Rc` between split fragments of the same element. Layout never writes to
//! it; resolved lengths go to the frame's [`UsedValues`](super::UsedValues).

use serde::{Deserialize, Serialize};

use super::keywords::{
    BorderCollapse, BoxSizing, Clear, Display, Float, ListStylePosition, ListStyleType,
    Overflow, PageBreak, Position, TableLayout, TextAlign, TextDecoration, TextTransform,
    VerticalAlign, Visibility, WhiteSpace, WordWrap,
};
use super::values::{
    BorderRadius, BorderSide, Color, ContentItem, CounterDirective, Length, LengthOrAuto,
    LineHeight, TransformFunction,
};
use crate::geometry::EdgeSizes;

/// Default font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Style properties consumed by layout and paint.
///
/// Every field defaults to its CSS initial value, so sparse JSON input
/// deserializes to a complete style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
#[allow(clippy::struct_excessive_bools)]
pub struct SpecifiedStyle {
    /// [§ 9.2.4 'display'](https://www.w3.org/TR/CSS2/visuren.html#display-prop)
    pub display: Display,
    /// [§ 9.3.1 'position'](https://www.w3.org/TR/CSS2/visuren.html#choose-position)
    pub position: Position,
    /// [§ 9.5.1 'float'](https://www.w3.org/TR/CSS2/visuren.html#float-position)
    pub float: Float,
    /// [§ 9.5.2 'clear'](https://www.w3.org/TR/CSS2/visuren.html#flow-control)
    pub clear: Clear,
    /// [§ 9.3.2 Box offsets](https://www.w3.org/TR/CSS2/visuren.html#position-props)
    pub top: LengthOrAuto,
    /// Right box offset.
    pub right: LengthOrAuto,
    /// Bottom box offset.
    pub bottom: LengthOrAuto,
    /// Left box offset.
    pub left: LengthOrAuto,
    /// [§ 9.9.1 'z-index'](https://www.w3.org/TR/CSS2/visuren.html#z-index); `None` is `auto`.
    pub z_index: Option<i32>,

    /// [§ 10.2 'width'](https://www.w3.org/TR/CSS2/visudet.html#the-width-property)
    pub width: LengthOrAuto,
    /// [§ 10.5 'height'](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    pub height: LengthOrAuto,
    /// [§ 10.4 'min-width'](https://www.w3.org/TR/CSS2/visudet.html#min-max-widths)
    pub min_width: Length,
    /// `None` is `none`.
    pub max_width: Option<Length>,
    /// [§ 10.7 'min-height'](https://www.w3.org/TR/CSS2/visudet.html#min-max-heights)
    pub min_height: Length,
    /// `None` is `none`.
    pub max_height: Option<Length>,
    /// Which box `width`/`height` size.
    pub box_sizing: BoxSizing,

    /// [§ 8.3 Margin properties](https://www.w3.org/TR/CSS2/box.html#margin-properties)
    pub margin_top: LengthOrAuto,
    /// Right margin.
    pub margin_right: LengthOrAuto,
    /// Bottom margin.
    pub margin_bottom: LengthOrAuto,
    /// Left margin.
    pub margin_left: LengthOrAuto,
    /// [§ 8.4 Padding properties](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    pub padding_top: Length,
    /// Right padding.
    pub padding_right: Length,
    /// Bottom padding.
    pub padding_bottom: Length,
    /// Left padding.
    pub padding_left: Length,
    /// [§ 8.5 Border properties](https://www.w3.org/TR/CSS2/box.html#border-properties)
    pub border_top: BorderSide,
    /// Right border.
    pub border_right: BorderSide,
    /// Bottom border.
    pub border_bottom: BorderSide,
    /// Left border.
    pub border_left: BorderSide,
    /// Rounded corners; also shapes the `overflow` clip.
    pub border_radius: BorderRadius,

    /// [§ 11.1.1 'overflow'](https://www.w3.org/TR/CSS2/visufx.html#overflow)
    pub overflow: Overflow,
    /// [§ 11.2 'visibility'](https://www.w3.org/TR/CSS2/visufx.html#visibility)
    pub visibility: Visibility,
    /// [CSS Color 3 § 3.2 'opacity'](https://www.w3.org/TR/css-color-3/#transparency)
    pub opacity: f32,
    /// [CSS Transforms § 5](https://www.w3.org/TR/css-transforms-1/#transform-property)
    pub transform: Vec<TransformFunction>,
    /// Transform origin; percentages refer to the border box.
    pub transform_origin: (Length, Length),

    /// [§ 14.1 'color'](https://www.w3.org/TR/CSS2/colors.html#colors)
    pub color: Color,
    /// [§ 14.2.1 'background-color'](https://www.w3.org/TR/CSS2/colors.html#background-properties)
    pub background_color: Option<Color>,

    /// [§ 15.3 'font-family'](https://www.w3.org/TR/CSS2/fonts.html#font-family-prop)
    pub font_family: String,
    /// Computed font size in points.
    pub font_size: f32,
    /// [§ 10.8.1 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
    pub line_height: LineHeight,
    /// [§ 10.8.1 'vertical-align'](https://www.w3.org/TR/CSS2/visudet.html#propdef-vertical-align)
    pub vertical_align: VerticalAlign,
    /// [§ 16.2 'text-align'](https://www.w3.org/TR/CSS2/text.html#alignment-prop)
    pub text_align: TextAlign,
    /// [§ 16.1 'text-indent'](https://www.w3.org/TR/CSS2/text.html#indentation-prop)
    pub text_indent: Length,
    /// [§ 16.3.1 'text-decoration'](https://www.w3.org/TR/CSS2/text.html#lining-striking-props)
    pub text_decoration: TextDecoration,
    /// [§ 16.5 'text-transform'](https://www.w3.org/TR/CSS2/text.html#caps-prop)
    pub text_transform: TextTransform,
    /// [§ 16.6 'white-space'](https://www.w3.org/TR/CSS2/text.html#white-space-prop)
    pub white_space: WhiteSpace,
    /// Whether long words may break anywhere.
    pub word_wrap: WordWrap,
    /// [§ 16.4 'letter-spacing'](https://www.w3.org/TR/CSS2/text.html#spacing-props), points.
    pub letter_spacing: f32,
    /// Extra space added to each inter-word gap, points.
    pub word_spacing: f32,

    /// [§ 17.6 'border-collapse'](https://www.w3.org/TR/CSS2/tables.html#borders)
    pub border_collapse: BorderCollapse,
    /// [§ 17.6.1 'border-spacing'](https://www.w3.org/TR/CSS2/tables.html#separated-borders):
    /// horizontal then vertical, points.
    pub border_spacing: (f32, f32),
    /// [§ 17.5.2 'table-layout'](https://www.w3.org/TR/CSS2/tables.html#width-layout)
    pub table_layout: TableLayout,
    /// Column span of a table cell.
    pub colspan: usize,
    /// Row span of a table cell.
    pub rowspan: usize,

    /// [§ 12.6.2 'list-style-type'](https://www.w3.org/TR/CSS2/generate.html#lists)
    pub list_style_type: ListStyleType,
    /// [§ 12.6.2 'list-style-position'](https://www.w3.org/TR/CSS2/generate.html#propdef-list-style-position)
    pub list_style_position: ListStylePosition,

    /// [§ 12.2 'content'](https://www.w3.org/TR/CSS2/generate.html#content);
    /// only meaningful on generated (`::before`/`::after`) boxes.
    pub content: Vec<ContentItem>,
    /// [§ 12.4 'counter-reset'](https://www.w3.org/TR/CSS2/generate.html#counters)
    pub counter_reset: Vec<CounterDirective>,
    /// [§ 12.4 'counter-increment'](https://www.w3.org/TR/CSS2/generate.html#counters)
    pub counter_increment: Vec<CounterDirective>,
    /// [§ 12.3.1 'quotes'](https://www.w3.org/TR/CSS2/generate.html#quotes-specify):
    /// open/close pairs per nesting level.
    pub quotes: Vec<(String, String)>,

    /// [§ 13.3.1 'page-break-before'](https://www.w3.org/TR/CSS2/page.html#page-break-props)
    pub page_break_before: PageBreak,
    /// `page-break-after`
    pub page_break_after: PageBreak,
    /// `page-break-inside`
    pub page_break_inside: PageBreak,
}

impl Default for SpecifiedStyle {
    fn default() -> Self {
        Self {
            display: Display::Inline,
            position: Position::Static,
            float: Float::None,
            clear: Clear::None,
            top: LengthOrAuto::Auto,
            right: LengthOrAuto::Auto,
            bottom: LengthOrAuto::Auto,
            left: LengthOrAuto::Auto,
            z_index: None,
            width: LengthOrAuto::Auto,
            height: LengthOrAuto::Auto,
            min_width: Length::ZERO,
            max_width: None,
            min_height: Length::ZERO,
            max_height: None,
            box_sizing: BoxSizing::ContentBox,
            margin_top: LengthOrAuto::pt(0.0),
            margin_right: LengthOrAuto::pt(0.0),
            margin_bottom: LengthOrAuto::pt(0.0),
            margin_left: LengthOrAuto::pt(0.0),
            padding_top: Length::ZERO,
            padding_right: Length::ZERO,
            padding_bottom: Length::ZERO,
            padding_left: Length::ZERO,
            border_top: BorderSide::default(),
            border_right: BorderSide::default(),
            border_bottom: BorderSide::default(),
            border_left: BorderSide::default(),
            border_radius: BorderRadius::default(),
            overflow: Overflow::Visible,
            visibility: Visibility::Visible,
            opacity: 1.0,
            transform: Vec::new(),
            transform_origin: (Length::Percent(50.0), Length::Percent(50.0)),
            color: Color::BLACK,
            background_color: None,
            font_family: "serif".to_string(),
            font_size: DEFAULT_FONT_SIZE,
            line_height: LineHeight::Normal,
            vertical_align: VerticalAlign::Baseline,
            text_align: TextAlign::Left,
            text_indent: Length::ZERO,
            text_decoration: TextDecoration::None,
            text_transform: TextTransform::None,
            white_space: WhiteSpace::Normal,
            word_wrap: WordWrap::Normal,
            letter_spacing: 0.0,
            word_spacing: 0.0,
            border_collapse: BorderCollapse::Separate,
            border_spacing: (0.0, 0.0),
            table_layout: TableLayout::Auto,
            colspan: 1,
            rowspan: 1,
            list_style_type: ListStyleType::Disc,
            list_style_position: ListStylePosition::Outside,
            content: Vec::new(),
            counter_reset: Vec::new(),
            counter_increment: Vec::new(),
            quotes: vec![
                ("\u{201c}".to_string(), "\u{201d}".to_string()),
                ("\u{2018}".to_string(), "\u{2019}".to_string()),
            ],
            page_break_before: PageBreak::Auto,
            page_break_after: PageBreak::Auto,
            page_break_inside: PageBreak::Auto,
        }
    }
}

impl SpecifiedStyle {
    /// Initial values with the given display type.
    #[must_use]
    pub fn with_display(display: Display) -> Self {
        Self {
            display,
            ..Self::default()
        }
    }

    /// A block box with initial values.
    #[must_use]
    pub fn block() -> Self {
        Self::with_display(Display::Block)
    }

    /// The style of an anonymous or text box: inherited properties copied from
    /// `parent`, everything else at its initial value.
    ///
    /// [§ 6.2 Inheritance](https://www.w3.org/TR/CSS2/cascade.html#inheritance)
    #[must_use]
    pub fn inherit(parent: &Self, display: Display) -> Self {
        Self {
            display,
            visibility: parent.visibility,
            color: parent.color,
            font_family: parent.font_family.clone(),
            font_size: parent.font_size,
            line_height: parent.line_height,
            text_align: parent.text_align,
            text_indent: parent.text_indent,
            text_decoration: parent.text_decoration,
            text_transform: parent.text_transform,
            white_space: parent.white_space,
            word_wrap: parent.word_wrap,
            letter_spacing: parent.letter_spacing,
            word_spacing: parent.word_spacing,
            border_collapse: parent.border_collapse,
            border_spacing: parent.border_spacing,
            list_style_type: parent.list_style_type,
            list_style_position: parent.list_style_position,
            quotes: parent.quotes.clone(),
            ..Self::default()
        }
    }

    /// Set all four margins.
    pub fn set_margin(&mut self, margin: LengthOrAuto) {
        self.margin_top = margin;
        self.margin_right = margin;
        self.margin_bottom = margin;
        self.margin_left = margin;
    }

    /// Set all four paddings.
    pub fn set_padding(&mut self, padding: Length) {
        self.padding_top = padding;
        self.padding_right = padding;
        self.padding_bottom = padding;
        self.padding_left = padding;
    }

    /// Set all four borders.
    pub fn set_border(&mut self, border: BorderSide) {
        self.border_top = border;
        self.border_right = border;
        self.border_bottom = border;
        self.border_left = border;
    }

    /// Used border widths (zero for `none`/`hidden`).
    #[must_use]
    pub fn border_widths(&self) -> EdgeSizes {
        EdgeSizes {
            top: self.border_top.used_width(),
            right: self.border_right.used_width(),
            bottom: self.border_bottom.used_width(),
            left: self.border_left.used_width(),
        }
    }

    /// Paddings resolved against the containing block width.
    ///
    /// [§ 8.4](https://www.w3.org/TR/CSS2/box.html#padding-properties)
    /// "The percentage is calculated with respect to the width of the generated
    /// box's containing block, even for 'padding-top' and 'padding-bottom'."
    #[must_use]
    pub fn padding_widths(&self, cb_width: f32) -> EdgeSizes {
        let fs = self.font_size;
        EdgeSizes {
            top: self.padding_top.to_pt(cb_width, fs).max(0.0),
            right: self.padding_right.to_pt(cb_width, fs).max(0.0),
            bottom: self.padding_bottom.to_pt(cb_width, fs).max(0.0),
            left: self.padding_left.to_pt(cb_width, fs).max(0.0),
        }
    }

    /// Border color for a side, resolving `currentColor`.
    #[must_use]
    pub fn border_color(&self, side: &BorderSide) -> Color {
        side.color.unwrap_or(self.color)
    }

    /// Returns true for floated boxes.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        self.float != Float::None && !self.position.is_out_of_flow()
    }

    /// Returns true for absolutely or fixed positioned boxes.
    #[must_use]
    pub const fn is_absolute(&self) -> bool {
        self.position.is_out_of_flow()
    }

    /// Returns true for boxes in normal flow.
    #[must_use]
    pub fn is_in_flow(&self) -> bool {
        !self.is_floating() && !self.is_absolute() && self.display != Display::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_json_fills_initial_values() {
        let style: SpecifiedStyle =
            serde_json::from_str(r#"{"display": "block", "width": "50%", "margin-left": "auto"}"#)
                .unwrap_or_default();
        assert_eq!(style.display, Display::Block);
        assert_eq!(style.width, LengthOrAuto::percent(50.0));
        assert!(style.margin_left.is_auto());
        assert_eq!(style.margin_right, LengthOrAuto::pt(0.0));
        assert!((style.font_size - DEFAULT_FONT_SIZE).abs() < f32::EPSILON);
    }

    #[test]
    fn test_inherit_copies_only_inherited_properties() {
        let mut parent = SpecifiedStyle::block();
        parent.font_size = 20.0;
        parent.width = LengthOrAuto::pt(100.0);
        parent.white_space = WhiteSpace::Pre;
        let child = SpecifiedStyle::inherit(&parent, Display::Inline);
        assert!((child.font_size - 20.0).abs() < f32::EPSILON);
        assert_eq!(child.white_space, WhiteSpace::Pre);
        assert!(child.width.is_auto());
    }

    #[test]
    fn test_hidden_border_has_no_width() {
        let mut style = SpecifiedStyle::block();
        style.set_border(BorderSide {
            width: 4.0,
            style: super::super::keywords::BorderStyle::Hidden,
            color: None,
        });
        assert!(style.border_widths().horizontal().abs() < f32::EPSILON);
    }
}
