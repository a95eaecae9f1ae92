//! Style model consumed by layout.
//!
//! - [`SpecifiedStyle`]: immutable values handed over by the cascade
//! - [`UsedValues`]: values resolved by reflow, owned by each frame

/// Keyword-valued properties.
pub mod keywords;
/// The immutable specified style record.
pub mod specified;
/// The per-frame used-value record.
pub mod used;
/// Lengths, colors, borders and other compound values.
pub mod values;

pub use keywords::{
    BorderCollapse, BorderStyle, BoxSizing, Clear, Display, Float, ListStylePosition,
    ListStyleType, Overflow, PageBreak, Position, TableLayout, TextAlign, TextDecoration,
    TextTransform, VerticalAlign, Visibility, WhiteSpace, WordWrap,
};
pub use specified::{DEFAULT_FONT_SIZE, SpecifiedStyle};
pub use used::{CollapsedMargin, CounterOp, UsedValues, collapse_margins};
pub use values::{
    BorderRadius, BorderSide, Color, ContentItem, CounterDirective, Length, LengthOrAuto,
    LineHeight, TransformFunction,
};
