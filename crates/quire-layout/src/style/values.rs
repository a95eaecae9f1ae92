//! Specified value types: lengths, colors, borders, content items.
//!
//! [CSS 2.1 § 4.3 Values](https://www.w3.org/TR/CSS2/syndata.html#values)
//!
//! Values arrive already computed by an external cascade. Lengths stay in
//! their specified unit until layout resolves them against a reference size
//! with [`Length::to_pt`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::keywords::{BorderStyle, ListStyleType};

/// Points per CSS pixel (`1px = 0.75pt`).
pub const PT_PER_PX: f32 = 0.75;

/// [§ 4.3.2 Lengths](https://www.w3.org/TR/CSS2/syndata.html#length-units)
///
/// "Lengths refer to horizontal or vertical measurements."
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LengthRepr", into = "String")]
pub enum Length {
    /// An absolute length in points.
    Pt(f32),
    /// [§ 4.3.3 Percentages](https://www.w3.org/TR/CSS2/syndata.html#percentage-units)
    ///
    /// "Percentage values are always relative to another value, for example a length."
    Percent(f32),
    /// "The 'em' unit is equal to the computed value of the 'font-size' property
    /// of the element on which it is used."
    Em(f32),
}

impl Default for Length {
    fn default() -> Self {
        Self::Pt(0.0)
    }
}

impl Length {
    /// Zero points.
    pub const ZERO: Self = Self::Pt(0.0);

    /// An absolute length in points.
    #[must_use]
    pub const fn pt(value: f32) -> Self {
        Self::Pt(value)
    }

    /// A percentage of the reference length.
    #[must_use]
    pub const fn percent(value: f32) -> Self {
        Self::Percent(value)
    }

    /// Resolve to points.
    ///
    /// Percentages resolve against `reference`, em units against `font_size`.
    #[must_use]
    pub fn to_pt(&self, reference: f32, font_size: f32) -> f32 {
        match *self {
            Self::Pt(pt) => pt,
            Self::Percent(pct) => pct * reference / 100.0,
            Self::Em(em) => em * font_size,
        }
    }

    /// Resolve to points when the reference may be indefinite.
    ///
    /// [§ 10.5](https://www.w3.org/TR/CSS2/visudet.html#the-height-property)
    /// "If the height of the containing block is not specified explicitly ...
    /// the value computes to 'auto'."
    #[must_use]
    pub fn to_pt_opt(&self, reference: Option<f32>, font_size: f32) -> Option<f32> {
        match *self {
            Self::Percent(pct) => reference.map(|r| pct * r / 100.0),
            other => Some(other.to_pt(0.0, font_size)),
        }
    }

    /// Returns true for percentage values.
    #[must_use]
    pub const fn is_percent(&self) -> bool {
        matches!(self, Self::Percent(_))
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pt(v) => write!(f, "{v}pt"),
            Self::Percent(v) => write!(f, "{v}%"),
            Self::Em(v) => write!(f, "{v}em"),
        }
    }
}

impl From<Length> for String {
    fn from(value: Length) -> Self {
        value.to_string()
    }
}

impl FromStr for Length {
    type Err = String;

    /// Parse `12pt`, `16px`, `1in`, `2.5cm`, `10mm`, `50%`, `1.2em` or a bare
    /// number (points).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);
        let value: f32 = number
            .parse()
            .map_err(|_| format!("invalid length '{s}'"))?;
        match unit.to_ascii_lowercase().as_str() {
            "" | "pt" => Ok(Self::Pt(value)),
            "px" => Ok(Self::Pt(value * PT_PER_PX)),
            "in" => Ok(Self::Pt(value * 72.0)),
            "cm" => Ok(Self::Pt(value * 72.0 / 2.54)),
            "mm" => Ok(Self::Pt(value * 72.0 / 25.4)),
            "pc" => Ok(Self::Pt(value * 12.0)),
            "%" => Ok(Self::Percent(value)),
            "em" => Ok(Self::Em(value)),
            other => Err(format!("unsupported length unit '{other}' in '{s}'")),
        }
    }
}

/// Wire form of a length: a bare number (points) or a string with a unit.
#[derive(Deserialize)]
#[serde(untagged)]
enum LengthRepr {
    Number(f32),
    Text(String),
}

impl TryFrom<LengthRepr> for Length {
    type Error = String;

    fn try_from(repr: LengthRepr) -> Result<Self, Self::Error> {
        match repr {
            LengthRepr::Number(n) => Ok(Self::Pt(n)),
            LengthRepr::Text(s) => s.parse(),
        }
    }
}

/// [§ 4.4 Automatic values](https://www.w3.org/TR/CSS2/cascade.html#value-def-auto)
///
/// A length that may be `auto`, used for width/height, margins and the
/// positioning offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LengthRepr", into = "String")]
pub enum LengthOrAuto {
    /// Resolved by the layout algorithm.
    #[default]
    Auto,
    /// A specific length.
    Length(Length),
}

impl LengthOrAuto {
    /// An absolute length in points.
    #[must_use]
    pub const fn pt(value: f32) -> Self {
        Self::Length(Length::Pt(value))
    }

    /// A percentage of the reference length.
    #[must_use]
    pub const fn percent(value: f32) -> Self {
        Self::Length(Length::Percent(value))
    }

    /// Check if the value is `auto`.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }

    /// Resolve to points, or `None` for `auto`.
    #[must_use]
    pub fn to_pt(&self, reference: f32, font_size: f32) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Length(len) => Some(len.to_pt(reference, font_size)),
        }
    }

    /// Resolve against a possibly indefinite reference; `auto` and
    /// unresolvable percentages both yield `None`.
    #[must_use]
    pub fn to_pt_opt(&self, reference: Option<f32>, font_size: f32) -> Option<f32> {
        match self {
            Self::Auto => None,
            Self::Length(len) => len.to_pt_opt(reference, font_size),
        }
    }
}

impl fmt::Display for LengthOrAuto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("auto"),
            Self::Length(len) => len.fmt(f),
        }
    }
}

impl From<LengthOrAuto> for String {
    fn from(value: LengthOrAuto) -> Self {
        value.to_string()
    }
}

impl TryFrom<LengthRepr> for LengthOrAuto {
    type Error = String;

    fn try_from(repr: LengthRepr) -> Result<Self, Self::Error> {
        match repr {
            LengthRepr::Text(s) if s.trim().eq_ignore_ascii_case("auto") => Ok(Self::Auto),
            other => Length::try_from(other).map(Self::Length),
        }
    }
}

/// [§ 10.8.1 'line-height'](https://www.w3.org/TR/CSS2/visudet.html#propdef-line-height)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LengthRepr", into = "String")]
pub enum LineHeight {
    /// Use the font's own height.
    #[default]
    Normal,
    /// A multiple of the font size.
    Number(f32),
    /// An explicit length (percentages are of the font size).
    Length(Length),
}

impl LineHeight {
    /// Resolve to points given the font's natural height and size.
    #[must_use]
    pub fn to_pt(&self, font_height: f32, font_size: f32) -> f32 {
        match self {
            Self::Normal => font_height,
            Self::Number(n) => n * font_size,
            Self::Length(len) => len.to_pt(font_size, font_size),
        }
    }
}

impl fmt::Display for LineHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => f.write_str("normal"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Length(len) => len.fmt(f),
        }
    }
}

impl From<LineHeight> for String {
    fn from(value: LineHeight) -> Self {
        value.to_string()
    }
}

impl TryFrom<LengthRepr> for LineHeight {
    type Error = String;

    fn try_from(repr: LengthRepr) -> Result<Self, Self::Error> {
        match repr {
            LengthRepr::Number(n) => Ok(Self::Number(n)),
            LengthRepr::Text(s) if s.trim().eq_ignore_ascii_case("normal") => Ok(Self::Normal),
            LengthRepr::Text(s) => match s.trim().parse::<f32>() {
                Ok(n) => Ok(Self::Number(n)),
                Err(_) => s.parse().map(Self::Length),
            },
        }
    }
}

/// [§ 4.3.6 Colors](https://www.w3.org/TR/CSS2/syndata.html#color-units)
///
/// sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    /// Red channel (0-255).
    pub r: u8,
    /// Green channel (0-255).
    pub g: u8,
    /// Blue channel (0-255).
    pub b: u8,
    /// Alpha channel (0-255, 255 = opaque).
    pub a: u8,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    /// Black (#000000)
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// White (#ffffff)
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    /// Opaque color from channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let digit = |s: &str| u8::from_str_radix(s, 16).ok();
        let short = |i: usize| digit(&hex.get(i..=i)?.repeat(2));
        let long = |i: usize| digit(hex.get(i..i + 2)?);
        match hex.len() {
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
                a: short(3)?,
            }),
            6 => Some(Self::rgb(long(0)?, long(2)?, long(4)?)),
            8 => Some(Self {
                r: long(0)?,
                g: long(2)?,
                b: long(4)?,
                a: long(6)?,
            }),
            _ => None,
        }
    }

    /// A handful of CSS 2.1 named colors.
    #[must_use]
    pub fn from_named(name: &str) -> Option<Self> {
        let color = match name.to_ascii_lowercase().as_str() {
            "black" => Self::BLACK,
            "white" => Self::WHITE,
            "red" => Self::rgb(255, 0, 0),
            "green" => Self::rgb(0, 128, 0),
            "lime" => Self::rgb(0, 255, 0),
            "blue" => Self::rgb(0, 0, 255),
            "navy" => Self::rgb(0, 0, 128),
            "yellow" => Self::rgb(255, 255, 0),
            "orange" => Self::rgb(255, 165, 0),
            "purple" => Self::rgb(128, 0, 128),
            "maroon" => Self::rgb(128, 0, 0),
            "gray" | "grey" => Self::rgb(128, 128, 128),
            "silver" => Self::rgb(192, 192, 192),
            "transparent" => Self::TRANSPARENT,
            _ => return None,
        };
        Some(color)
    }

    /// Scale the RGB channels (used for 3D border shading).
    #[must_use]
    pub fn shade(self, factor: f32) -> Self {
        let scale = |c: u8| (f32::from(c) * factor).clamp(0.0, 255.0) as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }

    /// Returns true if the color paints nothing.
    #[must_use]
    pub const fn is_transparent(&self) -> bool {
        self.a == 0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02x}", self.a)?;
        }
        Ok(())
    }
}

impl From<Color> for String {
    fn from(value: Color) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
            .filter(|_| value.starts_with('#'))
            .or_else(|| Self::from_named(&value))
            .ok_or_else(|| format!("unrecognised color '{value}'"))
    }
}

/// [§ 8.5 Border properties](https://www.w3.org/TR/CSS2/box.html#border-properties)
///
/// One side of a border: width in points, style and color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderSide {
    /// Specified width in points.
    pub width: f32,
    /// Line style.
    pub style: BorderStyle,
    /// Border color; `None` means `currentColor`.
    pub color: Option<Color>,
}

impl BorderSide {
    /// A solid border.
    #[must_use]
    pub const fn solid(width: f32, color: Color) -> Self {
        Self {
            width,
            style: BorderStyle::Solid,
            color: Some(color),
        }
    }

    /// "the computed border width is zero if the border style is 'none' or 'hidden'"
    #[must_use]
    pub fn used_width(&self) -> f32 {
        if self.style.is_visible() {
            self.width.max(0.0)
        } else {
            0.0
        }
    }
}

/// [§ 5 'border-radius'](https://www.w3.org/TR/css-backgrounds-3/#border-radius)
///
/// Corner radii in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BorderRadius {
    /// Top-left corner.
    pub top_left: f32,
    /// Top-right corner.
    pub top_right: f32,
    /// Bottom-right corner.
    pub bottom_right: f32,
    /// Bottom-left corner.
    pub bottom_left: f32,
}

impl BorderRadius {
    /// Same radius on every corner.
    #[must_use]
    pub const fn uniform(r: f32) -> Self {
        Self {
            top_left: r,
            top_right: r,
            bottom_right: r,
            bottom_left: r,
        }
    }

    /// Returns true when all corners are square.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.top_left <= 0.0
            && self.top_right <= 0.0
            && self.bottom_right <= 0.0
            && self.bottom_left <= 0.0
    }
}

/// [§ 12.2 The 'content' property](https://www.w3.org/TR/CSS2/generate.html#content)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentItem {
    /// A literal string.
    String(String),
    /// `counter(name, style)`
    Counter {
        /// Counter name.
        name: String,
        /// Numbering style.
        #[serde(default)]
        style: ListStyleType,
    },
    /// `counters(name, separator, style)`
    Counters {
        /// Counter name.
        name: String,
        /// Joiner between nesting levels.
        separator: String,
        /// Numbering style.
        #[serde(default)]
        style: ListStyleType,
    },
    /// The opening quote for the current nesting depth.
    OpenQuote,
    /// The closing quote for the current nesting depth.
    CloseQuote,
    /// Increments the nesting depth without rendering anything.
    NoOpenQuote,
    /// Decrements the nesting depth without rendering anything.
    NoCloseQuote,
}

/// [CSS Transforms § 7](https://www.w3.org/TR/css-transforms-1/#transform-functions)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformFunction {
    /// `translate(tx, ty)`; percentages refer to the border box.
    Translate(Length, Length),
    /// `rotate(angle)` in degrees, clockwise.
    Rotate(f32),
    /// `scale(sx, sy)`
    Scale(f32, f32),
    /// `skewX(angle)` in degrees.
    SkewX(f32),
    /// `skewY(angle)` in degrees.
    SkewY(f32),
    /// `matrix(a, b, c, d, e, f)`
    Matrix([f32; 6]),
}

/// [§ 12.4 'counter-reset' / 'counter-increment'](https://www.w3.org/TR/CSS2/generate.html#counters)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterDirective {
    /// Counter name.
    pub name: String,
    /// Reset value or increment amount.
    pub value: i32,
}

impl CounterDirective {
    /// Create a directive.
    #[must_use]
    pub fn new(name: &str, value: i32) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lengths() {
        assert_eq!("12pt".parse::<Length>(), Ok(Length::Pt(12.0)));
        assert_eq!("16px".parse::<Length>(), Ok(Length::Pt(12.0)));
        assert_eq!("1in".parse::<Length>(), Ok(Length::Pt(72.0)));
        assert_eq!("30%".parse::<Length>(), Ok(Length::Percent(30.0)));
        assert_eq!("-1.5em".parse::<Length>(), Ok(Length::Em(-1.5)));
        assert!("12furlongs".parse::<Length>().is_err());
    }

    #[test]
    fn test_percent_resolves_against_reference() {
        assert!((Length::Percent(30.0).to_pt(400.0, 12.0) - 120.0).abs() < 0.001);
        assert_eq!(LengthOrAuto::Auto.to_pt(400.0, 12.0), None);
        assert_eq!(Length::Percent(50.0).to_pt_opt(None, 12.0), None);
    }

    #[test]
    fn test_hex_colors() {
        assert_eq!(Color::from_hex("#fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#ff000080").map(|c| c.a), Some(128));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::rgb(255, 0, 16).to_string(), "#ff0010");
    }

    #[test]
    fn test_deserialize_wire_forms() {
        let width: LengthOrAuto = serde_json::from_str("\"auto\"").unwrap_or_default();
        assert!(width.is_auto());
        let margin: LengthOrAuto =
            serde_json::from_str("10").unwrap_or(LengthOrAuto::Auto);
        assert_eq!(margin, LengthOrAuto::pt(10.0));
        let lh: LineHeight = serde_json::from_str("1.5").unwrap_or_default();
        assert_eq!(lh, LineHeight::Number(1.5));
    }
}
