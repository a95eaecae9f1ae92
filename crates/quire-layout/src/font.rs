//! Font metrics provider interface.
//!
//! Glyph lookup and shaping live outside the layout core. Layout only asks
//! three questions of a font: how wide is this run, how tall is a line, and
//! where does the baseline sit.

/// Font metric lookup supplied by the host.
pub trait FontMetrics {
    /// Advance width of `text`, including `word_spacing` added at every space
    /// and `char_spacing` added after every character.
    fn text_width(
        &self,
        text: &str,
        font: &str,
        size: f32,
        word_spacing: f32,
        char_spacing: f32,
    ) -> f32;

    /// Natural height of a line set in this font (ascent + descent + gap).
    ///
    /// [§ 10.8.1 Leading and half-leading](https://www.w3.org/TR/CSS2/visudet.html#leading)
    ///
    /// This is the used value of `line-height: normal`.
    fn font_height(&self, font: &str, size: f32) -> f32;

    /// Distance from the top of the font's em box down to its baseline.
    fn font_baseline(&self, font: &str, size: f32) -> f32;
}

/// Approximate font metrics using fixed ratios.
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
///
/// Every glyph advances half an em; lines are 1.2em tall with the baseline
/// at 0.8em. Deterministic and font-free, which makes it the metrics of
/// choice for tests and the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproximateFontMetrics;

impl ApproximateFontMetrics {
    /// Advance of one glyph as a fraction of the font size.
    pub const CHAR_WIDTH_RATIO: f32 = 0.5;
    /// `line-height: normal` as a fraction of the font size.
    pub const LINE_HEIGHT_RATIO: f32 = 1.2;
    /// Baseline offset as a fraction of the font size.
    pub const BASELINE_RATIO: f32 = 0.8;
}

impl FontMetrics for ApproximateFontMetrics {
    fn text_width(
        &self,
        text: &str,
        _font: &str,
        size: f32,
        word_spacing: f32,
        char_spacing: f32,
    ) -> f32 {
        let chars = text.chars().count() as f32;
        let spaces = text.chars().filter(|c| *c == ' ').count() as f32;
        chars * (size * Self::CHAR_WIDTH_RATIO + char_spacing) + spaces * word_spacing
    }

    fn font_height(&self, _font: &str, size: f32) -> f32 {
        size * Self::LINE_HEIGHT_RATIO
    }

    fn font_baseline(&self, _font: &str, size: f32) -> f32 {
        size * Self::BASELINE_RATIO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_is_added_per_space_and_glyph() {
        let m = ApproximateFontMetrics;
        let plain = m.text_width("ab cd", "serif", 10.0, 0.0, 0.0);
        assert!((plain - 25.0).abs() < 0.001);
        let spaced = m.text_width("ab cd", "serif", 10.0, 3.0, 1.0);
        assert!((spaced - (25.0 + 3.0 + 5.0)).abs() < 0.001);
    }
}
