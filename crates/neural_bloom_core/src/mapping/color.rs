//! HSL color model: hue = topic, saturation = salience, lightness = valence.
//!
//! # Responsibility
//! - Convert HSL to byte-exact RGB/hex with the standard 6-sector formula.
//! - Encode salience/valence/token type/emotion hints as HSL adjustments.
//! - Keep the legacy per-sentiment palettes for the global structure color.
//!
//! # Invariants
//! - Hue is wrapped into [0, 360) before conversion.
//! - Saturation/lightness are percentages clamped to [0, 100] before conversion.
//! - Mapped saturation stays in [25, 100], mapped lightness in [35, 80].

use crate::model::analysis::{DocumentSentiment, Emotion, EmotionHints, SentimentLabel};
use crate::model::text::TypeTag;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const SATURATION_MIN: f64 = 25.0;
pub const SATURATION_MAX: f64 = 100.0;
pub const LIGHTNESS_MIN: f64 = 35.0;
pub const LIGHTNESS_MAX: f64 = 80.0;

const SATURATION_BASE: f64 = 40.0;
const SATURATION_SPAN: f64 = 55.0;
const LIGHTNESS_BASE: f64 = 55.0;
const LIGHTNESS_SPAN: f64 = 12.0;

/// Clamps into [0, 1]; non-finite input maps to 0.
pub fn clamp01(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Wraps a hue in degrees into [0, 360).
pub fn wrap_hue(hue: f64) -> f64 {
    if !hue.is_finite() {
        return 0.0;
    }
    let mut wrapped = hue % 360.0;
    if wrapped < 0.0 {
        wrapped += 360.0;
    }
    // -1e-15 + 360.0 rounds up to 360.0.
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// 8-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`, lowercase.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// HSL color; `h` in degrees, `s`/`l` in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Wraps hue and clamps saturation/lightness into the mapped ranges.
    pub fn bounded(self) -> Self {
        Self {
            h: wrap_hue(self.h),
            s: self.s.clamp(SATURATION_MIN, SATURATION_MAX),
            l: self.l.clamp(LIGHTNESS_MIN, LIGHTNESS_MAX),
        }
    }

    /// Adds the tint of every active emotion, then re-bounds.
    pub fn with_emotions(self, hints: &EmotionHints) -> Self {
        hints
            .active()
            .map(EmotionTint::for_emotion)
            .fold(self, |color, tint| Self {
                h: color.h + tint.hue,
                s: color.s + tint.sat,
                l: color.l + tint.light,
            })
            .bounded()
    }

    pub fn to_rgb(self) -> Rgb {
        hsl_to_rgb(self.h, self.s, self.l)
    }

    pub fn to_hex(self) -> String {
        self.to_rgb().to_hex()
    }
}

/// Converts HSL (degrees, percent, percent) to RGB.
pub fn hsl_to_rgb(hue: f64, saturation_pct: f64, lightness_pct: f64) -> Rgb {
    let s = clamp01(saturation_pct / 100.0);
    let l = clamp01(lightness_pct / 100.0);
    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let sector = wrap_hue(hue) / 60.0;
    let x = chroma * (1.0 - ((sector % 2.0) - 1.0).abs());

    let (r, g, b) = if sector < 1.0 {
        (chroma, x, 0.0)
    } else if sector < 2.0 {
        (x, chroma, 0.0)
    } else if sector < 3.0 {
        (0.0, chroma, x)
    } else if sector < 4.0 {
        (0.0, x, chroma)
    } else if sector < 5.0 {
        (x, 0.0, chroma)
    } else {
        (chroma, 0.0, x)
    };

    let m = l - chroma / 2.0;
    Rgb::new(channel(r + m), channel(g + m), channel(b + m))
}

/// Converts HSL (degrees, percent, percent) to `#rrggbb`.
pub fn hsl_to_hex(hue: f64, saturation_pct: f64, lightness_pct: f64) -> String {
    hsl_to_rgb(hue, saturation_pct, lightness_pct).to_hex()
}

fn channel(value: f64) -> u8 {
    (clamp01(value) * 255.0).round() as u8
}

/// Hex color parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    InvalidLength(String),
    InvalidDigit(String),
}

impl Display for ColorParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLength(value) => {
                write!(f, "hex color must have 3 or 6 digits: `{value}`")
            }
            Self::InvalidDigit(value) => write!(f, "hex color has invalid digits: `{value}`"),
        }
    }
}

impl Error for ColorParseError {}

/// Parses `#rgb`, `#rrggbb` (leading `#` optional).
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorParseError> {
    let clean = hex.trim().trim_start_matches('#');
    let expanded = match clean.len() {
        3 => clean.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => clean.to_string(),
        _ => return Err(ColorParseError::InvalidLength(hex.to_string())),
    };
    let value = u32::from_str_radix(&expanded, 16)
        .map_err(|_| ColorParseError::InvalidDigit(hex.to_string()))?;
    Ok(Rgb::new(
        ((value >> 16) & 0xff) as u8,
        ((value >> 8) & 0xff) as u8,
        (value & 0xff) as u8,
    ))
}

/// Formats 8-bit channels as `#rrggbb`.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    Rgb::new(r, g, b).to_hex()
}

/// Linear RGB blend; `t = 0` yields `a`, `t = 1` yields `b`.
pub fn mix_colors(a: &str, b: &str, t: f64) -> Result<String, ColorParseError> {
    let a = hex_to_rgb(a)?;
    let b = hex_to_rgb(b)?;
    let t = clamp01(t);
    let blend = |x: u8, y: u8| (f64::from(x) * (1.0 - t) + f64::from(y) * t).round() as u8;
    Ok(rgb_to_hex(blend(a.r, b.r), blend(a.g, b.g), blend(a.b, b.b)))
}

/// Per-emotion HSL nudge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmotionTint {
    pub hue: f64,
    pub sat: f64,
    pub light: f64,
}

impl EmotionTint {
    pub fn for_emotion(emotion: Emotion) -> Self {
        let (hue, sat, light) = match emotion {
            Emotion::Joy => (8.0, 6.0, 4.0),
            Emotion::Anger => (14.0, 8.0, -4.0),
            Emotion::Sadness => (-10.0, 4.0, -6.0),
            Emotion::Fear => (-6.0, 5.0, -2.0),
        };
        Self { hue, sat, light }
    }
}

/// Hue offset in degrees by token type.
pub fn type_hue_bias(tag: TypeTag) -> f64 {
    match tag {
        TypeTag::Name => 10.0,
        TypeTag::Number | TypeTag::Date => 6.0,
        TypeTag::Url => -12.0,
        TypeTag::Word | TypeTag::Punct => 0.0,
    }
}

/// Saturation percent from salience.
pub fn salience_saturation(salience: f64) -> f64 {
    (SATURATION_BASE + clamp01(salience) * SATURATION_SPAN).clamp(SATURATION_MIN, SATURATION_MAX)
}

/// Lightness percent from signed valence.
pub fn valence_lightness(signed: f64) -> f64 {
    let signed = if signed.is_finite() { signed } else { 0.0 };
    let sign = if signed > 0.0 {
        1.0
    } else if signed < 0.0 {
        -1.0
    } else {
        0.0
    };
    (LIGHTNESS_BASE + sign * LIGHTNESS_SPAN * clamp01(signed.abs()))
        .clamp(LIGHTNESS_MIN, LIGHTNESS_MAX)
}

/// Global particle base hue in turns.
pub fn base_hue(label: SentimentLabel) -> f64 {
    match label {
        SentimentLabel::Positive => 0.5,
        SentimentLabel::Negative => 0.8,
        SentimentLabel::Neutral => 0.62,
    }
}

const POSITIVE_PALETTE: [&str; 3] = ["#FFD700", "#FF6B6B", "#4ECDC4"];
const NEGATIVE_PALETTE: [&str; 3] = ["#6C5CE7", "#00B4D8", "#5A189A"];
const NEUTRAL_PALETTE: [&str; 3] = ["#9CA3AF", "#60A5FA", "#34D399"];

/// Three-color palette for one sentiment label.
pub fn palette(label: SentimentLabel) -> &'static [&'static str; 3] {
    match label {
        SentimentLabel::Positive => &POSITIVE_PALETTE,
        SentimentLabel::Negative => &NEGATIVE_PALETTE,
        SentimentLabel::Neutral => &NEUTRAL_PALETTE,
    }
}

/// Picks the global structure color from the sentiment palette.
///
/// Emotion hints shift the palette index: joy +1, anger +2, sadness -1.
pub fn sentiment_to_color(sentiment: DocumentSentiment, hints: &EmotionHints) -> &'static str {
    let colors = palette(sentiment.label);
    let bias = [
        (hints.joy, 1.0),
        (hints.anger, 2.0),
        (hints.sadness, -1.0),
    ]
    .into_iter()
    .filter(|(active, _)| *active)
    .map(|(_, shift)| shift)
    .sum::<f64>();

    let raw = (clamp01(sentiment.score) * colors.len() as f64 + bias).floor();
    let index = (raw.abs() as usize) % colors.len();
    colors[index]
}

#[cfg(test)]
mod tests {
    use super::{
        hex_to_rgb, hsl_to_hex, mix_colors, salience_saturation, sentiment_to_color,
        valence_lightness, wrap_hue, ColorParseError, Hsl, Rgb,
    };
    use crate::model::analysis::{DocumentSentiment, EmotionHints, SentimentLabel};

    #[test]
    fn primary_hues_convert_exactly() {
        assert_eq!(hsl_to_hex(0.0, 100.0, 50.0), "#ff0000");
        assert_eq!(hsl_to_hex(120.0, 100.0, 50.0), "#00ff00");
        assert_eq!(hsl_to_hex(240.0, 100.0, 50.0), "#0000ff");
    }

    #[test]
    fn out_of_range_inputs_are_wrapped_and_clamped() {
        assert_eq!(hsl_to_hex(-30.0, 80.0, 60.0), "#eb4799");
        assert_eq!(hsl_to_hex(725.0, 40.0, 55.0), "#ba665e");
        assert_eq!(hsl_to_hex(33.3, 150.0, -5.0), "#000000");
    }

    #[test]
    fn wrap_hue_stays_in_range() {
        assert_eq!(wrap_hue(360.0), 0.0);
        assert_eq!(wrap_hue(-90.0), 270.0);
        assert!(wrap_hue(-1e-15) < 360.0);
        assert_eq!(wrap_hue(f64::NAN), 0.0);
    }

    #[test]
    fn hex_parsing_accepts_short_and_long_forms() {
        assert_eq!(hex_to_rgb("#fff").expect("short form"), Rgb::new(255, 255, 255));
        assert_eq!(hex_to_rgb("2e73b8").expect("long form"), Rgb::new(46, 115, 184));
        assert!(matches!(
            hex_to_rgb("#12345"),
            Err(ColorParseError::InvalidLength(_))
        ));
        assert!(matches!(
            hex_to_rgb("#zzzzzz"),
            Err(ColorParseError::InvalidDigit(_))
        ));
    }

    #[test]
    fn mix_colors_blends_linearly() {
        assert_eq!(
            mix_colors("#000000", "#ffffff", 0.5).expect("valid colors"),
            "#808080"
        );
        assert_eq!(
            mix_colors("#ff0000", "#0000ff", 0.0).expect("valid colors"),
            "#ff0000"
        );
    }

    #[test]
    fn saturation_and_lightness_ranges() {
        assert_eq!(salience_saturation(0.0), 40.0);
        assert_eq!(salience_saturation(1.0), 95.0);
        assert_eq!(salience_saturation(7.0), 95.0);
        assert_eq!(valence_lightness(0.0), 55.0);
        assert_eq!(valence_lightness(1.0), 67.0);
        assert_eq!(valence_lightness(-0.5), 49.0);
    }

    #[test]
    fn emotion_tints_accumulate_and_rebound() {
        let hints = EmotionHints {
            joy: true,
            anger: true,
            sadness: false,
            fear: false,
        };
        let tinted = Hsl::new(355.0, 95.0, 78.0).with_emotions(&hints);
        assert_eq!(tinted.h, 17.0);
        assert_eq!(tinted.s, 100.0);
        assert_eq!(tinted.l, 78.0);
    }

    #[test]
    fn palette_index_follows_score_and_hints() {
        let sentiment = DocumentSentiment {
            label: SentimentLabel::Positive,
            score: 0.5,
        };
        assert_eq!(
            sentiment_to_color(sentiment, &EmotionHints::default()),
            "#FF6B6B"
        );
        let joyful = EmotionHints {
            joy: true,
            ..EmotionHints::default()
        };
        assert_eq!(sentiment_to_color(sentiment, &joyful), "#4ECDC4");
    }
}
