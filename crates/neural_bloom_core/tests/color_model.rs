use neural_bloom_core::mapping::color::{sentiment_to_color, valence_lightness};
use neural_bloom_core::{
    hex_to_rgb, hsl_to_hex, mix_colors, DocumentSentiment, EmotionHints, Hsl, Rgb,
    SentimentLabel,
};

/// Reference conversion using the hue-to-channel formulation.
fn reference_rgb(h: f64, s: f64, l: f64) -> (f64, f64, f64) {
    let h = h.rem_euclid(360.0) / 360.0;
    let s = (s / 100.0).clamp(0.0, 1.0);
    let l = (l / 100.0).clamp(0.0, 1.0);
    if s == 0.0 {
        return (l * 255.0, l * 255.0, l * 255.0);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |mut t: f64| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        v * 255.0
    };
    (channel(h + 1.0 / 3.0), channel(h), channel(h - 1.0 / 3.0))
}

#[test]
fn hex_round_trip_matches_reference_within_one() {
    for h in (-360..=720).step_by(37) {
        for s in (0..=100).step_by(20) {
            for l in (0..=100).step_by(20) {
                let (h, s, l) = (f64::from(h), f64::from(s), f64::from(l));
                let rgb = hex_to_rgb(&hsl_to_hex(h, s, l)).unwrap();
                let (r, g, b) = reference_rgb(h, s, l);
                for (got, want) in [(rgb.r, r), (rgb.g, g), (rgb.b, b)] {
                    assert!(
                        (f64::from(got) - want).abs() <= 1.0,
                        "hsl({h},{s},{l}) channel {got} vs {want}"
                    );
                }
            }
        }
    }
}

#[test]
fn known_conversions_are_byte_exact() {
    assert_eq!(hsl_to_hex(210.0, 60.0, 45.0), "#2e73b8");
    assert_eq!(hsl_to_hex(300.0, 50.0, 75.0), "#df9fdf");
    assert_eq!(hsl_to_hex(359.9, 95.0, 35.0), "#ae0405");
    assert_eq!(Hsl::new(210.0, 60.0, 45.0).to_rgb(), Rgb::new(46, 115, 184));
}

#[test]
fn bounded_color_stays_in_mapped_ranges() {
    let hsl = Hsl::new(-725.0, 3.0, 99.0).bounded();
    assert!((0.0..360.0).contains(&hsl.h));
    assert_eq!(hsl.s, 25.0);
    assert_eq!(hsl.l, 80.0);
}

#[test]
fn valence_moves_lightness_symmetrically() {
    assert_eq!(valence_lightness(0.5) - 55.0, 55.0 - valence_lightness(-0.5));
    assert_eq!(valence_lightness(f64::NAN), 55.0);
}

#[test]
fn palette_colors_and_mixing() {
    let neutral = DocumentSentiment {
        label: SentimentLabel::Neutral,
        score: 0.0,
    };
    assert_eq!(sentiment_to_color(neutral, &EmotionHints::default()), "#9CA3AF");

    let angry = EmotionHints {
        anger: true,
        ..EmotionHints::default()
    };
    assert_eq!(sentiment_to_color(neutral, &angry), "#34D399");

    assert_eq!(mix_colors("#FFD700", "#FFD700", 0.3).unwrap(), "#ffd700");
    assert!(mix_colors("#FFD7", "#000", 0.5).is_err());
}
