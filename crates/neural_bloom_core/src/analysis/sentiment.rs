//! Sentence-level sentiment to document label calibration.
//!
//! # Invariants
//! - `mean_signed` is the plain average of signed sentence scores (0 when empty).
//! - Confidence is 0 anywhere inside the neutral dead-zone.

use crate::inference::SentimentPrediction;
use crate::mapping::color::clamp01;
use crate::model::analysis::{DocumentSentiment, SentimentLabel};
use crate::model::text::Sentence;

/// Calibrated document sentiment plus the per-sentence inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct CalibratedSentiment {
    pub document: DocumentSentiment,
    pub mean_signed: f64,
    /// Signed score per scored sentence, in input order.
    pub sentence_signed: Vec<f64>,
}

/// Folds sentence predictions into a document label and confidence.
pub fn calibrate(predictions: &[SentimentPrediction], margin: f64) -> CalibratedSentiment {
    let sentence_signed: Vec<f64> = predictions
        .iter()
        .map(|prediction| prediction.signed().clamp(-1.0, 1.0))
        .collect();

    let mean_signed = if sentence_signed.is_empty() {
        0.0
    } else {
        sentence_signed.iter().sum::<f64>() / sentence_signed.len() as f64
    };

    let label = SentimentLabel::from_signed(mean_signed, margin);
    let score = clamp01((mean_signed.abs() - margin) / (1.0 - margin));

    CalibratedSentiment {
        document: DocumentSentiment { label, score },
        mean_signed,
        sentence_signed,
    }
}

/// Writes signed scores onto the leading sentences; later sentences stay at 0.
pub fn apply_sentence_scores(sentences: &mut [Sentence], signed: &[f64]) {
    for (sentence, value) in sentences.iter_mut().zip(signed) {
        sentence.signed_sentiment = *value;
        sentence.score = value.abs();
    }
}

#[cfg(test)]
mod tests {
    use super::{apply_sentence_scores, calibrate};
    use crate::inference::{Polarity, SentimentPrediction};
    use crate::model::analysis::SentimentLabel;
    use crate::model::text::Sentence;

    fn prediction(label: Polarity, score: f64) -> SentimentPrediction {
        SentimentPrediction::new(label, score)
    }

    #[test]
    fn positive_lean_above_margin() {
        let calibrated = calibrate(
            &[
                prediction(Polarity::Positive, 0.5),
                prediction(Polarity::Positive, 0.0),
            ],
            0.15,
        );
        assert_eq!(calibrated.mean_signed, 0.25);
        assert_eq!(calibrated.document.label, SentimentLabel::Positive);
        assert!((calibrated.document.score - 0.1 / 0.85).abs() < 1e-12);
    }

    #[test]
    fn opposing_sentences_cancel_to_neutral() {
        let calibrated = calibrate(
            &[
                prediction(Polarity::Positive, 0.9),
                prediction(Polarity::Negative, 0.8),
            ],
            0.15,
        );
        assert_eq!(calibrated.document.label, SentimentLabel::Neutral);
        assert_eq!(calibrated.document.score, 0.0);
    }

    #[test]
    fn strong_negative_reaches_full_confidence() {
        let calibrated = calibrate(&[prediction(Polarity::Negative, 1.0)], 0.15);
        assert_eq!(calibrated.document.label, SentimentLabel::Negative);
        assert_eq!(calibrated.document.score, 1.0);
    }

    #[test]
    fn empty_predictions_are_neutral() {
        let calibrated = calibrate(&[], 0.15);
        assert_eq!(calibrated.document.label, SentimentLabel::Neutral);
        assert_eq!(calibrated.mean_signed, 0.0);
    }

    #[test]
    fn scores_are_applied_to_leading_sentences_only() {
        let mut sentences = vec![
            Sentence::new(0, "a", 0, 1),
            Sentence::new(1, "b", 2, 3),
        ];
        apply_sentence_scores(&mut sentences, &[-0.4]);
        assert_eq!(sentences[0].signed_sentiment, -0.4);
        assert_eq!(sentences[0].score, 0.4);
        assert_eq!(sentences[1].signed_sentiment, 0.0);
    }
}
