//! Per-kind normalization of a rating into a sub-score in [0, 1].
//!
//! Numeric edge cases all resolve the same way: a rating equal to its
//! column's best scores 1, and any other ratio that cannot be computed (zero
//! denominator) or falls outside [0, 1] (negative inputs) scores 0.

use crate::model::{MetricRule, Rating, Sentiment, Stars};

pub fn boolean_subscore(rating: bool, true_is_better: bool) -> f64 {
    if rating == true_is_better {
        1.0
    } else {
        0.0
    }
}

pub fn stars_subscore(stars: Stars) -> f64 {
    f64::from(stars.get()) / f64::from(Stars::MAX)
}

/// bad = 0, neutral = 0.5, good = 1
pub fn sentiment_subscore(sentiment: Sentiment) -> f64 {
    match sentiment {
        Sentiment::Bad => 0.0,
        Sentiment::Neutral => 0.5,
        Sentiment::Good => 1.0,
    }
}

/// Best value of a numeric column: the max when higher is better, else the min.
/// None for an empty column.
pub fn column_best(values: impl IntoIterator<Item = f64>, higher_is_better: bool) -> Option<f64> {
    values.into_iter().reduce(|best, v| {
        if higher_is_better {
            best.max(v)
        } else {
            best.min(v)
        }
    })
}

/// Ratio of a rating to its column's best: `rating / max` when higher is
/// better, `min / rating` when lower is better.
///
/// Only the best value scores 1. A ratio outside [0, 1] (signs differ, or both
/// values are negative so the division inverts the order) scores 0, so no
/// worse rating ever outscores a better one.
pub fn numeric_subscore(rating: f64, best: f64, higher_is_better: bool) -> f64 {
    if rating == best {
        return 1.0;
    }
    let ratio = if higher_is_better {
        rating / best
    } else {
        best / rating
    };
    if ratio.is_finite() && (0.0..=1.0).contains(&ratio) {
        ratio
    } else {
        0.0
    }
}

/// Sub-score of `rating` under `rule`.
///
/// `numeric_best` is the column best for numeric metrics (ignored otherwise).
/// Returns None when the rating does not belong to the metric's kind.
pub fn subscore(rule: &MetricRule, rating: &Rating, numeric_best: Option<f64>) -> Option<f64> {
    match (rule, rating) {
        (MetricRule::Boolean { true_is_better }, Rating::Boolean(v)) => {
            Some(boolean_subscore(*v, *true_is_better))
        }
        (MetricRule::FiveStar, Rating::Stars(stars)) => Some(stars_subscore(*stars)),
        (MetricRule::BadNeutralGood, Rating::Sentiment(s)) => Some(sentiment_subscore(*s)),
        (MetricRule::Numeric { higher_is_better }, Rating::Numeric(v)) => {
            // A column holding this rating always has a best
            let best = numeric_best.unwrap_or(*v);
            Some(numeric_subscore(*v, best, *higher_is_better))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_agreement() {
        assert_eq!(boolean_subscore(true, true), 1.0);
        assert_eq!(boolean_subscore(false, true), 0.0);
        assert_eq!(boolean_subscore(false, false), 1.0);
        assert_eq!(boolean_subscore(true, false), 0.0);
    }

    #[test]
    fn test_stars() {
        assert_eq!(stars_subscore(Stars::new(0).unwrap()), 0.0);
        assert_eq!(stars_subscore(Stars::new(4).unwrap()), 0.8);
        assert_eq!(stars_subscore(Stars::new(5).unwrap()), 1.0);
    }

    #[test]
    fn test_sentiment_is_monotonic() {
        let bad = sentiment_subscore(Sentiment::Bad);
        let neutral = sentiment_subscore(Sentiment::Neutral);
        let good = sentiment_subscore(Sentiment::Good);
        assert!(bad < neutral && neutral < good);
        assert_eq!((bad, neutral, good), (0.0, 0.5, 1.0));
    }

    #[test]
    fn test_column_best() {
        assert_eq!(column_best([1400.0, 1200.0], true), Some(1400.0));
        assert_eq!(column_best([1400.0, 1200.0], false), Some(1200.0));
        assert_eq!(column_best(Vec::<f64>::new(), true), None);
    }

    #[test]
    fn test_numeric_ratio_to_best() {
        assert_eq!(numeric_subscore(760.0, 760.0, true), 1.0);
        assert!((numeric_subscore(700.0, 760.0, true) - 700.0 / 760.0).abs() < 1e-12);
        assert_eq!(numeric_subscore(1200.0, 1200.0, false), 1.0);
        assert!((numeric_subscore(1400.0, 1200.0, false) - 1200.0 / 1400.0).abs() < 1e-12);
    }

    #[test]
    fn test_numeric_zero_best_higher_is_better() {
        // Column [0, 0]: both rows hold the best value
        assert_eq!(numeric_subscore(0.0, 0.0, true), 1.0);
        // Column [-5, 0]: max is 0, -5 / 0 is not a usable ratio
        assert_eq!(numeric_subscore(-5.0, 0.0, true), 0.0);
    }

    #[test]
    fn test_numeric_zero_rating_lower_is_better() {
        // A zero rating in a lower-is-better column is the minimum itself
        assert_eq!(numeric_subscore(0.0, 0.0, false), 1.0);
        // Other rows compare against a zero minimum
        assert_eq!(numeric_subscore(10.0, 0.0, false), 0.0);
        // Negative minimum over a zero rating
        assert_eq!(numeric_subscore(0.0, -5.0, false), 0.0);
    }

    #[test]
    fn test_numeric_negative_values_never_outscore_the_best() {
        assert_eq!(numeric_subscore(-5.0, 10.0, true), 0.0);
        // Column [-10, -5], higher is better: -5 is the best
        assert_eq!(numeric_subscore(-5.0, -5.0, true), 1.0);
        assert_eq!(numeric_subscore(-10.0, -5.0, true), 0.0);
        // Same column, lower is better: -10 is the best
        assert_eq!(numeric_subscore(-10.0, -10.0, false), 1.0);
        assert_eq!(numeric_subscore(-5.0, -10.0, false), 0.0);
    }

    #[test]
    fn test_subscore_dispatch() {
        let rule = MetricRule::Numeric {
            higher_is_better: true,
        };
        assert_eq!(subscore(&rule, &Rating::Numeric(5.0), Some(10.0)), Some(0.5));
        assert_eq!(subscore(&rule, &Rating::Boolean(true), Some(10.0)), None);

        let rule = MetricRule::BadNeutralGood;
        assert_eq!(
            subscore(&rule, &Rating::Sentiment(Sentiment::Good), None),
            Some(1.0)
        );
    }
}
