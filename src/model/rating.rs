use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::metric::MetricKind;

/// Star count on the widened 0-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Stars(u8);

impl Stars {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 5;

    pub fn new(count: u8) -> Option<Self> {
        (count <= Self::MAX).then_some(Self(count))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl Default for Stars {
    fn default() -> Self {
        Self(Self::MIN)
    }
}

impl TryFrom<u8> for Stars {
    type Error = String;

    fn try_from(count: u8) -> Result<Self, Self::Error> {
        Stars::new(count).ok_or_else(|| {
            format!("star rating {} outside {}..={}", count, Stars::MIN, Stars::MAX)
        })
    }
}

impl From<Stars> for u8 {
    fn from(stars: Stars) -> u8 {
        stars.0
    }
}

/// Rating for a bad/neutral/good metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Sentiment {
    Bad,
    #[default]
    Neutral,
    Good,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Bad => "bad",
            Sentiment::Neutral => "neutral",
            Sentiment::Good => "good",
        }
    }
}

/// The value entered for one (comparable, metric) cell.
///
/// The variant must agree with the kind of the metric owning the column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Boolean(bool),
    Stars(Stars),
    Sentiment(Sentiment),
    Numeric(f64),
}

impl Rating {
    /// Metric kind this rating belongs to.
    pub fn kind(&self) -> MetricKind {
        match self {
            Rating::Boolean(_) => MetricKind::Boolean,
            Rating::Stars(_) => MetricKind::FiveStar,
            Rating::Sentiment(_) => MetricKind::BadNeutralGood,
            Rating::Numeric(_) => MetricKind::Numeric,
        }
    }

    /// Parse user input for a column of the given kind.
    pub fn parse(kind: MetricKind, input: &str) -> Result<Self, RatingParseError> {
        let s = input.trim();
        let invalid = || RatingParseError {
            kind,
            input: input.to_string(),
        };

        match kind {
            MetricKind::Boolean => match s.to_ascii_lowercase().as_str() {
                "true" | "yes" | "y" | "1" => Ok(Rating::Boolean(true)),
                "false" | "no" | "n" | "0" => Ok(Rating::Boolean(false)),
                _ => Err(invalid()),
            },
            MetricKind::FiveStar => s
                .parse::<u8>()
                .ok()
                .and_then(Stars::new)
                .map(Rating::Stars)
                .ok_or_else(invalid),
            MetricKind::BadNeutralGood => match s.to_ascii_lowercase().as_str() {
                "bad" => Ok(Rating::Sentiment(Sentiment::Bad)),
                "neutral" => Ok(Rating::Sentiment(Sentiment::Neutral)),
                "good" => Ok(Rating::Sentiment(Sentiment::Good)),
                _ => Err(invalid()),
            },
            MetricKind::Numeric => match s.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Rating::Numeric(v)),
                _ => Err(invalid()),
            },
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rating::Boolean(true) => write!(f, "yes"),
            Rating::Boolean(false) => write!(f, "no"),
            Rating::Stars(stars) => {
                let filled = stars.get() as usize;
                let empty = (Stars::MAX - stars.get()) as usize;
                write!(f, "{}{}", "★".repeat(filled), "☆".repeat(empty))
            }
            Rating::Sentiment(sentiment) => write!(f, "{}", sentiment.as_str()),
            Rating::Numeric(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("'{input}' is not a valid {kind} rating ({hint})", hint = .kind.input_hint())]
pub struct RatingParseError {
    pub kind: MetricKind,
    pub input: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars_bounds() {
        assert_eq!(Stars::new(0).map(Stars::get), Some(0));
        assert_eq!(Stars::new(5).map(Stars::get), Some(5));
        assert!(Stars::new(6).is_none());
    }

    #[test]
    fn test_stars_reject_out_of_range_on_deserialize() {
        let result: Result<Stars, _> = serde_json::from_str("7");
        assert!(result.is_err());
        let ok: Stars = serde_json::from_str("4").unwrap();
        assert_eq!(ok.get(), 4);
    }

    #[test]
    fn test_parse_boolean() {
        assert_eq!(Rating::parse(MetricKind::Boolean, "yes").unwrap(), Rating::Boolean(true));
        assert_eq!(Rating::parse(MetricKind::Boolean, " False ").unwrap(), Rating::Boolean(false));
        assert!(Rating::parse(MetricKind::Boolean, "maybe").is_err());
    }

    #[test]
    fn test_parse_stars() {
        assert_eq!(
            Rating::parse(MetricKind::FiveStar, "3").unwrap(),
            Rating::Stars(Stars::new(3).unwrap())
        );
        assert!(Rating::parse(MetricKind::FiveStar, "6").is_err());
        assert!(Rating::parse(MetricKind::FiveStar, "-1").is_err());
    }

    #[test]
    fn test_parse_sentiment() {
        assert_eq!(
            Rating::parse(MetricKind::BadNeutralGood, "Good").unwrap(),
            Rating::Sentiment(Sentiment::Good)
        );
        assert!(Rating::parse(MetricKind::BadNeutralGood, "great").is_err());
    }

    #[test]
    fn test_parse_numeric_rejects_non_finite() {
        assert_eq!(Rating::parse(MetricKind::Numeric, "1400").unwrap(), Rating::Numeric(1400.0));
        assert!(Rating::parse(MetricKind::Numeric, "NaN").is_err());
        assert!(Rating::parse(MetricKind::Numeric, "inf").is_err());
        assert!(Rating::parse(MetricKind::Numeric, "").is_err());
    }

    #[test]
    fn test_parse_error_message_names_kind() {
        let err = Rating::parse(MetricKind::FiveStar, "ten").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'ten'"), "got: {}", msg);
        assert!(msg.contains("five-star"), "got: {}", msg);
    }

    #[test]
    fn test_rating_kind() {
        assert_eq!(Rating::Boolean(true).kind(), MetricKind::Boolean);
        assert_eq!(Rating::Stars(Stars::default()).kind(), MetricKind::FiveStar);
        assert_eq!(Rating::Sentiment(Sentiment::Bad).kind(), MetricKind::BadNeutralGood);
        assert_eq!(Rating::Numeric(1.0).kind(), MetricKind::Numeric);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rating::Boolean(true).to_string(), "yes");
        assert_eq!(Rating::Stars(Stars::new(2).unwrap()).to_string(), "★★☆☆☆");
        assert_eq!(Rating::Sentiment(Sentiment::Neutral).to_string(), "neutral");
        assert_eq!(Rating::Numeric(760.0).to_string(), "760");
    }
}
