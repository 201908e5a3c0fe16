use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::rating::{Rating, Sentiment, Stars};

/// One weighted evaluation criterion.
///
/// Example JSON:
/// ```json
/// { "name": "Rent", "relative_importance": 1.0, "kind": "numeric", "higher_is_better": false }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub name: String,

    /// Non-negative weight applied to the sub-score (default: 1.0)
    #[serde(default = "default_importance")]
    pub relative_importance: f64,

    #[serde(flatten)]
    pub rule: MetricRule,
}

fn default_importance() -> f64 {
    1.0
}

/// Kind-specific part of a metric. Each variant carries only its own fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MetricRule {
    Boolean { true_is_better: bool },
    FiveStar,
    BadNeutralGood,
    Numeric { higher_is_better: bool },
}

impl MetricRule {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricRule::Boolean { .. } => MetricKind::Boolean,
            MetricRule::FiveStar => MetricKind::FiveStar,
            MetricRule::BadNeutralGood => MetricKind::BadNeutralGood,
            MetricRule::Numeric { .. } => MetricKind::Numeric,
        }
    }
}

impl Metric {
    pub fn kind(&self) -> MetricKind {
        self.rule.kind()
    }

    /// Human-readable direction, e.g. "Higher is better"
    pub fn interpretation(&self) -> &'static str {
        match self.rule {
            MetricRule::Boolean { true_is_better: true } => "True is better",
            MetricRule::Boolean { true_is_better: false } => "False is better",
            MetricRule::Numeric { higher_is_better: true } => "Higher is better",
            MetricRule::Numeric { higher_is_better: false } => "Lower is better",
            MetricRule::FiveStar | MetricRule::BadNeutralGood => "N/A",
        }
    }

    /// Merge a patch into this metric. Callers check
    /// [`MetricPatch::conflicting_field`] first; a direction flag that does not
    /// belong to this metric's kind is ignored here.
    pub fn merge(&mut self, patch: MetricPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(weight) = patch.relative_importance {
            self.relative_importance = weight;
        }
        match &mut self.rule {
            MetricRule::Boolean { true_is_better } => {
                if let Some(v) = patch.true_is_better {
                    *true_is_better = v;
                }
            }
            MetricRule::Numeric { higher_is_better } => {
                if let Some(v) = patch.higher_is_better {
                    *higher_is_better = v;
                }
            }
            MetricRule::FiveStar | MetricRule::BadNeutralGood => {}
        }
    }
}

/// Partial update for a metric's name, weight or direction. Never changes kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricPatch {
    pub name: Option<String>,
    pub relative_importance: Option<f64>,
    pub true_is_better: Option<bool>,
    pub higher_is_better: Option<bool>,
}

impl MetricPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.relative_importance.is_none()
            && self.true_is_better.is_none()
            && self.higher_is_better.is_none()
    }

    /// Name of a field in this patch that `kind` does not have, if any.
    pub fn conflicting_field(&self, kind: MetricKind) -> Option<&'static str> {
        if self.true_is_better.is_some() && kind != MetricKind::Boolean {
            return Some("true_is_better");
        }
        if self.higher_is_better.is_some() && kind != MetricKind::Numeric {
            return Some("higher_is_better");
        }
        None
    }
}

/// Field-less tag for the metric kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Boolean,
    FiveStar,
    BadNeutralGood,
    Numeric,
}

impl MetricKind {
    pub const ALL: [MetricKind; 4] = [
        MetricKind::Boolean,
        MetricKind::FiveStar,
        MetricKind::BadNeutralGood,
        MetricKind::Numeric,
    ];

    /// Stable identifier, also used as the serialized `kind` tag.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Boolean => "boolean",
            MetricKind::FiveStar => "five-star",
            MetricKind::BadNeutralGood => "bad-neutral-good",
            MetricKind::Numeric => "numeric",
        }
    }

    /// Display label for tables
    pub fn label(self) -> &'static str {
        match self {
            MetricKind::Boolean => "Boolean",
            MetricKind::FiveStar => "5 Star",
            MetricKind::BadNeutralGood => "Bad/Neutral/Good",
            MetricKind::Numeric => "Numeric",
        }
    }

    pub fn input_hint(self) -> &'static str {
        match self {
            MetricKind::Boolean => "expected yes/no or true/false",
            MetricKind::FiveStar => "expected a whole number from 0 to 5",
            MetricKind::BadNeutralGood => "expected bad, neutral or good",
            MetricKind::Numeric => "expected a finite number",
        }
    }

    fn name_prefix(self) -> &'static str {
        match self {
            MetricKind::Boolean => "Boolean",
            MetricKind::FiveStar => "FiveStar",
            MetricKind::BadNeutralGood => "BadNeutralGood",
            MetricKind::Numeric => "Numeric",
        }
    }

    /// Rating written into a column when it is created or retyped.
    pub fn default_rating(self) -> Rating {
        match self {
            MetricKind::Boolean => Rating::Boolean(false),
            MetricKind::FiveStar => Rating::Stars(Stars::default()),
            MetricKind::BadNeutralGood => Rating::Sentiment(Sentiment::Neutral),
            MetricKind::Numeric => Rating::Numeric(0.0),
        }
    }

    /// Fresh metric of this kind, named `{Prefix}{n}` where `n` is one more
    /// than the number of `existing` metrics of the same kind.
    pub fn default_metric(self, existing: &[Metric]) -> Metric {
        let count = existing.iter().filter(|m| m.kind() == self).count();
        let rule = match self {
            MetricKind::Boolean => MetricRule::Boolean {
                true_is_better: true,
            },
            MetricKind::FiveStar => MetricRule::FiveStar,
            MetricKind::BadNeutralGood => MetricRule::BadNeutralGood,
            MetricKind::Numeric => MetricRule::Numeric {
                higher_is_better: true,
            },
        };
        Metric {
            name: format!("{}{}", self.name_prefix(), count + 1),
            relative_importance: default_importance(),
            rule,
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown metric kind '{0}' (expected one of: boolean, five-star, bad-neutral-good, numeric)")]
pub struct UnknownMetricKind(pub String);

impl FromStr for MetricKind {
    type Err = UnknownMetricKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        MetricKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| UnknownMetricKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(name: &str, higher_is_better: bool) -> Metric {
        Metric {
            name: name.to_string(),
            relative_importance: 1.0,
            rule: MetricRule::Numeric { higher_is_better },
        }
    }

    #[test]
    fn test_default_metric_counts_same_kind_only() {
        let existing = vec![
            numeric("Rent", false),
            numeric("Square Footage", true),
            MetricKind::Boolean.default_metric(&[]),
        ];

        let m = MetricKind::Numeric.default_metric(&existing);
        assert_eq!(m.name, "Numeric3");
        assert_eq!(m.relative_importance, 1.0);
        assert_eq!(m.rule, MetricRule::Numeric { higher_is_better: true });

        let b = MetricKind::Boolean.default_metric(&existing);
        assert_eq!(b.name, "Boolean2");
        assert_eq!(b.rule, MetricRule::Boolean { true_is_better: true });

        assert_eq!(MetricKind::FiveStar.default_metric(&existing).name, "FiveStar1");
        assert_eq!(
            MetricKind::BadNeutralGood.default_metric(&existing).name,
            "BadNeutralGood1"
        );
    }

    #[test]
    fn test_default_ratings_match_kind() {
        for kind in MetricKind::ALL {
            assert_eq!(kind.default_rating().kind(), kind);
            assert_eq!(kind.default_metric(&[]).kind(), kind);
        }
        assert_eq!(MetricKind::FiveStar.default_rating(), Rating::Stars(Stars::default()));
        assert_eq!(MetricKind::Numeric.default_rating(), Rating::Numeric(0.0));
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("numeric".parse::<MetricKind>().unwrap(), MetricKind::Numeric);
        assert_eq!("Five-Star".parse::<MetricKind>().unwrap(), MetricKind::FiveStar);
        assert_eq!(
            "bad_neutral_good".parse::<MetricKind>().unwrap(),
            MetricKind::BadNeutralGood
        );
        let err = "percent".parse::<MetricKind>().unwrap_err();
        assert!(err.to_string().contains("percent"));
    }

    #[test]
    fn test_metric_serde_keeps_kind_tag() {
        let metric = numeric("Rent", false);
        let json = serde_json::to_string(&metric).unwrap();
        assert!(json.contains(r#""kind":"numeric""#), "got: {}", json);
        assert!(json.contains(r#""higher_is_better":false"#), "got: {}", json);

        let parsed: Metric = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, metric);
    }

    #[test]
    fn test_metric_parse_unit_variant() {
        let json = r#"{ "name": "Location", "relative_importance": 2.5, "kind": "five-star" }"#;
        let metric: Metric = serde_json::from_str(json).unwrap();
        assert_eq!(metric.kind(), MetricKind::FiveStar);
        assert_eq!(metric.relative_importance, 2.5);
    }

    #[test]
    fn test_metric_parse_missing_importance_defaults_to_one() {
        let json = r#"{ "name": "Has Parking", "kind": "boolean", "true_is_better": true }"#;
        let metric: Metric = serde_json::from_str(json).unwrap();
        assert_eq!(metric.relative_importance, 1.0);
    }

    #[test]
    fn test_metric_parse_unknown_kind_fails() {
        let json = r#"{ "name": "Vibes", "relative_importance": 1.0, "kind": "percent" }"#;
        assert!(serde_json::from_str::<Metric>(json).is_err());
    }

    #[test]
    fn test_merge_patch() {
        let mut metric = numeric("Rent", false);
        metric.merge(MetricPatch {
            name: Some("Monthly Rent".to_string()),
            relative_importance: Some(2.0),
            higher_is_better: Some(true),
            ..Default::default()
        });
        assert_eq!(metric.name, "Monthly Rent");
        assert_eq!(metric.relative_importance, 2.0);
        assert_eq!(metric.rule, MetricRule::Numeric { higher_is_better: true });
    }

    #[test]
    fn test_conflicting_field() {
        let patch = MetricPatch {
            true_is_better: Some(false),
            ..Default::default()
        };
        assert_eq!(patch.conflicting_field(MetricKind::Numeric), Some("true_is_better"));
        assert_eq!(patch.conflicting_field(MetricKind::Boolean), None);

        let patch = MetricPatch {
            higher_is_better: Some(false),
            ..Default::default()
        };
        assert_eq!(patch.conflicting_field(MetricKind::FiveStar), Some("higher_is_better"));
    }

    #[test]
    fn test_interpretation() {
        assert_eq!(numeric("Rent", false).interpretation(), "Lower is better");
        assert_eq!(MetricKind::Boolean.default_metric(&[]).interpretation(), "True is better");
        assert_eq!(MetricKind::FiveStar.default_metric(&[]).interpretation(), "N/A");
    }
}
