use crate::model::{Comparable, Metric, Rating};

/// Check that separately stored collections form a consistent comparison.
///
/// Used when state comes from outside the aggregate (persisted keys, imported
/// snapshots). Returns all problems at once (not just the first).
pub fn validate_parts(
    comparables: &[Comparable],
    metrics: &[Metric],
    ratings: &[Vec<Rating>],
) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    for (i, comparable) in comparables.iter().enumerate() {
        if comparable.name.trim().is_empty() {
            errors.push(format!("comparables[{}].name: must not be empty", i));
        }
    }

    for (j, metric) in metrics.iter().enumerate() {
        let weight = metric.relative_importance;
        if !(weight.is_finite() && weight >= 0.0) {
            errors.push(format!(
                "metrics[{}].relative_importance: must be a non-negative number, got {}",
                j, weight
            ));
        }
    }

    if ratings.len() != comparables.len() {
        errors.push(format!(
            "rating_matrix: {} rows for {} comparables",
            ratings.len(),
            comparables.len()
        ));
    }

    for (i, row) in ratings.iter().enumerate() {
        if row.len() != metrics.len() {
            errors.push(format!(
                "rating_matrix[{}]: {} ratings for {} metrics",
                i,
                row.len(),
                metrics.len()
            ));
            continue;
        }

        for (j, (rating, metric)) in row.iter().zip(metrics).enumerate() {
            if rating.kind() != metric.kind() {
                errors.push(format!(
                    "rating_matrix[{}][{}]: expected {} rating for '{}', found {}",
                    i,
                    j,
                    metric.kind(),
                    metric.name,
                    rating.kind()
                ));
            } else if let Rating::Numeric(v) = rating {
                if !v.is_finite() {
                    errors.push(format!("rating_matrix[{}][{}]: {} is not a finite number", i, j, v));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MetricKind, MetricRule};

    fn metric(name: &str, rule: MetricRule) -> Metric {
        Metric {
            name: name.to_string(),
            relative_importance: 1.0,
            rule,
        }
    }

    #[test]
    fn test_valid_parts() {
        let comparables = vec![Comparable::named("A"), Comparable::named("B")];
        let metrics = vec![metric("Size", MetricRule::Numeric { higher_is_better: true })];
        let ratings = vec![vec![Rating::Numeric(1.0)], vec![Rating::Numeric(2.0)]];
        assert!(validate_parts(&comparables, &metrics, &ratings).is_ok());
    }

    #[test]
    fn test_empty_parts() {
        assert!(validate_parts(&[], &[], &[]).is_ok());
    }

    #[test]
    fn test_row_count_mismatch() {
        let comparables = vec![Comparable::named("A"), Comparable::named("B")];
        let errors = validate_parts(&comparables, &[], &[vec![]]).unwrap_err();
        assert_eq!(errors, vec!["rating_matrix: 1 rows for 2 comparables".to_string()]);
    }

    #[test]
    fn test_kind_mismatch() {
        let comparables = vec![Comparable::named("A")];
        let metrics = vec![metric("Parking", MetricRule::Boolean { true_is_better: true })];
        let ratings = vec![vec![MetricKind::FiveStar.default_rating()]];
        let errors = validate_parts(&comparables, &metrics, &ratings).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("rating_matrix[0][0]: expected boolean rating for 'Parking'"));
    }

    #[test]
    fn test_collects_all_errors() {
        let comparables = vec![Comparable::named(" ")]; // Error 1
        let mut bad_weight = metric("Size", MetricRule::Numeric { higher_is_better: true });
        bad_weight.relative_importance = -2.0; // Error 2
        let ratings = vec![vec![Rating::Numeric(f64::NAN)]]; // Error 3

        let errors = validate_parts(&comparables, &[bad_weight], &ratings).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].contains("comparables[0].name"));
        assert!(errors[1].contains("metrics[0].relative_importance"));
        assert!(errors[2].contains("not a finite number"));
    }
}
