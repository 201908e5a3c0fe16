use thiserror::Error;

use super::subscore::{column_best, subscore};
use crate::model::{Comparable, Metric, MetricKind, MetricRule, Rating};
use crate::store::Comparison;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricContribution {
    pub metric: String, // metric name at scoring time
    pub subscore: f64,  // unweighted, in [0, 1]
    pub weight: f64,    // relative importance
    pub weighted: f64,  // weight * subscore
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranked {
    /// Position of the comparable in the input collection
    pub index: usize,
    pub comparable: Comparable,
    pub score: f64,
    pub breakdown: Vec<MetricContribution>,
}

/// Snapshot shapes the engine refuses to score.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("rating matrix has {rows} rows for {comparables} comparables")]
    RowCount { rows: usize, comparables: usize },

    #[error("rating row {row} has {found} ratings for {expected} metrics")]
    RowLength {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("no scoring rule for a {found} rating in {expected} column [{row}][{column}]")]
    KindMismatch {
        row: usize,
        column: usize,
        expected: MetricKind,
        found: MetricKind,
    },
}

/// Score every comparable and sort by descending score.
///
/// Each score is `Σ(weight × subscore) / metric_count`; the divisor is the
/// number of metrics, not the total weight. With no metrics every comparable
/// scores 0. A score that still comes out non-finite (possible only with
/// non-finite weights supplied directly) is recorded as 0.
///
/// The sort is stable: equal scores keep their input order.
pub fn rank(
    comparables: &[Comparable],
    metrics: &[Metric],
    ratings: &[Vec<Rating>],
) -> Result<Vec<Ranked>, ScoringError> {
    if ratings.len() != comparables.len() {
        return Err(ScoringError::RowCount {
            rows: ratings.len(),
            comparables: comparables.len(),
        });
    }
    if let Some((row, r)) = ratings
        .iter()
        .enumerate()
        .find(|(_, r)| r.len() != metrics.len())
    {
        return Err(ScoringError::RowLength {
            row,
            found: r.len(),
            expected: metrics.len(),
        });
    }

    let bests = numeric_bests(metrics, ratings);

    let mut ranked = comparables
        .iter()
        .zip(ratings)
        .enumerate()
        .map(|(index, (comparable, row))| {
            let (score, breakdown) = score_row(index, metrics, row, &bests)?;
            Ok(Ranked {
                index,
                comparable: comparable.clone(),
                score,
                breakdown,
            })
        })
        .collect::<Result<Vec<_>, ScoringError>>()?;

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(ranked)
}

/// Rank the current contents of a comparison.
pub fn rank_comparison(state: &Comparison) -> Result<Vec<Ranked>, ScoringError> {
    rank(state.comparables(), state.metrics(), state.rating_matrix())
}

/// Column best per metric (None for non-numeric metrics).
fn numeric_bests(metrics: &[Metric], ratings: &[Vec<Rating>]) -> Vec<Option<f64>> {
    metrics
        .iter()
        .enumerate()
        .map(|(column, metric)| match metric.rule {
            MetricRule::Numeric { higher_is_better } => {
                let values = ratings.iter().filter_map(|row| match row.get(column) {
                    Some(Rating::Numeric(v)) => Some(*v),
                    _ => None,
                });
                column_best(values, higher_is_better)
            }
            _ => None,
        })
        .collect()
}

fn score_row(
    row_index: usize,
    metrics: &[Metric],
    row: &[Rating],
    bests: &[Option<f64>],
) -> Result<(f64, Vec<MetricContribution>), ScoringError> {
    if metrics.is_empty() {
        return Ok((0.0, Vec::new()));
    }

    let mut total = 0.0;
    let mut breakdown = Vec::with_capacity(metrics.len());

    for (column, ((metric, rating), best)) in metrics.iter().zip(row).zip(bests).enumerate() {
        let sub = subscore(&metric.rule, rating, *best).ok_or(ScoringError::KindMismatch {
            row: row_index,
            column,
            expected: metric.kind(),
            found: rating.kind(),
        })?;
        let weighted = metric.relative_importance * sub;
        total += weighted;

        breakdown.push(MetricContribution {
            metric: metric.name.clone(),
            subscore: sub,
            weight: metric.relative_importance,
            weighted,
        });
    }

    let score = total / metrics.len() as f64;
    Ok((if score.is_finite() { score } else { 0.0 }, breakdown))
}
