use std::fmt;
use std::str::FromStr;
use tracing::debug;

use super::error::StoreError;
use super::validation::validate_parts;
use crate::model::{
    Comparable, ComparablePatch, Metric, MetricKind, MetricPatch, MetricRule, Rating,
};

/// Reorder direction for moves: one step towards the front or the back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards index 0 (-1)
    Back,
    /// Towards the end (+1)
    Forward,
}

impl Direction {
    pub fn offset(self) -> isize {
        match self {
            Direction::Back => -1,
            Direction::Forward => 1,
        }
    }

    /// Neighbouring index in a collection of `len` items, or None past either end.
    pub fn target(self, index: usize, len: usize) -> Option<usize> {
        let target = match self {
            Direction::Back => index.checked_sub(1)?,
            Direction::Forward => index.checked_add(1)?,
        };
        (index < len && target < len).then_some(target)
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Back => Direction::Forward,
            Direction::Forward => Direction::Back,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:+}", self.offset())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "-1" | "back" | "up" | "left" => Ok(Direction::Back),
            "+1" | "1" | "forward" | "down" | "right" => Ok(Direction::Forward),
            other => Err(format!(
                "invalid direction '{}' (expected up/left/-1 or down/right/+1)",
                other
            )),
        }
    }
}

/// The comparison being edited: comparables, metrics and the rating matrix,
/// kept aligned behind one mutation API.
///
/// Invariants, checked by [`validate_parts`] on construction and preserved by
/// every operation:
/// - one rating row (and one edit flag) per comparable
/// - every row has one rating per metric, in metric order
/// - each rating's kind matches its column's metric kind
///
/// Every operation validates its arguments before touching any collection, so
/// an `Err` leaves the state exactly as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    comparables: Vec<Comparable>,
    editing: Vec<bool>,
    metrics: Vec<Metric>,
    ratings: Vec<Vec<Rating>>,
}

impl Default for Comparison {
    fn default() -> Self {
        Self::empty()
    }
}

impl Comparison {
    pub fn empty() -> Self {
        Self {
            comparables: Vec::new(),
            editing: Vec::new(),
            metrics: Vec::new(),
            ratings: Vec::new(),
        }
    }

    /// First-run example: two apartments rated on rent, size and parking.
    pub fn example() -> Self {
        let comparables = vec![
            Comparable::named("Apartment 1"),
            Comparable::named("Apartment 2"),
        ];
        let metrics = vec![
            Metric {
                name: "Rent".to_string(),
                relative_importance: 1.0,
                rule: MetricRule::Numeric {
                    higher_is_better: false,
                },
            },
            Metric {
                name: "Square Footage".to_string(),
                relative_importance: 1.0,
                rule: MetricRule::Numeric {
                    higher_is_better: true,
                },
            },
            Metric {
                name: "Has Parking".to_string(),
                relative_importance: 1.0,
                rule: MetricRule::Boolean {
                    true_is_better: true,
                },
            },
        ];
        let ratings = vec![
            vec![
                Rating::Numeric(1400.0),
                Rating::Numeric(760.0),
                Rating::Boolean(true),
            ],
            vec![
                Rating::Numeric(1200.0),
                Rating::Numeric(700.0),
                Rating::Boolean(false),
            ],
        ];
        Self {
            editing: vec![false; comparables.len()],
            comparables,
            metrics,
            ratings,
        }
    }

    /// Assemble a comparison from separately stored collections.
    ///
    /// Returns every consistency problem found, not just the first.
    pub fn from_parts(
        comparables: Vec<Comparable>,
        metrics: Vec<Metric>,
        ratings: Vec<Vec<Rating>>,
    ) -> Result<Self, Vec<String>> {
        validate_parts(&comparables, &metrics, &ratings)?;
        Ok(Self {
            editing: vec![false; comparables.len()],
            comparables,
            metrics,
            ratings,
        })
    }

    pub fn into_parts(self) -> (Vec<Comparable>, Vec<Metric>, Vec<Vec<Rating>>) {
        (self.comparables, self.metrics, self.ratings)
    }

    pub fn comparables(&self) -> &[Comparable] {
        &self.comparables
    }

    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Rating matrix indexed `[comparable][metric]`
    pub fn rating_matrix(&self) -> &[Vec<Rating>] {
        &self.ratings
    }

    pub fn editing(&self) -> &[bool] {
        &self.editing
    }

    pub fn rating(&self, comparable: usize, metric: usize) -> Option<&Rating> {
        self.ratings.get(comparable).and_then(|row| row.get(metric))
    }

    // --- comparables ---

    /// Append a placeholder comparable ("Item {n+1}") with default ratings.
    /// Returns its index.
    pub fn add_comparable(&mut self) -> usize {
        let index = self.comparables.len();
        self.comparables
            .push(Comparable::named(format!("Item {}", index + 1)));
        self.editing.push(false);
        self.ratings.push(
            self.metrics
                .iter()
                .map(|m| m.kind().default_rating())
                .collect(),
        );
        debug!(index, "added comparable");
        index
    }

    pub fn patch_comparable(
        &mut self,
        index: usize,
        patch: ComparablePatch,
    ) -> Result<(), StoreError> {
        const OP: &str = "patch_comparable";
        self.check_comparable(OP, index)?;
        if matches!(&patch.name, Some(name) if name.trim().is_empty()) {
            return Err(StoreError::EmptyName { op: OP, index });
        }

        self.comparables[index].merge(patch);
        debug!(index, "patched comparable");
        Ok(())
    }

    pub fn set_editing(&mut self, index: usize, editing: bool) -> Result<(), StoreError> {
        self.check_comparable("set_editing", index)?;
        self.editing[index] = editing;
        Ok(())
    }

    /// Swap a comparable, its edit flag and its rating row with the neighbour.
    pub fn move_comparable(
        &mut self,
        index: usize,
        direction: Direction,
    ) -> Result<(), StoreError> {
        const OP: &str = "move_comparable";
        self.check_comparable(OP, index)?;
        let target = move_target(OP, index, direction, self.comparables.len())?;

        self.comparables.swap(index, target);
        self.editing.swap(index, target);
        self.ratings.swap(index, target);
        debug!(index, target, "moved comparable");
        Ok(())
    }

    pub fn delete_comparable(&mut self, index: usize) -> Result<Comparable, StoreError> {
        self.check_comparable("delete_comparable", index)?;

        self.editing.remove(index);
        self.ratings.remove(index);
        let removed = self.comparables.remove(index);
        debug!(index, name = %removed.name, "deleted comparable");
        Ok(removed)
    }

    // --- metrics ---

    /// Append a numeric metric ("Numeric{n}", weight 1, higher is better) and
    /// a default rating column. Returns its index.
    pub fn add_metric(&mut self) -> usize {
        self.add_metric_of(MetricKind::Numeric)
    }

    /// Append a defaulted metric of any kind and a default rating column.
    pub fn add_metric_of(&mut self, kind: MetricKind) -> usize {
        let metric = kind.default_metric(&self.metrics);
        let rating = kind.default_rating();
        let index = self.metrics.len();

        self.metrics.push(metric);
        for row in &mut self.ratings {
            row.push(rating);
        }
        debug!(index, %kind, "added metric");
        index
    }

    /// Merge name, weight or direction changes. The kind never changes here.
    pub fn patch_metric(&mut self, index: usize, patch: MetricPatch) -> Result<(), StoreError> {
        self.check_metric("patch_metric", index)?;

        let kind = self.metrics[index].kind();
        if let Some(field) = patch.conflicting_field(kind) {
            return Err(StoreError::IncompatiblePatch { index, field, kind });
        }
        if let Some(weight) = patch.relative_importance {
            if !(weight.is_finite() && weight >= 0.0) {
                return Err(StoreError::InvalidWeight { index, weight });
            }
        }

        self.metrics[index].merge(patch);
        debug!(index, "patched metric");
        Ok(())
    }

    /// Replace a metric with a fresh one of `kind`, keeping its name and
    /// weight. Every rating in the column is reset to the kind's default;
    /// ratings are never converted between kinds.
    pub fn change_metric_type(&mut self, index: usize, kind: MetricKind) -> Result<(), StoreError> {
        self.check_metric("change_metric_type", index)?;

        let mut fresh = kind.default_metric(&self.metrics);
        let previous = &self.metrics[index];
        fresh.name = previous.name.clone();
        fresh.relative_importance = previous.relative_importance;
        let from = previous.kind();
        self.metrics[index] = fresh;

        let rating = kind.default_rating();
        for row in &mut self.ratings {
            row[index] = rating;
        }
        debug!(index, %from, to = %kind, "changed metric type");
        Ok(())
    }

    /// Swap a metric and its rating column with the neighbour.
    pub fn move_metric(&mut self, index: usize, direction: Direction) -> Result<(), StoreError> {
        const OP: &str = "move_metric";
        self.check_metric(OP, index)?;
        let target = move_target(OP, index, direction, self.metrics.len())?;

        self.metrics.swap(index, target);
        for row in &mut self.ratings {
            row.swap(index, target);
        }
        debug!(index, target, "moved metric");
        Ok(())
    }

    pub fn delete_metric(&mut self, index: usize) -> Result<Metric, StoreError> {
        self.check_metric("delete_metric", index)?;

        for row in &mut self.ratings {
            row.remove(index);
        }
        let removed = self.metrics.remove(index);
        debug!(index, name = %removed.name, "deleted metric");
        Ok(removed)
    }

    // --- ratings ---

    /// Overwrite one cell. The rating must match the column's metric kind.
    pub fn update_rating(
        &mut self,
        comparable: usize,
        metric: usize,
        value: Rating,
    ) -> Result<(), StoreError> {
        const OP: &str = "update_rating";
        self.check_comparable(OP, comparable)?;
        self.check_metric(OP, metric)?;

        let expected = self.metrics[metric].kind();
        if value.kind() != expected {
            return Err(StoreError::RatingKindMismatch {
                comparable,
                metric,
                expected,
                found: value.kind(),
            });
        }
        if let Rating::Numeric(v) = value {
            if !v.is_finite() {
                return Err(StoreError::NonFiniteRating {
                    comparable,
                    metric,
                    value: v,
                });
            }
        }

        self.ratings[comparable][metric] = value;
        debug!(comparable, metric, %value, "updated rating");
        Ok(())
    }

    fn check_comparable(&self, op: &'static str, index: usize) -> Result<(), StoreError> {
        if index < self.comparables.len() {
            Ok(())
        } else {
            Err(StoreError::ComparableOutOfRange {
                op,
                index,
                len: self.comparables.len(),
            })
        }
    }

    fn check_metric(&self, op: &'static str, index: usize) -> Result<(), StoreError> {
        if index < self.metrics.len() {
            Ok(())
        } else {
            Err(StoreError::MetricOutOfRange {
                op,
                index,
                len: self.metrics.len(),
            })
        }
    }
}

fn move_target(
    op: &'static str,
    index: usize,
    direction: Direction,
    len: usize,
) -> Result<usize, StoreError> {
    direction
        .target(index, len)
        .ok_or(StoreError::MoveOutOfRange {
            op,
            index,
            direction,
            len,
        })
}
