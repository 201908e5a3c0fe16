use thiserror::Error;

use super::state::Direction;
use crate::model::MetricKind;

/// Precondition violations raised by [`Comparison`](super::Comparison) operations.
///
/// These indicate a caller bug (an index the caller should never have offered,
/// or a value for the wrong column). A failed operation leaves the state
/// untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("{op}: comparable index {index} out of range (have {len})")]
    ComparableOutOfRange {
        op: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{op}: metric index {index} out of range (have {len})")]
    MetricOutOfRange {
        op: &'static str,
        index: usize,
        len: usize,
    },

    #[error("{op}: cannot move index {index} by {direction} (have {len})")]
    MoveOutOfRange {
        op: &'static str,
        index: usize,
        direction: Direction,
        len: usize,
    },

    #[error(
        "update_rating: cell [{comparable}][{metric}] expects a {expected} rating, got {found}"
    )]
    RatingKindMismatch {
        comparable: usize,
        metric: usize,
        expected: MetricKind,
        found: MetricKind,
    },

    #[error("update_rating: cell [{comparable}][{metric}] needs a finite number, got {value}")]
    NonFiniteRating {
        comparable: usize,
        metric: usize,
        value: f64,
    },

    #[error("patch_metric: metric {index} relative importance must be a non-negative number, got {weight}")]
    InvalidWeight { index: usize, weight: f64 },

    #[error("patch_metric: metric {index} is {kind} and has no '{field}' field")]
    IncompatiblePatch {
        index: usize,
        field: &'static str,
        kind: MetricKind,
    },

    #[error("{op}: comparable {index} name must not be empty")]
    EmptyName { op: &'static str, index: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_operation_and_argument() {
        let err = StoreError::ComparableOutOfRange {
            op: "delete_comparable",
            index: 7,
            len: 2,
        };
        assert_eq!(
            err.to_string(),
            "delete_comparable: comparable index 7 out of range (have 2)"
        );

        let err = StoreError::MoveOutOfRange {
            op: "move_metric",
            index: 0,
            direction: Direction::Back,
            len: 3,
        };
        assert_eq!(err.to_string(), "move_metric: cannot move index 0 by -1 (have 3)");

        let err = StoreError::RatingKindMismatch {
            comparable: 1,
            metric: 2,
            expected: MetricKind::Boolean,
            found: MetricKind::Numeric,
        };
        assert!(err.to_string().contains("expects a boolean rating, got numeric"));
    }
}
