pub mod comparable;
pub mod metric;
pub mod rating;

pub use comparable::{Comparable, ComparablePatch};
pub use metric::{Metric, MetricKind, MetricPatch, MetricRule, UnknownMetricKind};
pub use rating::{Rating, RatingParseError, Sentiment, Stars};
