pub mod formatter;

pub use formatter::{
    display_score, format_breakdown, format_grid, format_metrics, format_results,
    format_results_with_breakdown, format_tsv, should_use_colors,
};
