use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::model::Metric;
use crate::scoring::Ranked;
use crate::store::Comparison;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Score as shown to the user: `round(score * scale)`
pub fn display_score(score: f64, scale: f64) -> i64 {
    (score * scale).round() as i64
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Left-align `text` in `width` display columns
fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

const RESULTS_EMPTY: &str = "Nothing to compare yet. Add an item with `comparo item add`.";

/// Ranked comparables, best first.
///
/// Columns: rank, displayed score, name, link. No headers.
/// Rank column: 3 chars (fits "99."), right-aligned.
/// Score column: right-aligned, 5 chars wide (fits "1000" and beyond).
pub fn format_results(ranked: &[Ranked], scale: f64, use_colors: bool) -> String {
    if ranked.is_empty() {
        return RESULTS_EMPTY.to_string();
    }

    let term_width = get_terminal_width();
    ranked
        .iter()
        .enumerate()
        .map(|(pos, entry)| format_result_line(pos, entry, scale, use_colors, term_width))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Same as [`format_results`], with each entry followed by its breakdown.
pub fn format_results_with_breakdown(ranked: &[Ranked], scale: f64, use_colors: bool) -> String {
    if ranked.is_empty() {
        return RESULTS_EMPTY.to_string();
    }

    let term_width = get_terminal_width();
    ranked
        .iter()
        .enumerate()
        .map(|(pos, entry)| {
            let line = format_result_line(pos, entry, scale, use_colors, term_width);
            if entry.breakdown.is_empty() {
                line
            } else {
                format!("{}\n{}", line, format_breakdown(entry, use_colors))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_result_line(
    pos: usize,
    entry: &Ranked,
    scale: f64,
    use_colors: bool,
    term_width: Option<usize>,
) -> String {
    let index_width = 3;
    let score_width = 5;
    let separator = "  ";

    let index_str = format!("{:>2}.", pos + 1);
    let score_str = format!(
        "{:>width$}",
        display_score(entry.score, scale),
        width = score_width
    );
    let url = entry.comparable.url.as_deref().unwrap_or("");

    let url_len = url.chars().count();
    let fixed_width = index_width + 1 + score_width + separator.len() * 2 + url_len;
    let name = match term_width {
        Some(width) if width > fixed_width + 10 => {
            truncate_text(&entry.comparable.name, width - fixed_width)
        }
        Some(_) => truncate_text(&entry.comparable.name, 20),
        None => entry.comparable.name.clone(),
    };

    let line = if use_colors {
        format!(
            "{} {}{}{}",
            index_str.dimmed(),
            score_str.bold(),
            separator,
            name
        )
    } else {
        format!("{} {}{}{}", index_str, score_str, separator, name)
    };

    if url.is_empty() {
        line
    } else if use_colors {
        format!("{}{}{}", line, separator, url.underline())
    } else {
        format!("{}{}{}", line, separator, url)
    }
}

/// Per-metric contributions for one ranked comparable, indented under it.
/// Each line: metric name, sub-score, weight and weighted contribution.
pub fn format_breakdown(entry: &Ranked, use_colors: bool) -> String {
    let name_width = entry
        .breakdown
        .iter()
        .map(|c| c.metric.chars().count())
        .max()
        .unwrap_or(0);

    entry
        .breakdown
        .iter()
        .map(|c| {
            let detail = format!("{:.3} x {} = {:.3}", c.subscore, c.weight, c.weighted);
            if use_colors {
                format!("      {}  {}", pad(&c.metric, name_width).cyan(), detail.dimmed())
            } else {
                format!("      {}  {}", pad(&c.metric, name_width), detail)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Metric definitions table: index, name, kind, importance, interpretation.
pub fn format_metrics(metrics: &[Metric], use_colors: bool) -> String {
    if metrics.is_empty() {
        return "No metrics defined. Add one with `comparo metric add`.".to_string();
    }

    let name_width = metrics
        .iter()
        .map(|m| m.name.chars().count())
        .max()
        .unwrap_or(0);
    let kind_width = metrics
        .iter()
        .map(|m| m.kind().label().chars().count())
        .max()
        .unwrap_or(0);

    metrics
        .iter()
        .enumerate()
        .map(|(idx, metric)| {
            let index_str = format!("{:>2}.", idx + 1);
            let name = pad(&metric.name, name_width);
            let kind = pad(metric.kind().label(), kind_width);
            let weight = format!("x{}", metric.relative_importance);
            if use_colors {
                format!(
                    "{} {}  {}  {:>6}  {}",
                    index_str.dimmed(),
                    name.bold(),
                    kind.cyan(),
                    weight,
                    metric.interpretation().dimmed()
                )
            } else {
                format!(
                    "{} {}  {}  {:>6}  {}",
                    index_str,
                    name,
                    kind,
                    weight,
                    metric.interpretation()
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Data-entry grid: one row per metric, one column per comparable.
///
/// The header row lists comparables (with their 1-based index); cells show
/// the rating in its display form.
pub fn format_grid(state: &Comparison, use_colors: bool) -> String {
    let comparables = state.comparables();
    let metrics = state.metrics();
    if comparables.is_empty() || metrics.is_empty() {
        return format!(
            "{} items, {} metrics. Add both to start rating.",
            comparables.len(),
            metrics.len()
        );
    }

    let label_width = metrics
        .iter()
        .enumerate()
        .map(|(j, m)| format!("{}. {}", j + 1, m.name).chars().count())
        .max()
        .unwrap_or(0);

    let headers: Vec<String> = comparables
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let marker = if state.editing().get(i).copied().unwrap_or(false) {
                "*"
            } else {
                ""
            };
            format!("{}. {}{}", i + 1, c.name, marker)
        })
        .collect();

    let column_widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let cell_width = state.rating_matrix()[i]
                .iter()
                .map(|r| r.to_string().chars().count())
                .max()
                .unwrap_or(0);
            header.chars().count().max(cell_width)
        })
        .collect();

    let header_line = std::iter::once(pad("", label_width))
        .chain(
            headers
                .iter()
                .zip(&column_widths)
                .map(|(h, w)| pad(h, *w)),
        )
        .collect::<Vec<_>>()
        .join("  ");
    let header_line = header_line.trim_end().to_string();

    let rows = metrics.iter().enumerate().map(|(j, metric)| {
        let label = pad(&format!("{}. {}", j + 1, metric.name), label_width);
        let cells = column_widths.iter().enumerate().map(|(i, w)| {
            let value = state
                .rating(i, j)
                .map(|r| r.to_string())
                .unwrap_or_default();
            pad(&value, *w)
        });
        let line = std::iter::once(label)
            .chain(cells)
            .collect::<Vec<_>>()
            .join("  ");
        line.trim_end().to_string()
    });

    let header_line = if use_colors {
        header_line.bold().to_string()
    } else {
        header_line
    };

    std::iter::once(header_line)
        .chain(rows)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format results as tab-separated values for scripting
/// Columns: rank, score, name, url (no headers, no colors)
pub fn format_tsv(ranked: &[Ranked], scale: f64) -> String {
    ranked
        .iter()
        .enumerate()
        .map(|(pos, entry)| {
            format!(
                "{}\t{}\t{}\t{}",
                pos + 1,
                display_score(entry.score, scale),
                entry.comparable.name,
                entry.comparable.url.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
