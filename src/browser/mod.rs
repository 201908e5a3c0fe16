use anyhow::{Context, Result};

use crate::model::Comparable;

/// Link to open for a comparable: its page URL, else its image URL.
pub fn link_for(comparable: &Comparable) -> Option<&str> {
    comparable
        .url
        .as_deref()
        .or(comparable.image_url.as_deref())
        .filter(|url| !url.trim().is_empty())
}

/// Open a comparable's link in the user's default browser
///
/// # Errors
/// Returns error if the comparable has no link or the browser cannot be
/// opened (e.g., no browser available)
pub fn open_comparable(comparable: &Comparable) -> Result<String> {
    let url = link_for(comparable)
        .with_context(|| format!("'{}' has no link to open", comparable.name))?;
    webbrowser::open(url).with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(url.to_string())
}
