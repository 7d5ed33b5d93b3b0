//! Format - Formatting Utilities

use crate::constants::ELLIPSIS;

/// Format a count with thousand separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);

    for (i, c) in s.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }

    result
}

/// Loading progress: "N of M loaded", or "N loaded" when the total is unknown
pub fn format_progress(loaded: usize, total: Option<usize>) -> String {
    match total {
        Some(total) => format!(
            "{} of {} loaded",
            format_number(loaded),
            format_number(total)
        ),
        None => format!("{} loaded", format_number(loaded)),
    }
}

/// Truncate a string to at most `max_chars` characters, ending with an ellipsis
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut out: String = s.chars().take(max_chars - 1).collect();
    out.push(ELLIPSIS);
    out
}

/// A cell value fitted to a fixed column width
///
/// `display` is what gets painted; `full` is kept for hover text whenever the
/// value had to be clipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClippedCell {
    pub display: String,
    pub full: Option<String>,
}

impl ClippedCell {
    pub fn is_clipped(&self) -> bool {
        self.full.is_some()
    }
}

/// Fit `text` into `width` pixels, assuming `char_width` pixels per character
pub fn clip_to_width(text: &str, width: f32, char_width: f32, padding: f32) -> ClippedCell {
    let usable = (width - padding).max(0.0);
    let max_chars = if char_width > 0.0 {
        (usable / char_width).floor() as usize
    } else {
        usize::MAX
    };

    if text.chars().count() <= max_chars {
        ClippedCell {
            display: text.to_string(),
            full: None,
        }
    } else {
        ClippedCell {
            display: truncate(text, max_chars),
            full: Some(text.to_string()),
        }
    }
}
