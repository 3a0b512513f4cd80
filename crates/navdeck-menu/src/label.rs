//! Display-label truncation.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Maximum display columns a navigation label occupies before truncation.
pub const NAV_LABEL_MAX: usize = 32;

/// Clip `label` to at most `max_width` display columns, ending in `…` when
/// anything was cut.
///
/// Grapheme-aware: combining sequences are never split, and wide glyphs count
/// their real column width. A label that already fits is returned verbatim.
#[must_use]
pub fn truncate_label(label: &str, max_width: usize) -> String {
    if label.width() <= max_width {
        return label.to_owned();
    }

    let budget = max_width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0usize;
    for grapheme in label.graphemes(true) {
        let w = grapheme.width();
        if used + w > budget {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_labels_pass_through() {
        assert_eq!(truncate_label("Tavern", 32), "Tavern");
        assert_eq!(truncate_label("", 32), "");
    }

    #[test]
    fn exact_fit_is_not_truncated() {
        let label = "a".repeat(32);
        assert_eq!(truncate_label(&label, 32), label);
    }

    #[test]
    fn long_labels_end_in_ellipsis_within_budget() {
        let label = "The Endless Halls of the Mountain King, Lower Galleries";
        let clipped = truncate_label(label, 32);
        assert!(clipped.ends_with('…'));
        assert!(clipped.width() <= 32);
    }

    #[test]
    fn wide_glyphs_count_their_columns() {
        // Each ideograph is two columns wide.
        let label = "地下城".repeat(8);
        let clipped = truncate_label(&label, 10);
        assert!(clipped.width() <= 10);
        assert!(clipped.ends_with('…'));
    }

    #[test]
    fn zero_budget_degrades_to_ellipsis() {
        assert_eq!(truncate_label("abc", 0), "…");
    }
}
