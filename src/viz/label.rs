pub const ELLIPSIS: char = '…';
/// Characters dropped per truncation pass.
pub const TRIM_STEP: usize = 3;
/// Label width budget as a multiple of the circle's on-screen radius.
pub const LABEL_FIT: f64 = 1.8;
/// Average glyph advance of the 11px label font.
pub const CHAR_WIDTH: f64 = 6.2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncation {
    pub text: String,
    /// Trimming passes performed; never more than `ceil(len / 3)`.
    pub passes: usize,
}

pub fn width_budget(radius: f64) -> f64 {
    (LABEL_FIT * radius).max(0.0)
}

/// Width estimate used when no real text metrics are available.
pub fn estimate_width(text: &str) -> f64 {
    text.chars().count() as f64 * CHAR_WIDTH
}

/// Shortens `label` three characters at a time, appending an ellipsis,
/// until `measure` reports it fits in `budget`. Gives up with an empty
/// string once nothing is left to trim.
pub fn truncate_label<F>(label: &str, budget: f64, measure: F) -> Truncation
where
    F: Fn(&str) -> f64,
{
    let budget = budget.max(0.0);
    if measure(label) <= budget {
        return Truncation { text: label.to_string(), passes: 0 };
    }

    let mut kept: Vec<char> = label.chars().collect();
    // A label that already ends in an ellipsis is trimmed from before it.
    if kept.last() == Some(&ELLIPSIS) {
        kept.pop();
    }

    let mut passes = 0;
    loop {
        passes += 1;
        if kept.len() <= TRIM_STEP {
            return Truncation { text: String::new(), passes };
        }
        kept.truncate(kept.len() - TRIM_STEP);
        let mut candidate: String = kept.iter().collect();
        candidate.push(ELLIPSIS);
        if measure(&candidate) <= budget {
            return Truncation { text: candidate, passes };
        }
    }
}

/// Label text for a circle of on-screen radius `radius`, using the width
/// estimate.
pub fn fit_label(label: &str, radius: f64) -> String {
    truncate_label(label, width_budget(radius), estimate_width).text
}
