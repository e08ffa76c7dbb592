//! Fitting slice labels into a width budget: greedy two-line wrapping, font
//! shrinking down to a floor, then ellipsis truncation.

pub const ELLIPSIS: &str = "…";

#[derive(Debug, Clone, Copy)]
pub struct LabelFit {
    pub max_width: f64,
    pub base_size: f64,
    pub min_size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FittedLabel {
    pub lines: Vec<String>,
    pub font_size: f64,
    pub truncated: bool,
}

/// Wrap `text` into at most two lines that each measure within
/// `fit.max_width` at the returned font size.
pub fn fit_label<M>(text: &str, fit: &LabelFit, measure: M) -> FittedLabel
where
    M: Fn(&str, f64) -> f64,
{
    let words: Vec<&str> = text.split_whitespace().collect();
    let min_size = fit.min_size.min(fit.base_size);
    let mut size = fit.base_size;

    if words.is_empty() {
        return FittedLabel {
            lines: Vec::new(),
            font_size: size,
            truncated: false,
        };
    }

    loop {
        let lines = wrap(&words, size, fit.max_width, &measure);
        let fits = lines.len() <= 2
            && lines.iter().all(|line| measure(line, size) <= fit.max_width);
        if fits {
            return FittedLabel {
                lines,
                font_size: size,
                truncated: false,
            };
        }
        if size <= min_size {
            break;
        }
        size = (size - 1.0).max(min_size);
    }

    let mut lines = wrap(&words, size, fit.max_width, &measure);
    if lines.len() > 2 {
        let rest = lines.split_off(1).join(" ");
        lines.push(rest);
    }

    let mut truncated = false;
    for line in lines.iter_mut() {
        if measure(line, size) > fit.max_width {
            *line = ellipsize(line, size, fit.max_width, &measure);
            truncated = true;
        }
    }

    FittedLabel {
        lines,
        font_size: size,
        truncated,
    }
}

fn wrap<M>(words: &[&str], size: f64, max_width: f64, measure: &M) -> Vec<String>
where
    M: Fn(&str, f64) -> f64,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in words {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }
        let candidate = format!("{} {}", line, word);
        if measure(&candidate, size) <= max_width {
            line = candidate;
        } else {
            lines.push(std::mem::replace(&mut line, (*word).to_string()));
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines
}

fn ellipsize<M>(line: &str, size: f64, max_width: f64, measure: &M) -> String
where
    M: Fn(&str, f64) -> f64,
{
    let mut chars: Vec<char> = line.chars().collect();
    loop {
        let head: String = chars.iter().collect();
        let candidate = format!("{}{}", head.trim_end(), ELLIPSIS);
        if measure(&candidate, size) <= max_width {
            return candidate;
        }
        if chars.pop().is_none() {
            // Not even the ellipsis fits.
            return String::new();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mono(text: &str, size: f64) -> f64 {
        text.chars().count() as f64 * size * 0.6
    }

    fn budget(max_width: f64) -> LabelFit {
        LabelFit {
            max_width,
            base_size: 18.0,
            min_size: 12.0,
        }
    }

    #[test]
    fn short_label_keeps_base_size() {
        let fitted = fit_label("Ann", &budget(60.0), mono);
        assert_eq!(fitted.lines, vec!["Ann"]);
        assert_eq!(fitted.font_size, 18.0);
        assert!(!fitted.truncated);
    }

    #[test]
    fn two_words_wrap_onto_two_lines() {
        let fitted = fit_label("Ann Marie", &budget(60.0), mono);
        assert_eq!(fitted.lines, vec!["Ann", "Marie"]);
        assert_eq!(fitted.font_size, 18.0);
    }

    #[test]
    fn long_word_shrinks_font_until_it_fits() {
        let fitted = fit_label("Christopher", &budget(100.0), mono);
        assert_eq!(fitted.lines, vec!["Christopher"]);
        assert_eq!(fitted.font_size, 15.0);
        assert!(!fitted.truncated);
    }

    #[test]
    fn word_too_long_at_floor_is_ellipsized() {
        let fitted = fit_label("Bartholomew", &budget(60.0), mono);
        assert_eq!(fitted.font_size, 12.0);
        assert_eq!(fitted.lines, vec!["Barthol…"]);
        assert!(fitted.truncated);
    }

    #[test]
    fn overflowing_words_collapse_into_truncated_second_line() {
        let fitted = fit_label("one two three four five six", &budget(60.0), mono);
        assert_eq!(fitted.font_size, 12.0);
        assert_eq!(fitted.lines, vec!["one two", "three f…"]);
        assert!(fitted.truncated);
    }

    #[test]
    fn blank_label_has_no_lines() {
        let fitted = fit_label("   ", &budget(60.0), mono);
        assert!(fitted.lines.is_empty());
    }

    #[test]
    fn fitted_lines_never_exceed_budget() {
        let labels = [
            "Maximilian Alexander von Habsburg-Lothringen",
            "Zoë",
            "a b c d e f g h i j k l m n o p",
            "Supercalifragilisticexpialidocious",
            "Jo Ann",
            "Dr. Mary-Kate Olsen-Smith the Third",
        ];
        for max_width in [40.0, 55.0, 80.0, 140.0] {
            for label in labels {
                let fitted = fit_label(label, &budget(max_width), mono);
                assert!(fitted.lines.len() <= 2, "{label}: {:?}", fitted.lines);
                for line in &fitted.lines {
                    assert!(
                        mono(line, fitted.font_size) <= max_width,
                        "{line} overflows {max_width} at {}",
                        fitted.font_size
                    );
                }
                if fitted.truncated {
                    assert!(fitted.lines.iter().any(|line| line.ends_with(ELLIPSIS)));
                }
            }
        }
    }
}
