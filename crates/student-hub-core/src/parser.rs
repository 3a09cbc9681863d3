//! Scrapes structured fields out of a free-text consultation reply.
//!
//! Two independent passes over the reply:
//! - majors: case-insensitive substring search for every alias in [`alias_table`]. The alias
//!   text itself is recorded, so "Công nghệ thông tin" and "IT" in the same reply count as two
//!   entries even though they name one major.
//! - suggestions: sentences that start at an advisory trigger word and run to the next period.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::majors::alias_table;

/// Placeholder confidence attached to every consultation. Not derived from the reply.
pub const FIXED_CONFIDENCE: f64 = 0.8;

pub const MAX_MAJORS: usize = 3;
pub const MAX_SUGGESTIONS: usize = 5;

static SUGGESTION_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(r"(?:nên|cần|khuyên|đề xuất|cải thiện|học thêm|tập trung)[^.]*[.]").ok()
});

/// Fields extracted from one reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedConsultation {
    pub majors: Vec<String>,
    pub suggestions: Vec<String>,
    pub confidence: f64,
}

impl ParsedConsultation {
    /// Result used when there is nothing to parse (fallback replies).
    pub fn unparsed() -> Self {
        Self {
            majors: Vec::new(),
            suggestions: Vec::new(),
            confidence: FIXED_CONFIDENCE,
        }
    }
}

pub fn parse_consultation(reply: &str) -> ParsedConsultation {
    ParsedConsultation {
        majors: extract_majors(reply),
        suggestions: extract_suggestions(reply),
        confidence: FIXED_CONFIDENCE,
    }
}

/// Up to [`MAX_MAJORS`] matched aliases, alias-table order, no repeats.
pub fn extract_majors(reply: &str) -> Vec<String> {
    let haystack = reply.to_lowercase();
    let mut found: Vec<String> = alias_table()
        .filter(|alias| haystack.contains(&alias.to_lowercase()))
        .map(str::to_string)
        .collect();
    found.truncate(MAX_MAJORS);
    let mut seen = std::collections::HashSet::new();
    found.retain(|alias| seen.insert(alias.clone()));
    found
}

/// First [`MAX_SUGGESTIONS`] advisory sentences in document order.
pub fn extract_suggestions(reply: &str) -> Vec<String> {
    let Some(pattern) = SUGGESTION_PATTERN.as_ref() else {
        return Vec::new();
    };
    pattern
        .find_iter(reply)
        .take(MAX_SUGGESTIONS)
        .map(|m| m.as_str().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alias_forms_of_one_major_are_kept_separately() {
        let majors = extract_majors("Bạn hợp với Công nghệ thông tin (IT).");
        assert_eq!(majors, vec!["Công nghệ thông tin", "IT"]);
    }

    #[test]
    fn matching_ignores_case_including_vietnamese_letters() {
        let upper = extract_majors("NGÀNH CÔNG NGHỆ THÔNG TIN RẤT HỢP");
        let lower = extract_majors("ngành công nghệ thông tin rất hợp");
        assert_eq!(upper, lower);
        assert_eq!(upper.first().map(String::as_str), Some("Công nghệ thông tin"));
    }

    #[test]
    fn majors_follow_table_order_and_stop_at_three() {
        let reply = "Xây dựng, Kế toán, Du lịch và Thiết kế đồ họa đều phù hợp";
        let majors = extract_majors(reply);
        assert_eq!(majors.len(), MAX_MAJORS);
        // "Thiết kế đồ họa" and "Thiết kế" come before Kế toán in the table.
        assert_eq!(majors, vec!["Thiết kế đồ họa", "Thiết kế", "Kế toán"]);
    }

    #[test]
    fn no_known_major_yields_empty_list() {
        assert!(extract_majors("Hãy nghỉ ngơi đầy đủ.").is_empty());
    }

    #[test]
    fn suggestions_run_from_trigger_to_period() {
        let reply = "Chào bạn. Bạn nên học thêm toán rời rạc. Ngoài ra cần luyện tiếng Anh mỗi ngày. Hết";
        assert_eq!(
            extract_suggestions(reply),
            vec!["nên học thêm toán rời rạc.", "cần luyện tiếng Anh mỗi ngày."]
        );
    }

    #[test]
    fn suggestion_without_closing_period_is_ignored() {
        assert!(extract_suggestions("Bạn nên cố gắng hơn").is_empty());
    }

    #[test]
    fn at_most_five_suggestions() {
        let reply = "nên a. nên b. nên c. nên d. nên e. nên f. nên g.";
        let suggestions = extract_suggestions(reply);
        assert_eq!(suggestions.len(), MAX_SUGGESTIONS);
        assert_eq!(suggestions[4], "nên e.");
    }

    #[test]
    fn confidence_is_the_fixed_placeholder() {
        let parsed = parse_consultation("Công nghệ thông tin. Bạn nên học Python.");
        assert_eq!(parsed.confidence, FIXED_CONFIDENCE);
        assert_eq!(parsed.suggestions, vec!["nên học Python."]);
        assert_eq!(ParsedConsultation::unparsed().confidence, FIXED_CONFIDENCE);
    }
}
