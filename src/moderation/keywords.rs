//! Lexical ad matching against the keyword list.

use super::normalize::normalize;

/// Check whether `candidate` contains any of `keywords`.
///
/// Each keyword is tried twice: lowercased substring on the raw text, then
/// substring on the normalized forms (so `p r o m o` still hits `promo`).
/// Returns on the first hit. An empty candidate never matches.
pub fn matches<S: AsRef<str>>(candidate: &str, keywords: &[S]) -> bool {
    if candidate.is_empty() {
        return false;
    }

    let raw = candidate.to_lowercase();
    let clean = normalize(&raw);

    keywords.iter().any(|keyword| {
        let raw_keyword = keyword.as_ref().to_lowercase();
        if raw.contains(&raw_keyword) {
            return true;
        }

        // A keyword made only of punctuation normalizes to "" and would hit everything
        let clean_keyword = normalize(&raw_keyword);
        !clean_keyword.is_empty() && clean.contains(&clean_keyword)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Vec<String> {
        ["广告", "优惠", "促销", "ad", "promo", "discount"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_raw_substring_case_insensitive() {
        let kw = defaults();
        assert!(matches("Huge DISCOUNT today", &kw));
        assert!(matches("今天有广告吗", &kw));
        assert!(!matches("hello there", &kw));
    }

    #[test]
    fn test_normalized_substring() {
        let kw = defaults();
        assert!(matches("p.r.o.m.o code inside", &kw));
        assert!(matches("优-惠 活动", &kw));
    }

    #[test]
    fn test_non_latin_case_folding() {
        let kw = vec!["СКИДКА".to_string()];
        assert!(matches("большая скидка", &kw));
        let kw = vec!["ΠΡΟΣΦΟΡΑ".to_string()];
        assert!(matches("μεγάλη προσφορα", &kw));
    }

    #[test]
    fn test_keyword_with_punctuation() {
        let kw = vec!["限时-抢购".to_string()];
        assert!(matches("限时抢购，速来", &kw));
    }

    #[test]
    fn test_empty_candidate_never_matches() {
        let kw = defaults();
        assert!(!matches("", &kw));
        assert!(!matches("", &[""]));
    }

    #[test]
    fn test_punctuation_only_keyword_does_not_match_everything() {
        let kw = vec!["!!!".to_string()];
        assert!(!matches("hello world", &kw));
        assert!(matches("wow!!!", &kw));
    }

    #[test]
    fn test_contained_keyword_always_matches() {
        let kw = vec!["Sale".to_string(), "推广".to_string(), "N°1".to_string()];
        for (text, hit) in [
            ("big sale now", true),
            ("全网推广服务", true),
            ("we are n°1", true),
            ("nothing to see", false),
        ] {
            assert_eq!(matches(text, &kw), hit, "text: {text}");
        }
    }
}
