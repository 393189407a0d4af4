//! Reply rendering for list edits.

use crate::i18n::get_text;
use crate::moderation::ListReport;
use crate::utils::numbered_list;

/// Which list a reply is about; selects the translation section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Keywords,
    Whitelist,
}

impl ListKind {
    fn section(self) -> &'static str {
        match self {
            Self::Keywords => "keywords",
            Self::Whitelist => "whitelist",
        }
    }

    fn text(self, locale: &str, key: &str) -> String {
        get_text(locale, &format!("{}.{}", self.section(), key))
    }
}

fn line(kind: ListKind, locale: &str, key: &str, items: &[String]) -> String {
    kind.text(locale, key)
        .replace("{count}", &items.len().to_string())
        .replace("{items}", &items.join(", "))
}

/// Reply to an add command.
pub fn render_added(kind: ListKind, locale: &str, report: &ListReport) -> String {
    let mut lines = Vec::new();
    if !report.changed.is_empty() {
        lines.push(line(kind, locale, "added", &report.changed));
    }
    if !report.unchanged.is_empty() {
        lines.push(line(kind, locale, "existing", &report.unchanged));
    }
    if !report.invalid.is_empty() {
        lines.push(line(kind, locale, "invalid", &report.invalid));
    }

    if lines.is_empty() {
        kind.text(locale, "none_added")
    } else {
        lines.join("\n")
    }
}

/// Reply to a remove command.
pub fn render_removed(kind: ListKind, locale: &str, report: &ListReport) -> String {
    let mut lines = Vec::new();
    if !report.changed.is_empty() {
        lines.push(line(kind, locale, "removed", &report.changed));
    }
    if !report.unchanged.is_empty() {
        lines.push(line(kind, locale, "not_found", &report.unchanged));
    }

    if lines.is_empty() {
        kind.text(locale, "none_removed")
    } else {
        lines.join("\n")
    }
}

/// Reply to a list command.
pub fn render_list<T: std::fmt::Display>(kind: ListKind, locale: &str, items: &[T]) -> String {
    if items.is_empty() {
        return kind.text(locale, "list_empty");
    }

    format!("{}\n{}", kind.text(locale, "list_header"), numbered_list(items))
}

/// Reply when a list edit could not be persisted.
pub fn render_save_failed(locale: &str, error: &impl std::fmt::Display) -> String {
    get_text(locale, "common.save_failed").replace("{error}", &error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(changed: &[&str], unchanged: &[&str], invalid: &[&str]) -> ListReport {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();
        ListReport {
            changed: owned(changed),
            unchanged: owned(unchanged),
            invalid: owned(invalid),
        }
    }

    #[test]
    fn test_render_added_lines() {
        crate::i18n::init();
        let text = render_added(
            ListKind::Whitelist,
            "en",
            &report(&["1", "2"], &["3"], &["abc"]),
        );

        assert_eq!(
            text,
            "Whitelisted 2 IDs: 1, 2\nAlready whitelisted: 3\nInvalid IDs: abc"
        );
    }

    #[test]
    fn test_render_added_nothing() {
        crate::i18n::init();
        assert_eq!(
            render_added(ListKind::Keywords, "en", &report(&[], &[], &[])),
            "No new keywords were added."
        );
    }

    #[test]
    fn test_render_removed() {
        crate::i18n::init();
        assert_eq!(
            render_removed(ListKind::Keywords, "en", &report(&["推广"], &["代理"], &[])),
            "Removed 1 keywords: 推广\nNot found: 代理"
        );
        assert_eq!(
            render_removed(ListKind::Whitelist, "en", &report(&[], &[], &[])),
            "No IDs were removed."
        );
    }

    #[test]
    fn test_render_list() {
        crate::i18n::init();
        assert_eq!(
            render_list(ListKind::Whitelist, "en", &[10_i64, -100200]),
            "Whitelisted IDs (users and channels):\n1. 10\n2. -100200"
        );
        assert_eq!(
            render_list::<String>(ListKind::Keywords, "en", &[]),
            "The keyword list is empty."
        );
    }
}
