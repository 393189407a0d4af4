//! Internationalization (i18n) module.
//!
//! Translation tables are embedded at compile time and loaded once.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;

/// Global translation store: LangCode -> Key -> Text
static TRANSLATIONS: OnceLock<HashMap<String, Value>> = OnceLock::new();

/// Languages shipped with the bot.
pub const SUPPORTED: &[&str] = &["zh", "en"];

/// Load the embedded translation tables. Safe to call more than once.
pub fn init() {
    TRANSLATIONS.get_or_init(|| {
        let mut map = HashMap::new();

        for (lang, raw) in [("zh", include_str!("zh.json")), ("en", include_str!("en.json"))] {
            match serde_json::from_str(raw) {
                Ok(val) => {
                    map.insert(lang.to_string(), val);
                }
                Err(e) => tracing::error!("Invalid {} translation table: {}", lang, e),
            }
        }

        map
    });
}

/// Get text for a key in a specific language.
///
/// Supports nested keys via dot notation, e.g. `"help.basic"`. Falls back to
/// English, then to the key itself.
pub fn get_text(lang: &str, key: &str) -> String {
    let Some(store) = TRANSLATIONS.get() else {
        return key.to_string();
    };

    if let Some(text) = store.get(lang).and_then(|val| resolve_key(val, key)) {
        return text;
    }

    if lang != "en"
        && let Some(text) = store.get("en").and_then(|val| resolve_key(val, key))
    {
        return text;
    }

    key.to_string()
}

fn resolve_key(val: &Value, key: &str) -> Option<String> {
    let mut current = val;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    current.as_str().map(|s| s.to_string())
}

/// Pick a supported locale, defaulting to Chinese.
pub fn resolve_locale(requested: Option<&str>) -> String {
    requested
        .map(|l| l.trim().to_lowercase())
        .filter(|l| SUPPORTED.contains(&l.as_str()))
        .unwrap_or_else(|| "zh".to_string())
}
