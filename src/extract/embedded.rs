//! Embedded-state extraction tier.
//!
//! Locates the structured data blob the page framework injects for its own
//! rendering, then scans its serialized text with per-field key patterns.
//! The blob's internal shape varies by page template, so scanning by key
//! name is more robust to schema drift than structural traversal.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::{session::RenderSession, RawFieldMap};
use crate::fields::{FieldKind, DICTIONARY};

/// Probe script trying the known embedded-state locations in fixed order
const STATE_PROBE: &str = r#"
(function() {
    // Framework hydration payload (most reliable on current builds)
    if (window.__NEXT_DATA__) {
        return window.__NEXT_DATA__;
    }

    // Site-specific config object
    if (window._cianConfig) {
        return window._cianConfig;
    }

    // Component props embedded in DOM attributes
    const propped = document.querySelectorAll('[data-props]');
    for (const el of propped) {
        try {
            return JSON.parse(el.getAttribute('data-props'));
        } catch (e) {}
    }

    // Inline JSON script tags carrying a sentinel key
    const scripts = document.querySelectorAll('script[type="application/json"]');
    for (const script of scripts) {
        try {
            const data = JSON.parse(script.innerText);
            if (data && (data.offer || data.apartment || data.building)) {
                return data;
            }
        } catch (e) {}
    }

    // Legacy global state object
    if (window.__INITIAL_STATE__) {
        return window.__INITIAL_STATE__;
    }

    return null;
})()
"#;

/// Per-field compiled pattern lists, built from the dictionary's candidate
/// keys. Numeric fields anchor on a digit/decimal-point class, text fields
/// on a quoted string value; key match is case-insensitive.
static PATTERN_TABLE: Lazy<Vec<(&'static str, Vec<Regex>)>> = Lazy::new(|| {
    DICTIONARY
        .iter()
        .map(|field| {
            let patterns = field
                .json_keys
                .iter()
                .map(|key| {
                    let value_part = match field.kind {
                        FieldKind::NumericWithUnit => r"([\d.]+)",
                        FieldKind::IntegerCount => r"(\d+)",
                        FieldKind::Category => r#""([^"]+)""#,
                    };
                    Regex::new(&format!(r#"(?i)"{}"\s*:\s*{}"#, key, value_part))
                        .expect("static pattern table must compile")
                })
                .collect();
            (field.name, patterns)
        })
        .collect()
});

/// Nuxt hydration payload script tag, as emitted by samolet.ru pages
static NUXT_DATA_SCRIPT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<script[^>]*id="__NUXT_DATA__"[^>]*>(.*?)</script>"#)
        .expect("static nuxt script pattern must compile")
});

/// Extract raw fields from the page's embedded state.
///
/// Returns an empty map when no state object exists or the probe fails;
/// this tier never aborts the pipeline.
pub async fn extract(session: &dyn RenderSession) -> RawFieldMap {
    let state = match session.evaluate_script(STATE_PROBE).await {
        Ok(value) => value,
        Err(e) => {
            warn!("Embedded-state probe failed: {}", e);
            return RawFieldMap::new();
        }
    };

    if state.is_null() {
        debug!("No embedded state object found on page");
        return RawFieldMap::new();
    }

    let blob = match serde_json::to_string(&state) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to serialize embedded state: {}", e);
            return RawFieldMap::new();
        }
    };

    let map = scan_blob(&blob);
    debug!("Embedded-state tier resolved {} fields", map.len());
    map
}

/// Extract raw fields from a Nuxt hydration payload in rendered markup.
///
/// Nuxt serializes its state into a `__NUXT_DATA__` script tag instead of
/// a window global, so this variant reads the markup rather than running
/// a probe script. A missing tag or malformed payload yields an empty map.
pub fn extract_nuxt(markup: &str) -> RawFieldMap {
    let script = match NUXT_DATA_SCRIPT.captures(markup) {
        Some(captures) => captures
            .get(1)
            .map(|m| m.as_str().trim())
            .unwrap_or_default(),
        None => {
            debug!("No Nuxt data script found in markup");
            return RawFieldMap::new();
        }
    };

    let state: serde_json::Value = match serde_json::from_str(script) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to parse Nuxt data payload: {}", e);
            return RawFieldMap::new();
        }
    };

    let blob = match serde_json::to_string(&state) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to serialize Nuxt state: {}", e);
            return RawFieldMap::new();
        }
    };

    let map = scan_blob(&blob);
    debug!("Nuxt embedded-state tier resolved {} fields", map.len());
    map
}

/// Scan a serialized state blob with the pattern table.
///
/// For each field the first matching pattern wins and later patterns are
/// skipped. A same-named key elsewhere in the blob can match instead of
/// the intended one; the lower tiers act as the safety net for that.
pub fn scan_blob(blob: &str) -> RawFieldMap {
    let mut extracted = RawFieldMap::new();

    for (field, patterns) in PATTERN_TABLE.iter() {
        for pattern in patterns {
            if let Some(captures) = pattern.captures(blob) {
                if let Some(value) = captures.get(1) {
                    let value = value.as_str().trim();
                    if !value.is_empty() {
                        extracted.insert(field.to_string(), value.to_string());
                        break;
                    }
                }
            }
        }
    }

    extracted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_empty_blob() {
        assert!(scan_blob("").is_empty());
        assert!(scan_blob("{}").is_empty());
    }

    #[test]
    fn test_scan_numeric_and_text_fields() {
        let blob = r#"{"offer":{"totalArea":64.2,"floor":7,"district":"Бутово"}}"#;
        let map = scan_blob(blob);

        assert_eq!(map.get("Общая Площадь").map(String::as_str), Some("64.2"));
        assert_eq!(map.get("Этаж").map(String::as_str), Some("7"));
        assert_eq!(map.get("Район").map(String::as_str), Some("Бутово"));
    }

    #[test]
    fn test_first_candidate_key_wins() {
        // Both candidate keys present: floorsTotal is listed first.
        let blob = r#"{"floorsTotal":25,"totalFloors":99}"#;
        let map = scan_blob(blob);
        assert_eq!(map.get("Всего Этажей").map(String::as_str), Some("25"));
    }

    #[test]
    fn test_case_insensitive_keys() {
        let blob = r#"{"CeilingHeight":2.8}"#;
        let map = scan_blob(blob);
        assert_eq!(map.get("Высота Потолков").map(String::as_str), Some("2.8"));
    }

    #[test]
    fn test_developer_name_preferred_over_developer() {
        let blob = r#"{"developer":"ПИК-Дочка","developerName":"ПИК"}"#;
        let map = scan_blob(blob);
        assert_eq!(map.get("Застройщик (Код)").map(String::as_str), Some("ПИК"));
    }

    #[test]
    fn test_nuxt_payload_in_markup() {
        let markup = r#"
            <html><body>
            <script type="application/json" id="__NUXT_DATA__" data-ssr="true">
                {"flat":{"totalArea":38.4,"floor":12,"district":"Люберцы"}}
            </script>
            </body></html>
        "#;
        let map = extract_nuxt(markup);

        assert_eq!(map.get("Общая Площадь").map(String::as_str), Some("38.4"));
        assert_eq!(map.get("Этаж").map(String::as_str), Some("12"));
        assert_eq!(map.get("Район").map(String::as_str), Some("Люберцы"));
    }

    #[test]
    fn test_missing_nuxt_script_yields_empty_map() {
        assert!(extract_nuxt("<html><body></body></html>").is_empty());
    }

    #[test]
    fn test_malformed_nuxt_payload_yields_empty_map() {
        let markup = r#"<script id="__NUXT_DATA__">{not json</script>"#;
        assert!(extract_nuxt(markup).is_empty());
    }
}
