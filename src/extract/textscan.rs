//! Text-scan extraction tier.
//!
//! Label-anchored regex scan over the page's visible text. Smallest
//! coverage and lowest precedence: only the fields most prone to markup
//! breakage are listed, and the merger consults this tier last.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::RawFieldMap;

/// Label-anchored patterns: label text, optional colon, value up to EOL
static TEXT_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    let table: &[(&str, &str)] = &[
        ("Общая Площадь", r"(?mi)Общая\s+площадь\s*:?\s*([\d][^\n]*)"),
        ("Всего Этажей", r"(?mi)(?:Всего\s+этажей|Этажей\s+всего)\s*:?\s*(\d+)"),
        ("Этаж", r"(?mi)Этаж\b\s*:?\s*(\d+[^\n]*)"),
        ("Высота Потолков", r"(?mi)Высота\s+потолков\s*:?\s*([\d][^\n]*)"),
        ("Район", r"(?mi)Район\s*:\s*([^\n]+)"),
        ("Отделка", r"(?mi)Отделка\s*:\s*([^\n]+)"),
    ];

    table
        .iter()
        .map(|(field, pattern)| {
            (*field, Regex::new(pattern).expect("static text pattern must compile"))
        })
        .collect()
});

/// Extract raw fields from visible page text.
///
/// Returns an empty map when nothing matches; never errors.
pub fn extract(text: &str) -> RawFieldMap {
    let mut extracted = RawFieldMap::new();

    for (field, pattern) in TEXT_PATTERNS.iter() {
        if let Some(captures) = pattern.captures(text) {
            if let Some(value) = captures.get(1) {
                let value = value.as_str().trim();
                if !value.is_empty() {
                    extracted.insert(field.to_string(), value.to_string());
                }
            }
        }
    }

    debug!("Text-scan tier resolved {} fields", extracted.len());
    extracted
}
