//! Markup extraction tier.
//!
//! Parses the rendered document for parameter elements and reads them as
//! label/value line pairs. The structural class markers below track the
//! source site's build artifacts and are expected to change whenever the
//! site ships a new bundle; this is the fragile tier by design.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

use super::RawFieldMap;
use crate::fields;

/// Elements whose class attribute carries one of the known parameter markers
static PARAM_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"li[class*="cui-wzd2b5"], div[class*="c6c5c8b1"], span[class*="c1c5b1a0"]"#)
        .expect("static selector must parse")
});

/// Extract raw fields from rendered markup.
///
/// Returns an empty map when nothing matches; missing or malformed
/// elements are skipped silently.
pub fn extract(markup: &str) -> RawFieldMap {
    let document = Html::parse_document(markup);
    let mut extracted = RawFieldMap::new();

    for element in document.select(&PARAM_SELECTOR) {
        // A label and value may share one text node, split by a newline.
        let lines: Vec<&str> = element
            .text()
            .flat_map(|node| node.split('\n'))
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if lines.len() < 2 {
            continue;
        }

        let Some(field) = fields::match_label(lines[0]) else {
            continue;
        };

        // First occurrence wins within this tier.
        extracted
            .entry(field.to_string())
            .or_insert_with(|| lines[1].to_string());
    }

    debug!("Markup tier resolved {} fields", extracted.len());
    extracted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_markup() {
        assert!(extract("").is_empty());
        assert!(extract("<html><body><p>nothing here</p></body></html>").is_empty());
    }

    #[test]
    fn test_label_value_pairs() {
        let markup = r#"
            <ul>
              <li class="cui-wzd2b5 a1"><span>Этаж</span><span>7</span></li>
              <li class="cui-wzd2b5 a2"><span>Всего этажей</span><span>25</span></li>
              <div class="c6c5c8b1"><span>Общая площадь</span><span>64.2 м²</span></div>
            </ul>
        "#;
        let map = extract(markup);

        assert_eq!(map.get("Этаж").map(String::as_str), Some("7"));
        assert_eq!(map.get("Всего Этажей").map(String::as_str), Some("25"));
        assert_eq!(map.get("Общая Площадь").map(String::as_str), Some("64.2 м²"));
    }

    #[test]
    fn test_label_and_value_in_one_text_node() {
        let markup = "<li class=\"cui-wzd2b5\">Этаж\n7</li>\
                      <li class=\"cui-wzd2b5\">Общая площадь\n64.2 м²</li>";
        let map = extract(markup);

        assert_eq!(map.get("Этаж").map(String::as_str), Some("7"));
        assert_eq!(map.get("Общая Площадь").map(String::as_str), Some("64.2 м²"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let markup = r#"
            <li class="cui-wzd2b5"><span>Этаж</span><span>7</span></li>
            <li class="cui-wzd2b5"><span>Этаж</span><span>99</span></li>
        "#;
        let map = extract(markup);
        assert_eq!(map.get("Этаж").map(String::as_str), Some("7"));
    }

    #[test]
    fn test_single_line_elements_are_skipped() {
        let markup = r#"<li class="cui-wzd2b5"><span>Этаж</span></li>"#;
        assert!(extract(markup).is_empty());
    }

    #[test]
    fn test_unknown_labels_are_skipped() {
        let markup = r#"<li class="cui-wzd2b5"><span>Парковка</span><span>есть</span></li>"#;
        assert!(extract(markup).is_empty());
    }

    #[test]
    fn test_total_floors_not_captured_as_floor() {
        let markup = r#"
            <li class="cui-wzd2b5"><span>Этажей всего</span><span>25</span></li>
        "#;
        let map = extract(markup);
        assert_eq!(map.get("Всего Этажей").map(String::as_str), Some("25"));
        assert!(!map.contains_key("Этаж"));
    }
}
