//! Field normalization: native-vocabulary raw values into the model's
//! feature schema.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::extract::MergedFieldMap;
use crate::fields::{self, FieldKind};

/// A typed feature value in the model schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Float(f64),
    Int(i64),
    Text(String),
}

impl FeatureValue {
    /// Numeric view of the value, if it has one.
    /// Text is parsed leniently so already-normalized records round-trip.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    /// String rendering used for categorical model inputs
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Float(v) => v.to_string(),
            Self::Int(v) => v.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Mapping from model-schema column name to a typed value
pub type FeatureRecord = BTreeMap<String, FeatureValue>;

/// Static one-to-one rename table: native field name to model column
static RENAME_TABLE: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Район", "District"),
        ("Класс Жилья", "Class"),
        ("Корпус", "Building"),
        ("Всего Этажей", "FloorsTotal"),
        ("Очередь", "Phase"),
        ("Тип Здания", "BuildingType"),
        ("Этаж", "Floor"),
        ("Секция", "Section"),
        ("Тип Недвижимости", "PropertyType"),
        ("Категория", "PropertyCategory"),
        ("Квартиры", "Apartments"),
        ("Отделка", "Finishing"),
        ("Статус", "Status"),
        ("Вариант Кв.", "ApartmentOption"),
        ("Ипотека", "Mortgage"),
        ("Субсидии", "Subsidies"),
        ("Планировка", "Layout"),
        ("Высота Потолков", "CeilingHeight"),
        ("Общая Площадь", "TotalArea"),
        ("Площадь без Балкона", "AreaWithoutBalcony"),
        ("Жилая Площадь", "LivingArea"),
        ("Площадь Кухни", "KitchenArea"),
        ("Площадь Коридора", "HallwayArea"),
        ("Площадь Ванной", "BathroomArea"),
        ("Площадь Балкона", "BalconyArea"),
        ("Площадь Участка", "PlotArea"),
        ("Застройщик (Код)", "Developer_encoded"),
        ("Комплекс (Код)", "Complex_encoded"),
    ])
});

/// Column-name view of the dictionary kinds, so that records keyed by
/// schema columns normalize the same way as native-vocabulary ones
static COLUMN_KINDS: Lazy<HashMap<&'static str, FieldKind>> = Lazy::new(|| {
    fields::DICTIONARY
        .iter()
        .filter_map(|field| {
            RENAME_TABLE
                .get(field.name)
                .map(|column| (*column, field.kind))
        })
        .collect()
});

static DECIMAL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+(?:[.,]\d+)?").expect("decimal token pattern must compile"));

static INTEGER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("integer token pattern must compile"));

/// First decimal or integer token of a raw string, with either comma or
/// period as the decimal separator: "85,5 м²" parses as 85.5
pub fn parse_decimal(raw: &str) -> Option<f64> {
    DECIMAL_TOKEN
        .find(raw)
        .and_then(|token| token.as_str().replace(',', ".").parse::<f64>().ok())
}

/// First integer token of a raw string: "12 этаж" parses as 12
pub fn parse_integer(raw: &str) -> Option<i64> {
    INTEGER_TOKEN
        .find(raw)
        .and_then(|token| token.as_str().parse::<i64>().ok())
}

/// Kind of a key, whether it is native vocabulary or already a schema column
fn kind_of_key(key: &str) -> FieldKind {
    fields::kind_of(key)
        .or_else(|| COLUMN_KINDS.get(key).copied())
        .unwrap_or(FieldKind::Category)
}

/// Normalize a merged raw-field map into a typed feature record.
///
/// Keys are renamed through the static table (unmapped keys pass through
/// unchanged), numeric fields have their unit suffix stripped, count
/// fields become integers and categories stay as trimmed text. A field
/// whose raw value yields no numeric token is dropped rather than zeroed,
/// so "missing" stays distinguishable from "zero" until default fill.
/// A single field failing never aborts the rest.
pub fn normalize(raw: &MergedFieldMap) -> FeatureRecord {
    let mut record = FeatureRecord::new();

    for (key, value) in raw {
        let column = RENAME_TABLE
            .get(key.as_str())
            .map(|c| c.to_string())
            .unwrap_or_else(|| key.clone());

        match kind_of_key(key) {
            FieldKind::NumericWithUnit => match parse_decimal(value) {
                Some(number) => {
                    record.insert(column, FeatureValue::Float(number));
                }
                None => {
                    debug!("Dropping field '{}': no numeric token in '{}'", key, value);
                }
            },
            FieldKind::IntegerCount => match parse_integer(value) {
                Some(number) => {
                    record.insert(column, FeatureValue::Int(number));
                }
                None => {
                    debug!("Dropping field '{}': no integer token in '{}'", key, value);
                }
            },
            FieldKind::Category => {
                record.insert(column, FeatureValue::Text(value.trim().to_string()));
            }
        }
    }

    record
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> MergedFieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_numeric_unit_stripping() {
        assert_eq!(parse_decimal("85.5 м²"), Some(85.5));
        assert_eq!(parse_decimal("85,5 м²"), Some(85.5));
        assert_eq!(parse_decimal("2.8 м"), Some(2.8));
        assert_eq!(parse_decimal("нет данных"), None);
    }

    #[test]
    fn test_integer_extraction() {
        assert_eq!(parse_integer("12 этаж"), Some(12));
        assert_eq!(parse_integer("7 из 25"), Some(7));
        assert_eq!(parse_integer("подвал"), None);
    }

    #[test]
    fn test_normalize_renames_and_types() {
        let record = normalize(&raw(&[
            ("Общая Площадь", "64.2 м²"),
            ("Этаж", "7"),
            ("Район", " Бутово "),
        ]));

        assert_eq!(record.get("TotalArea"), Some(&FeatureValue::Float(64.2)));
        assert_eq!(record.get("Floor"), Some(&FeatureValue::Int(7)));
        assert_eq!(
            record.get("District"),
            Some(&FeatureValue::Text("Бутово".to_string()))
        );
    }

    #[test]
    fn test_unparseable_numeric_field_is_dropped_not_zeroed() {
        let record = normalize(&raw(&[("Общая Площадь", "уточняется")]));
        assert!(!record.contains_key("TotalArea"));
    }

    #[test]
    fn test_partial_failure_keeps_other_fields() {
        let record = normalize(&raw(&[
            ("Общая Площадь", "уточняется"),
            ("Этаж", "7"),
        ]));

        assert_eq!(record.len(), 1);
        assert_eq!(record.get("Floor"), Some(&FeatureValue::Int(7)));
    }

    #[test]
    fn test_unmapped_keys_pass_through() {
        let record = normalize(&raw(&[("Парковка", "подземная")]));
        assert_eq!(
            record.get("Парковка"),
            Some(&FeatureValue::Text("подземная".to_string()))
        );
    }

    #[test]
    fn test_idempotence_on_schema_named_record() {
        let first = normalize(&raw(&[
            ("Общая Площадь", "64.2 м²"),
            ("Этаж", "7"),
            ("Район", "Бутово"),
        ]));

        // Render the normalized record back to strings and normalize again.
        let as_strings: MergedFieldMap = first
            .iter()
            .map(|(k, v)| (k.clone(), v.to_display_string()))
            .collect();
        let second = normalize(&as_strings);

        assert_eq!(first, second);
    }
}
