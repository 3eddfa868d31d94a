//! Canonical field dictionary for listing attributes.
//!
//! Field names use the source site's native (Russian) label vocabulary.
//! Each entry carries the value kind used by the normalizer and the ordered
//! candidate key list used by the embedded-state pattern scan.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Value kind of a canonical field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Decimal quantity with a trailing unit, e.g. "64.2 м²"
    NumericWithUnit,
    /// Whole-number count, e.g. floor number
    IntegerCount,
    /// Free-text category, passed through as-is
    Category,
}

/// One entry in the field dictionary
#[derive(Debug, Clone, Copy)]
pub struct CanonicalField {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Candidate JSON key names tried in order; the first match wins.
    pub json_keys: &'static [&'static str],
}

use FieldKind::{Category, IntegerCount, NumericWithUnit};

/// The complete dictionary of extractable listing attributes
pub static DICTIONARY: &[CanonicalField] = &[
    CanonicalField { name: "Район", kind: Category, json_keys: &["district", "area"] },
    CanonicalField {
        name: "Класс Жилья",
        kind: Category,
        json_keys: &["buildingClass", "class", "comfortClass"],
    },
    CanonicalField { name: "Корпус", kind: Category, json_keys: &["building", "corps"] },
    CanonicalField {
        name: "Всего Этажей",
        kind: IntegerCount,
        json_keys: &["floorsTotal", "totalFloors", "floorCount"],
    },
    CanonicalField { name: "Очередь", kind: Category, json_keys: &["phase", "stage"] },
    CanonicalField {
        name: "Тип Здания",
        kind: Category,
        json_keys: &["buildingType", "material"],
    },
    CanonicalField { name: "Этаж", kind: IntegerCount, json_keys: &["floor"] },
    CanonicalField { name: "Секция", kind: Category, json_keys: &["section", "entrance"] },
    CanonicalField {
        name: "Тип Недвижимости",
        kind: Category,
        json_keys: &["propertyType", "realtyType"],
    },
    CanonicalField { name: "Категория", kind: Category, json_keys: &["category"] },
    CanonicalField { name: "Квартиры", kind: IntegerCount, json_keys: &["apartments", "units"] },
    CanonicalField {
        name: "Отделка",
        kind: Category,
        json_keys: &["finishing", "renovation", "decoration"],
    },
    CanonicalField { name: "Статус", kind: Category, json_keys: &["status", "state"] },
    CanonicalField { name: "Вариант Кв.", kind: Category, json_keys: &["option", "variant"] },
    CanonicalField { name: "Ипотека", kind: Category, json_keys: &["mortgage"] },
    CanonicalField { name: "Субсидии", kind: Category, json_keys: &["subsidy", "subsidies"] },
    CanonicalField {
        name: "Планировка",
        kind: Category,
        json_keys: &["planning", "layout", "plan"],
    },
    CanonicalField {
        name: "Высота Потолков",
        kind: NumericWithUnit,
        json_keys: &["ceilingHeight", "ceiling"],
    },
    CanonicalField {
        name: "Общая Площадь",
        kind: NumericWithUnit,
        json_keys: &["totalArea", "area"],
    },
    CanonicalField {
        name: "Площадь без Балкона",
        kind: NumericWithUnit,
        json_keys: &["areaWithoutBalcony", "netArea"],
    },
    CanonicalField { name: "Жилая Площадь", kind: NumericWithUnit, json_keys: &["livingArea"] },
    CanonicalField {
        name: "Площадь Кухни",
        kind: NumericWithUnit,
        json_keys: &["kitchenArea", "kitchen"],
    },
    CanonicalField {
        name: "Площадь Коридора",
        kind: NumericWithUnit,
        json_keys: &["hallwayArea", "corridorArea"],
    },
    CanonicalField {
        name: "Площадь Ванной",
        kind: NumericWithUnit,
        json_keys: &["bathroomArea", "bathArea"],
    },
    CanonicalField {
        name: "Площадь Балкона",
        kind: NumericWithUnit,
        json_keys: &["balconyArea", "balcony"],
    },
    CanonicalField {
        name: "Площадь Участка",
        kind: NumericWithUnit,
        json_keys: &["landArea", "plotArea"],
    },
    CanonicalField {
        name: "Застройщик (Код)",
        kind: Category,
        json_keys: &["developerName", "developer", "builder"],
    },
    CanonicalField {
        name: "Комплекс (Код)",
        kind: Category,
        json_keys: &["complexName", "complex", "residentialComplex", "zhk"],
    },
];

static KIND_INDEX: Lazy<HashMap<&'static str, FieldKind>> =
    Lazy::new(|| DICTIONARY.iter().map(|f| (f.name, f.kind)).collect());

/// Look up the kind of a canonical field by name
pub fn kind_of(name: &str) -> Option<FieldKind> {
    KIND_INDEX.get(name).copied()
}

/// A markup label classification rule.
///
/// Rules are matched against the lowercased label text; the first rule
/// whose `all` substrings are present and `none` substrings are absent
/// wins. Ordering matters: "этажей"+"всего" must be tested before the
/// bare "этаж" rule or a total-floors label would be captured as a plain
/// floor.
#[derive(Debug, Clone, Copy)]
pub struct LabelRule {
    pub all: &'static [&'static str],
    pub none: &'static [&'static str],
    pub field: &'static str,
}

/// Ordered label rules, most specific first where substrings overlap
pub static LABEL_RULES: &[LabelRule] = &[
    LabelRule { all: &["район"], none: &[], field: "Район" },
    LabelRule { all: &["класс жилья"], none: &[], field: "Класс Жилья" },
    LabelRule { all: &["корпус"], none: &[], field: "Корпус" },
    LabelRule { all: &["этажей", "всего"], none: &[], field: "Всего Этажей" },
    LabelRule { all: &["очередь"], none: &[], field: "Очередь" },
    LabelRule { all: &["тип здания"], none: &[], field: "Тип Здания" },
    LabelRule { all: &["этаж"], none: &["всего"], field: "Этаж" },
    LabelRule { all: &["секция"], none: &[], field: "Секция" },
    LabelRule { all: &["тип недвижимости"], none: &[], field: "Тип Недвижимости" },
    LabelRule { all: &["категория"], none: &[], field: "Категория" },
    LabelRule { all: &["количество квартир"], none: &[], field: "Квартиры" },
    LabelRule { all: &["квартиры"], none: &[], field: "Квартиры" },
    LabelRule { all: &["отделка"], none: &[], field: "Отделка" },
    LabelRule { all: &["статус"], none: &[], field: "Статус" },
    LabelRule { all: &["вариант"], none: &[], field: "Вариант Кв." },
    LabelRule { all: &["ипотека"], none: &[], field: "Ипотека" },
    LabelRule { all: &["субсидии"], none: &[], field: "Субсидии" },
    LabelRule { all: &["планировка"], none: &[], field: "Планировка" },
    LabelRule { all: &["потолков"], none: &[], field: "Высота Потолков" },
    LabelRule { all: &["высота"], none: &[], field: "Высота Потолков" },
    LabelRule { all: &["общая площадь"], none: &[], field: "Общая Площадь" },
    LabelRule { all: &["площадь без балкона"], none: &[], field: "Площадь без Балкона" },
    LabelRule { all: &["жилая площадь"], none: &[], field: "Жилая Площадь" },
    LabelRule { all: &["площадь кухни"], none: &[], field: "Площадь Кухни" },
    LabelRule { all: &["площадь коридора"], none: &[], field: "Площадь Коридора" },
    LabelRule { all: &["площадь ванной"], none: &[], field: "Площадь Ванной" },
    LabelRule { all: &["площадь балкона"], none: &[], field: "Площадь Балкона" },
    LabelRule { all: &["площадь участка"], none: &[], field: "Площадь Участка" },
    LabelRule { all: &["застройщик"], none: &[], field: "Застройщик (Код)" },
    LabelRule { all: &["комплекс"], none: &[], field: "Комплекс (Код)" },
];

/// Classify a markup label into a canonical field name
pub fn match_label(label: &str) -> Option<&'static str> {
    let label = label.to_lowercase();

    LABEL_RULES
        .iter()
        .find(|rule| {
            rule.all.iter().all(|s| label.contains(s))
                && rule.none.iter().all(|s| !label.contains(s))
        })
        .map(|rule| rule.field)
}
