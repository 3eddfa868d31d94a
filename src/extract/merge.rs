//! Reconciliation of the three extraction tiers.

use super::{MergedFieldMap, RawFieldMap};

/// Merge the tier results under fixed precedence:
/// embedded state > markup > text scan.
///
/// A field resolved by a higher-precedence tier is never overwritten by a
/// lower one, and a field resolved by any tier is never dropped. The result
/// depends only on the inputs and the precedence order.
pub fn merge(embedded: RawFieldMap, markup: RawFieldMap, textscan: RawFieldMap) -> MergedFieldMap {
    let mut merged = embedded;

    for (field, value) in markup {
        merged.entry(field).or_insert(value);
    }

    for (field, value) in textscan {
        merged.entry(field).or_insert(value);
    }

    merged
}
