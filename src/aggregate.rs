use crate::records::SpendingRecord;
use std::collections::hash_map::{Entry, Iter};
use std::collections::HashMap;

/// Summed spending per category.
///
/// Iteration order is whatever the underlying map yields. It is stable for a
/// given value, which is all the series builder relies on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryTotals {
    totals: HashMap<String, f64>,
}

impl CategoryTotals {
    /// Folds the records into per-category totals. Costs are added in input
    /// order so repeated runs over the same file are bit-for-bit identical.
    /// Categories are compared exactly: "Food" and "food" are separate.
    pub fn from_records(records: &[SpendingRecord]) -> Self {
        let mut totals: HashMap<String, f64> = HashMap::new();

        for record in records {
            match totals.entry(record.category.clone()) {
                Entry::Occupied(mut total) => {
                    let total = total.get_mut();
                    *total += record.cost;
                }
                Entry::Vacant(vacancy) => {
                    vacancy.insert(record.cost);
                }
            }
        }

        Self { totals }
    }

    pub fn get(&self, category: &str) -> Option<f64> {
        self.totals.get(category).copied()
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, String, f64> {
        self.totals.iter()
    }
}

impl<'a> IntoIterator for &'a CategoryTotals {
    type Item = (&'a String, &'a f64);
    type IntoIter = Iter<'a, String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<&[SpendingRecord]> for CategoryTotals {
    fn from(records: &[SpendingRecord]) -> Self {
        Self::from_records(records)
    }
}
