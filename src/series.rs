use crate::aggregate::CategoryTotals;
use crate::records::IncomeGroup;

/// One slice of a pie chart.
///
/// The label already embeds the formatted value, so a renderer should draw
/// it as-is and must not overlay its own numeric label on the slice.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledProportion<T> {
    pub label: String,
    pub value: T,
}

impl<T: Copy + Into<f64>> LabeledProportion<T> {
    /// The slice weight as seen by the renderer.
    pub fn weight(&self) -> f64 {
        self.value.into()
    }
}

/// Builds the spending series, one entry per category, labelled
/// `"{category}: £{total:.2}"`. Entries follow the iteration order of
/// `totals`; nothing is sorted, merged or filtered out.
pub fn spending_series(totals: &CategoryTotals) -> Vec<LabeledProportion<f64>> {
    totals
        .iter()
        .map(|(category, &total)| LabeledProportion {
            label: format!("{}: £{:.2}", category, total),
            value: total,
        })
        .collect()
}

/// Builds the income series in input order, labelled
/// `"{category}: £{amount}"`.
pub fn income_series(groups: &[IncomeGroup]) -> Vec<LabeledProportion<i32>> {
    groups
        .iter()
        .map(|group| LabeledProportion {
            label: format!("{}: £{}", group.category, group.amount),
            value: group.amount,
        })
        .collect()
}
