use crate::aggregate::CategoryTotals;
use crate::args::Args;
use crate::chart::{ChartOptions, PieChart};
use crate::errors::ReportError;
use crate::records::{load_income, load_spending};
use crate::render::{write_chart, Rasterizer};
use crate::series::{income_series, spending_series, LabeledProportion};
use std::path::Path;
use tracing::debug;

pub const SPENDING_CHART: &str = "committed-spending.png";
pub const INCOME_CHART: &str = "income-breakdown.png";

/// Parses the spending file and reduces it to one labelled slice per
/// category.
pub fn load_spending_series(path: &Path) -> Result<Vec<LabeledProportion<f64>>, ReportError> {
    let records = load_spending(path)?;
    let totals = CategoryTotals::from_records(&records);
    debug!(
        records = records.len(),
        categories = totals.len(),
        "aggregated spending"
    );

    Ok(spending_series(&totals))
}

/// Parses the income file into one labelled slice per row.
pub fn load_income_series(path: &Path) -> Result<Vec<LabeledProportion<i32>>, ReportError> {
    let groups = load_income(path)?;
    debug!(groups = groups.len(), "parsed income");

    Ok(income_series(&groups))
}

/// Produces both charts in `out_dir`, spending first.
///
/// The two pipelines share nothing, but they run back to back and the first
/// error ends the run: if the spending chart fails the income file is never
/// read.
pub fn run<R: Rasterizer + ?Sized>(
    args: &Args,
    rasterizer: &R,
    out_dir: &Path,
) -> Result<(), ReportError> {
    let spending = load_spending_series(&args.spending_file)?;
    let chart = PieChart::new(ChartOptions::default(), &spending);
    write_chart(&chart, rasterizer, &out_dir.join(SPENDING_CHART))?;

    let income = load_income_series(&args.income_file)?;
    let chart = PieChart::new(ChartOptions::default(), &income);
    write_chart(&chart, rasterizer, &out_dir.join(INCOME_CHART))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RecordError;
    use crate::render::tests::FakeRasterizer;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn should_build_both_charts() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args {
            spending_file: fixture(
                &dir,
                "spending.csv",
                "date,cost,category\n2024-01-01,1.10,A\n2024-01-02,2.20,A\n2024-01-03,5.00,B\n",
            ),
            income_file: fixture(&dir, "income.csv", "Salary,2000\nSalary,500\n"),
        };
        let rasterizer = FakeRasterizer::default();

        run(&args, &rasterizer, dir.path()).unwrap();

        assert!(dir.path().join(SPENDING_CHART).exists());
        assert!(dir.path().join(INCOME_CHART).exists());
        assert!(!dir.path().join("committed-spending.svg").exists());
        assert!(!dir.path().join("income-breakdown.svg").exists());

        let seen = rasterizer.seen.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].contains("A: £3.30"));
        assert!(seen[0].contains("B: £5.00"));
        assert!(seen[1].contains("Salary: £2000"));
        assert!(seen[1].contains("Salary: £500"));
    }

    #[test]
    fn should_aggregate_spending_series() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(
            &dir,
            "spending.csv",
            "date,cost,category\n2024-01-01,1.10,A\n2024-01-02,2.20,A\n2024-01-03,5.00,B\n",
        );

        let mut series = load_spending_series(&path).unwrap();
        series.sort_by(|a, b| a.label.cmp(&b.label));

        assert_eq!(
            series,
            vec![
                LabeledProportion {
                    label: String::from("A: £3.30"),
                    value: 1.10 + 2.20,
                },
                LabeledProportion {
                    label: String::from("B: £5.00"),
                    value: 5.0,
                },
            ]
        );
    }

    #[test]
    fn should_build_empty_chart_for_header_only_spending() {
        let dir = tempfile::tempdir().unwrap();
        let path = fixture(&dir, "spending.csv", "date,cost,category\n");

        assert!(load_spending_series(&path).unwrap().is_empty());
    }

    #[test]
    fn should_abort_before_income_when_spending_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args {
            spending_file: fixture(
                &dir,
                "spending.csv",
                "date,cost,category\n2024-01-01,abc,Food\n",
            ),
            // Would fail too, but must never be read.
            income_file: dir.path().join("missing.csv"),
        };
        let rasterizer = FakeRasterizer::default();

        let err = run(&args, &rasterizer, dir.path()).unwrap_err();

        assert!(matches!(
            err,
            ReportError::Records {
                source: RecordError::InvalidCost { .. },
                ..
            }
        ));
        assert!(rasterizer.seen.borrow().is_empty());
        assert!(!dir.path().join(SPENDING_CHART).exists());
        assert!(!dir.path().join(INCOME_CHART).exists());
    }

    #[test]
    fn should_keep_spending_chart_when_income_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = Args {
            spending_file: fixture(&dir, "spending.csv", "date,cost,category\n1,2.00,Food\n"),
            income_file: fixture(&dir, "income.csv", "Salary,lots\n"),
        };

        let err = run(&args, &FakeRasterizer::default(), dir.path()).unwrap_err();

        assert!(matches!(
            err,
            ReportError::Records {
                source: RecordError::InvalidAmount { .. },
                ..
            }
        ));
        assert!(dir.path().join(SPENDING_CHART).exists());
        assert!(!dir.path().join(INCOME_CHART).exists());
    }
}
