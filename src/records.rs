use crate::errors::{RecordError, ReportError};
use csv::{ByteRecord, Trim};
use std::fs::File;
use std::path::Path;
use std::str;
use tracing::debug;

/// A single spending line item.
#[derive(Clone, Debug, PartialEq)]
pub struct SpendingRecord {
    pub category: String,

    /// The amount spent on this item. Negative values (refunds) are allowed
    /// and are summed like any other cost.
    pub cost: f64,
}

/// An income bucket whose amount has already been totalled by the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct IncomeGroup {
    pub category: String,
    pub amount: i32,
}

/// Reads every row of the CSV file at `path` without interpreting any of
/// them as a header. Fields are kept as raw bytes and rows may differ in
/// width; only the fields a parser actually consumes are ever decoded.
pub fn read_rows(path: &Path) -> Result<Vec<ByteRecord>, ReportError> {
    let file = File::open(path).map_err(|source| ReportError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;

    // Note: the csv reader wraps the file in its own io::BufReader.
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .trim(Trim::None)
        .from_reader(file);

    let mut rows = Vec::new();
    for row in reader.byte_records() {
        rows.push(row.map_err(|err| ReportError::from_csv(path.to_path_buf(), err))?);
    }

    debug!(path = %path.display(), rows = rows.len(), "read csv rows");
    Ok(rows)
}

/// Converts spending rows into records.
///
/// The first row is always treated as the header and dropped without being
/// inspected or decoded. Every other row must carry the cost at index 1 and the
/// category at index 2; index 0 is not consumed. The first unparseable cost
/// aborts the whole parse.
pub fn parse_spending(rows: &[ByteRecord]) -> Result<Vec<SpendingRecord>, RecordError> {
    rows.iter()
        .enumerate()
        .skip(1)
        .map(|(idx, row)| -> Result<SpendingRecord, RecordError> {
            let row_number = idx + 1;
            let [cost, category] = required_fields(row, row_number, [1, 2])?;
            let cost = cost
                .parse::<f64>()
                .map_err(|source| RecordError::InvalidCost {
                    row: row_number,
                    value: cost.to_string(),
                    source,
                })?;

            Ok(SpendingRecord {
                category: category.to_string(),
                cost,
            })
        })
        .collect()
}

/// Converts headerless income rows into groups, one per row and in file
/// order. Rows sharing a category are NOT merged.
pub fn parse_income(rows: &[ByteRecord]) -> Result<Vec<IncomeGroup>, RecordError> {
    rows.iter()
        .enumerate()
        .map(|(idx, row)| -> Result<IncomeGroup, RecordError> {
            let row_number = idx + 1;
            let [category, amount] = required_fields(row, row_number, [0, 1])?;
            let amount = amount
                .parse::<i32>()
                .map_err(|source| RecordError::InvalidAmount {
                    row: row_number,
                    value: amount.to_string(),
                    source,
                })?;

            Ok(IncomeGroup {
                category: category.to_string(),
                amount,
            })
        })
        .collect()
}

/// Reads and parses the spending file at `path`.
pub fn load_spending(path: &Path) -> Result<Vec<SpendingRecord>, ReportError> {
    let rows = read_rows(path)?;
    parse_spending(&rows).map_err(|source| ReportError::Records {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads and parses the income file at `path`.
pub fn load_income(path: &Path) -> Result<Vec<IncomeGroup>, ReportError> {
    let rows = read_rows(path)?;
    parse_income(&rows).map_err(|source| ReportError::Records {
        path: path.to_path_buf(),
        source,
    })
}

/// Fetches and decodes the fields at `indices`, failing when the row is too
/// short to hold all of them or one of them is not UTF-8. Other fields,
/// including trailing ones beyond the highest index, are left untouched.
fn required_fields<'r, const N: usize>(
    row: &'r ByteRecord,
    row_number: usize,
    indices: [usize; N],
) -> Result<[&'r str; N], RecordError> {
    let expected = indices.iter().max().map_or(0, |max| max + 1);
    if row.len() < expected {
        return Err(RecordError::MalformedInput {
            row: row_number,
            expected,
            found: row.len(),
        });
    }

    let mut fields = [""; N];
    for (field, &idx) in fields.iter_mut().zip(indices.iter()) {
        *field = str::from_utf8(&row[idx]).map_err(|source| RecordError::InvalidEncoding {
            row: row_number,
            field: idx,
            source,
        })?;
    }

    Ok(fields)
}
