use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::model::{CellValue, ColumnError, Row, Table};

// ---------------------------------------------------------------------------
// Derived tables (averages, timeline)
// ---------------------------------------------------------------------------

/// Group rows by the composite `keys` and average `value_column` per group.
///
/// Groups appear in first-seen order. The output has the key columns
/// followed by `out_column` holding the mean as a float.
pub fn mean_by(
    table: &Table,
    keys: &[&str],
    value_column: &str,
    out_column: &str,
) -> Result<Table, ColumnError> {
    for key in keys {
        table.require_column(key)?;
    }
    table.require_column(value_column)?;

    let mut index: BTreeMap<Vec<CellValue>, usize> = BTreeMap::new();
    let mut groups: Vec<(Vec<CellValue>, f64, usize)> = Vec::new();

    for (i, row) in table.rows.iter().enumerate() {
        let key: Vec<CellValue> = keys
            .iter()
            .map(|k| row.get(*k).cloned().unwrap_or(CellValue::Null))
            .collect();
        let value = table.numeric(i, value_column)?;
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, 0.0, 0));
            groups.len() - 1
        });
        groups[slot].1 += value;
        groups[slot].2 += 1;
    }

    let rows: Vec<Row> = groups
        .into_iter()
        .map(|(key, sum, count)| {
            let mut row: Row = keys
                .iter()
                .map(|k| k.to_string())
                .zip(key)
                .collect();
            row.insert(out_column.to_string(), CellValue::Float(sum / count as f64));
            row
        })
        .collect();

    let mut columns: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
    columns.push(out_column.to_string());
    Ok(Table::from_rows(columns, rows))
}

/// Parse a date label such as `2024-03-01`, `3/1/2024` or `3/1 (Friday)`.
pub fn parse_date(label: &str) -> Option<NaiveDate> {
    let text = label.split(" (").next().unwrap_or(label).trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%m/%d/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(&format!("{text}/2000"), "%m/%d/%Y"))
        .ok()
}

/// Stable-sort rows by the date in `column`. Rows stay in input order
/// unless every cell parses as a date.
pub fn sort_chronologically(table: &Table, column: &str) -> Table {
    let dates: Option<Vec<NaiveDate>> = (0..table.len())
        .map(|i| parse_date(&table.label(i, column)))
        .collect();

    match dates {
        Some(dates) => {
            let mut order: Vec<usize> = (0..table.len()).collect();
            order.sort_by_key(|&i| dates[i]);
            table.subset(&order)
        }
        None => {
            log::debug!("column '{column}' is not all dates; keeping row order");
            table.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::table;

    #[test]
    fn mean_by_composite_key_keeps_first_seen_order() {
        let t = table(
            &["Platform", "PostType", "Likes"],
            &[
                &["Twitter", "Video", "10"],
                &["Instagram", "Image", "5"],
                &["Twitter", "Video", "30"],
                &["Twitter", "Link", "7"],
            ],
        );
        let avg = mean_by(&t, &["Platform", "PostType"], "Likes", "AvgLikes").unwrap();
        assert_eq!(avg.column_names, ["Platform", "PostType", "AvgLikes"]);
        assert_eq!(avg.len(), 3);
        assert_eq!(avg.label(0, "Platform"), "Twitter");
        assert_eq!(avg.numeric(0, "AvgLikes").unwrap(), 20.0);
        assert_eq!(avg.label(1, "Platform"), "Instagram");
        assert_eq!(avg.numeric(2, "AvgLikes").unwrap(), 7.0);
    }

    #[test]
    fn mean_by_reports_missing_columns() {
        let t = table(&["Date", "Likes"], &[&["3/1", "1"]]);
        assert_eq!(
            mean_by(&t, &["Day"], "Likes", "AvgLikes").unwrap_err(),
            ColumnError::Missing("Day".into())
        );
    }

    #[test]
    fn parses_date_formats() {
        let march_first = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(parse_date("2024-03-01"), Some(march_first));
        assert_eq!(parse_date("3/1/2024 (Friday)"), Some(march_first));
        assert_eq!(parse_date("3/7").map(|d| d.to_string()), Some("2000-03-07".into()));
        assert_eq!(parse_date("Friday"), None);
    }

    #[test]
    fn sorts_only_when_all_rows_are_dates() {
        let t = table(
            &["Date", "AvgLikes"],
            &[&["3/3/2024", "3"], &["3/1/2024", "1"], &["3/2/2024", "2"]],
        );
        let sorted = sort_chronologically(&t, "Date");
        assert_eq!(sorted.column_labels("Date"), ["3/1/2024", "3/2/2024", "3/3/2024"]);

        let mixed = table(&["Date", "AvgLikes"], &[&["later", "3"], &["3/1/2024", "1"]]);
        assert_eq!(
            sort_chronologically(&mixed, "Date").column_labels("Date"),
            ["later", "3/1/2024"]
        );
    }
}
