use super::{read_inventory_csv, InventoryRow};
use crate::error::Error;
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionStats {
    pub extension: String,
    pub count: usize,
    pub total_bytes: u64,
}

#[derive(Debug, Clone, Default)]
pub struct InventorySummary {
    pub by_extension: Vec<ExtensionStats>,
    /// `None` collects rows whose creation date could not be parsed.
    pub by_year: Vec<(Option<i32>, usize)>,
    pub largest: Vec<InventoryRow>,
}

fn parse_year(value: &str) -> Option<i32> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|dt| dt.year())
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d").map(|d| d.year()))
        .ok()
}

fn parse_size(value: &str) -> Option<u64> {
    value.trim().parse().ok()
}

pub fn summarize(rows: &[InventoryRow], top_n: usize) -> InventorySummary {
    let mut by_extension: BTreeMap<&str, ExtensionStats> = BTreeMap::new();
    let mut by_year: BTreeMap<Option<i32>, usize> = BTreeMap::new();

    for row in rows {
        let stats = by_extension
            .entry(row.extension.as_str())
            .or_insert_with(|| ExtensionStats {
                extension: row.extension.clone(),
                count: 0,
                total_bytes: 0,
            });
        stats.count += 1;
        stats.total_bytes += parse_size(&row.size).unwrap_or(0);

        *by_year.entry(parse_year(&row.created)).or_default() += 1;
    }

    let mut sized: Vec<(u64, &InventoryRow)> = rows
        .iter()
        .filter_map(|r| parse_size(&r.size).map(|s| (s, r)))
        .collect();
    sized.sort_by_key(|(size, row)| (Reverse(*size), row.file_path.clone()));

    // Known years first, in order, then the unknown bucket.
    let mut years: Vec<(Option<i32>, usize)> = by_year.into_iter().collect();
    years.sort_by_key(|(year, _)| (year.is_none(), *year));

    InventorySummary {
        by_extension: by_extension.into_values().collect(),
        by_year: years,
        largest: sized.into_iter().take(top_n).map(|(_, r)| r.clone()).collect(),
    }
}

pub fn summarize_csv(input: &Path, top_n: usize) -> Result<InventorySummary, Error> {
    let rows = read_inventory_csv(input)?;
    Ok(summarize(&rows, top_n))
}

impl InventorySummary {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Summary by File Extension:");
        let _ = writeln!(out, "{:<12} {:>8} {:>16}", "Extension", "Count", "Total_Size_bytes");
        for stats in &self.by_extension {
            let ext = if stats.extension.is_empty() { "(none)" } else { &stats.extension };
            let _ = writeln!(out, "{:<12} {:>8} {:>16}", ext, stats.count, stats.total_bytes);
        }

        let _ = writeln!(out, "\nSummary by Creation Year:");
        let _ = writeln!(out, "{:<8} {:>8}", "Year", "Count");
        for (year, count) in &self.by_year {
            let label = year.map(|y| y.to_string()).unwrap_or_else(|| "unknown".to_string());
            let _ = writeln!(out, "{:<8} {:>8}", label, count);
        }

        let _ = writeln!(out, "\nTop {} Largest Files:", self.largest.len());
        let _ = writeln!(out, "{:<40} {:>14}  {}", "File Name", "Size (bytes)", "File Path");
        for row in &self.largest {
            let _ = writeln!(out, "{:<40} {:>14}  {}", row.file_name, row.size, row.file_path);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(name: &str, ext: &str, size: &str, created: &str) -> InventoryRow {
        InventoryRow {
            file_path: format!("/c/{}", name),
            file_name: name.to_string(),
            extension: ext.to_string(),
            size: size.to_string(),
            created: created.to_string(),
            modified: created.to_string(),
        }
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2021-03-04T10:11:12.123456"), Some(2021));
        assert_eq!(parse_year("2019-01-01T00:00:00"), Some(2019));
        assert_eq!(parse_year("2018-07-09"), Some(2018));
        assert_eq!(parse_year("N/A"), None);
    }

    #[test]
    fn test_summarize() {
        let rows = vec![
            row("a.pdf", ".pdf", "100", "2020-01-01T00:00:00"),
            row("b.pdf", ".pdf", "300", "2021-01-01T00:00:00"),
            row("c.docx", ".docx", "200", "2021-06-01T00:00:00"),
            row("d.pdf", ".pdf", "N/A", "N/A"),
        ];
        let summary = summarize(&rows, 2);

        assert_eq!(
            summary.by_extension,
            vec![
                ExtensionStats { extension: ".docx".into(), count: 1, total_bytes: 200 },
                ExtensionStats { extension: ".pdf".into(), count: 3, total_bytes: 400 },
            ]
        );
        assert_eq!(summary.by_year, vec![(Some(2020), 1), (Some(2021), 2), (None, 1)]);
        let largest: Vec<&str> = summary.largest.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(largest, vec!["b.pdf", "c.docx"]);

        let text = summary.render();
        assert!(text.contains("Summary by File Extension:"));
        assert!(text.contains("unknown"));
    }
}
