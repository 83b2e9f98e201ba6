use crate::importer::FileFailure;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Stage")]
    stage: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Error")]
    error: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, String)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

pub fn failures_table(failures: &[FileFailure]) -> String {
    if failures.is_empty() {
        return String::new();
    }

    let rows: Vec<FailureRow> = failures
        .iter()
        .map(|f| FailureRow {
            file: f.path.display().to_string(),
            stage: f.stage.to_string(),
            kind: f.kind.to_string(),
            error: f.message.clone(),
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::FileStage;
    use std::path::PathBuf;

    #[test]
    fn test_stats_table_contains_rows() {
        let table = stats_table(&[("Games", "3".to_string()), ("Stat rows", "42".to_string())]);
        assert!(table.contains("Metric"));
        assert!(table.contains("Stat rows"));
        assert!(table.contains("42"));
    }

    #[test]
    fn test_empty_tables_render_nothing() {
        assert!(TableBuilder::new().build().is_empty());
        assert!(failures_table(&[]).is_empty());
    }

    #[test]
    fn test_failures_table() {
        let failures = vec![FileFailure {
            path: PathBuf::from("week1/broken.json"),
            stage: FileStage::Discovered,
            kind: "parse",
            message: "Parse error: EOF while parsing".to_string(),
        }];
        let table = failures_table(&failures);
        assert!(table.contains("broken.json"));
        assert!(table.contains("discovered"));
        assert!(table.contains("parse"));
    }
}
