use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::PathBuf,
};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::aggregate::WeeklyReport;
use crate::error::{Error, Result};

/// Destination for rendered weekly reports.
pub trait ReportSink {
    /// Store `report` under a name derived from `label` (a window's end date).
    fn write_report(&mut self, label: &str, report: &WeeklyReport) -> Result<()>;
}

pub fn report_file_name(label: &str) -> String {
    format!("Week_{label}.json")
}

/// Pretty JSON with four-space indentation.
pub fn render_report(report: &WeeklyReport) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    report.serialize(&mut ser)?;
    Ok(buf)
}

fn sink_failure(label: &str, source: io::Error) -> Error {
    Error::SinkWriteFailure {
        label: label.to_owned(),
        source,
    }
}

/// Writes `Week_<label>.json` files into one directory, creating it as needed.
#[derive(Debug, Clone)]
pub struct JsonDirectorySink {
    output_dir: PathBuf,
}

impl JsonDirectorySink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn report_path(&self, label: &str) -> PathBuf {
        self.output_dir.join(report_file_name(label))
    }
}

impl ReportSink for JsonDirectorySink {
    fn write_report(&mut self, label: &str, report: &WeeklyReport) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| sink_failure(label, e))?;

        let body = render_report(report).map_err(|e| sink_failure(label, e.into()))?;
        let path = self.report_path(label);
        let mut file = fs::File::create(&path).map_err(|e| sink_failure(label, e))?;
        file.write_all(&body).map_err(|e| sink_failure(label, e))?;

        tracing::info!("Stored {}", path.display());
        Ok(())
    }
}

/// Keeps rendered reports in memory, keyed by file name.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    documents: BTreeMap<String, Vec<u8>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &BTreeMap<String, Vec<u8>> {
        &self.documents
    }

    pub fn get(&self, file_name: &str) -> Option<&[u8]> {
        self.documents.get(file_name).map(Vec::as_slice)
    }
}

impl ReportSink for MemorySink {
    fn write_report(&mut self, label: &str, report: &WeeklyReport) -> Result<()> {
        let body = render_report(report).map_err(|e| sink_failure(label, e.into()))?;
        self.documents.insert(report_file_name(label), body);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::aggregate_window;
    use crate::reference::EnrichedRow;
    use crate::transaction::parse_purchase_timestamp;

    fn report() -> WeeklyReport {
        aggregate_window(&[EnrichedRow {
            customer_id: "C1".to_owned(),
            date_of_purchase: parse_purchase_timestamp("2021-01-05 10:00:00").unwrap(),
            product_id: "P1".to_owned(),
            price: 1.0,
            product_category: Some("fruit_veg".to_owned()),
            loyalty_score: Some(6),
        }])
    }

    #[test]
    fn file_name_embeds_label() {
        assert_eq!(report_file_name("2021-01-10"), "Week_2021-01-10.json");
    }

    #[test]
    fn renders_with_four_space_indent() {
        let rendered = String::from_utf8(render_report(&report()).unwrap()).unwrap();
        let expected = r#"{
    "C1": {
        "purchase_count": 1,
        "loyalty_score": 6,
        "product_id": [
            "P1"
        ],
        "product_category": [
            "fruit_veg"
        ]
    }
}"#;
        assert_eq!(rendered, expected);
    }

    #[test]
    fn directory_sink_creates_missing_directories() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut sink = JsonDirectorySink::new(dir.path().join("nested").join("outputs"));

        sink.write_report("2021-01-10", &report()).unwrap();

        let written = fs::read(sink.report_path("2021-01-10")).unwrap();
        assert_eq!(written, render_report(&report()).unwrap());
    }

    #[test]
    fn directory_sink_reports_write_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let blocker = dir.path().join("occupied");
        fs::write(&blocker, b"not a directory").unwrap();
        let mut sink = JsonDirectorySink::new(blocker.join("outputs"));

        let err = sink.write_report("2021-01-10", &report()).unwrap_err();

        match err {
            Error::SinkWriteFailure { label, .. } => assert_eq!(label, "2021-01-10"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn memory_sink_keys_by_file_name() {
        let mut sink = MemorySink::new();
        sink.write_report("2021-01-03", &report()).unwrap();

        assert!(sink.get("Week_2021-01-03.json").is_some());
        assert_eq!(sink.documents().len(), 1);
    }
}
