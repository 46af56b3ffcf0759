//! End-to-end run: load, flatten, join, partition, aggregate, write.

use tracing::{debug, info, warn};

use crate::aggregate::{aggregate_window, WeeklyReport};
use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::partition::{partition_weeks, WeekWindow};
use crate::records::{
    list_transaction_sources, read_customers, read_products, read_transaction_source,
};
use crate::reference::{EnrichedRow, ReferenceIndex};
use crate::sink::{JsonDirectorySink, ReportSink};

/// Counters describing one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub sources: usize,
    pub skipped_lines: usize,
    pub rows: usize,
    pub windows: usize,
    pub reports_written: usize,
    pub failed_windows: usize,
    pub uncovered_rows: usize,
}

/// Reports for every window, in ascending window order.
#[derive(Debug, Default)]
pub struct WeeklyReports {
    pub reports: Vec<(WeekWindow, WeeklyReport)>,
    pub uncovered_rows: usize,
}

/// Partition enriched rows and aggregate each window.
pub fn build_reports(rows: Vec<EnrichedRow>) -> Result<WeeklyReports> {
    let partition = partition_weeks(rows)?;

    let uncovered_rows = partition.uncovered_rows().len();
    if uncovered_rows > 0 {
        warn!(
            uncovered_rows,
            first_window_start = %partition.windows()[0].start,
            "Rows precede the first week window and are not reported"
        );
    }

    let reports = partition
        .iter()
        .map(|(window, rows)| {
            debug!(
                start = %window.start,
                end = %window.end,
                rows = rows.len(),
                "Aggregating window"
            );
            (window, aggregate_window(rows))
        })
        .collect();

    Ok(WeeklyReports {
        reports,
        uncovered_rows,
    })
}

/// Load every input named by `config`, then hand each window's report to `sink`.
///
/// Malformed transaction lines and per-window sink failures are logged and
/// counted. Duplicate reference keys and unreadable inputs abort the run.
pub fn run(config: PipelineConfig, sink: &mut dyn ReportSink) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    info!("Reading {}", config.customers_location.display());
    let customers = read_customers(&config.customers_location)?;
    info!("Reading {}", config.products_location.display());
    let products = read_products(&config.products_location)?;
    let index = ReferenceIndex::build(products, customers)?;
    debug!(
        products = index.product_count(),
        customers = index.customer_count(),
        "Built reference index"
    );

    info!(
        "Listing transaction sources in {}",
        config.transactions_location.display()
    );
    let mut flat_rows = Vec::new();
    for source in list_transaction_sources(&config.transactions_location)? {
        let load = read_transaction_source(&source)?;
        debug!(source = %load.path.display(), rows = load.rows.len(), "Loaded transactions");
        summary.sources += 1;
        summary.skipped_lines += load.skipped.len();
        flat_rows.extend(load.rows);
    }

    let enriched = index.join(flat_rows);
    summary.rows = enriched.len();
    info!(rows = summary.rows, sources = summary.sources, "Joined reference data");

    let built = match build_reports(enriched) {
        Ok(built) => built,
        Err(err @ Error::EmptyPartition { .. }) => {
            warn!("{}; no reports written", err);
            return Ok(summary);
        }
        Err(err) => return Err(err),
    };
    summary.windows = built.reports.len();
    summary.uncovered_rows = built.uncovered_rows;

    for (window, report) in &built.reports {
        match sink.write_report(&window.label(), report) {
            Ok(()) => summary.reports_written += 1,
            Err(err) => {
                warn!("Skipping window ending {}: {}", window.end, err);
                summary.failed_windows += 1;
            }
        }
    }

    info!(
        written = summary.reports_written,
        failed = summary.failed_windows,
        "Done"
    );
    Ok(summary)
}

/// [`run`] writing into `config.output_location`.
pub fn run_to_directory(config: PipelineConfig) -> Result<RunSummary> {
    let mut sink = JsonDirectorySink::new(config.output_location.clone());
    run(config, &mut sink)
}
