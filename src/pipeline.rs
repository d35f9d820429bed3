use crate::apis::create_sources;
use crate::assembler::{EventRecordAssembler, SourceTally};
use crate::config::Config;
use crate::error::Result;
use crate::infra::{DebugDump, PageFetcher, ReqwestHttp};
use crate::output::write_csv;
use crate::types::{EventRecord, EventSource, RawRow, Source};
use chrono::NaiveDate;
use metrics::counter;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{error, info, instrument, warn};

/// What happened to one source during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceReport {
    pub source: Source,
    /// Raw rows the extractor returned
    pub fetched: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub duplicates: usize,
    /// Set when the fetch failed outright
    pub error: Option<String>,
}

impl SourceReport {
    fn new(source: Source) -> Self {
        Self {
            source,
            fetched: 0,
            accepted: 0,
            rejected: 0,
            duplicates: 0,
            error: None,
        }
    }

    fn apply(&mut self, tally: &SourceTally) {
        self.accepted = tally.accepted;
        self.rejected = tally.rejected;
        self.duplicates = tally.duplicates;
    }
}

/// Result of a complete run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_date: NaiveDate,
    pub sources: Vec<SourceReport>,
    pub total_records: usize,
    pub output_file: Option<String>,
}

impl RunReport {
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources.iter().filter(|s| s.error.is_some())
    }
}

pub struct RunOutcome {
    pub records: Vec<EventRecord>,
    pub report: RunReport,
}

/// Fetches every source concurrently, then assembles their rows in source order
pub struct Orchestrator {
    sources: Vec<Arc<dyn EventSource>>,
    assembler: EventRecordAssembler,
}

impl Orchestrator {
    pub fn new(sources: Vec<Arc<dyn EventSource>>, assembler: EventRecordAssembler) -> Self {
        Self { sources, assembler }
    }

    /// Wire up live extractors for `config.sources`
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(ReqwestHttp::new(&config.http)?);
        let dump = DebugDump::new(config.debug_dump_enabled, &config.debug_dir);
        let sources = create_sources(&config.sources, fetcher, &dump)?;
        let assembler = EventRecordAssembler::for_today(config.assembler.clone());
        Ok(Self::new(sources, assembler))
    }

    /// Fetch all sources. Results come back in source order whatever order
    /// the fetches finish in.
    async fn fetch_all(&self) -> Vec<(Source, Result<Vec<RawRow>>)> {
        let mut tasks = JoinSet::new();
        for (index, source) in self.sources.iter().enumerate() {
            let source = Arc::clone(source);
            tasks.spawn(async move { (index, source.fetch_rows().await) });
        }

        let mut slots: Vec<Option<Result<Vec<RawRow>>>> = self.sources.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, result)) => slots[index] = Some(result),
                Err(e) => error!("Fetch task aborted: {}", e),
            }
        }

        self.sources
            .iter()
            .zip(slots)
            .map(|(source, slot)| {
                let result = slot.unwrap_or_else(|| {
                    Err(crate::error::ScraperError::Extraction {
                        source_name: source.source().to_string(),
                        message: "fetch task did not complete".to_string(),
                    })
                });
                (source.source(), result)
            })
            .collect()
    }

    /// Fetch and assemble. A failing source is reported and skipped; it never
    /// fails the run.
    #[instrument(skip(self), fields(run_date = %self.assembler.run_date()))]
    pub async fn run(&self) -> RunOutcome {
        info!("Starting run over {} sources", self.sources.len());

        let mut reports = Vec::new();
        let mut rows = Vec::new();
        for (source, result) in self.fetch_all().await {
            let mut report = SourceReport::new(source);
            match result {
                Ok(fetched) => {
                    info!(source = %source, "Fetched {} raw rows", fetched.len());
                    report.fetched = fetched.len();
                    rows.extend(fetched);
                }
                Err(e) => {
                    error!(source = %source, "Source failed: {}", e);
                    counter!("expo_source_failures_total", "source" => source.as_str())
                        .increment(1);
                    report.error = Some(e.to_string());
                }
            }
            reports.push(report);
        }

        let assembly = self.assembler.assemble_with_report(rows);
        for report in &mut reports {
            if let Some(tally) = assembly.tallies.get(report.source.as_str()) {
                report.apply(tally);
            }
        }

        let report = RunReport {
            run_date: self.assembler.run_date(),
            sources: reports,
            total_records: assembly.records.len(),
            output_file: None,
        };
        for source in &report.sources {
            info!(
                source = %source.source,
                fetched = source.fetched,
                accepted = source.accepted,
                rejected = source.rejected,
                duplicates = source.duplicates,
                error = ?source.error,
                "Source summary"
            );
        }
        if report.failed_sources().count() == report.sources.len() && !report.sources.is_empty() {
            warn!("Every source failed; the output will only have a header");
        }

        RunOutcome {
            records: assembly.records,
            report,
        }
    }

    /// Run and write the records to `output`, even when no source succeeded
    pub async fn run_to_csv(&self, output: &Path) -> Result<RunReport> {
        let RunOutcome { records, mut report } = self.run().await;
        write_csv(output, &records)?;
        report.output_file = Some(output.display().to_string());
        Ok(report)
    }
}
