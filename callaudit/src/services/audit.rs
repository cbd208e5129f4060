use std::sync::Arc;

use chrono::NaiveDate;
use common::config::{AuditConfig, Settings};
use common::{Error, Result};
use dashmap::DashMap;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tracing::debug;

use crate::engine::{self, CallIndex};
use crate::models::{
    AggregateCounts, CallCategory, CallEntry, CallRecord, ClassificationResult, RawCallRow,
};
use crate::source::{FetchedLog, RecordSource};
use crate::storage::{ObjectStorage, S3Config, S3Manager, S3Storage};

/// Inclusive date range selected by the dashboard user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn parse(start: &str, end: &str) -> Result<DateRange> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if end < start {
            return Err(Error::InvalidInput(format!(
                "date range ends ({}) before it starts ({})",
                end, start
            )));
        }
        Ok(DateRange { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidInput(format!("invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// One agent's loaded log with its prebuilt index. Immutable once built;
/// classification passes over different date ranges reuse it as long as
/// the stored fingerprint still matches the record source.
pub struct AgentDataset {
    pub agent: String,
    pub fingerprint: String,
    pub entries: Vec<CallEntry>,
    pub index: CallIndex,
}

impl AgentDataset {
    fn build(agent: String, log: FetchedLog) -> AgentDataset {
        let records: Vec<CallRecord> = log
            .entries
            .iter()
            .filter_map(|entry| entry.record.as_ref().ok().cloned())
            .collect();

        AgentDataset {
            agent,
            fingerprint: log.fingerprint,
            index: CallIndex::build(records),
            entries: log.entries,
        }
    }
}

/// A classified row as served to the dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedCall {
    pub call: RawCallRow,
    pub result: ClassificationResult,
}

#[derive(Debug, Default)]
pub struct WarmCacheReport {
    pub loaded: u32,
    pub failed: Vec<(String, String)>,
}

pub struct AuditService {
    source: RecordSource,
    // Explicit per-agent cache; freshness is decided by fingerprint
    // comparison on every access, not by implicit memoization.
    cache: DashMap<String, Arc<AgentDataset>>,
    warm_concurrency: usize,
}

impl AuditService {
    pub async fn new(settings: &Settings) -> Result<Self> {
        let s3_config = S3Config::from_settings(settings);
        let s3_manager = Arc::new(S3Manager::new(s3_config.clone()));
        s3_manager
            .verify_bucket_exists(&s3_config.call_log_bucket)
            .await?;

        let storage =
            S3Storage::new(Arc::clone(&s3_manager), &s3_config.call_log_bucket).await?;

        Ok(Self::with_storage(Arc::new(storage), &settings.audit))
    }

    pub fn with_storage(storage: Arc<dyn ObjectStorage>, audit: &AuditConfig) -> Self {
        Self {
            source: RecordSource::new(storage, audit.row_limit),
            cache: DashMap::new(),
            warm_concurrency: audit.warm_concurrency.max(1),
        }
    }

    pub async fn list_agents(&self) -> Result<Vec<String>> {
        self.source.list_agents().await
    }

    /// Returns the cached dataset for an agent, rebuilding it when the
    /// record source reports different content.
    pub async fn dataset(&self, agent: &str) -> Result<Arc<AgentDataset>> {
        let cached = self.cache.get(agent).map(|entry| Arc::clone(entry.value()));

        // Cheap probe first: skip the download entirely when the storage
        // fingerprint still matches the cached build.
        if let Some(ref dataset) = cached {
            if let Some(fingerprint) = self.source.fingerprint(agent).await? {
                if fingerprint == dataset.fingerprint {
                    return Ok(Arc::clone(dataset));
                }
            }
        }

        let log = self.source.fetch(agent).await?;
        if let Some(ref dataset) = cached {
            if dataset.fingerprint == log.fingerprint {
                return Ok(Arc::clone(dataset));
            }
        }

        debug!(agent, rows = log.entries.len(), "building agent dataset");
        let dataset = Arc::new(AgentDataset::build(agent.to_string(), log));
        self.cache.insert(agent.to_string(), Arc::clone(&dataset));
        Ok(dataset)
    }

    pub async fn classified_calls(
        &self,
        agent: &str,
        range: &DateRange,
        category: Option<CallCategory>,
    ) -> Result<Vec<ClassifiedCall>> {
        let dataset = self.dataset(agent).await?;

        let calls = dataset
            .entries
            .iter()
            .filter(|entry| entry_in_range(entry, range))
            .map(|entry| ClassifiedCall {
                call: entry.raw.clone(),
                result: engine::classify_entry(entry, &dataset.index),
            })
            .filter(|classified| category.map_or(true, |c| c == classified.result.category))
            .collect();

        Ok(calls)
    }

    pub async fn summary(&self, agent: &str, range: &DateRange) -> Result<AggregateCounts> {
        let dataset = self.dataset(agent).await?;

        let results: Vec<ClassificationResult> = dataset
            .entries
            .iter()
            .filter(|entry| entry_in_range(entry, range))
            .map(|entry| engine::classify_entry(entry, &dataset.index))
            .collect();

        Ok(engine::aggregate(&results))
    }

    /// Builds datasets for every agent with bounded concurrency. Per-agent
    /// failures are reported and do not abort the warm-up.
    pub async fn warm_cache(&self) -> Result<WarmCacheReport> {
        let agents = self.source.list_agents().await?;
        println!("Warming dataset cache for {} agents...", agents.len());

        let mut report = WarmCacheReport::default();
        let mut pending = agents.into_iter();
        let mut futures = FuturesUnordered::new();

        loop {
            while futures.len() < self.warm_concurrency {
                match pending.next() {
                    Some(agent) => futures.push(async move {
                        let outcome = self.dataset(&agent).await;
                        (agent, outcome)
                    }),
                    None => break,
                }
            }

            match futures.next().await {
                Some((agent, Ok(dataset))) => {
                    report.loaded += 1;
                    println!(
                        "Loaded {} call records for agent {}",
                        dataset.entries.len(),
                        agent
                    );
                }
                Some((agent, Err(e))) => {
                    eprintln!("Failed to load call log for agent {}: {}", agent, e);
                    report.failed.push((agent, e.to_string()));
                }
                None => break,
            }
        }

        Ok(report)
    }
}

fn entry_in_range(entry: &CallEntry, range: &DateRange) -> bool {
    match &entry.record {
        Ok(record) => range.contains(record.start_time.date()),
        // Rows that failed to parse carry no usable date; keep them
        // visible in every range so totals stay consistent with the
        // row count.
        Err(_) => true,
    }
}
