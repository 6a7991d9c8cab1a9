use std::collections::{BTreeSet, HashSet};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Duration;
use std::vec;
use log::{info, warn};
use url::Url;

use crate::config::{Config, RunOptions};
use crate::delay_manager;
use crate::errors::{ConfigError, FetchError};
use crate::extractor::{BillExtractor, ExtractionRecord};
use crate::fetcher::Fetch;
use crate::locator::Locator;
use crate::report::ReportRow;

/// Counters reported at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub sessions_failed: usize,
    pub documents_queued: usize,
    pub documents_failed: usize,
    pub rows: usize,
    pub duplicates: usize,
}

struct Job {
    session: usize,
    url: Url,
}

/// Fans bill documents out to a worker pool and folds the results into
/// a sorted, de-duplicated report.
pub struct Pipeline<'a, F: Fetch + ?Sized> {
    fetcher: &'a F,
    config: &'a Config,
    extractor: BillExtractor,
}

impl<'a, F: Fetch + ?Sized> Pipeline<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a Config) -> Result<Self, ConfigError> {
        Ok(Pipeline {
            fetcher,
            config,
            extractor: BillExtractor::new(config)?,
        })
    }

    pub fn run(&self, options: &RunOptions) -> Vec<ReportRow> {
        let (rows, stats) = self.run_with_stats(options);
        info!(
            "Checked {} documents: {} matching bills, {} duplicates, {} fetch failures, {} sessions unavailable",
            stats.documents_queued,
            stats.rows,
            stats.duplicates,
            stats.documents_failed,
            stats.sessions_failed
        );
        rows
    }

    pub fn run_with_stats(&self, options: &RunOptions) -> (Vec<ReportRow>, RunStats) {
        let mut aggregator = Aggregator::new(self.config, options);
        let jobs = self.collect_jobs(&mut aggregator.stats);
        aggregator.stats.documents_queued = jobs.len();

        let workers = options.workers.max(1).min(jobs.len());
        let queue = Mutex::new(jobs.into_iter());

        thread::scope(|scope| {
            let (result_tx, result_rx) = mpsc::channel();
            for _ in 0..workers {
                let result_tx = result_tx.clone();
                let queue = &queue;
                scope.spawn(move || {
                    while let Some(job) = next_job(queue) {
                        let outcome = self.extractor.extract(self.fetcher, &job.url);
                        if result_tx.send((job, outcome)).is_err() {
                            return;
                        }
                    }
                });
            }
            drop(result_tx);

            // Completion order; this loop is the only writer of aggregation state.
            for (job, outcome) in result_rx {
                let biennium = &self.config.sessions[job.session].label;
                aggregator.accept(biennium, &job.url, outcome);
            }
        });

        aggregator.finish()
    }

    fn collect_jobs(&self, stats: &mut RunStats) -> Vec<Job> {
        let locator = Locator::new(self.fetcher, self.config);
        let mut jobs = Vec::new();

        for (index, session) in self.config.sessions.iter().enumerate() {
            info!("Scanning {} …", session.label);
            match locator.list_documents(session) {
                Ok(urls) => {
                    info!("Found {} documents for {}", urls.len(), session.label);
                    jobs.extend(urls.into_iter().map(|url| Job { session: index, url }));
                }
                Err(e) => {
                    warn!("Failed to list {}: {}", session.label, e);
                    stats.sessions_failed += 1;
                }
            }
        }
        jobs
    }
}

fn next_job(queue: &Mutex<vec::IntoIter<Job>>) -> Option<Job> {
    queue.lock().ok()?.next()
}

#[derive(Debug, Hash, PartialEq, Eq)]
struct DedupKey {
    biennium: String,
    year: u32,
    identifier: String,
}

/// Filter, de-duplication and ordering applied to extraction results.
pub struct Aggregator<'a> {
    config: &'a Config,
    years: &'a BTreeSet<u32>,
    delay: Duration,
    seen: HashSet<DedupKey>,
    rows: Vec<ReportRow>,
    stats: RunStats,
}

impl<'a> Aggregator<'a> {
    pub fn new(config: &'a Config, options: &'a RunOptions) -> Self {
        Aggregator {
            config,
            years: &options.years,
            delay: options.delay,
            seen: HashSet::new(),
            rows: Vec::new(),
            stats: RunStats::default(),
        }
    }

    /// Returns true if the outcome produced a new row.
    pub fn accept(
        &mut self,
        biennium: &str,
        url: &Url,
        outcome: Result<ExtractionRecord, FetchError>,
    ) -> bool {
        let record = match outcome {
            Ok(record) => record,
            Err(e) => {
                warn!("Error fetching {}: {}", url, e);
                self.stats.documents_failed += 1;
                return false;
            }
        };

        let (Some(year), Some(identifier)) = (record.year, record.identifier) else {
            return false;
        };
        if !self.years.contains(&year) || !record.matched {
            return false;
        }

        let key = DedupKey {
            biennium: biennium.to_string(),
            year,
            identifier,
        };
        if self.seen.contains(&key) {
            self.stats.duplicates += 1;
            return false;
        }

        let summary =
            bill_summary_url(&self.config.summary_url_base, Some(key.identifier.as_str()), Some(year));
        let number = key.identifier.parse().unwrap_or_default();
        self.rows.push(ReportRow {
            biennium: key.biennium.clone(),
            year,
            bill_number: format!("{} {}", self.config.bill_prefix, key.identifier),
            title: record.title.unwrap_or_default(),
            bill_text_url: record.source_url,
            bill_summary_url: summary.unwrap_or_default(),
            number,
        });
        self.seen.insert(key);
        self.stats.rows += 1;

        delay_manager::match_delay(self.delay);
        true
    }

    /// Rows ordered by year then bill number.
    pub fn finish(mut self) -> (Vec<ReportRow>, RunStats) {
        self.rows.sort_by(|a, b| {
            (a.year, a.number)
                .cmp(&(b.year, b.number))
                .then_with(|| a.biennium.cmp(&b.biennium))
                .then_with(|| a.bill_text_url.cmp(&b.bill_text_url))
        });
        (self.rows, self.stats)
    }
}

/// Link to the legislature's summary page, when both parts are known.
pub fn bill_summary_url(base: &str, number: Option<&str>, year: Option<u32>) -> Option<String> {
    let (number, year) = (number?, year?);
    Some(format!(
        "{}?BillNumber={}&Year={}&Initiative=false",
        base, number, year
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn record(year: Option<u32>, id: Option<&str>, matched: bool, url: &str) -> ExtractionRecord {
        ExtractionRecord {
            year,
            identifier: id.map(str::to_string),
            title: Some("AN ACT Relating to climate resilience.".to_string()),
            matched,
            source_url: url.to_string(),
        }
    }

    fn url(name: &str) -> Url {
        Url::parse(&format!("https://example.test/{}", name)).unwrap()
    }

    #[test]
    fn qualifying_record_becomes_a_row() {
        let config = Config::default();
        let options = RunOptions::default();
        let mut agg = Aggregator::new(&config, &options);

        let u = url("1181.htm");
        assert!(agg.accept("2023-24", &u, Ok(record(Some(2024), Some("1181"), true, u.as_str()))));
        let (rows, stats) = agg.finish();

        assert_eq!(
            rows,
            vec![ReportRow {
                biennium: "2023-24".to_string(),
                year: 2024,
                bill_number: "HB 1181".to_string(),
                title: "AN ACT Relating to climate resilience.".to_string(),
                bill_text_url: "https://example.test/1181.htm".to_string(),
                bill_summary_url:
                    "https://app.leg.wa.gov/BillSummary/?BillNumber=1181&Year=2024&Initiative=false"
                        .to_string(),
                number: 1181,
            }]
        );
        assert_eq!(stats.rows, 1);
    }

    #[test]
    fn filter_drops_incomplete_unmatched_and_out_of_range_records() {
        let config = Config::default();
        let options = RunOptions::default();
        let mut agg = Aggregator::new(&config, &options);
        let u = url("x.htm");

        assert!(!agg.accept("2023-24", &u, Ok(record(None, Some("1181"), true, u.as_str()))));
        assert!(!agg.accept("2023-24", &u, Ok(record(Some(2024), None, true, u.as_str()))));
        assert!(!agg.accept("2023-24", &u, Ok(record(Some(2022), Some("1181"), true, u.as_str()))));
        assert!(!agg.accept("2023-24", &u, Ok(record(Some(2024), Some("1181"), false, u.as_str()))));
        assert!(!agg.accept(
            "2023-24",
            &u,
            Err(FetchError::Status { url: u.to_string(), status: 500 })
        ));

        let (rows, stats) = agg.finish();
        assert!(rows.is_empty());
        assert_eq!(stats.documents_failed, 1);
    }

    #[test]
    fn first_completed_duplicate_wins() {
        let config = Config::default();
        let options = RunOptions::default();
        let mut agg = Aggregator::new(&config, &options);

        let sub = url("1181-S.htm");
        let base = url("1181.htm");
        assert!(agg.accept("2023-24", &sub, Ok(record(Some(2024), Some("1181"), true, sub.as_str()))));
        assert!(!agg.accept("2023-24", &base, Ok(record(Some(2024), Some("1181"), true, base.as_str()))));
        // Same bill in another biennium is a distinct key.
        assert!(agg.accept("2025-26", &base, Ok(record(Some(2024), Some("1181"), true, base.as_str()))));

        let (rows, stats) = agg.finish();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].bill_text_url, sub.as_str());
        assert_eq!(stats.duplicates, 1);
    }

    #[test]
    fn rows_sort_by_year_then_numeric_bill_number() {
        let config = Config::default();
        let options = RunOptions::default();
        let mut agg = Aggregator::new(&config, &options);

        for (year, id) in [(2025, "1010"), (2024, "1500"), (2024, "999"), (2023, "2000")] {
            let u = url(&format!("{}.htm", id));
            agg.accept("2023-24", &u, Ok(record(Some(year), Some(id), true, u.as_str())));
        }

        let (rows, _) = agg.finish();
        let order: Vec<(u32, &str)> = rows.iter().map(|r| (r.year, r.bill_number.as_str())).collect();
        assert_eq!(
            order,
            vec![(2023, "HB 2000"), (2024, "HB 999"), (2024, "HB 1500"), (2025, "HB 1010")]
        );
    }

    #[test]
    fn digits_in_the_prefix_do_not_affect_ordering() {
        let config = Config {
            bill_prefix: "HB-20232024".to_string(),
            ..Config::default()
        };
        let options = RunOptions::default();
        let mut agg = Aggregator::new(&config, &options);

        for id in ["1500", "999"] {
            let u = url(&format!("{}.htm", id));
            agg.accept("2023-24", &u, Ok(record(Some(2024), Some(id), true, u.as_str())));
        }

        let (rows, _) = agg.finish();
        let order: Vec<&str> = rows.iter().map(|r| r.bill_number.as_str()).collect();
        assert_eq!(order, vec!["HB-20232024 999", "HB-20232024 1500"]);
    }

    #[test]
    fn delay_follows_accepted_rows_only() {
        let delay = Duration::from_millis(50);
        let config = Config::default();
        let options = RunOptions {
            delay,
            ..RunOptions::default()
        };
        let mut agg = Aggregator::new(&config, &options);
        let u = url("1181.htm");

        let started = Instant::now();
        assert!(agg.accept("2023-24", &u, Ok(record(Some(2024), Some("1181"), true, u.as_str()))));
        assert!(!agg.accept("2023-24", &u, Ok(record(Some(2024), Some("1181"), true, u.as_str()))));
        assert!(!agg.accept("2023-24", &u, Ok(record(Some(2019), Some("1200"), true, u.as_str()))));
        assert!(!agg.accept(
            "2023-24",
            &u,
            Err(FetchError::Status { url: u.to_string(), status: 503 })
        ));
        let elapsed = started.elapsed();

        assert!(elapsed >= delay, "no pause after the accepted row: {:?}", elapsed);
        assert!(elapsed < delay * 2, "paused after a rejected result: {:?}", elapsed);
    }

    #[test]
    fn summary_url_needs_number_and_year() {
        let base = "https://app.leg.wa.gov/BillSummary/";
        assert_eq!(bill_summary_url(base, None, Some(2024)), None);
        assert_eq!(bill_summary_url(base, Some("1181"), None), None);
        assert_eq!(
            bill_summary_url(base, Some("1181"), Some(2024)).as_deref(),
            Some("https://app.leg.wa.gov/BillSummary/?BillNumber=1181&Year=2024&Initiative=false")
        );
    }
}
