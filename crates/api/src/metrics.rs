use evidence::Analysis;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,
    rejected_requests: AtomicUsize,

    // Timing (in microseconds)
    total_analysis_time_us: AtomicU64,

    // Counts
    total_claims_assessed: AtomicUsize,
    total_sources_collected: AtomicUsize,
    search_failures: AtomicUsize,
    assessment_failures: AtomicUsize,
    extraction_failures: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            rejected_requests: AtomicUsize::new(0),
            total_analysis_time_us: AtomicU64::new(0),
            total_claims_assessed: AtomicUsize::new(0),
            total_sources_collected: AtomicUsize::new(0),
            search_failures: AtomicUsize::new(0),
            assessment_failures: AtomicUsize::new(0),
            extraction_failures: AtomicUsize::new(0),
        })
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Request turned away by the in-flight limiter.
    pub fn record_rejected(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.rejected_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_analysis(&self, duration: Duration, analysis: &Analysis) {
        self.total_analysis_time_us.fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.total_claims_assessed.fetch_add(analysis.result.claims.len(), Ordering::Relaxed);
        self.total_sources_collected.fetch_add(analysis.result.sources.len(), Ordering::Relaxed);
        self.search_failures.fetch_add(analysis.trace.search_failures, Ordering::Relaxed);
        self.assessment_failures.fetch_add(analysis.trace.assessment_failures, Ordering::Relaxed);
        if analysis.extraction_failed {
            self.extraction_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let successful = self.successful_requests.load(Ordering::Relaxed);

        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: successful,
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            rejected_requests: self.rejected_requests.load(Ordering::Relaxed),
            avg_analysis_time_ms: avg_time_ms(&self.total_analysis_time_us, successful),
            total_claims_assessed: self.total_claims_assessed.load(Ordering::Relaxed),
            total_sources_collected: self.total_sources_collected.load(Ordering::Relaxed),
            search_failures: self.search_failures.load(Ordering::Relaxed),
            assessment_failures: self.assessment_failures.load(Ordering::Relaxed),
            extraction_failures: self.extraction_failures.load(Ordering::Relaxed),
        }
    }
}

fn avg_time_ms(total_us: &AtomicU64, count: usize) -> f64 {
    let total = total_us.load(Ordering::Relaxed) as f64;
    if count > 0 {
        total / count as f64 / 1000.0 // Convert to ms
    } else {
        0.0
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub rejected_requests: usize,
    pub avg_analysis_time_ms: f64,
    pub total_claims_assessed: usize,
    pub total_sources_collected: usize,
    pub search_failures: usize,
    pub assessment_failures: usize,
    pub extraction_failures: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
