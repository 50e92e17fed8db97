//! Request counters and latency statistics for the inference pipeline.

use crate::types::{PredictionResult, RiskLabel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector shared by both front-ends
pub struct InferenceMetrics {
    /// Successful predictions
    pub predictions: AtomicU64,
    pub positive: AtomicU64,
    pub negative: AtomicU64,
    /// Predictions served without a probability
    pub degraded: AtomicU64,
    pub validation_failures: AtomicU64,
    pub internal_errors: AtomicU64,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    started_at: DateTime<Utc>,
    start_time: Instant,
}

impl InferenceMetrics {
    pub fn new() -> Self {
        Self {
            predictions: AtomicU64::new(0),
            positive: AtomicU64::new(0),
            negative: AtomicU64::new(0),
            degraded: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            internal_errors: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            started_at: Utc::now(),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(&self, processing_time: Duration, result: &PredictionResult) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
        match result.label {
            RiskLabel::Positive => self.positive.fetch_add(1, Ordering::Relaxed),
            RiskLabel::Negative => self.negative.fetch_add(1, Ordering::Relaxed),
        };

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        match result.probability {
            Some(p) => {
                let bucket = (p * 10.0).min(9.0) as usize;
                if let Ok(mut buckets) = self.probability_buckets.write() {
                    buckets[bucket] += 1;
                }
            }
            None => {
                self.degraded.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_internal_error(&self) {
        self.internal_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Get processing time statistics
    pub fn processing_stats(&self) -> ProcessingStats {
        let Ok(times) = self.processing_times.read() else {
            return ProcessingStats::default();
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Requests per second since startup
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn probability_distribution(&self) -> [u64; 10] {
        self.probability_buckets
            .read()
            .map(|buckets| *buckets)
            .unwrap_or_default()
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            started_at: self.started_at,
            predictions: self.predictions.load(Ordering::Relaxed),
            positive: self.positive.load(Ordering::Relaxed),
            negative: self.negative.load(Ordering::Relaxed),
            degraded: self.degraded.load(Ordering::Relaxed),
            validation_failures: self.validation_failures.load(Ordering::Relaxed),
            internal_errors: self.internal_errors.load(Ordering::Relaxed),
            throughput: self.throughput(),
            processing: self.processing_stats(),
            probability_distribution: self.probability_distribution(),
        }
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let snapshot = self.snapshot();
        let positive_rate = if snapshot.predictions > 0 {
            (snapshot.positive as f64 / snapshot.predictions as f64) * 100.0
        } else {
            0.0
        };

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              HEART RISK SERVICE - METRICS SUMMARY            ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Predictions Served:     {:>8}  │  Throughput: {:>6.1} req/s ║",
            snapshot.predictions, snapshot.throughput
        );
        info!(
            "║ High Risk:              {:>8}  │  Rate: {:>6.1}%           ║",
            snapshot.positive, positive_rate
        );
        info!(
            "║ Degraded: {:>6}  │  Rejected: {:>6}  │  Failed: {:>6}     ║",
            snapshot.degraded, snapshot.validation_failures, snapshot.internal_errors
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Processing Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} ║",
            snapshot.processing.mean_us,
            snapshot.processing.p50_us,
            snapshot.processing.p95_us,
            snapshot.processing.p99_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Probability Distribution:                                    ║");
        let total: u64 = snapshot.probability_distribution.iter().sum();
        for (i, &count) in snapshot.probability_distribution.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for InferenceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Serializable view served at `/metrics`
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub started_at: DateTime<Utc>,
    pub predictions: u64,
    pub positive: u64,
    pub negative: u64,
    pub degraded: u64,
    pub validation_failures: u64,
    pub internal_errors: u64,
    pub throughput: f64,
    pub processing: ProcessingStats,
    pub probability_distribution: [u64; 10],
}

/// Periodic metrics reporter
pub struct MetricsReporter {
    metrics: Arc<InferenceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<InferenceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = InferenceMetrics::new();

        metrics.record_prediction(
            Duration::from_micros(100),
            &PredictionResult::new(RiskLabel::Positive, Some(0.82)),
        );
        metrics.record_prediction(
            Duration::from_micros(200),
            &PredictionResult::new(RiskLabel::Negative, None),
        );
        metrics.record_validation_failure();
        metrics.record_internal_error();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.predictions, 2);
        assert_eq!(snapshot.positive, 1);
        assert_eq!(snapshot.negative, 1);
        assert_eq!(snapshot.degraded, 1);
        assert_eq!(snapshot.validation_failures, 1);
        assert_eq!(snapshot.internal_errors, 1);
        assert_eq!(snapshot.probability_distribution[8], 1);
        assert_eq!(snapshot.processing.count, 2);
    }

    #[test]
    fn test_probability_one_lands_in_last_bucket() {
        let metrics = InferenceMetrics::new();

        metrics.record_prediction(
            Duration::from_micros(50),
            &PredictionResult::new(RiskLabel::Positive, Some(1.0)),
        );

        assert_eq!(metrics.probability_distribution()[9], 1);
    }

    #[test]
    fn test_empty_processing_stats() {
        let stats = InferenceMetrics::new().processing_stats();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.max_us, 0);
    }
}
