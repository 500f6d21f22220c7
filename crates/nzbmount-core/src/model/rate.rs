//! Exponentially smoothed throughput estimation from bucketed samples.
//!
//! The engine reports byte counters at irregular wall-clock ticks. Samples
//! sharing a time value belong to one bucket (several servers report the same
//! tick into the aggregate estimator); the bytes of a bucket cover the
//! interval that ends at its time value.

use super::units::{select_rate_unit, DataRateUnit};

/// Smoothing half-life constant in milliseconds.
const RC_MS: i64 = 10_000;
/// Fixed-point scale for the smoothing weight.
const SCALE: i64 = 1_000;

/// Reusable exponential-smoothing rate estimator with automatic display-unit
/// selection. One instance per server plus one for the aggregate status.
#[derive(Debug, Clone, Default)]
pub struct RateEstimator {
    /// Time key of the open bucket, `None` until the first sample.
    bucket_time: Option<i64>,
    /// Bytes accumulated into the open bucket.
    bucket_bytes: u64,
    /// Interval length of the open bucket in ms (0 for the first bucket).
    bucket_dt: i64,
    /// Smoothed rate before the open bucket was blended in, so same-time
    /// accumulation can re-blend instead of double-counting.
    rate_before_bucket: f64,
    /// Current smoothed rate in bytes/sec.
    rate: f64,
}

impl RateEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smoothed rate in bytes/sec.
    pub fn bytes_per_sec(&self) -> f64 {
        self.rate
    }

    /// Smoothed rate with a display unit picked by the shared ladder.
    pub fn display(&self) -> (f64, DataRateUnit) {
        select_rate_unit(self.rate)
    }

    /// Feed one sample: `bytes` received over the interval ending at
    /// `time_ms`. Equal time keys accumulate into the open bucket;
    /// non-monotonic time skips recomputation and re-keys the bucket.
    pub fn sample(&mut self, time_ms: i64, bytes: u64) {
        match self.bucket_time {
            None => {
                // First sample: no interval start, no rate yet.
                self.bucket_time = Some(time_ms);
                self.bucket_bytes = bytes;
                self.bucket_dt = 0;
            }
            Some(current) if time_ms == current => {
                self.bucket_bytes += bytes;
                self.reblend();
            }
            Some(current) => {
                let dt = time_ms - current;
                self.rate_before_bucket = self.rate;
                self.bucket_time = Some(time_ms);
                self.bucket_bytes = bytes;
                self.bucket_dt = if dt > 0 { dt } else { 0 };
                self.reblend();
            }
        }
    }

    /// Recompute the smoothed rate from the open bucket. A zero interval
    /// (first bucket or non-monotonic time) leaves the rate untouched.
    fn reblend(&mut self) {
        if self.bucket_dt <= 0 {
            return;
        }
        let dt = self.bucket_dt;
        let alpha = (SCALE * dt) / (dt + RC_MS);
        let instantaneous = self.bucket_bytes as f64 * 1000.0 / dt as f64;
        self.rate = (alpha as f64 * instantaneous
            + (SCALE - alpha) as f64 * self.rate_before_bucket)
            / SCALE as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_emits_no_rate() {
        let mut est = RateEstimator::new();
        est.sample(0, 1_000_000);
        assert_eq!(est.bytes_per_sec(), 0.0);
    }

    #[test]
    fn smoothing_stays_below_instantaneous() {
        let mut est = RateEstimator::new();
        est.sample(0, 0);
        est.sample(1000, 0);
        est.sample(2000, 1_024_000);
        let rate = est.bytes_per_sec();
        assert!(rate > 0.0, "expected a non-zero smoothed rate");
        assert!(rate < 1_024_000.0, "smoothed rate must stay below the raw 1024 KB/s");
    }

    #[test]
    fn steady_input_converges_to_instantaneous() {
        let mut est = RateEstimator::new();
        for tick in 0..200 {
            est.sample(tick * 1000, 1_024_000);
        }
        let rate = est.bytes_per_sec();
        assert!((rate - 1_024_000.0).abs() < 1_024_000.0 * 0.01);
    }

    #[test]
    fn non_monotonic_time_skips_recomputation() {
        let mut est = RateEstimator::new();
        est.sample(0, 0);
        est.sample(1000, 500_000);
        let before = est.bytes_per_sec();
        est.sample(500, 9_999_999);
        assert_eq!(est.bytes_per_sec(), before);
        // The estimator recovers once time moves forward again.
        est.sample(1500, 500_000);
        assert!(est.bytes_per_sec() > before);
    }

    #[test]
    fn same_time_samples_accumulate() {
        let mut a = RateEstimator::new();
        a.sample(0, 0);
        a.sample(1000, 600);
        a.sample(1000, 400);

        let mut b = RateEstimator::new();
        b.sample(0, 0);
        b.sample(1000, 1000);

        assert!((a.bytes_per_sec() - b.bytes_per_sec()).abs() < 1e-9);
    }

    #[test]
    fn display_unit_follows_magnitude() {
        let mut est = RateEstimator::new();
        est.sample(0, 0);
        for tick in 1..100 {
            est.sample(tick * 1000, 300 * 1024 * 1024);
        }
        let (_, unit) = est.display();
        assert_eq!(unit, DataRateUnit::MibS);
    }
}
