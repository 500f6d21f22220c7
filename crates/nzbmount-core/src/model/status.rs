//! Aggregate drive status across all servers.

use super::rate::RateEstimator;
use super::units::DataRateUnit;

/// Drive-wide telemetry: one estimator fed by every server's counter
/// snapshots. Samples from different servers in the same reporting tick
/// accumulate into one bucket.
#[derive(Debug, Clone, Default)]
pub struct DriveStatus {
    rate: RateEstimator,
}

impl DriveStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rate(&self) -> &RateEstimator {
        &self.rate
    }

    /// Aggregate smoothed rate with its display unit.
    pub fn display_rate(&self) -> (f64, DataRateUnit) {
        self.rate.display()
    }

    pub(super) fn sample(&mut self, time_ms: i64, rx_bytes: u64) {
        self.rate.sample(time_ms, rx_bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_same_tick_samples() {
        let mut status = DriveStatus::new();
        status.sample(0, 0);
        // Two servers reporting the same tick.
        status.sample(1000, 512_000);
        status.sample(1000, 512_000);
        status.sample(2000, 0);
        assert!(status.rate().bytes_per_sec() > 0.0);
    }
}
