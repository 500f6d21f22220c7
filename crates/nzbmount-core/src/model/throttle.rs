//! User-facing throttling configuration and its engine translation.

use serde::{Deserialize, Serialize};

use crate::engine::{NetThrottle, NetworkMode};

use super::units::{DataRateUnit, DataSizeUnit};

/// Engine constant: adaptive IO ratio in percent.
const ADAPTIVE_IO_RATIO_PCT: u32 = 110;
/// Engine constant: background fetch floor in bytes/sec.
const BACKGROUND_NETWORK_RATE: u64 = 1000;

/// Throttling strategy as presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThrottlingMode {
    /// Constant bitrate.
    Constant,
    /// Adaptive bitrate with pre-caching.
    #[default]
    Adaptive,
}

/// User-facing throttling settings: mode, rate cap, pre-cache window.
///
/// Every field change re-translates and pushes the full engine record; the
/// engine has no partial-update command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottlingSettings {
    pub mode: ThrottlingMode,
    pub speed_limit: u64,
    pub speed_limit_unit: DataRateUnit,
    pub precache_size: u64,
    pub precache_size_unit: DataSizeUnit,
}

impl Default for ThrottlingSettings {
    fn default() -> Self {
        Self {
            mode: ThrottlingMode::Adaptive,
            speed_limit: 10,
            speed_limit_unit: DataRateUnit::Unlimited,
            precache_size: 10,
            precache_size_unit: DataSizeUnit::Mib,
        }
    }
}

impl ThrottlingSettings {
    /// Whether the rate cap is active.
    pub fn speed_limit_enabled(&self) -> bool {
        self.speed_limit_unit != DataRateUnit::Unlimited
    }

    /// Whether the pre-cache window applies (adaptive mode only).
    pub fn precache_enabled(&self) -> bool {
        self.mode == ThrottlingMode::Adaptive
    }

    /// Translate to the engine-native record. Total over the settings domain:
    /// unlimited rates become a 0 limit ("no cap").
    pub fn to_engine(&self) -> NetThrottle {
        NetThrottle {
            mode: match self.mode {
                ThrottlingMode::Constant => NetworkMode::Constant,
                ThrottlingMode::Adaptive => NetworkMode::Adaptive,
            },
            network_limit: self.speed_limit_unit.to_bytes(self.speed_limit),
            fast_precache: self.precache_size_unit.to_bytes(self.precache_size),
            adaptive_io_ratio_pct: ADAPTIVE_IO_RATIO_PCT,
            background_network_rate: BACKGROUND_NETWORK_RATE,
        }
    }
}
