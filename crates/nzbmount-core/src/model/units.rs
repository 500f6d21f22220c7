//! Display units for data rates and sizes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Data-rate display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataRateUnit {
    #[serde(rename = "kib_s")]
    KibS,
    #[serde(rename = "mib_s")]
    MibS,
    #[serde(rename = "gib_s")]
    GibS,
    #[default]
    Unlimited,
}

impl DataRateUnit {
    /// Multiplier to bytes/sec; `Unlimited` maps to 0, the engine's "no cap".
    pub fn to_bytes(self, value: u64) -> u64 {
        match self {
            DataRateUnit::KibS => value * 1024,
            DataRateUnit::MibS => value * 1024 * 1024,
            DataRateUnit::GibS => value * 1024 * 1024 * 1024,
            DataRateUnit::Unlimited => 0,
        }
    }
}

impl fmt::Display for DataRateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DataRateUnit::KibS => "KB/s",
            DataRateUnit::MibS => "MB/s",
            DataRateUnit::GibS => "GB/s",
            DataRateUnit::Unlimited => "Unlimited",
        };
        f.write_str(label)
    }
}

/// Data-size display unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSizeUnit {
    Kib,
    #[default]
    Mib,
    Gib,
}

impl DataSizeUnit {
    /// Multiplier to bytes.
    pub fn to_bytes(self, value: u64) -> u64 {
        match self {
            DataSizeUnit::Kib => value * 1024,
            DataSizeUnit::Mib => value * 1024 * 1024,
            DataSizeUnit::Gib => value * 1024 * 1024 * 1024,
        }
    }
}

impl fmt::Display for DataSizeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DataSizeUnit::Kib => "KB",
            DataSizeUnit::Mib => "MB",
            DataSizeUnit::Gib => "GB",
        };
        f.write_str(label)
    }
}

/// Pick a display unit for a rate in bytes/sec.
///
/// The ladder divides by 1024 and switches up while the value is 512 or more,
/// so displayed rates stay below 512 in their unit. Shared by the per-server
/// and aggregate displays.
pub fn select_rate_unit(bytes_per_sec: f64) -> (f64, DataRateUnit) {
    let mut rate = bytes_per_sec / 1024.0;
    if rate < 512.0 {
        return (rate, DataRateUnit::KibS);
    }
    rate /= 1024.0;
    if rate < 512.0 {
        return (rate, DataRateUnit::MibS);
    }
    (rate / 1024.0, DataRateUnit::GibS)
}

/// Pick a display unit for a size in bytes: KiB below 10 MiB, MiB below
/// 10 GiB, else GiB. Values truncate.
pub fn select_size_unit(bytes: u64) -> (u64, DataSizeUnit) {
    let mut size = bytes / 1024;
    if size < 1024 * 10 {
        return (size, DataSizeUnit::Kib);
    }
    size /= 1024;
    if size < 1024 * 10 {
        return (size, DataSizeUnit::Mib);
    }
    (size / 1024, DataSizeUnit::Gib)
}
