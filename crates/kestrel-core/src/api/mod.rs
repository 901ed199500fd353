//! Reporting API access: transaction records and their HAR archives.

mod client;
mod endpoint;
mod poll;
mod record;

pub use client::ReporterClient;
pub use endpoint::ReporterEndpoint;
pub use poll::PollConfig;
pub use record::TransactionRecord;

/// Well-known record properties
pub mod properties {
    pub const NETWORK_PROFILE: &str = "networkProfile";
    pub const CPU_AVG: &str = "cpuAvg";
    pub const CPU_MAX: &str = "cpuMax";
    pub const CPU_CORE_COUNT: &str = "cpuCoreCount";
    pub const MEM_AVG: &str = "memAvg";
    pub const MEM_MAX: &str = "memMax";
    pub const MEM_TOTAL_IN_BYTES: &str = "memTotalInBytes";
    pub const BATTERY_AVG: &str = "batteryAvg";
    pub const BATTERY_MAX: &str = "batteryMax";
    pub const DURATION: &str = "duration";
    pub const SPEED_INDEX: &str = "speedIndex";
}
