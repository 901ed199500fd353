//! Device session side of a performance transaction: typed commands, the
//! channel they travel over, and the [`PerformanceSession`] facade that
//! joins capture, summary, reporting API, and HAR metrics.

mod channel;
mod command;
mod error;
mod evaluation;
mod session;

pub use channel::{CommandChannel, CommandOutput, WebDriverChannel};
pub use command::{DeviceCommand, ReportStatus};
pub use error::{Error, Result};
pub use evaluation::{DEFAULT_SPEED_INDEX_THRESHOLD, SpeedIndexCheck, SpeedIndexVerdict};
pub use session::{CaptureLevel, PerformanceSession, PropertySource};
