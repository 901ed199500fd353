use crate::evaluation::{SpeedIndexCheck, SpeedIndexVerdict};
use crate::{CommandChannel, DeviceCommand, Error, ReportStatus, Result};
use kestrel_core::analysis::{HarMetrics, MetricsAnalyzer};
use kestrel_core::api::{PollConfig, ReporterClient, TransactionRecord};
use kestrel_core::har::HarRetriever;
use kestrel_core::summary::TransactionSummary;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Scope of metric capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureLevel {
    /// Whole device
    Device,
    /// A single application
    Application,
}

impl FromStr for CaptureLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("device") {
            Ok(CaptureLevel::Device)
        } else if s.eq_ignore_ascii_case("application") {
            Ok(CaptureLevel::Application)
        } else {
            Err(Error::InvalidCaptureLevel(s.to_string()))
        }
    }
}

impl fmt::Display for CaptureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureLevel::Device => f.write_str("Device"),
            CaptureLevel::Application => f.write_str("Application"),
        }
    }
}

/// Where a property lookup is answered from
#[derive(Debug, Clone, Copy)]
pub enum PropertySource<'a> {
    /// The summary returned when the capture ended
    Summary(&'a TransactionSummary),
    /// The aggregated record on the reporting API
    Api { transaction_id: &'a str },
}

/// Drives one capture-to-metrics pipeline over a device session.
///
/// Ordering is the caller's job: end the capture before looking anything
/// up, and give the reporting API time to aggregate (see
/// [`PerformanceSession::wait_for_property`]) before reading API-side
/// properties.
pub struct PerformanceSession<C> {
    channel: C,
    reporter: Option<ReporterClient>,
    har: Option<HarRetriever>,
    analyzer: MetricsAnalyzer,
    poll: PollConfig,
}

impl<C: CommandChannel> PerformanceSession<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            reporter: None,
            har: None,
            analyzer: MetricsAnalyzer::new(),
            poll: PollConfig::default(),
        }
    }

    /// Attach the reporting API. Also enables HAR downloads into the
    /// default directory unless a retriever was set explicitly.
    pub fn with_reporter(mut self, client: ReporterClient) -> Self {
        if self.har.is_none() {
            self.har = Some(HarRetriever::from_client(&client));
        }
        self.reporter = Some(client);
        self
    }

    pub fn with_har_retriever(mut self, retriever: HarRetriever) -> Self {
        self.har = Some(retriever);
        self
    }

    pub fn with_analyzer(mut self, analyzer: MetricsAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn into_channel(self) -> C {
        self.channel
    }

    /// Start capturing. Never fails: an unrecognized level or a channel
    /// error is logged and the surrounding flow carries on without a
    /// capture.
    pub fn start_capture(&mut self, network_profile: &str, capture_level: &str, application: &str) {
        let level = match capture_level.parse::<CaptureLevel>() {
            Ok(level) => level,
            Err(e) => {
                tracing::warn!("Could not start capturing: {}", e);
                return;
            }
        };

        if let Err(e) = self.try_start_capture(network_profile, level, application) {
            tracing::warn!(
                "Could not start capturing. Accepted values: [Device, Application]. Cause: {}",
                e
            );
        }
    }

    /// Start capturing, reporting failures to the caller
    pub fn try_start_capture(
        &mut self,
        network_profile: &str,
        level: CaptureLevel,
        application: &str,
    ) -> Result<()> {
        let command = match level {
            CaptureLevel::Device => DeviceCommand::StartPerformanceTransaction {
                network_profile: network_profile.to_string(),
            },
            CaptureLevel::Application => DeviceCommand::StartPerformanceTransactionForApplication {
                application: application.to_string(),
                network_profile: network_profile.to_string(),
            },
        };

        self.channel.execute(&command)?;
        tracing::info!(
            "Started {} capture with network profile {}",
            level,
            network_profile
        );
        Ok(())
    }

    /// Stop capturing and return the raw transaction summary
    pub fn end_capture(&mut self, transaction_name: &str) -> Result<String> {
        let output = self.channel.execute(&DeviceCommand::EndPerformanceTransaction {
            transaction_name: transaction_name.to_string(),
        })?;

        let raw = output.render().ok_or_else(|| {
            Error::Channel(format!(
                "endPerformanceTransaction returned nothing for '{}'",
                transaction_name
            ))
        })?;

        tracing::info!("Transaction Information: {}", raw);
        Ok(raw)
    }

    /// Parse a raw transaction summary
    pub fn summary(&self, raw: &str) -> Result<TransactionSummary> {
        Ok(TransactionSummary::parse(raw)?)
    }

    /// Stop capturing and parse the returned summary
    pub fn end_capture_summary(&mut self, transaction_name: &str) -> Result<TransactionSummary> {
        let raw = self.end_capture(transaction_name)?;
        self.summary(&raw)
    }

    /// Look up `name` in the given source.
    ///
    /// Summary lookups never fail and return `None` for absent keys. API
    /// lookups fetch the record each time and fail if the property is
    /// missing.
    pub fn property(&self, source: PropertySource<'_>, name: &str) -> Result<Option<String>> {
        match source {
            PropertySource::Summary(summary) => Ok(summary.get(name).map(str::to_string)),
            PropertySource::Api { transaction_id } => {
                let value = self.reporter()?.fetch_property(transaction_id, name)?;
                Ok(Some(value))
            }
        }
    }

    /// Poll the reporting API until the record carries `name`
    pub fn wait_for_property(&self, transaction_id: &str, name: &str) -> Result<TransactionRecord> {
        Ok(self
            .reporter()?
            .wait_for_property(transaction_id, name, &self.poll)?)
    }

    /// Download the transaction's HAR archive
    pub fn download_har(&self, transaction_id: &str, file_name: &str) -> Result<PathBuf> {
        let retriever = self
            .har
            .as_ref()
            .ok_or(Error::NotConfigured("HAR retriever"))?;
        Ok(retriever.download(transaction_id, file_name)?)
    }

    /// Download the transaction's HAR archive and compute its metrics
    pub fn har_metrics(&self, transaction_id: &str, file_name: &str) -> Result<HarMetrics> {
        let path = self.download_har(transaction_id, file_name)?;
        Ok(self.analyzer.aggregate(&path)?)
    }

    /// Check the speed index and record the verdict as a report step
    pub fn report_speed_index(
        &mut self,
        speed_index: &str,
        check: &SpeedIndexCheck,
    ) -> Result<SpeedIndexVerdict> {
        let verdict = check.evaluate_str(speed_index)?;
        self.add_report_step_with_status(&verdict.message, verdict.passed)?;
        Ok(verdict)
    }

    pub fn add_report_step(&mut self, message: &str) -> Result<()> {
        self.add_report_step_with_status(message, true)
    }

    pub fn add_report_step_with_status(&mut self, message: &str, passed: bool) -> Result<()> {
        self.send(DeviceCommand::Report {
            message: message.to_string(),
            passed,
        })
    }

    pub fn set_report_status(&mut self, status: ReportStatus, message: &str) -> Result<()> {
        self.send(DeviceCommand::SetReportStatus {
            status,
            message: message.to_string(),
        })
    }

    /// Attach a filterable property to the test result
    pub fn add_property(&mut self, property: &str, value: &str) -> Result<()> {
        self.send(DeviceCommand::AddTestProperty {
            property: property.to_string(),
            value: value.to_string(),
        })
    }

    pub fn start_steps_group(&mut self, name: &str) -> Result<()> {
        self.send(DeviceCommand::StartStepsGroup {
            name: name.to_string(),
        })
    }

    pub fn stop_steps_group(&mut self) -> Result<()> {
        self.send(DeviceCommand::StopStepsGroup)
    }

    fn send(&mut self, command: DeviceCommand) -> Result<()> {
        self.channel.execute(&command)?;
        Ok(())
    }

    fn reporter(&self) -> Result<&ReporterClient> {
        self.reporter
            .as_ref()
            .ok_or(Error::NotConfigured("reporting API client"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandOutput;
    use serde_json::json;

    /// Records every command and answers end-of-capture with a fixed value
    #[derive(Default)]
    struct RecordingChannel {
        scripts: Vec<String>,
        end_response: Option<serde_json::Value>,
        fail: bool,
    }

    impl CommandChannel for RecordingChannel {
        fn execute(&mut self, command: &DeviceCommand) -> Result<CommandOutput> {
            if self.fail {
                return Err(Error::Channel("session closed".to_string()));
            }
            self.scripts.push(command.script());
            match command {
                DeviceCommand::EndPerformanceTransaction { .. } => Ok(self
                    .end_response
                    .clone()
                    .map(CommandOutput::value)
                    .unwrap_or_default()),
                _ => Ok(CommandOutput::none()),
            }
        }
    }

    #[test]
    fn test_capture_level_is_case_insensitive() {
        assert_eq!("device".parse::<CaptureLevel>().unwrap(), CaptureLevel::Device);
        assert_eq!(
            "APPLICATION".parse::<CaptureLevel>().unwrap(),
            CaptureLevel::Application
        );
        assert!(matches!(
            "Network".parse::<CaptureLevel>(),
            Err(Error::InvalidCaptureLevel(_))
        ));
    }

    #[test]
    fn test_start_capture_device_level() {
        let mut session = PerformanceSession::new(RecordingChannel::default());

        session.start_capture("4G-average", "Device", "com.experitest.ExperiBank");

        assert_eq!(
            session.channel().scripts,
            vec![r#"seetest:client.startPerformanceTransaction("4G-average")"#.to_string()]
        );
    }

    #[test]
    fn test_start_capture_application_level() {
        let mut session = PerformanceSession::new(RecordingChannel::default());

        session.start_capture("3G-good", "application", "com.apple.mobilesafari");

        assert_eq!(
            session.channel().scripts,
            vec![
                r#"seetest:client.startPerformanceTransactionForApplication("com.apple.mobilesafari", "3G-good")"#
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_unrecognized_level_sends_nothing() {
        let mut session = PerformanceSession::new(RecordingChannel::default());

        session.start_capture("4G-average", "Network", "app");

        assert!(session.channel().scripts.is_empty());
    }

    #[test]
    fn test_start_capture_swallows_channel_errors() {
        let mut session = PerformanceSession::new(RecordingChannel {
            fail: true,
            ..RecordingChannel::default()
        });

        // Must not panic or propagate
        session.start_capture("4G-average", "Device", "app");

        let strict = session.try_start_capture("4G-average", CaptureLevel::Device, "app");
        assert!(matches!(strict, Err(Error::Channel(_))));
    }

    #[test]
    fn test_end_capture_returns_rendered_summary() {
        let mut session = PerformanceSession::new(RecordingChannel {
            end_response: Some(json!({"transactionId": "abc123", "link": "http://report/abc123"})),
            ..RecordingChannel::default()
        });

        let summary = session.end_capture_summary("test_login_response_time").unwrap();

        assert_eq!(summary.transaction_id(), Some("abc123"));
        assert_eq!(summary.link(), Some("http://report/abc123"));
        assert_eq!(
            session.channel().scripts,
            vec![
                r#"seetest:client.endPerformanceTransaction("test_login_response_time")"#
                    .to_string()
            ]
        );
    }

    #[test]
    fn test_end_capture_without_value_fails() {
        let mut session = PerformanceSession::new(RecordingChannel::default());
        assert!(matches!(session.end_capture("x"), Err(Error::Channel(_))));
    }

    #[test]
    fn test_summary_source_lookup() {
        let session = PerformanceSession::new(RecordingChannel::default());
        let summary = session
            .summary("Transaction Information: {transactionId=abc123, link=null}")
            .unwrap();

        let id = session
            .property(PropertySource::Summary(&summary), "transactionId")
            .unwrap();
        let link = session
            .property(PropertySource::Summary(&summary), "link")
            .unwrap();
        let missing = session
            .property(PropertySource::Summary(&summary), "nonexistent")
            .unwrap();

        assert_eq!(id.as_deref(), Some("abc123"));
        assert_eq!(link, None);
        assert_eq!(missing, None);
    }

    #[test]
    fn test_api_lookup_requires_reporter() {
        let session = PerformanceSession::new(RecordingChannel::default());
        let result = session.property(PropertySource::Api { transaction_id: "t1" }, "speedIndex");
        assert!(matches!(result, Err(Error::NotConfigured(_))));
        assert!(matches!(
            session.har_metrics("t1", "t1"),
            Err(Error::NotConfigured(_))
        ));
    }

    #[test]
    fn test_report_speed_index_adds_step() {
        let mut session = PerformanceSession::new(RecordingChannel::default());

        let verdict = session
            .report_speed_index("2400", &SpeedIndexCheck::default())
            .unwrap();

        assert!(!verdict.passed);
        assert_eq!(
            session.channel().scripts,
            vec![r#"seetest:client.report("Speed Index Captured is too high: 2400", false)"#.to_string()]
        );
    }

    #[test]
    fn test_reporting_helpers() {
        let mut session = PerformanceSession::new(RecordingChannel::default());

        session.start_steps_group("login - GROUP").unwrap();
        session.add_report_step("Using Network Profile: 4G-average").unwrap();
        session.add_property("category", "performance").unwrap();
        session.stop_steps_group().unwrap();
        session
            .set_report_status(ReportStatus::Failed, "Test Failed")
            .unwrap();

        assert_eq!(
            session.into_channel().scripts,
            vec![
                r#"seetest:client.startStepsGroup("login - GROUP")"#.to_string(),
                r#"seetest:client.report("Using Network Profile: 4G-average", true)"#.to_string(),
                r#"seetest:client.addTestProperty("category", "performance")"#.to_string(),
                "seetest:client.stopStepsGroup()".to_string(),
                r#"seetest:client.setReportStatus("Failed", "Failed", "Test Failed")"#.to_string(),
            ]
        );
    }
}
