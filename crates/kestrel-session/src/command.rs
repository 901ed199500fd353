use std::fmt;

const CLIENT: &str = "seetest:client";

/// Overall test status shown in the device lab report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStatus {
    Passed,
    Failed,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Passed => "Passed",
            ReportStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commands understood by the device lab's script channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCommand {
    /// Capture device-wide metrics under a network profile
    StartPerformanceTransaction { network_profile: String },
    /// Capture metrics for a single application under a network profile
    StartPerformanceTransactionForApplication {
        application: String,
        network_profile: String,
    },
    /// Stop capturing; the lab answers with the transaction summary
    EndPerformanceTransaction { transaction_name: String },
    SetReportStatus {
        status: ReportStatus,
        message: String,
    },
    /// Add a step to the report, marked passed or failed
    Report { message: String, passed: bool },
    AddTestProperty { property: String, value: String },
    StartStepsGroup { name: String },
    StopStepsGroup,
}

impl DeviceCommand {
    /// Name of the remote procedure
    pub fn name(&self) -> &'static str {
        match self {
            DeviceCommand::StartPerformanceTransaction { .. } => "startPerformanceTransaction",
            DeviceCommand::StartPerformanceTransactionForApplication { .. } => {
                "startPerformanceTransactionForApplication"
            }
            DeviceCommand::EndPerformanceTransaction { .. } => "endPerformanceTransaction",
            DeviceCommand::SetReportStatus { .. } => "setReportStatus",
            DeviceCommand::Report { .. } => "report",
            DeviceCommand::AddTestProperty { .. } => "addTestProperty",
            DeviceCommand::StartStepsGroup { .. } => "startStepsGroup",
            DeviceCommand::StopStepsGroup => "stopStepsGroup",
        }
    }

    /// Render the script sent over the channel, e.g.
    /// `seetest:client.endPerformanceTransaction("login")`
    pub fn script(&self) -> String {
        let args = match self {
            DeviceCommand::StartPerformanceTransaction { network_profile } => {
                vec![quote(network_profile)]
            }
            DeviceCommand::StartPerformanceTransactionForApplication {
                application,
                network_profile,
            } => vec![quote(application), quote(network_profile)],
            DeviceCommand::EndPerformanceTransaction { transaction_name } => {
                vec![quote(transaction_name)]
            }
            // The lab takes the status twice: once as the status, once as its label
            DeviceCommand::SetReportStatus { status, message } => {
                vec![quote(status.as_str()), quote(status.as_str()), quote(message)]
            }
            DeviceCommand::Report { message, passed } => vec![quote(message), passed.to_string()],
            DeviceCommand::AddTestProperty { property, value } => {
                vec![quote(property), quote(value)]
            }
            DeviceCommand::StartStepsGroup { name } => vec![quote(name)],
            DeviceCommand::StopStepsGroup => vec![],
        };

        format!("{}.{}({})", CLIENT, self.name(), args.join(", "))
    }
}

/// Double-quoted script string literal
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
