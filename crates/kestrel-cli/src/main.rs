use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use kestrel_cli::commands::capture::SessionTarget;
use kestrel_cli::commands::record::FetchOptions;
use kestrel_cli::{ConfigArgs, OutputFormat, commands};
use kestrel_core::config::DEFAULT_PROPERTIES_FILE;
use kestrel_core::filter::EntryFilter;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "kestrel")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "A CLI tool for performance transactions on cloud device labs",
    long_about = "Kestrel starts and ends performance transaction captures on a device session, \
                  parses the returned transaction summary, reads aggregated metrics from the \
                  reporting API, and computes network metrics from the transaction's HAR file."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,

    /// Properties file with urlForAPIs, accessKey and cloudUrl
    #[arg(long, global = true, value_name = "FILE", default_value = DEFAULT_PROPERTIES_FILE)]
    config: PathBuf,

    /// Reporting API base URL (overrides urlForAPIs)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Access key (overrides accessKey)
    #[arg(long, global = true, value_name = "KEY")]
    access_key: Option<String>,

    /// Device grid URL (overrides cloudUrl)
    #[arg(long, global = true, value_name = "URL")]
    cloud_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a transaction summary returned when a capture ends
    Summary {
        /// Raw response, e.g. "Transaction Information: {transactionId=..., link=...}"
        #[arg(value_name = "RESPONSE")]
        response: String,

        /// Print only this property ("null" if absent)
        #[arg(short, long)]
        property: Option<String>,
    },

    /// Fetch a transaction record from the reporting API
    Record {
        /// Transaction id
        #[arg(value_name = "TRANSACTION_ID")]
        transaction_id: String,

        /// Properties to show (repeatable); all when omitted
        #[arg(short, long = "property", value_name = "NAME")]
        properties: Vec<String>,

        /// Poll until the properties have been aggregated
        #[arg(long)]
        wait: bool,

        /// Polling deadline in seconds
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },

    /// Download HAR archives and compute network metrics
    #[command(subcommand)]
    Har(HarCommands),

    /// Start or end a capture on an existing device session
    #[command(subcommand)]
    Capture(CaptureCommands),

    /// Show the resolved configuration
    Config,

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:\n  bash, zsh, fish, powershell, elvish\n\n\
                            INSTALLATION:\n  \
                            bash: kestrel completion --shell bash >> ~/.bashrc\n  \
                            zsh:  kestrel completion --shell zsh > \"${fpath[1]}/_kestrel\"\n  \
                            fish: kestrel completion --shell fish > ~/.config/fish/completions/kestrel.fish")]
    Completion {
        /// Target shell
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

#[derive(clap::Args)]
struct EntryFilterArgs {
    /// Only count requests with this HTTP method
    #[arg(long)]
    method: Option<String>,

    /// Only count requests whose URL contains this text
    #[arg(long, value_name = "TEXT")]
    url_contains: Option<String>,

    /// Only count entries of this resource type (xhr, fetch, document, ...)
    #[arg(long, value_name = "TYPE")]
    resource_type: Option<String>,
}

impl EntryFilterArgs {
    fn into_filter(self) -> EntryFilter {
        let mut filter = EntryFilter::new();
        if let Some(method) = self.method {
            filter = filter.with_method(method);
        }
        if let Some(pattern) = self.url_contains {
            filter = filter.with_url_contains(pattern);
        }
        if let Some(kind) = self.resource_type {
            filter = filter.with_resource_type(kind);
        }
        filter
    }
}

#[derive(Subcommand)]
enum HarCommands {
    /// Download a transaction's HAR archive
    Download {
        #[arg(value_name = "TRANSACTION_ID")]
        transaction_id: String,

        /// Base file name; a timestamp and .har are appended
        #[arg(short, long)]
        name: String,

        /// Download directory
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Compute network metrics for a local HAR file
    Metrics {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        filter: EntryFilterArgs,
    },

    /// Download a transaction's HAR archive and compute its metrics
    Fetch {
        #[arg(value_name = "TRANSACTION_ID")]
        transaction_id: String,

        /// Base file name; a timestamp and .har are appended
        #[arg(short, long)]
        name: String,

        /// Download directory
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        #[command(flatten)]
        filter: EntryFilterArgs,
    },
}

#[derive(clap::Args)]
struct SessionArgs {
    /// Full WebDriver session URL
    #[arg(long, value_name = "URL")]
    session_url: Option<String>,

    /// Session id on the grid at cloudUrl
    #[arg(long, value_name = "ID")]
    session_id: Option<String>,
}

#[derive(Subcommand)]
enum CaptureCommands {
    /// Start a performance transaction
    Start {
        #[command(flatten)]
        session: SessionArgs,

        /// Network virtualization profile, e.g. 4G-average
        #[arg(long)]
        profile: String,

        /// Capture level: Device or Application
        #[arg(long, default_value = "Device")]
        level: String,

        /// Application identifier (used at Application level)
        #[arg(long, default_value = "")]
        app: String,
    },

    /// End a performance transaction and print its summary
    End {
        #[command(flatten)]
        session: SessionArgs,

        /// Transaction name
        #[arg(long)]
        name: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    let config_args = ConfigArgs {
        config: cli.config,
        api_url: cli.api_url,
        access_key: cli.access_key,
        cloud_url: cli.cloud_url,
    };
    let format = cli.format;

    // Execute the command
    match cli.command {
        Commands::Summary { response, property } => {
            commands::summary::execute(&response, property.as_deref(), format)
        }
        Commands::Record {
            transaction_id,
            properties,
            wait,
            timeout,
        } => {
            let config = config_args.resolve()?;
            let options = FetchOptions {
                wait,
                timeout: Duration::from_secs(timeout),
            };
            commands::record::execute(&config, &transaction_id, &properties, options, format)
        }
        Commands::Har(har) => {
            let config = config_args.resolve()?;
            match har {
                HarCommands::Download {
                    transaction_id,
                    name,
                    output_dir,
                } => commands::har::execute_download(
                    &config,
                    &transaction_id,
                    &name,
                    output_dir.as_deref(),
                ),
                HarCommands::Metrics { file, filter } => {
                    commands::har::execute_metrics(&file, filter.into_filter(), format)
                }
                HarCommands::Fetch {
                    transaction_id,
                    name,
                    output_dir,
                    filter,
                } => commands::har::execute_fetch(
                    &config,
                    &transaction_id,
                    &name,
                    output_dir.as_deref(),
                    filter.into_filter(),
                    format,
                ),
            }
        }
        Commands::Capture(capture) => {
            let config = config_args.resolve()?;
            match capture {
                CaptureCommands::Start {
                    session,
                    profile,
                    level,
                    app,
                } => {
                    let target = SessionTarget::from_args(session.session_url, session.session_id)?;
                    commands::capture::execute_start(&config, &target, &profile, &level, &app)
                }
                CaptureCommands::End { session, name } => {
                    let target = SessionTarget::from_args(session.session_url, session.session_id)?;
                    commands::capture::execute_end(&config, &target, &name)
                }
            }
        }
        Commands::Config => {
            let config = config_args.resolve()?;
            commands::config::execute(&config, format)
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            commands::completion::execute(shell, &mut cmd)
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("kestrel=debug,kestrel_cli=debug,kestrel_core=debug,kestrel_session=debug")
    } else {
        EnvFilter::new("kestrel=info,kestrel_core=warn,kestrel_session=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
