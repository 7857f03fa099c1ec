use super::Host;
use crate::Result;
use crate::config::Config;
use crate::providers::{Endpoints, ProviderName, fetch_all};
use crate::reports::{WeightFilter, generate_console, write_json_file};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, ValueEnum};
use std::io::Write;

const LOG_TARGET: &str = "     fetch";

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    None,

    /// Only error messages
    Error,

    /// Warning and error messages
    #[default]
    Warn,

    /// Info, warning, and error messages
    Info,

    /// Debug, info, warning, and error messages
    Debug,

    /// Trace, debug, info, warning, and error messages
    Trace,
}

#[derive(Parser, Debug, Default)]
pub struct FetchArgs {
    /// Path to configuration file (default is `contribkit.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Directory receiving the output file
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output_dir: Option<Utf8PathBuf>,

    /// Stem of the output file name
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Keep only records whose weight passes this threshold (`<N`, `<=N`, `>N`, `>=N`)
    #[arg(long, value_name = "EXPR", value_parser = parse_filter)]
    pub filter: Option<WeightFilter>,

    /// Provider to run; repeat to run several (default is to guess from the configuration)
    #[arg(long = "provider", value_name = "NAME")]
    pub providers: Vec<ProviderName>,

    /// GitHub personal access token (`CONTRIBKIT_GITHUB_TOKEN` or `GITHUB_TOKEN` are read when absent)
    #[arg(long, value_name = "TOKEN")]
    pub github_token: Option<String>,

    /// Set the logging level for diagnostic output
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: LogLevel,

    /// Print a summary of the fetched records
    #[arg(long)]
    pub console: bool,
}

fn parse_filter(s: &str) -> Result<WeightFilter, String> {
    s.parse().map_err(|e: ohno::AppError| e.to_string())
}

pub async fn fetch<H: Host>(host: &mut H, args: &FetchArgs) -> Result<()> {
    init_logging(args.log_level);

    let result = fetch_with(host, args, Utf8Path::new("."), &Endpoints::default(), |name| std::env::var(name).ok()).await;

    if let Err(e) = &result {
        let _ = writeln!(host.error(), "❌ Fetch failed: {e:#}");
        host.exit(1);
    }

    result
}

/// Run the fetch workflow against the given endpoints, reading environment variables through `env`.
///
/// Settings are layered with later sources winning: configuration file, environment, command line.
pub async fn fetch_with<H: Host>(
    host: &mut H,
    args: &FetchArgs,
    base_dir: &Utf8Path,
    endpoints: &Endpoints,
    env: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    let mut config = Config::load(base_dir, args.config.as_deref())?;
    config.apply_env(env)?;
    apply_args(&mut config, args);
    config.validate()?;

    let mut records = fetch_all(&config, endpoints).await?;

    if let Some(filter) = &config.filter {
        let before = records.len();
        filter.retain(&mut records);
        log::info!(target: LOG_TARGET, "Filter '{filter}' kept {} of {before} record(s)", records.len());
    }

    let path = write_json_file(&config.output_dir, &config.name, &records)?;

    if args.console {
        let mut console_output = String::new();
        generate_console(&records, &mut console_output)?;
        let _ = write!(host.output(), "{console_output}");
    }

    let _ = writeln!(host.output(), "Wrote {} record(s) to {path}", records.len());
    Ok(())
}

fn apply_args(config: &mut Config, args: &FetchArgs) {
    if let Some(dir) = &args.output_dir {
        config.output_dir.clone_from(dir);
    }

    if let Some(name) = &args.name {
        config.name.clone_from(name);
    }

    if let Some(filter) = args.filter {
        config.filter = Some(filter);
    }

    if !args.providers.is_empty() {
        config.providers.clone_from(&args.providers);
    }

    if let Some(token) = args.github_token.as_ref().filter(|t| !t.is_empty()) {
        config.token = Some(token.clone());
    }
}

fn init_logging(log_level: LogLevel) {
    let level = match log_level {
        LogLevel::None => return,
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    };

    let env = env_logger::Env::default().filter_or("RUST_LOG", level);

    let _ = env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(matches!(log_level, LogLevel::Debug | LogLevel::Trace))
        .try_init();
}
