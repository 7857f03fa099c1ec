use super::Host;
use crate::Result;
use crate::config::Config;
use crate::providers::resolve_providers;
use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use std::io::Write;

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file (default is `contribkit.toml`)
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,
}

pub fn validate_config<H: Host>(host: &mut H, args: &ValidateArgs) -> Result<()> {
    validate_in(host, args, Utf8Path::new("."))
}

fn validate_in<H: Host>(host: &mut H, args: &ValidateArgs, base_dir: &Utf8Path) -> Result<()> {
    let config_path = args.config.as_deref();

    match Config::load(base_dir, config_path) {
        Ok(config) => {
            let _ = writeln!(host.output(), "Configuration file is valid");
            if let Some(path) = config_path {
                let _ = writeln!(host.output(), "Config file: {path}");
            } else {
                let _ = writeln!(host.output(), "Using default configuration (no config file found)");
            }

            // Without the environment overlay the provider list may legitimately be empty here.
            if let Ok(names) = resolve_providers(&config) {
                let names: Vec<_> = names.iter().map(ToString::to_string).collect();
                let _ = writeln!(host.output(), "Providers: {}", names.join(", "));
            }

            Ok(())
        }
        Err(e) => {
            let _ = writeln!(host.error(), "❌ Configuration validation failed: {e:#}");
            host.exit(1);
            Err(e)
        }
    }
}
