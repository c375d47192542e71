use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use postcode_core::config::FieldGroupConfig;
use postcode_core::{AustPostcodeConfig, FieldGroupOptions, OptionKey, PostcodePool};
use postcode_lookup::{HttpLookupClient, LookupClient, OfflineLookupClient};

/// aust-postcode: Australian postcode autocomplete in the terminal.
///
/// Type part of a locality name, pick a match from the drop-down list, and the
/// locality, state and postcode fields are filled in together.
#[derive(Parser, Debug)]
#[command(name = "aust-postcode", version, about)]
struct Cli {
    /// Base URL of the postcode API (overrides the config file).
    #[arg(long)]
    url: Option<String>,

    /// Quiet period after the last keystroke before a lookup, in milliseconds.
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Colour theme: safe, dark or light.
    #[arg(long)]
    theme: Option<String>,

    /// Set a field group option, e.g. `-o resultPanelHeight=40`. Repeatable.
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    options: Vec<String>,

    /// Answer lookups from a JSON file of postcodes instead of the API.
    #[arg(long, value_name = "FILE")]
    offline: Option<PathBuf>,

    /// Write the effective configuration back to the config file.
    #[arg(long)]
    save_config: bool,

    /// List the option names accepted by `-o` and exit.
    #[arg(long)]
    list_options: bool,

    /// Increase logging verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging.
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Log to a file so the alternate screen is never written over. If the
    // file can't be opened, logs are discarded.
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("aust-postcode");
    let _ = std::fs::create_dir_all(&log_dir);
    let log_path = log_dir.join("aust-postcode.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path);

    match log_file {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
                )
                .with_writer(std::sync::Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        Err(_) => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .with_writer(std::io::sink)
                .init();
        }
    }

    if cli.list_options {
        let defaults = FieldGroupOptions::default();
        for key in OptionKey::all() {
            println!("{:<20} {}", key.name(), defaults.get(*key).replace('\n', "\\n"));
        }
        return Ok(());
    }

    // Load config.
    let mut config = AustPostcodeConfig::load().unwrap_or_else(|e| {
        eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
        AustPostcodeConfig::default()
    });
    apply_overrides(&mut config, &cli);

    if cli.save_config {
        config.save().context("Failed to save config")?;
    }

    tracing::info!("Starting aust-postcode v{}", env!("CARGO_PKG_VERSION"));

    let pool = match &cli.offline {
        Some(path) => Some(Arc::new(PostcodePool::load_json(path).with_context(|| {
            format!("Failed to load postcodes from {}", path.display())
        })?)),
        None => None,
    };

    let mut app = postcode_tui::App::new();
    for group in &config.field_groups {
        let options = group_options(&config, group, &cli.options)?;
        let client: Arc<dyn LookupClient> = match &pool {
            Some(pool) => Arc::new(OfflineLookupClient::new(pool.clone())),
            None => Arc::new(HttpLookupClient::new(&options.url, config.lookup_timeout())),
        };
        let label = if group.label.is_empty() {
            group.host.as_str()
        } else {
            group.label.as_str()
        };
        app.attach(&group.host, label, options, client)
            .with_context(|| format!("Failed to attach field group '{}'", group.host))?;
    }

    app.run().await?;

    tracing::info!("aust-postcode exited cleanly");
    Ok(())
}

fn apply_overrides(config: &mut AustPostcodeConfig, cli: &Cli) {
    if let Some(url) = &cli.url {
        config.lookup.url = url.clone();
    }
    if let Some(delay) = cli.delay_ms {
        config.widget.key_stroke_delay_ms = delay;
    }
    if let Some(theme) = &cli.theme {
        config.widget.theme = theme.clone();
    }
}

/// Options for one group: the config file's values, then every `-o`
/// assignment in order.
fn group_options(
    config: &AustPostcodeConfig,
    group: &FieldGroupConfig,
    assignments: &[String],
) -> Result<FieldGroupOptions> {
    let mut options = config.options_for(group);
    for assignment in assignments {
        options
            .apply_assignment(assignment)
            .with_context(|| format!("Invalid option '{assignment}'"))?;
    }
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("aust-postcode").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn flags_override_the_config_file() {
        let cli = parse(&["--url", "https://example.org/api", "--delay-ms", "250", "--theme", "dark"]);
        let mut config = AustPostcodeConfig::default();
        apply_overrides(&mut config, &cli);

        let options = group_options(&config, &config.field_groups[0], &cli.options).unwrap();
        assert_eq!(options.url, "https://example.org/api/");
        assert_eq!(options.key_stroke_delay, Duration::from_millis(250));
        assert_eq!(options.theme, "dark");
    }

    #[test]
    fn option_assignments_apply_in_order() {
        let cli = parse(&["-o", "resultPanelHeight=40", "--option", "resultPanelHeight=60"]);
        let config = AustPostcodeConfig::default();
        let options = group_options(&config, &config.field_groups[0], &cli.options).unwrap();
        assert_eq!(options.result_panel_height, 60);
    }

    #[test]
    fn bad_assignments_are_reported() {
        let config = AustPostcodeConfig::default();
        let err = group_options(
            &config,
            &config.field_groups[0],
            &["noSuchOption=1".to_string()],
        )
        .unwrap_err();
        assert!(err.to_string().contains("noSuchOption=1"));
    }

    #[test]
    fn offline_file_and_verbosity() {
        let cli = parse(&["--offline", "postcodes.json", "-vv"]);
        assert_eq!(cli.offline, Some(PathBuf::from("postcodes.json")));
        assert_eq!(cli.verbose, 2);
    }
}
