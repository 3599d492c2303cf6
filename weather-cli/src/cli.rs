use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use tracing::debug;
use weather_core::{Config, FetchConfig, FetchController, Phase, render};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for a city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default city.
    Configure,

    /// Fetch and show the current weather.
    Show(ShowArgs),
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// City name; defaults to the configured city.
    #[arg(long)]
    pub city: Option<String>,

    /// OpenWeather API key; defaults to the configured key.
    #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Give up after this many seconds.
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Retries for transient failures.
    #[arg(long)]
    pub retries: Option<u32>,
}

impl ShowArgs {
    /// Apply command-line overrides on top of the stored config.
    pub fn resolve(&self, mut config: Config) -> Result<FetchConfig> {
        if let Some(city) = &self.city {
            config.city = city.clone();
        }
        if let Some(api_key) = &self.api_key {
            config.set_api_key(api_key.clone());
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = Some(timeout);
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }

        config.fetch_config()
    }
}

impl Cli {
    pub async fn run(self) -> Result<ExitCode> {
        match self.command {
            Command::Configure => configure(),
            Command::Show(args) => show(args).await,
        }
    }
}

fn configure() -> Result<ExitCode> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let city = Text::new("City:")
        .with_default(&config.city)
        .prompt()
        .context("Failed to read city")?;

    config.set_api_key(api_key);
    config.city = city;

    // Validate before writing anything.
    config.fetch_config()?;
    config.save()?;

    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(ExitCode::SUCCESS)
}

async fn show(args: ShowArgs) -> Result<ExitCode> {
    let fetch = args.resolve(Config::load()?)?;
    debug!(city = %fetch.city, policy = ?fetch.policy, "mounting weather view");

    let mut mounted = FetchController::openweather(fetch).mount();
    eprintln!("{}", render(&mounted.state()));

    let state = mounted.settled().await;
    println!("{}", render(&state));

    Ok(match state.phase() {
        Phase::Succeeded => ExitCode::SUCCESS,
        Phase::Pending | Phase::Failed => ExitCode::FAILURE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn show_args(argv: &[&str]) -> ShowArgs {
        let cli = Cli::try_parse_from(argv).expect("valid arguments");
        match cli.command {
            Command::Show(args) => args,
            other => panic!("expected show, got {other:?}"),
        }
    }

    #[test]
    fn flags_override_stored_config() {
        let args = show_args(&[
            "weather", "show", "--city", "Oslo", "--api-key", "FLAG_KEY", "--timeout", "5",
            "--retries", "1",
        ]);

        let mut stored = Config::default();
        stored.set_api_key("STORED_KEY".into());

        let fetch = args.resolve(stored).expect("resolves");
        assert_eq!(fetch.city, "Oslo");
        assert_eq!(fetch.api_key, "FLAG_KEY");
        assert_eq!(fetch.policy.timeout, Some(Duration::from_secs(5)));
        assert_eq!(fetch.policy.retries, 1);
    }

    #[test]
    fn stored_config_is_used_without_flags() {
        let args = ShowArgs { city: None, api_key: None, timeout: None, retries: None };

        let mut stored = Config::default();
        stored.set_api_key("STORED_KEY".into());

        let fetch = args.resolve(stored).expect("resolves");
        assert_eq!(fetch.city, "London");
        assert_eq!(fetch.api_key, "STORED_KEY");
        assert_eq!(fetch.policy.timeout, None);
    }

    #[test]
    fn missing_key_is_reported() {
        let args = ShowArgs { city: None, api_key: None, timeout: None, retries: None };
        let err = args.resolve(Config::default()).unwrap_err();

        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn configure_takes_no_arguments() {
        let cli = Cli::try_parse_from(["weather", "configure"]).expect("valid arguments");
        assert!(matches!(cli.command, Command::Configure));
    }
}
