//! Media Relay - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use media_relay::{
    alert::{AlertChannel, DisabledAlerts, LarkNotifier},
    api::TelegramApi,
    cli::Args,
    clock::{Clock, SystemClock},
    config::{validate_config, Config, RunMode},
    download::HttpFetcher,
    error::{exit_codes, Error, Result},
    output::{
        print_banner, print_config_summary, print_error, print_global_stats, print_info,
        print_run_stats, print_warning,
    },
    runner::{run_many, run_one, Relay},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                _ if e.is_store_error() => ExitCode::from(exit_codes::STORE_ERROR as u8),
                Error::Api(_) | Error::Http(_) | Error::RateLimited(_) => {
                    ExitCode::from(exit_codes::API_ERROR as u8)
                }
                Error::FilesFailed(_) => ExitCode::from(exit_codes::SOME_FILES_FAILED as u8),
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            args.config.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    args.merge_into_config(&mut config);

    // Missing credentials stop the run before any item is touched.
    validate_config(&config)?;

    let mode = args.run_mode(&config);
    print_config_summary(
        &mode.to_string(),
        &config.telegram.chat_id,
        &config.download_directory().display().to_string(),
        config.alert.lark_key.is_some(),
    );

    // Collaborators
    let fetcher = HttpFetcher::new(config.options.download_timeout(), true)?;
    let publisher = TelegramApi::new(
        &config.telegram.api_base,
        &config.telegram.bot_token,
        &config.telegram.chat_id,
        config.options.publish_timeout(),
    )?;
    let alerts: Box<dyn AlertChannel> = match &config.alert.lark_key {
        Some(key) => Box::new(LarkNotifier::new(
            &config.alert.webhook_base,
            key,
            config.options.alert_timeout(),
            config.options.alert_body_chars,
        )?),
        None => {
            print_warning("No Lark key configured, alerts are disabled");
            Box::new(DisabledAlerts)
        }
    };
    let clock = SystemClock;

    let relay = Relay {
        config: &config,
        fetcher: &fetcher,
        publisher: &publisher,
        alerts: alerts.as_ref(),
        clock: &clock,
    };

    match mode {
        RunMode::Single {
            state_path,
            download_dir,
        } => {
            let download_dir = download_dir.unwrap_or_else(|| config.download_directory());
            print_info(&format!("Processing {}", state_path.display()));
            let stats = run_one(&relay, &state_path, &download_dir).await?;
            print_run_stats(&stats);
        }
        RunMode::Window { days } => {
            let global = run_many(&relay, clock.now().date(), days).await;
            print_global_stats(&global);

            if global.files_failed > 0 {
                return Err(Error::FilesFailed(global.files_failed));
            }
        }
    }

    Ok(())
}
