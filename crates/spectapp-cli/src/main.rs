//! spectapp - Spect'App festival listings CLI.

/// Application configuration (TOML).
mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::instrument;
use tracing_subscriber::filter::EnvFilter;
#[cfg(not(feature = "otel"))]
use tracing_subscriber::fmt;
#[cfg(feature = "otel")]
use tracing_subscriber::layer::SubscriberExt;
#[cfg(feature = "otel")]
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{AppConfig, resolve_config_path};
use spectapp_api::{
    LocalSpectAppApi, Show, ShowDate, ShowPage, SpectAppClient, collect_all_shows,
};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// API key (overrides the key stored in config.toml).
    #[arg(long, global = true)]
    key: Option<String>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List or search a festival's shows.
    Shows(ShowsCommand),
    /// Inspect a single show.
    Show(ShowCommand),
    /// Manage the local configuration.
    Config(ConfigCommand),
}

/// Arguments for the `shows` subcommand.
#[derive(clap::Args)]
struct ShowsCommand {
    /// Shows subcommand to run.
    #[command(subcommand)]
    command: ShowsSubcommands,
}

/// Available shows subcommands.
#[derive(Subcommand)]
enum ShowsSubcommands {
    /// List one page of shows.
    List(ListArgs),
    /// Search shows by free text.
    Search(SearchArgs),
}

/// Arguments for the `shows list` subcommand.
#[derive(clap::Args)]
struct ListArgs {
    /// Festival identifier (e.g. "chalon2024").
    #[arg(long, required = true)]
    festival: String,
    /// Zero-based page number (10 shows per page).
    #[arg(long, default_value_t = 0, conflicts_with = "all")]
    page: u32,
    /// Fetch every page instead of a single one.
    #[arg(long)]
    all: bool,
}

/// Arguments for the `shows search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Festival identifier (e.g. "chalon2024").
    #[arg(long, required = true)]
    festival: String,
    /// Search text (e.g. "rollmops").
    #[arg(long, required = true)]
    query: String,
    /// Zero-based page number (10 shows per page).
    #[arg(long, default_value_t = 0, conflicts_with = "all")]
    page: u32,
    /// Fetch every page instead of a single one.
    #[arg(long)]
    all: bool,
}

/// Arguments for the `show` subcommand.
#[derive(clap::Args)]
struct ShowCommand {
    /// Show subcommand to run.
    #[command(subcommand)]
    command: ShowSubcommands,
}

/// Available show subcommands.
#[derive(Subcommand)]
enum ShowSubcommands {
    /// Print a show's full record as JSON.
    Get(ShowArgs),
    /// Print a show's icon URL.
    Icon(MediaArgs),
    /// Print a show's header URL.
    Header(MediaArgs),
    /// Print a show's dates and places.
    Dates(ShowArgs),
}

/// Arguments identifying a show.
#[derive(clap::Args)]
struct ShowArgs {
    /// Festival identifier (e.g. "chalon2024").
    #[arg(long, required = true)]
    festival: String,
    /// Show identifier (e.g. "128").
    #[arg(long, required = true)]
    id: String,
}

/// Arguments for the `show icon` / `show header` subcommands.
#[derive(clap::Args)]
struct MediaArgs {
    #[command(flatten)]
    show: ShowArgs,
    /// Format the URL locally instead of asking the API.
    #[arg(long)]
    local: bool,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Store the API key in config.toml.
    SetKey(SetKeyArgs),
    /// Show the config file location and whether a key is stored.
    Show,
}

/// Arguments for the `config set-key` subcommand.
#[derive(clap::Args)]
struct SetKeyArgs {
    /// API key to store.
    #[arg(value_name = "KEY")]
    value: String,
}

/// Builds the API client from CLI flags and config.toml.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, the configured base URL
/// is invalid, or the HTTP client fails to build.
fn build_client(cli_key: Option<&str>, dir: Option<&PathBuf>) -> Result<SpectAppClient> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;

    let mut builder = SpectAppClient::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(ref raw) = config.api.base_url {
        let url = raw
            .parse::<reqwest::Url>()
            .with_context(|| format!("invalid api.base_url in config: {raw}"))?;
        builder = builder.base_url(url);
    }
    if let Some(key) = config.resolve_key(cli_key) {
        builder = builder.api_key(key);
    }

    builder.build().context("failed to build Spect'App API client")
}

/// Logs `id<TAB>title` for each show.
fn log_show_lines(shows: &[Show]) {
    for show in shows {
        tracing::info!(
            "{}\t{}",
            show.id().unwrap_or_else(|| String::from("-")),
            show.title().unwrap_or("-"),
        );
    }
}

/// Logs every collected show followed by the count.
fn log_all_shows(shows: &[Show]) {
    log_show_lines(shows);
    tracing::info!("Total: {} shows", shows.len());
}

/// Logs one page of shows, one line per show, followed by the totals.
fn log_show_page(page: &ShowPage) {
    log_show_lines(&page.shows);
    tracing::info!(
        "Shows on page: {}, total: {}",
        page.shows.len(),
        page.total
    );
}

/// Logs a show record as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the record cannot be serialized.
fn log_show(show: &Show) -> Result<()> {
    let json = serde_json::to_string_pretty(show).context("failed to serialize show")?;
    tracing::info!("{}", json);
    Ok(())
}

/// Logs show dates in server order.
fn log_show_dates(dates: &[ShowDate]) {
    for date in dates {
        let when = date.datetime.format("%Y-%m-%d %H:%M");
        match date.offset {
            Some(offset) => tracing::info!("{} {}\t{}", when, offset, date.place),
            None => tracing::info!("{}\t{}", when, date.place),
        }
    }
    tracing::info!("Total: {} dates", dates.len());
}

/// Runs the `shows list` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_shows_list(args: &ListArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli.key.as_deref(), cli.dir.as_ref())?;
    if args.all {
        let shows = collect_all_shows(&client, &args.festival, None)
            .await
            .context("failed to list shows")?;
        log_all_shows(&shows);
        return Ok(());
    }
    let page = client
        .list_shows(&args.festival, args.page)
        .await
        .context("failed to list shows")?;
    log_show_page(&page);
    Ok(())
}

/// Runs the `shows search` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_shows_search(args: &SearchArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli.key.as_deref(), cli.dir.as_ref())?;
    if args.all {
        let shows = collect_all_shows(&client, &args.festival, Some(&args.query))
            .await
            .context("failed to search shows")?;
        log_all_shows(&shows);
        return Ok(());
    }
    let page = client
        .search_shows(&args.festival, &args.query, args.page)
        .await
        .context("failed to search shows")?;
    log_show_page(&page);
    Ok(())
}

/// Runs the `show get` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_show_get(args: &ShowArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli.key.as_deref(), cli.dir.as_ref())?;
    let show = client
        .get_show(&args.festival, &args.id)
        .await
        .context("failed to fetch show")?;
    log_show(&show)
}

/// Runs the `show icon` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_show_icon(args: &MediaArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli.key.as_deref(), cli.dir.as_ref())?;
    let url = client
        .get_show_icon(&args.show.festival, &args.show.id, !args.local)
        .await
        .context("failed to resolve icon URL")?;
    tracing::info!("Icon URL: {}", url);
    Ok(())
}

/// Runs the `show header` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_show_header(args: &MediaArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli.key.as_deref(), cli.dir.as_ref())?;
    let url = client
        .get_show_header(&args.show.festival, &args.show.id, !args.local)
        .await
        .context("failed to resolve header URL")?;
    tracing::info!("Header URL: {}", url);
    Ok(())
}

/// Runs the `show dates` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the API request fails.
#[instrument(skip_all)]
async fn run_show_dates(args: &ShowArgs, cli: &Cli) -> Result<()> {
    let client = build_client(cli.key.as_deref(), cli.dir.as_ref())?;
    let dates = client
        .get_show_dates(&args.festival, &args.id)
        .await
        .context("failed to fetch show dates")?;
    log_show_dates(&dates);
    Ok(())
}

/// Runs the `config set-key` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or saved.
#[instrument(skip_all)]
fn run_config_set_key(args: &SetKeyArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let mut config = AppConfig::load(&config_path).context("failed to load config")?;
    config.api.key = Some(args.value.clone());
    config.save(&config_path).context("failed to save config")?;
    tracing::info!("Saved API key to {}", config_path.display());
    Ok(())
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded.
#[instrument(skip_all)]
fn run_config_show(dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    let config = AppConfig::load(&config_path).context("failed to load config")?;
    tracing::info!("Config file: {}", config_path.display());
    tracing::info!(
        "API key: {}",
        if config.api.key.is_some() { "set" } else { "not set" }
    );
    if let Some(ref url) = config.api.base_url {
        tracing::info!("Base URL: {}", url);
    }
    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    #[cfg(not(feature = "otel"))]
    {
        fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_target(false)
            .init();
    }

    #[cfg(feature = "otel")]
    {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);

        let otel_layer = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
            .ok()
            .and_then(|_| {
                let exporter = opentelemetry_otlp::SpanExporter::builder()
                    .with_http()
                    .build()
                    .ok()?;

                let tracer_provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                    .with_simple_exporter(exporter)
                    .build();

                let tracer = opentelemetry::trace::TracerProvider::tracer(
                    &tracer_provider,
                    env!("CARGO_PKG_NAME"),
                );
                opentelemetry::global::set_tracer_provider(tracer_provider);

                Some(tracing_opentelemetry::layer().with_tracer(tracer))
            });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .with(otel_layer)
            .init();
    }

    let cli = Cli::parse();
    match cli.command {
        Commands::Shows(ref cmd) => match cmd.command {
            ShowsSubcommands::List(ref args) => run_shows_list(args, &cli).await,
            ShowsSubcommands::Search(ref args) => run_shows_search(args, &cli).await,
        },
        Commands::Show(ref cmd) => match cmd.command {
            ShowSubcommands::Get(ref args) => run_show_get(args, &cli).await,
            ShowSubcommands::Icon(ref args) => run_show_icon(args, &cli).await,
            ShowSubcommands::Header(ref args) => run_show_header(args, &cli).await,
            ShowSubcommands::Dates(ref args) => run_show_dates(args, &cli).await,
        },
        Commands::Config(ref cmd) => match cmd.command {
            ConfigSubcommands::SetKey(ref args) => run_config_set_key(args, cli.dir.as_ref()),
            ConfigSubcommands::Show => run_config_show(cli.dir.as_ref()),
        },
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::{FixedOffset, NaiveDate};
    use tracing::subscriber::with_default;
    use tracing_mock::{expect, subscriber};

    use super::*;

    fn show(value: serde_json::Value) -> Show {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_log_show_page() {
        // Arrange
        let page = ShowPage {
            shows: vec![
                show(serde_json::json!({"id": 128, "title": "Rollmops"})),
                show(serde_json::json!({"id": "b7"})),
            ],
            total: 214,
        };
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().with_fields(expect::msg("128\tRollmops")))
            .event(expect::event().with_fields(expect::msg("b7\t-")))
            .event(expect::event().with_fields(expect::msg("Shows on page: 2, total: 214")))
            .only()
            .run_with_handle();

        // Act
        with_default(subscriber, || log_show_page(&page));

        // Assert
        handle.assert_finished();
    }

    #[test]
    fn test_log_all_shows() {
        // Arrange
        let shows = vec![
            show(serde_json::json!({"id": 128, "title": "Rollmops"})),
            show(serde_json::json!({"id": 129, "title": "Kraken"})),
        ];
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().with_fields(expect::msg("128\tRollmops")))
            .event(expect::event().with_fields(expect::msg("129\tKraken")))
            .event(expect::event().with_fields(expect::msg("Total: 2 shows")))
            .only()
            .run_with_handle();

        // Act
        with_default(subscriber, || log_all_shows(&shows));

        // Assert
        handle.assert_finished();
    }

    #[test]
    fn test_log_empty_show_page() {
        // Arrange
        let page = ShowPage {
            shows: Vec::new(),
            total: 0,
        };
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().with_fields(expect::msg("Shows on page: 0, total: 0")))
            .only()
            .run_with_handle();

        // Act
        with_default(subscriber, || log_show_page(&page));

        // Assert
        handle.assert_finished();
    }

    #[test]
    fn test_log_show_dates() {
        // Arrange
        let dates = vec![ShowDate {
            datetime: NaiveDate::from_ymd_opt(2024, 7, 20)
                .unwrap()
                .and_hms_opt(19, 0, 0)
                .unwrap(),
            offset: None,
            place: String::from("Main Stage"),
        }];
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().with_fields(expect::msg("2024-07-20 19:00\tMain Stage")))
            .event(expect::event().with_fields(expect::msg("Total: 1 dates")))
            .only()
            .run_with_handle();

        // Act
        with_default(subscriber, || log_show_dates(&dates));

        // Assert
        handle.assert_finished();
    }

    #[test]
    fn test_log_show_dates_with_offset() {
        // Arrange
        let dates = vec![ShowDate {
            datetime: NaiveDate::from_ymd_opt(2024, 7, 20)
                .unwrap()
                .and_hms_opt(19, 0, 0)
                .unwrap(),
            offset: FixedOffset::east_opt(2 * 3600),
            place: String::from("Main Stage"),
        }];
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().with_fields(expect::msg("2024-07-20 19:00 +02:00\tMain Stage")))
            .event(expect::event().with_fields(expect::msg("Total: 1 dates")))
            .only()
            .run_with_handle();

        // Act
        with_default(subscriber, || log_show_dates(&dates));

        // Assert
        handle.assert_finished();
    }

    #[test]
    fn test_log_show_pretty_json() {
        // Arrange
        let record = show(serde_json::json!({"id": 1}));
        let (subscriber, handle) = subscriber::mock()
            .event(expect::event().with_fields(expect::msg("{\n  \"id\": 1\n}")))
            .only()
            .run_with_handle();

        // Act
        let result = with_default(subscriber, || log_show(&record));

        // Assert
        assert!(result.is_ok());
        handle.assert_finished();
    }

    #[test]
    fn test_build_client_uses_cli_key() {
        // Arrange
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_path_buf();

        // Act
        let client = build_client(Some("cli-key"), Some(&dir)).unwrap();

        // Assert
        assert_eq!(client.key(), Some("cli-key"));
    }

    #[test]
    fn test_build_client_falls_back_to_config_key() {
        // Arrange
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_path_buf();
        std::fs::write(dir.join("config.toml"), "[api]\nkey = \"stored\"\n").unwrap();

        // Act
        let client = build_client(None, Some(&dir)).unwrap();

        // Assert
        assert_eq!(client.key(), Some("stored"));
    }

    #[test]
    fn test_build_client_rejects_bad_base_url() {
        // Arrange
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().to_path_buf();
        std::fs::write(dir.join("config.toml"), "[api]\nbase_url = \"not a url\"\n").unwrap();

        // Act
        let result = build_client(Some("k"), Some(&dir));

        // Assert
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("invalid api.base_url")
        );
    }
}
