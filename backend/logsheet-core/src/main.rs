// src/main.rs
use anyhow::{bail, Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use clap::{Args, Parser, Subcommand};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logsheet_core::handlers::{router, AppState};
use logsheet_core::timesheet::MonthNameCase;
use logsheet_core::xlsx::save_xlsx;
use logsheet_core::{build_sheet, Config, EssClient, ExportParams};

#[derive(Parser, Debug)]
#[command(name = "logsheet", version, about = "ESS activity log to XLSX timesheet converter")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default)
    Serve,
    /// Log in with USERNAME_ESS/PASSWORD_ESS and write one timesheet file
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct ExportArgs {
    /// Months to include, e.g. 7,8,9
    #[arg(long, value_delimiter = ',', required = true, value_parser = clap::value_parser!(u32).range(1..=12))]
    months: Vec<u32>,
    #[arg(long)]
    year: i32,
    /// Exact project name to export
    #[arg(long)]
    project: String,
    #[arg(long, default_value = "timesheet.xlsx")]
    output: PathBuf,
    /// Replace each duration with a random value in [min, max]
    #[arg(long, requires_all = ["min_duration", "max_duration"])]
    randomize: bool,
    #[arg(long)]
    min_duration: Option<i32>,
    #[arg(long)]
    max_duration: Option<i32>,
    /// "Januari" instead of "JANUARI"
    #[arg(long)]
    title_case: bool,
    /// Values only, no fonts or borders
    #[arg(long)]
    plain: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration from environment")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Tracing subscriber initialized.");

    let ess_client = EssClient::new(&config.base_url, config.request_timeout())
        .context("Failed to build ESS HTTP client")?;
    info!("ESS client initialized for {}", ess_client.base_url());

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, ess_client).await,
        Command::Export(args) => export(config, ess_client, args).await,
    }
}

async fn serve(config: Config, ess_client: EssClient) -> Result<()> {
    let state = AppState {
        ess_client,
        sheet_options: Arc::new(config.sheet_options()),
    };
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port)
        .parse()
        .context("Invalid SERVER_HOST/SERVER_PORT")?;

    match config.tls_paths() {
        Some((cert_path, key_path)) => {
            let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
                .await
                .context("Failed to load TLS cert/key")?;
            info!("Starting server on https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .serve(app.into_make_service())
                .await
                .context("HTTPS server failed")?;
        }
        None => {
            if config.cert_path.is_some() || config.key_path.is_some() {
                warn!("Only one of CERT_PATH/KEY_PATH is set; serving plain HTTP");
            }
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            info!("Listening on http://{}", addr);
            axum::serve(listener, app).await.context("HTTP server failed")?;
        }
    }
    Ok(())
}

async fn export(config: Config, ess_client: EssClient, args: ExportArgs) -> Result<()> {
    let (Some(username), Some(password)) = (&config.username_ess, &config.password_ess) else {
        bail!("USERNAME_ESS and PASSWORD_ESS must be set for the export command");
    };

    let login = ess_client.login(username, password).await?;
    let employee_id = login.user_info.employee_id.to_string();

    let activities = ess_client
        .fetch_activities_for_months(&login.id_token, &employee_id, &args.months, args.year)
        .await?;
    info!("Fetched {} activity record(s) in total", activities.len());

    let mut params = ExportParams::new(args.project.as_str());
    if args.randomize {
        params = params.randomized(
            args.min_duration.unwrap_or_default(),
            args.max_duration.unwrap_or_default(),
        );
    }

    let mut options = config.sheet_options();
    if args.title_case {
        options.month_case = MonthNameCase::Title;
    }
    if args.plain {
        options.styled = false;
    }

    let sheet = build_sheet(&activities, &params, &options, &mut rand::thread_rng())?;
    save_xlsx(&sheet, &options, &args.output)?;
    info!(
        "Wrote {} data row(s) to {}",
        sheet.data_row_count(),
        args.output.display()
    );
    Ok(())
}
