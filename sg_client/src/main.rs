//! Terminal client for a Shoot the Gate table server.

use anyhow::{Context, Result};
use pico_args::Arguments;
use sg_client::{
    app::App,
    config::{ClientConfig, ConfigOverrides},
    connection, logging, plain,
    tui_app::TuiApp,
};
use std::path::PathBuf;
use tracing::info;

const HELP: &str = "\
Play Shoot the Gate against a table server

USAGE:
  sg_client [OPTIONS]

OPTIONS:
  --host HOST                Server host           [default: env SG_HOST or localhost]
  --port PORT                Server port           [default: env SG_PORT or 8765]
  --scheme SCHEME            ws or wss             [default: env SG_SCHEME or ws]
  --name NAME                Name to join with     [default: env SG_NAME or your username]
  --ante AMOUNT              Ante to join with     [default: env SG_ANTE or 10]
  --reconnect-delay-ms MS    Pause between connection attempts [default: env SG_RECONNECT_DELAY_MS or 3000]
  --log-file PATH            Where to write logs   [default: sg_client.log]

FLAGS:
  --plain                    Line-oriented output instead of the full-screen UI
  -h, --help                 Print help information

ENVIRONMENT:
  RUST_LOG                   Log filter (e.g., debug or sg_client=trace)
  (Variables may also be set in a .env file)
";

struct Args {
    overrides: ConfigOverrides,
    log_file: PathBuf,
    plain: bool,
}

fn parse_args() -> Result<Args> {
    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        overrides: ConfigOverrides {
            host: pargs.opt_value_from_str("--host")?,
            port: pargs.opt_value_from_str("--port")?,
            scheme: pargs.opt_value_from_str("--scheme")?,
            name: pargs.opt_value_from_str("--name")?,
            ante: pargs.opt_value_from_str("--ante")?,
            reconnect_delay_ms: pargs.opt_value_from_str("--reconnect-delay-ms")?,
        },
        log_file: pargs
            .opt_value_from_str("--log-file")?
            .unwrap_or_else(|| PathBuf::from(logging::DEFAULT_LOG_FILE)),
        plain: pargs.contains("--plain"),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("unexpected arguments: {remaining:?}");
    }
    Ok(args)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let args = parse_args()?;
    let config = ClientConfig::from_env(args.overrides).context("invalid configuration")?;
    logging::init(&args.log_file)
        .with_context(|| format!("failed to open log file {}", args.log_file.display()))?;

    let url = config.ws_url();
    info!(%url, name = %config.name, ante = config.ante, "starting");

    let app = App::new(&config.name, config.ante);
    let (handle, events) = connection::spawn(url, config.reconnect_delay);

    if args.plain {
        plain::run(app, handle, events).await
    } else {
        let terminal = ratatui::init();
        let result = TuiApp::new(app).run(handle, events, terminal).await;
        ratatui::restore();
        result
    }
}
