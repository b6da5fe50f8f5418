use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "alert-relay",
    about = "Relay monitoring alerts to Telegram subscribers"
)]
struct Cli {
    /// Path to the TOML config file (defaults to ~/.config/alert-relay/config.toml)
    #[arg(short, long)]
    config: Option<std::path::PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let config = match cli.config {
        Some(path) => alert_relay::config::Config::load_from_path(&path),
        None => alert_relay::config::Config::load(),
    };
    let config = match config {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    if let Err(e) = rt.block_on(alert_relay::bot::run_relay(config)) {
        eprintln!("Relay error: {e}");
        std::process::exit(1);
    }
}
