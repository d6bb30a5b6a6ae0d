//! snapview - live snapshot viewer for ISAPI cameras and NVRs
//!
//! Polls `/ISAPI/Streaming/channels/{id}/picture` once per interval and shows
//! the result, with keyboard channel switching.

// Use mimalloc for faster memory allocation (Linux, macOS)
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::io;
use std::process;
use std::sync::Arc;

mod acquisition;
mod api;
mod cli;
mod config;
mod discovery;
mod error;
mod headless;
mod models;
mod prompt;
mod selector;
mod store;
mod viewer;

#[cfg(test)]
mod test_support;

use acquisition::Acquisition;
use api::IsapiClient;
use config::AppConfig;
use error::ViewerError;
use models::ConnectionRecord;
use store::CredentialStore;

fn main() {
    // Initialize logger (controlled by RUST_LOG environment variable)
    // Example: RUST_LOG=debug snapview --camera lobby
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let cli_args = match cli::parse_args(&args) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Use --help for usage information");
            process::exit(2);
        }
    };

    if cli_args.help {
        print_help();
        return;
    }
    if cli_args.version {
        println!("snapview {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    let mut config = AppConfig::load();
    if let Some(secs) = cli_args.interval_secs {
        config.refresh_interval_secs = secs;
    }
    if let Some(count) = cli_args.fallback_channels {
        config.fallback_channel_count = count;
    }

    let store = CredentialStore::new(config.cameras_dir());
    let connection = match select_connection(&store, cli_args.camera.as_deref()) {
        Ok(connection) => connection,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = run(&config, &connection, cli_args.output.as_deref()) {
        log::error!("{}", e);
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn select_connection(store: &CredentialStore, name: Option<&str>) -> io::Result<ConnectionRecord> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    prompt::open_or_choose(store, name, &mut input, &mut output)
}

fn run(
    config: &AppConfig,
    connection: &ConnectionRecord,
    output: Option<&std::path::Path>,
) -> Result<(), ViewerError> {
    let client = IsapiClient::new(connection).with_timeout(config.request_timeout());
    log::info!("Connecting to {}", client.connection().base_url());

    let channels = discovery::resolve(&client, config.fallback_channel_count());
    let acquisition = Acquisition::new(Arc::new(client), channels)?
        .with_cadence(config.refresh_interval());

    match output {
        Some(path) => headless::run(acquisition, path),
        None => viewer::run(&connection.host, acquisition, config),
    }
}

fn print_help() {
    println!("snapview {}", env!("CARGO_PKG_VERSION"));
    println!("Live snapshot viewer for ISAPI network cameras and NVRs");
    println!();
    println!("USAGE:");
    println!("    snapview [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -c, --camera <NAME>     Open a saved camera without the selection menu");
    println!("    -o, --output <FILE>     Headless: write frames to a PNG, read commands from stdin");
    println!("        --interval <SECS>   Seconds between snapshots (default 1.0)");
    println!("        --channels <N>      Channels assumed when discovery fails (default 32)");
    println!("    -h, --help              Print help");
    println!("    -V, --version           Print version");
    println!();
    println!("KEYS:");
    println!("    q  quit    n  next channel    p  previous channel    m  enter channel id");
    println!();
    println!("Settings: {}/snapview/config.json", dirs::config_dir().unwrap_or_default().display());
}
