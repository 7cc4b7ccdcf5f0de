use std::io::BufRead;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use buildmuc::build::{BuildBoard, BuildControl, ChannelBuildControl};
use buildmuc::transport::ChannelTransport;
use buildmuc::{BotEvent, Config, StatusBot};

#[tokio::main]
async fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    // Load configuration
    let config = match Config::load_with_env(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    // Initialize logging
    if let Err(e) = buildmuc::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        buildmuc::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("buildmuc - build status relay");
    info!(
        "Connecting as {} via {}:{}",
        config.jabber.jid, config.jabber.host, config.jabber.port
    );

    let (transport, mut outbound) = ChannelTransport::new();
    tokio::spawn(async move {
        while let Some(command) = outbound.recv().await {
            info!("outbound: {:?}", command);
        }
    });

    let (control, mut requests) = ChannelBuildControl::new();
    tokio::spawn(async move {
        while let Some(request) = requests.recv().await {
            info!("build control: {:?}", request);
        }
    });
    let control: Arc<dyn BuildControl> = Arc::new(control);

    let mut bot = StatusBot::new(
        &config,
        Arc::new(transport),
        Arc::new(BuildBoard::new()),
        Some(control),
    );

    // One JSON event per line on stdin
    let (tx, rx) = mpsc::channel(256);
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("Failed to read event feed: {}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match BotEvent::from_json_line(&line) {
                Ok(event) => {
                    if tx.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(e) => warn!(kind = e.kind(), "Ignoring malformed event: {}", e),
            }
        }
    });

    bot.run(rx).await;
}
