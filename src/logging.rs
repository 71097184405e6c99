/// Log setup. The terminal belongs to the renderer, so events go to a
/// file. If the file cannot be opened the client runs without logging.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, Registry};

use crate::config::LogConfig;

/// Install the global subscriber. Returns false when logging is off.
pub fn init(cfg: &LogConfig) -> bool {
    let file = match OpenOptions::new().create(true).append(true).open(&cfg.file) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log file {}: {e}", cfg.file.display());
            return false;
        }
    };

    let subscriber = Registry::default()
        .with(cfg.level)
        .with(
            tracing_subscriber::fmt::Layer::default()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        );
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
