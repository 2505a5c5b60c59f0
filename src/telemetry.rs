use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use anyhow::Context;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

pub const LOG_FILE_NAME: &str = "server.log";

/// Installs the global subscriber: console output (text or JSON) plus an
/// optional plain-text copy appended to `<dir>/server.log`.
pub fn init(cfg: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&cfg.filter)
        .with_context(|| format!("invalid log filter {:?}", cfg.filter))?;

    let file_layer = match &cfg.dir {
        Some(dir) => {
            fs::create_dir_all(dir)
                .with_context(|| format!("create log directory {}", dir.display()))?;
            let path = dir.join(LOG_FILE_NAME);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("open log file {}", path.display()))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    let json_layer = cfg.json.then(|| fmt::layer().json().with_target(false));
    let text_layer = (!cfg.json).then(fmt::layer);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .context("install tracing subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_filter_is_reported() {
        let cfg = LogConfig {
            filter: "booking_service=loud[".into(),
            json: false,
            dir: None,
        };
        assert!(init(&cfg).is_err());
    }
}
