use anyhow::{Context, Result};
use chrono::Local;

use crate::config::LoggingConfig;

/// Install the global logger described by `config`. Does nothing when
/// logging is disabled.
pub fn init(config: &LoggingConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}] {:<5} {}: {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(config.level_filter()?);

    let dispatch = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
            let file = fern::log_file(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            dispatch.chain(file)
        }
        None => dispatch.chain(std::io::stderr()),
    };

    dispatch.apply().context("Failed to install logger")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_logging_installs_nothing() {
        assert!(init(&LoggingConfig::default()).is_ok());
    }

    #[test]
    fn invalid_level_is_reported() {
        let config = LoggingConfig {
            enabled: true,
            level: "chatty".into(),
            file: None,
        };
        assert!(init(&config).is_err());
    }
}
