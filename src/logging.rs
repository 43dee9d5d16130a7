//! Utilities for setting up logging

use crate::config;
use fern::colors::{Color, ColoredLevelConfig};
use std::env;
use std::fs;
use thiserror::Error;

fn should_print_color() -> bool {
    env::var_os("NO_COLOR").is_none() && atty::is(atty::Stream::Stdout)
}

/// Subroutine to instantiate the loggers
pub fn set_up_logging() -> anyhow::Result<()> {
    let colors_line = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .trace(Color::BrightBlack);
    let should_color = should_print_color();

    let colors_level = colors_line.info(Color::Green);
    let dispatch = fern::Dispatch::new()
        // stdout and stderr logging
        .level(log::LevelFilter::Info)
        .filter(|metadata| metadata.target().starts_with("regauth"))
        .chain({
            let base = if should_color {
                fern::Dispatch::new().format(move |out, message, record| {
                    out.finish(format_args!(
                        "{color_line}[{level}{color_line}]{ansi_close} {message}",
                        color_line = format_args!(
                            "\x1B[{}m",
                            colors_line.get_color(&record.level()).to_fg_str()
                        ),
                        level = colors_level.color(record.level()),
                        ansi_close = "\x1B[0m",
                        message = message,
                    ));
                })
            } else {
                // default formatter without color
                fern::Dispatch::new().format(move |out, message, record| {
                    out.finish(format_args!(
                        "[{level}] {message}",
                        level = record.level(),
                        message = message,
                    ));
                })
            };
            base
                // stdout
                .chain(
                    fern::Dispatch::new()
                        .filter(|metadata| metadata.level() == log::LevelFilter::Info)
                        .chain(std::io::stdout()),
                )
                // stderr
                .chain(
                    fern::Dispatch::new()
                        .filter(|metadata| {
                            // lower is higher priority
                            metadata.level() <= log::LevelFilter::Warn
                                && metadata.target().starts_with("regauth")
                        })
                        .chain(std::io::stderr()),
                )
        });

    // verbose logging to file
    let dispatch = if let Ok(data_dir) = config::data_folder() {
        let log_out = data_dir.join("regauth.log");
        dispatch.chain(
            fern::Dispatch::new()
                .level(log::LevelFilter::Debug)
                .level_for("hyper", log::LevelFilter::Info)
                .format(move |out, message, record| {
                    out.finish(format_args!(
                        "[{date}][{level}][{target}][{file}:{line}] {message}",
                        date = chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                        target = record.target(),
                        level = record.level(),
                        message = message,
                        file = record.file().unwrap_or(""),
                        line = record
                            .line()
                            .map(|line| format!("{}", line))
                            .unwrap_or_else(|| "".to_string()),
                    ));
                })
                .chain(
                    fs::OpenOptions::new()
                        .write(true)
                        .create(true)
                        .truncate(true)
                        .open(log_out)
                        .map_err(|e| {
                            LoggingError::FailedToOpenLoggingFile(format!(
                                "error type: {:?}",
                                e.kind()
                            ))
                        })?,
                ),
        )
    } else {
        dispatch
    };

    dispatch
        .apply()
        .map_err(|e| LoggingError::FailedToInstantiateLogger(format!("{}", e)))?;

    trace!("Logging set up");
    Ok(())
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to open the log file in the data directory: {0}")]
    FailedToOpenLoggingFile(String),
    #[error("Something went wrong setting up logging: {0}")]
    FailedToInstantiateLogger(String),
}
