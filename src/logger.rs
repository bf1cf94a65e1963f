use chrono::Local;
use colored::*;
use log::{Level, LevelFilter};
use std::path::{Path, PathBuf};

const LOGS_PREFIX: &str = "kiwi_log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const CONSOLE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Maps a `-v` count to a console level. Errors and warnings always show.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn log_file_name() -> String {
    format!("{}_{}.log", LOGS_PREFIX, Local::now().format(TIMESTAMP_FORMAT))
}

/// Installs the global logger. Console output goes to stderr so that it never
/// interleaves with program output on stdout. When `log_dir` is given, every
/// record is also written to a timestamped file inside it.
pub fn init(console_level: LevelFilter, log_dir: Option<&Path>) -> Result<(), fern::InitError> {
    let console_dispatch = fern::Dispatch::new()
        .format(|out, message, record| {
            let level_str = match record.level() {
                Level::Error => "ERROR".red().bold(),
                Level::Warn => "WARN ".yellow().bold(),
                Level::Info => "INFO ".green().bold(),
                Level::Debug => "DEBUG".blue().bold(),
                Level::Trace => "TRACE".magenta().bold(),
            };
            out.finish(format_args!(
                "[{}] [{}] [{}] {}",
                Local::now().format(CONSOLE_TIMESTAMP_FORMAT),
                level_str,
                record.target(),
                message
            ))
        })
        .level(console_level)
        .chain(std::io::stderr());

    let mut base_dispatch = fern::Dispatch::new()
        .level(LevelFilter::Trace)
        .chain(console_dispatch);

    let mut log_file_path: Option<PathBuf> = None;
    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(log_file_name());
        let file_dispatch = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!(
                    "[{}] [{:<5}] [{}] [{}:{}] {}",
                    Local::now().format(CONSOLE_TIMESTAMP_FORMAT),
                    record.level(),
                    record.target(),
                    record.file().unwrap_or("?"),
                    record.line().unwrap_or(0),
                    message
                ))
            })
            .level(LevelFilter::Trace)
            .chain(fern::log_file(&path)?);
        base_dispatch = base_dispatch.chain(file_dispatch);
        log_file_path = Some(path);
    }

    base_dispatch.apply()?;

    log::debug!("logger initialised at console level {}", console_level);
    if let Some(path) = log_file_path {
        log::debug!("writing logs to {}", path.display());
    }
    Ok(())
}
