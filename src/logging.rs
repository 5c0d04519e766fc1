// Conditional logging macros - only active in debug builds

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use log::LevelFilter;

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

/// Initializes `env_logger`, writing to `log_file` when given.
///
/// The terminal belongs to the game, so without a file only warnings reach
/// stderr. `RUST_LOG` still overrides the level.
pub fn init(log_file: Option<&Path>, verbose: bool) -> std::io::Result<()> {
    let default_level = if verbose {
        LevelFilter::Debug
    } else if log_file.is_some() {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(default_level)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        });

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    // Tests may initialize more than once.
    let _ = builder.try_init();
    Ok(())
}
