//! This module provides observability and diagnostics for the encode/decode pipeline.
//!
//! Every stage reports its sizes through the `log_metric!` macro so that a
//! failing round trip can be traced stage by stage. Nothing is printed unless a
//! logger is installed, either by the host application or through
//! `enable_verbose_logging`.

use std::fs::OpenOptions;
use std::sync::Once;

use log::LevelFilter;

use crate::error::KmerCodeError;

/// Logs a structured key-value metric line at `debug` level.
///
/// # Example
/// ```
/// use kmercode::log_metric;
/// let blocks = 4;
/// log_metric!("event"="protect", "blocks"=&blocks);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        if $crate::__log::log_enabled!($crate::__log::Level::Debug) {
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+
            $crate::__log::debug!("KMERCODE_METRIC: {{ {} }}", parts.join(", "));
        }
    };
}

static INIT_LOGGER: Once = Once::new();

/// Installs an `env_logger` sink at `debug` level. Calling it more than once is a no-op.
///
/// When `log_file` is given, records are appended to that file instead of stderr.
pub fn enable_verbose_logging(log_file: Option<&str>) -> Result<(), KmerCodeError> {
    let target = match log_file {
        Some(filename) => Some(
            OpenOptions::new()
                .append(true)
                .create(true)
                .open(filename)?,
        ),
        None => None,
    };

    INIT_LOGGER.call_once(move || {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(LevelFilter::Debug);

        // Just the level and message.
        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(buf, "[{}] {}", record.level(), record.args())?;
            buf.flush()?;
            Ok(())
        });

        if let Some(file) = target {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }

        let _ = builder.try_init();
    });
    Ok(())
}
