//! Log output as workflow commands
//!
//! Warnings, errors and debug events are rendered as `::warning::`,
//! `::error::` and `::debug::` commands so the runner annotates them.
//! Info events are printed as-is.

use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::path::Path;

use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// Event formatter emitting workflow commands
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkflowCommandFormat;

impl<S, N> FormatEvent<S, N> for WorkflowCommandFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut message = String::new();
        ctx.field_format()
            .format_fields(format::Writer::new(&mut message), event)?;

        match command_prefix(event.metadata().level()) {
            Some(prefix) => writeln!(writer, "{}{}", prefix, escape_data(&message)),
            None => writeln!(writer, "{}", message),
        }
    }
}

fn command_prefix(level: &Level) -> Option<&'static str> {
    match *level {
        Level::ERROR => Some("::error::"),
        Level::WARN => Some("::warning::"),
        Level::INFO => None,
        _ => Some("::debug::"),
    }
}

/// Escapes a workflow command payload
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Installs the global subscriber.
///
/// `RUST_LOG` overrides the default filter. The returned guard flushes the
/// non-blocking writer when dropped and must be held until exit.
pub fn init(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "setup_dotnet=debug"
        } else {
            "setup_dotnet=info"
        })
    });

    let (writer, guard) = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .event_format(WorkflowCommandFormat)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}
