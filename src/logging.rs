use colored::*;
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// A tracing event formatter that colors each line by severity.
///
/// Lines carry no timestamps or targets. Warnings and errors keep a short
/// text prefix for terminals without color.
pub struct ColorizedFormatter;

impl<S, N> FormatEvent<S, N> for ColorizedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        // format_fields writes directly, so buffer to color the whole line
        let mut buffer = String::new();
        ctx.format_fields(Writer::new(&mut buffer), event)?;

        let level = *event.metadata().level();
        writeln!(writer, "{}", colorize(level, &buffer))
    }
}

fn colorize(level: Level, line: &str) -> ColoredString {
    match level {
        Level::ERROR => format!("error: {}", line).red(),
        Level::WARN => format!("warning: {}", line).yellow(),
        Level::INFO => line.white(),
        Level::DEBUG => line.blue(),
        Level::TRACE => line.purple(),
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` with
/// `verbose`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(ColorizedFormatter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_for_problems_only() {
        colored::control::set_override(false);
        assert_eq!(colorize(Level::ERROR, "bad").to_string(), "error: bad");
        assert_eq!(colorize(Level::WARN, "odd").to_string(), "warning: odd");
        assert_eq!(colorize(Level::INFO, "fine").to_string(), "fine");
        colored::control::unset_override();
    }
}
