use std::fmt;

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// `2024-05-01 12:00:00 | INFO     | pail | message key=value`
///
/// Shared by the console and file sinks.
#[derive(Debug, Clone)]
pub struct LineFormat {
    name: String,
}

impl LineFormat {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl<S, N> FormatEvent<S, N> for LineFormat
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
        let now = jiff::Zoned::now();
        write!(
            writer,
            "{} | {:<8} | {} | ",
            now.strftime(DATE_FORMAT),
            event.metadata().level().as_str(),
            self.name
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
