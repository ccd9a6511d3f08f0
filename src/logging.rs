//! Logfmt-style tracing output.
//!
//! Events render as `time="…" level=info msg="…" key=value` lines on
//! stderr, so scripts can grep stable `msg="…"` fields out of the stream
//! while humans still get readable logs.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// Install the global subscriber. `RUST_LOG` overrides the default level;
/// `debug` flips the default from `info` to `debug`.
pub fn init(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .event_format(Logfmt)
        .init();
}

/// The line format: timestamp, level, quoted message, remaining fields in
/// declaration order.
#[derive(Debug, Clone, Default)]
pub struct Logfmt;

impl<S, N> FormatEvent<S, N> for Logfmt
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut fields = LogfmtFields::default();
        event.record(&mut fields);
        write!(
            writer,
            "time=\"{}\" level={} msg=\"{}\"",
            Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            event.metadata().level().as_str().to_lowercase(),
            escape(&fields.message),
        )?;
        for (key, value) in &fields.extra {
            write!(writer, " {key}={value}")?;
        }
        writeln!(writer)
    }
}

/// Captures the message plus any structured fields of one event. String
/// values keep their quotes from the Debug rendering; numbers stay bare.
#[derive(Default)]
struct LogfmtFields {
    message: String,
    extra: Vec<(&'static str, String)>,
}

impl Visit for LogfmtFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.extra.push((field.name(), format!("{value:?}")));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.extra.push((field.name(), format!("{value:?}")));
        }
    }
}

fn escape(raw: &str) -> String {
    raw.replace('\\', "\\\\").replace('"', "\\\"")
}
