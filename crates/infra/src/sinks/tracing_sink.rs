//! Report sink that emits each report as a `tracing` event

use chrono::{DateTime, SecondsFormat, Utc};
use metricore_core::{format_metric, MetricReport, ReportSink};
use tracing::info;

use crate::config::DEFAULT_FORMAT_BUFFER_LEN;

/// Target of every report event, for filtering with `RUST_LOG`
pub const REPORT_TARGET: &str = "metricore::report";

/// Default sink: renders each metric into a bounded buffer and logs it at
/// `info` level under [`REPORT_TARGET`]
///
/// Metrics that render to nothing (an idle statistical metric) are skipped.
#[derive(Debug, Clone, Copy)]
pub struct TracingReportSink {
    format_buffer_len: usize,
}

impl TracingReportSink {
    /// Sink rendering into buffers of `format_buffer_len` bytes
    pub fn new(format_buffer_len: usize) -> Self {
        Self { format_buffer_len }
    }

    /// Render a report the way it will be logged; `None` when empty
    pub fn render(&self, report: &MetricReport<'_>) -> Option<String> {
        let mut buf = vec![0u8; self.format_buffer_len];
        let written = format_metric(report.metric, report.reported_at_us, &mut buf);
        if written == 0 {
            return None;
        }
        // Truncation may split a multi-byte character
        Some(String::from_utf8_lossy(&buf[..written]).into_owned())
    }
}

impl Default for TracingReportSink {
    fn default() -> Self {
        Self::new(DEFAULT_FORMAT_BUFFER_LEN)
    }
}

fn rfc3339(micros: Option<u64>) -> Option<String> {
    let micros = i64::try_from(micros?).ok()?;
    DateTime::<Utc>::from_timestamp_micros(micros)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Micros, true))
}

impl ReportSink for TracingReportSink {
    fn report(&self, report: &MetricReport<'_>) {
        let Some(text) = self.render(report) else {
            return;
        };
        let metric = report.metric;
        let first_event = rfc3339(metric.first_event_us());
        let last_event = rfc3339(metric.last_event_us());

        info!(
            target: REPORT_TARGET,
            metric = metric.name(),
            kind = ?metric.kind(),
            policy = report.policy.map(|p| p.name.as_str()),
            first_event = first_event.as_deref(),
            last_event = last_event.as_deref(),
            "{text}"
        );
    }
}
