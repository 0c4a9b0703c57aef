//! Human-readable rendering of a metric's accumulated state
//!
//! Statistical metrics render one section per non-empty outcome, e.g.
//! `latency: Go: 2, mean: 200us, NoGo: 1, mean: 50us, min: 50us, max: 300us`.
//! Histogram metrics list their buckets newest first:
//! `http_status: tot: 4, [ 404: 1, 200: 3 ]`.

use std::fmt::{self, Write};

use metricore_common::time::{write_humanized, UnitSchema};

use crate::aggregate::BranchStats;
use crate::flags::{MetricFlags, Outcome};
use crate::metric::{Metric, MetricStore};

/// `fmt::Write` adapter over a byte slice that truncates instead of failing
struct BoundedWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl Write for BoundedWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.buf.len() - self.len;
        let take = room.min(s.len());
        self.buf[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

/// Render `metric` into `buf`, returning the number of bytes written
///
/// At most `buf.len() - 1` bytes of text are written and a NUL follows them,
/// so the output is never longer than the buffer. Text that does not fit is
/// cut off. A statistical metric with no events writes nothing.
///
/// `now_us` is used for the elapsed window of duty-cycle metrics.
pub fn format_metric(metric: &Metric, now_us: u64, buf: &mut [u8]) -> usize {
    let Some(cap) = buf.len().checked_sub(1) else {
        return 0;
    };

    let mut out = BoundedWriter { buf: &mut buf[..cap], len: 0 };
    // The bounded writer never reports an error
    let _ = write_metric(&mut out, metric, now_us);
    let len = out.len;

    buf[len] = 0;
    len
}

/// Render `metric` into an owned string without a length bound
pub fn render_metric(metric: &Metric, now_us: u64) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_metric(&mut out, metric, now_us);
    out
}

fn write_metric<W: Write>(out: &mut W, metric: &Metric, now_us: u64) -> fmt::Result {
    let flags = metric.flags();
    let schema = flags.unit_schema();

    let agg = match metric.store() {
        MetricStore::Histogram(hist) => {
            write!(out, "{}: tot: {}, [ ", metric.name(), hist.total_count())?;
            for (i, bucket) in hist.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write!(out, "{}: {}", bucket.name(), bucket.count())?;
            }
            return out.write_str(" ]");
        }
        MetricStore::Aggregate(agg) => agg,
    };

    let only_go = flags.contains(MetricFlags::ONLY_GO);
    let go = agg.branch(Outcome::Go);
    let nogo = agg.branch(Outcome::NoGo);
    let show_go = !go.is_empty();
    let show_nogo = !only_go && !nogo.is_empty();

    if !show_go && !show_nogo {
        return Ok(());
    }

    write!(out, "{}: ", metric.name())?;

    if show_go {
        if !only_go {
            out.write_str("Go: ")?;
        }
        write_branch(out, metric, go, now_us)?;
    }

    if show_nogo {
        out.write_str(if show_go { ", NoGo: " } else { "NoGo: " })?;
        write_branch(out, metric, nogo, now_us)?;
    }

    if flags.contains(MetricFlags::MEAN) {
        if let Some((min, max)) = agg.extremes(only_go) {
            out.write_str(", min: ")?;
            write_humanized(out, min, schema)?;
            out.write_str(", max: ")?;
            write_humanized(out, max, schema)?;
        }
    }

    Ok(())
}

fn write_branch<W: Write>(
    out: &mut W,
    metric: &Metric,
    branch: &BranchStats,
    now_us: u64,
) -> fmt::Result {
    let flags = metric.flags();

    if flags.contains(MetricFlags::MEAN) {
        write!(out, "{}, mean: ", branch.count)?;
        return write_humanized(out, branch.mean(), flags.unit_schema());
    }

    // Only the sum is meaningful from here on
    if flags.contains(MetricFlags::DUTY_WALLCLOCK) {
        let elapsed = now_us.saturating_sub(metric.first_event_us().unwrap_or(now_us));
        let percent = (u128::from(branch.sum) * 100).checked_div(u128::from(elapsed)).unwrap_or(0);

        write_humanized(out, branch.sum, UnitSchema::Micros)?;
        out.write_str(" / ")?;
        write_humanized(out, elapsed, UnitSchema::Micros)?;
        return write!(out, " ({percent}%)");
    }

    write!(out, "({}) ", branch.count)?;
    write_humanized(out, branch.sum, UnitSchema::Si)
}
