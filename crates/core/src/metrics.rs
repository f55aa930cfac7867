//! Derived job metrics: progress, elapsed time, and throughput.
//!
//! Everything here is a pure function of a [`JobState`] snapshot and the
//! current wall-clock time, so a view can recompute it on every tick. Any
//! metric whose operands are missing (scene still indexing, zero elapsed
//! time, no samples yet) comes back as `None` ("unavailable") instead of a
//! NaN or infinite value.

use std::time::Duration;

use crate::job::JobState;
use crate::types::Timestamp;

/// Maximum fraction digits shown for throughput values.
pub const SPS_FRACTION_DIGITS: i32 = 2;

/// Placeholder rendered for unavailable metrics.
pub const UNAVAILABLE: &str = "n/a";

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Completion percentage, `round(100 * spp / target_spp)`.
///
/// `None` when the target is zero.
pub fn progress_percent(spp: u64, target_spp: u64) -> Option<u64> {
    if target_spp == 0 {
        return None;
    }
    Some((100.0 * spp as f64 / target_spp as f64).round() as u64)
}

// ---------------------------------------------------------------------------
// Durations
// ---------------------------------------------------------------------------

/// Time between `start` and `end`, or between `start` and `now` while there
/// is no end yet. Never negative.
pub fn elapsed(start: Timestamp, end: Option<Timestamp>, now: Timestamp) -> Duration {
    let end = end.unwrap_or(now);
    (end - start).to_std().unwrap_or(Duration::ZERO)
}

/// Format a duration as `HH:MM:SS`. The hour field grows past two digits
/// instead of wrapping into days.
pub fn format_elapsed(duration: Duration) -> String {
    let total = duration.as_secs();
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// Convert the service's fractional render time to a [`Duration`].
///
/// `None` for absent, zero, negative or non-finite values.
pub fn render_time(job: &JobState) -> Option<Duration> {
    let secs = job.render_time_seconds?;
    if secs <= 0.0 {
        return None;
    }
    Duration::try_from_secs_f64(secs).ok()
}

// ---------------------------------------------------------------------------
// Throughput
// ---------------------------------------------------------------------------

/// Samples per second over the job's wall-clock lifetime.
///
/// `spp * width * height / seconds(finished_at or now - created)`, rounded to
/// at most two fraction digits. The numerator always uses the samples
/// actually reached, never the target.
pub fn effective_sps(job: &JobState, now: Timestamp) -> Option<f64> {
    if job.spp == 0 {
        return None;
    }
    let samples = total_samples(job)?;
    let seconds = elapsed(job.created, job.finished_at, now).as_secs_f64();
    divide(samples, seconds).map(round_fraction)
}

/// Average samples per second of the render nodes, based on the summed
/// render time of all merged dumps. Static: it does not tick.
pub fn render_time_sps(job: &JobState) -> Option<f64> {
    let seconds = job.render_time_seconds?;
    let samples = total_samples(job)?;
    divide(samples, seconds).map(round_fraction)
}

fn total_samples(job: &JobState) -> Option<f64> {
    Some(job.spp as f64 * job.pixel_count()? as f64)
}

fn divide(numerator: f64, denominator: f64) -> Option<f64> {
    if !denominator.is_finite() || denominator <= 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

/// Round to [`SPS_FRACTION_DIGITS`] fraction digits.
pub fn round_fraction(value: f64) -> f64 {
    let factor = 10f64.powi(SPS_FRACTION_DIGITS);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// Number formatting
// ---------------------------------------------------------------------------

/// Format an integer count with `,` thousands separators.
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a number with thousands separators and at most two fraction
/// digits, dropping trailing zeros (`1234.5` -> `"1,234.5"`).
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return UNAVAILABLE.to_string();
    }
    let fixed = format!("{:.*}", SPS_FRACTION_DIGITS as usize, round_fraction(value));
    let (sign, digits) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::with_capacity(fixed.len() + 4);
    if int_part.chars().any(|c| c != '0') || !frac_part.is_empty() {
        out.push_str(sign);
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

// ---------------------------------------------------------------------------
// Aggregated view
// ---------------------------------------------------------------------------

/// What the "finished at" column shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishState {
    At(Timestamp),
    Cancelled,
    Pending,
}

impl FinishState {
    pub fn of(job: &JobState) -> Self {
        match job.finished_at {
            Some(ts) => Self::At(ts),
            None if job.cancelled => Self::Cancelled,
            None => Self::Pending,
        }
    }
}

impl std::fmt::Display for FinishState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::At(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S UTC")),
            Self::Cancelled => f.write_str("Cancelled"),
            Self::Pending => f.write_str(UNAVAILABLE),
        }
    }
}

/// Every display metric for one job snapshot at one point in time.
///
/// Cancelled jobs carry no elapsed or throughput values at all.
#[derive(Debug, Clone, PartialEq)]
pub struct JobMetrics {
    pub progress_percent: Option<u64>,
    pub finish: FinishState,
    pub total_time: Option<Duration>,
    pub effective_sps: Option<f64>,
    pub render_time: Option<Duration>,
    pub average_sps: Option<f64>,
}

impl JobMetrics {
    pub fn derive(job: &JobState, now: Timestamp) -> Self {
        let progress_percent = progress_percent(job.spp, job.target_spp);
        let finish = FinishState::of(job);

        if job.cancelled {
            return Self {
                progress_percent,
                finish,
                total_time: None,
                effective_sps: None,
                render_time: None,
                average_sps: None,
            };
        }

        Self {
            progress_percent,
            finish,
            total_time: Some(elapsed(job.created, job.finished_at, now)),
            effective_sps: effective_sps(job, now),
            render_time: render_time(job),
            average_sps: render_time(job).and_then(|_| render_time_sps(job)),
        }
    }
}

/// Render an optional metric, falling back to [`UNAVAILABLE`].
pub fn display_or_unavailable<T>(value: Option<T>, render: impl FnOnce(T) -> String) -> String {
    value.map(render).unwrap_or_else(|| UNAVAILABLE.to_string())
}
