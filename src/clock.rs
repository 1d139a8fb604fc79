//! Business-hours clock check.
//!
//! Reports today's date and whether the current moment is past the daily
//! cutoff, both evaluated in a fixed offset from UTC (+10 by default).
//! The current time comes from a [`Clock`] so tests can pin it.

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::config::BusinessHoursConfig;
use crate::error::{ConfigFormatError, HandlerError};
use crate::telemetry::{create_invocation_span, generate_correlation_id};

pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 10;

pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockResponse {
    /// ISO calendar date in the business offset
    pub date: String,
    /// Whether the cutoff has passed
    #[serde(rename = "BusinessClosingTime")]
    pub past_cutoff: bool,
}

/// Parse a 24-hour `HH:MM` cutoff. Both fields must be two digits.
pub fn parse_cutoff(spec: &str) -> Result<NaiveTime, ConfigFormatError> {
    let invalid = || ConfigFormatError::InvalidCutoff {
        value: spec.to_string(),
    };
    let bytes = spec.as_bytes();
    let shaped = bytes.len() == 5
        && bytes[2] == b':'
        && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
    if !shaped {
        return Err(invalid());
    }
    NaiveTime::parse_from_str(spec, "%H:%M").map_err(|_| invalid())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessHours {
    cutoff: NaiveTime,
    offset: FixedOffset,
}

impl BusinessHours {
    pub fn new(cutoff: NaiveTime, offset: FixedOffset) -> Self {
        Self { cutoff, offset }
    }

    pub fn from_config(config: &BusinessHoursConfig) -> Result<Self, ConfigFormatError> {
        let cutoff = parse_cutoff(&config.closing_time)?;
        let offset = offset_from_hours(config.utc_offset_hours)?;
        Ok(Self::new(cutoff, offset))
    }

    pub fn cutoff(&self) -> NaiveTime {
        self.cutoff
    }

    pub fn local_now(&self, clock: &dyn Clock) -> DateTime<FixedOffset> {
        clock.now_utc().with_timezone(&self.offset)
    }

    pub fn current_date_offset(&self, clock: &dyn Clock) -> NaiveDate {
        self.local_now(clock).date_naive()
    }

    /// Strictly later than the cutoff; the cutoff minute itself is still open.
    pub fn is_past_cutoff(&self, clock: &dyn Clock) -> bool {
        self.local_now(clock).time() > self.cutoff
    }

    pub fn check(&self, clock: &dyn Clock) -> ClockResponse {
        let local = self.local_now(clock);
        ClockResponse {
            date: local.date_naive().format("%Y-%m-%d").to_string(),
            past_cutoff: local.time() > self.cutoff,
        }
    }
}

fn offset_from_hours(hours: i32) -> Result<FixedOffset, ConfigFormatError> {
    hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .ok_or(ConfigFormatError::InvalidUtcOffset { hours })
}

fn shifted_now(clock: &dyn Clock) -> NaiveDateTime {
    clock.now_utc().naive_utc() + Duration::hours(DEFAULT_UTC_OFFSET_HOURS.into())
}

/// Today's date at UTC+10.
pub fn current_date_offset(clock: &dyn Clock) -> NaiveDate {
    shifted_now(clock).date()
}

/// Whether the UTC+10 time of day is strictly past `cutoff_spec`.
pub fn is_past_cutoff(cutoff_spec: &str, clock: &dyn Clock) -> Result<bool, ConfigFormatError> {
    let cutoff = parse_cutoff(cutoff_spec)?;
    Ok(shifted_now(clock).time() > cutoff)
}

/// Entry point for the clock function.
pub fn handle_clock_invocation(
    config: &BusinessHoursConfig,
    clock: &dyn Clock,
) -> Result<ClockResponse, HandlerError> {
    let correlation_id = generate_correlation_id();
    let span = create_invocation_span("clock", &correlation_id);
    let _enter = span.enter();

    let hours = BusinessHours::from_config(config).map_err(|e| {
        error!(error = %e, closing_time = %config.closing_time, "Invalid business hours configuration");
        e
    })?;

    let response = hours.check(clock);
    info!(
        date = %response.date,
        past_cutoff = response.past_cutoff,
        cutoff = %hours.cutoff(),
        "Business hours checked"
    );
    Ok(response)
}
