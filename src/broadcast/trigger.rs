//! Calendar triggers for scheduled broadcasts.
//!
//! A trigger fires when an instant, converted into the trigger's timezone,
//! falls on one of its weekdays at exactly its hour and minute. Matching is a
//! pure predicate; the ticking loop lives in `broadcast::engine`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::ScheduleError;
use crate::responder::{ResponsePayload, catalog};

/// Builds the payload at firing time.
pub type PayloadFactory = Arc<dyn Fn() -> ResponsePayload + Send + Sync>;

/// Weekday set plus a wall-clock hour and minute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceSpec {
    weekdays: Vec<Weekday>,
    hour: u32,
    minute: u32,
}

impl RecurrenceSpec {
    pub fn new<I>(weekdays: I, hour: u32, minute: u32) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = Weekday>,
    {
        let mut weekdays: Vec<Weekday> = weekdays.into_iter().collect();
        weekdays.sort_by_key(|d| d.num_days_from_monday());
        weekdays.dedup();

        if weekdays.is_empty() {
            return Err(ScheduleError::InvalidRecurrence(
                "weekday set is empty".into(),
            ));
        }
        if hour > 23 {
            return Err(ScheduleError::InvalidRecurrence(format!(
                "hour {hour} out of range 0-23"
            )));
        }
        if minute > 59 {
            return Err(ScheduleError::InvalidRecurrence(format!(
                "minute {minute} out of range 0-59"
            )));
        }

        Ok(Self {
            weekdays,
            hour,
            minute,
        })
    }

    /// Monday through Friday.
    pub fn weekdays_at(hour: u32, minute: u32) -> Result<Self, ScheduleError> {
        Self::new(
            [
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            hour,
            minute,
        )
    }

    pub fn weekdays(&self) -> &[Weekday] {
        &self.weekdays
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// Whether a local weekday/hour/minute falls on this recurrence.
    pub fn matches_local(&self, weekday: Weekday, hour: u32, minute: u32) -> bool {
        self.hour == hour && self.minute == minute && self.weekdays.contains(&weekday)
    }

    /// Equivalent six-field cron expression (`sec min hour dom month dow`).
    pub fn cron_expression(&self) -> String {
        let days: Vec<String> = self.weekdays.iter().map(|d| d.to_string()).collect();
        format!("0 {} {} * * {}", self.minute, self.hour, days.join(","))
    }
}

impl fmt::Display for RecurrenceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let days: Vec<String> = self.weekdays.iter().map(|d| d.to_string()).collect();
        write!(f, "{} {:02}:{:02}", days.join(","), self.hour, self.minute)
    }
}

/// A named recurring broadcast. Read-only after construction.
#[derive(Clone)]
pub struct ScheduleTrigger {
    name: String,
    recurrence: RecurrenceSpec,
    timezone: Tz,
    schedule: cron::Schedule,
    payload_factory: PayloadFactory,
}

impl ScheduleTrigger {
    pub fn new(
        name: impl Into<String>,
        recurrence: RecurrenceSpec,
        timezone: Tz,
        payload_factory: PayloadFactory,
    ) -> Result<Self, ScheduleError> {
        let expression = recurrence.cron_expression();
        let schedule = cron::Schedule::from_str(&expression).map_err(|e| ScheduleError::Cron {
            expression: expression.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            name: name.into(),
            recurrence,
            timezone,
            schedule,
            payload_factory,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn recurrence(&self) -> &RecurrenceSpec {
        &self.recurrence
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Does `instant` fall inside a firing minute of this trigger?
    pub fn matches(&self, instant: DateTime<Utc>) -> bool {
        let local = instant.with_timezone(&self.timezone);
        self.recurrence
            .matches_local(local.weekday(), local.hour(), local.minute())
    }

    /// Minutes since the epoch on the trigger's local wall clock.
    ///
    /// Both passes through a repeated DST hour map to the same value.
    pub fn local_minute(&self, instant: DateTime<Utc>) -> i64 {
        instant
            .with_timezone(&self.timezone)
            .naive_local()
            .and_utc()
            .timestamp()
            .div_euclid(60)
    }

    /// First firing instant strictly after `after`.
    pub fn next_fire_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule
            .after(&after.with_timezone(&self.timezone))
            .next()
            .map(|t| t.with_timezone(&Utc))
    }

    /// Build this trigger's payload.
    pub fn payload(&self) -> ResponsePayload {
        (self.payload_factory)()
    }
}

impl fmt::Debug for ScheduleTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleTrigger")
            .field("name", &self.name)
            .field("recurrence", &self.recurrence)
            .field("timezone", &self.timezone)
            .finish_non_exhaustive()
    }
}

/// Parse an IANA timezone name such as `Asia/Tokyo`.
pub fn parse_timezone(name: &str) -> Result<Tz, ScheduleError> {
    name.parse::<Tz>()
        .map_err(|_| ScheduleError::UnknownTimezone(name.to_string()))
}

/// The standard broadcasts: weekday mornings at 08:00 and Friday evenings at 17:00.
pub fn default_triggers(timezone: Tz) -> Result<Vec<ScheduleTrigger>, ScheduleError> {
    Ok(vec![
        ScheduleTrigger::new(
            "weekday-morning",
            RecurrenceSpec::weekdays_at(8, 0)?,
            timezone,
            Arc::new(|| ResponsePayload::text(catalog::WEEKDAY_MORNING_BROADCAST)),
        )?,
        ScheduleTrigger::new(
            "friday-evening",
            RecurrenceSpec::new([Weekday::Fri], 17, 0)?,
            timezone,
            Arc::new(|| ResponsePayload::text(catalog::FRIDAY_EVENING_BROADCAST)),
        )?,
    ])
}
