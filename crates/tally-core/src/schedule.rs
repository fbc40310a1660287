//! Recurring-rule scheduling decisions.
//!
//! Pure calendar computation: given a rule and the current instant, decide
//! whether a new occurrence is due and on which effective date. The caller
//! materializes the transaction and stamps the rule.

#![allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)] // calendar months fit comfortably in i32

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::models::{Frequency, RecurringRule};

/// Months with fewer than 29 days do not exist, so clamping the effective
/// day here keeps every generated date valid year-round.
const MAX_EFFECTIVE_DAY: u32 = 28;

/// Decide whether `rule` is due at `now`.
///
/// Returns the effective calendar date for the generated transaction, or
/// `None` when nothing is due. `rule.last_generated` is the instant the
/// rule last fired and is compared against `now` per frequency; a due date
/// missed while the process was down still fires on the next evaluation
/// because every condition below is a plain date comparison.
#[must_use]
pub fn should_generate(rule: &RecurringRule, now: DateTime<Utc>) -> Option<NaiveDate> {
    if !rule.is_active {
        return None;
    }
    let today = now.date_naive();
    if rule.start_date > today {
        return None;
    }
    if rule.end_date.is_some_and(|end| end < today) {
        return None;
    }

    match rule.frequency {
        Frequency::Monthly => monthly(rule, now),
        Frequency::Weekly => weekly(rule, now),
        Frequency::Yearly => yearly(rule, now),
        Frequency::Custom => custom(rule, now),
    }
}

/// Once per calendar month, on the configured (clamped) day.
fn monthly(rule: &RecurringRule, now: DateTime<Utc>) -> Option<NaiveDate> {
    if rule
        .last_generated
        .is_some_and(|last| (last.year(), last.month()) == (now.year(), now.month()))
    {
        return None;
    }
    NaiveDate::from_ymd_opt(now.year(), now.month(), effective_day(rule))
}

/// Once every elapsed seven days. The effective date is the evaluation
/// date; `day_of_week` is a display hint and does not shift it.
fn weekly(rule: &RecurringRule, now: DateTime<Utc>) -> Option<NaiveDate> {
    if rule
        .last_generated
        .is_some_and(|last| now - last < Duration::days(7))
    {
        return None;
    }
    Some(now.date_naive())
}

/// Once per calendar year, at the start date's month and day.
fn yearly(rule: &RecurringRule, now: DateTime<Utc>) -> Option<NaiveDate> {
    if rule
        .last_generated
        .is_some_and(|last| last.year() >= now.year())
    {
        return None;
    }
    date_in_month(now.year(), rule.start_date.month(), rule.start_date.day())
}

/// Every `interval_months` months. The first fire targets the start date's
/// month immediately; later fires target the month of the previous fire
/// plus the interval, once `now` reaches it.
fn custom(rule: &RecurringRule, now: DateTime<Utc>) -> Option<NaiveDate> {
    // A custom rule without an interval is misconfigured and never fires.
    let interval = rule.interval_months? as i32;
    let day = effective_day(rule);

    match rule.last_generated {
        None => NaiveDate::from_ymd_opt(rule.start_date.year(), rule.start_date.month(), day),
        Some(last) => {
            let scheduled = month_index(last.year(), last.month()) + interval;
            if month_index(now.year(), now.month()) >= scheduled {
                let (year, month) = from_month_index(scheduled);
                NaiveDate::from_ymd_opt(year, month, day)
            } else {
                None
            }
        }
    }
}

fn effective_day(rule: &RecurringRule) -> u32 {
    rule.day_of_month
        .unwrap_or_else(|| rule.start_date.day())
        .min(MAX_EFFECTIVE_DAY)
}

/// Date at `year`/`month`, with `day` pulled back into the month when it
/// does not exist there (Feb 29 starts in a non-leap year).
fn date_in_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    (1..=day)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
}

fn month_index(year: i32, month: u32) -> i32 {
    year * 12 + month as i32 - 1
}

fn from_month_index(index: i32) -> (i32, u32) {
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}
