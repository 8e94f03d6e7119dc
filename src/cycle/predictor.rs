//! Menstrual-cycle milestone arithmetic.
//!
//! Everything here is pure: the same input always yields the same dates.

use time::{macros::format_description, Date, Duration};

use crate::error::{AppError, AppResult};

/// Days between ovulation and the start of the next period.
const LUTEAL_PHASE_DAYS: i64 = 14;
const FERTILE_DAYS_BEFORE_OVULATION: i64 = 5;
const FERTILE_DAYS_AFTER_OVULATION: i64 = 4;
const PREGNANCY_TEST_DAYS_AFTER_PERIOD: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleInput {
    pub start_date: Date,
    pub cycle_length_days: i64,
    /// Checked for presence and sign only; it does not move any milestone.
    pub period_length_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CyclePrediction {
    pub next_period_start: Date,
    pub ovulation: Date,
    pub fertile_window_start: Date,
    pub fertile_window_end: Date,
    pub pregnancy_test: Date,
}

const SECONDS_PER_DAY: i64 = 86_400;

fn shift(date: Date, days: i64) -> AppResult<Date> {
    days.checked_mul(SECONDS_PER_DAY)
        .map(Duration::seconds)
        .and_then(|d| date.checked_add(d))
        .ok_or_else(|| AppError::Validation("Date is out of range".into()))
}

pub fn predict(input: &CycleInput) -> AppResult<CyclePrediction> {
    if input.cycle_length_days <= 0 || input.period_length_days <= 0 {
        return Err(AppError::Validation(
            "Cycle and period length must be positive".into(),
        ));
    }

    let next_period_start = shift(input.start_date, input.cycle_length_days)?;
    let ovulation = shift(next_period_start, -LUTEAL_PHASE_DAYS)?;
    Ok(CyclePrediction {
        next_period_start,
        ovulation,
        fertile_window_start: shift(ovulation, -FERTILE_DAYS_BEFORE_OVULATION)?,
        fertile_window_end: shift(ovulation, FERTILE_DAYS_AFTER_OVULATION)?,
        pregnancy_test: shift(next_period_start, PREGNANCY_TEST_DAYS_AFTER_PERIOD)?,
    })
}

/// Renders a date like `January 29, 2024`.
pub fn human_date(date: Date) -> AppResult<String> {
    let fmt = format_description!("[month repr:long] [day padding:none], [year]");
    date.format(fmt)
        .map_err(|e| AppError::Internal(anyhow::Error::new(e).context("format date")))
}
