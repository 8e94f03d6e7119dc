use serde::{Deserialize, Serialize};
use time::{format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime};

use crate::cycle::predictor::{human_date, CycleInput, CyclePrediction};
use crate::error::{AppError, AppResult};

/// A day count sent either as a JSON number or as a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DayCount {
    Number(i64),
    Text(String),
}

impl DayCount {
    fn days(&self, field: &str) -> AppResult<Option<i64>> {
        match self {
            DayCount::Number(n) => Ok(Some(*n)),
            DayCount::Text(s) if s.trim().is_empty() => Ok(None),
            DayCount::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Some)
                .map_err(|_| AppError::Validation(format!("{field} must be a whole number of days"))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTrackerRequest {
    pub start_date: Option<String>,
    pub cycle_length: Option<DayCount>,
    pub period_length: Option<DayCount>,
}

fn parse_start_date(raw: &str) -> AppResult<Date> {
    let raw = raw.trim();
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339).map(|dt| dt.date()))
        .map_err(|_| AppError::Validation("startDate must be a date like 2024-01-31".into()))
}

impl PeriodTrackerRequest {
    pub fn into_input(self) -> AppResult<CycleInput> {
        let start = self.start_date.filter(|s| !s.trim().is_empty());
        let cycle = match &self.cycle_length {
            Some(c) => c.days("cycleLength")?,
            None => None,
        };
        let period = match &self.period_length {
            Some(p) => p.days("periodLength")?,
            None => None,
        };

        let (Some(start), Some(cycle), Some(period)) = (start, cycle, period) else {
            return Err(AppError::Validation("All fields are required".into()));
        };

        Ok(CycleInput {
            start_date: parse_start_date(&start)?,
            cycle_length_days: cycle,
            period_length_days: period,
        })
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PeriodTrackerResponse {
    pub next_period_start_date: String,
    pub ovulation_date: String,
    pub fertile_window: String,
    pub pregnancy_test_date: String,
}

impl TryFrom<CyclePrediction> for PeriodTrackerResponse {
    type Error = AppError;

    fn try_from(p: CyclePrediction) -> AppResult<Self> {
        Ok(Self {
            next_period_start_date: human_date(p.next_period_start)?,
            ovulation_date: human_date(p.ovulation)?,
            fertile_window: format!(
                "{} - {}",
                human_date(p.fertile_window_start)?,
                human_date(p.fertile_window_end)?
            ),
            pregnancy_test_date: human_date(p.pregnancy_test)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use time::macros::date;

    fn request(json: serde_json::Value) -> PeriodTrackerRequest {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn accepts_numbers_and_numeric_strings() {
        let a = request(serde_json::json!({"startDate": "2024-01-01", "cycleLength": 28, "periodLength": 5}))
            .into_input()
            .unwrap();
        let b = request(serde_json::json!({"startDate": "2024-01-01", "cycleLength": "28", "periodLength": " 5 "}))
            .into_input()
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.start_date, date!(2024 - 01 - 01));
    }

    #[test]
    fn accepts_rfc3339_start_date() {
        let input = request(serde_json::json!({
            "startDate": "2024-01-01T08:30:00Z", "cycleLength": 28, "periodLength": 5
        }))
        .into_input()
        .unwrap();
        assert_eq!(input.start_date, date!(2024 - 01 - 01));
    }

    #[test]
    fn missing_fields_are_rejected() {
        for body in [
            serde_json::json!({"cycleLength": 28, "periodLength": 5}),
            serde_json::json!({"startDate": "2024-01-01", "periodLength": 5}),
            serde_json::json!({"startDate": "2024-01-01", "cycleLength": 28}),
            serde_json::json!({"startDate": "", "cycleLength": 28, "periodLength": 5}),
            serde_json::json!({"startDate": "2024-01-01", "cycleLength": "", "periodLength": 5}),
        ] {
            assert_matches!(
                request(body).into_input(),
                Err(AppError::Validation(msg)) if msg == "All fields are required"
            );
        }
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert_matches!(
            request(serde_json::json!({"startDate": "01/02/2024", "cycleLength": 28, "periodLength": 5}))
                .into_input(),
            Err(AppError::Validation(_))
        );
        assert_matches!(
            request(serde_json::json!({"startDate": "2024-01-01", "cycleLength": "four weeks", "periodLength": 5}))
                .into_input(),
            Err(AppError::Validation(_))
        );
    }

    #[test]
    fn renders_fertile_window_range() {
        let prediction = CyclePrediction {
            next_period_start: date!(2024 - 01 - 29),
            ovulation: date!(2024 - 01 - 15),
            fertile_window_start: date!(2024 - 01 - 10),
            fertile_window_end: date!(2024 - 01 - 19),
            pregnancy_test: date!(2024 - 01 - 30),
        };
        let response = PeriodTrackerResponse::try_from(prediction).unwrap();
        assert_eq!(response.next_period_start_date, "January 29, 2024");
        assert_eq!(response.ovulation_date, "January 15, 2024");
        assert_eq!(response.fertile_window, "January 10, 2024 - January 19, 2024");
        assert_eq!(response.pregnancy_test_date, "January 30, 2024");
    }
}
