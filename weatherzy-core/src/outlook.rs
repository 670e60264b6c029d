//! Hourly and five-day projections of a forecast.

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Timelike, Utc};
use serde::Serialize;

use crate::{
    card::ConditionIcon,
    model::Forecast,
    units::{Units, convert_temperature},
};

pub const DAILY_LIMIT: usize = 5;

const NOON_SECS: i64 = 12 * 3600;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub min: f64,
    pub max: f64,
    pub condition: String,
    pub icon: ConditionIcon,
}

/// One point per forecast slice, in forecast order.
pub fn hourly(forecast: &Forecast, units: Units) -> Vec<HourlyPoint> {
    forecast
        .records
        .iter()
        .map(|r| HourlyPoint {
            time: r.observed_at,
            temperature: convert_temperature(r.temperature, r.units, units),
            condition: r.condition_description.to_lowercase(),
        })
        .collect()
}

/// Group slices by the city's local date, keeping at most [`DAILY_LIMIT`] days.
///
/// Each day reports its temperature range and the condition of the slice
/// nearest local noon.
pub fn daily(forecast: &Forecast, units: Units) -> Vec<DailySummary> {
    let offset = FixedOffset::east_opt(forecast.utc_offset_secs).unwrap_or_else(|| Utc.fix());

    let mut days: Vec<DailySummary> = Vec::new();
    let mut noon_distance: Vec<i64> = Vec::new();

    for record in &forecast.records {
        let local = record.observed_at.with_timezone(&offset);
        let date = local.date_naive();
        let temp = convert_temperature(record.temperature, record.units, units);
        let distance = (i64::from(local.num_seconds_from_midnight()) - NOON_SECS).abs();

        match days.last_mut() {
            Some(day) if day.date == date => {
                day.min = day.min.min(temp);
                day.max = day.max.max(temp);
                if let Some(best) = noon_distance.last_mut() {
                    if distance < *best {
                        *best = distance;
                        day.condition = record.condition_description.clone();
                        day.icon = ConditionIcon::for_condition(&record.condition_main);
                    }
                }
            }
            _ => {
                if days.len() == DAILY_LIMIT {
                    break;
                }
                days.push(DailySummary {
                    date,
                    min: temp,
                    max: temp,
                    condition: record.condition_description.clone(),
                    icon: ConditionIcon::for_condition(&record.condition_main),
                });
                noon_distance.push(distance);
            }
        }
    }

    days
}
