//! Dashboard aggregation.
//!
//! A summary is computed fresh for every request from stored records. The
//! reference instant `now` is taken once by the caller and used for every
//! window, so a request straddling midnight still sees one consistent day.

use crate::store::RecordStore;
use crate::users::UserDirectory;
use crate::window::{trailing_days, TimeWindow};
use crate::{DashboardSummary, OwnerId, Result, TrendPoint, WorkoutRecord};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Days covered by the calorie trend, today included
pub const TREND_DAYS: u32 = 7;

const DAY_LABEL_FORMAT: &str = "%Y-%m-%d";

/// Compute dashboard statistics for `owner` as of `now`.
///
/// Fails with [`crate::Error::NotFound`] before querying the store when the
/// owner is unknown. Store failures are returned unchanged.
pub fn summarize<S, U>(
    store: &S,
    users: &U,
    owner: &OwnerId,
    now: NaiveDateTime,
) -> Result<DashboardSummary>
where
    S: RecordStore + ?Sized,
    U: UserDirectory + ?Sized,
{
    users.require(owner)?;

    let today = TimeWindow::today(now);
    let todays = store.query_range(owner, &today)?;

    let total_calories_today = total_calories(&todays);
    let total_workouts_today = todays.len() as u32;
    let avg_calories_per_workout_today = if total_workouts_today > 0 {
        total_calories_today / f64::from(total_workouts_today)
    } else {
        0.0
    };

    let mut category_breakdown = store.category_totals(owner, &today)?;
    category_breakdown.sort_by(|a, b| a.category.cmp(&b.category));

    let trend = trailing_days(now, TREND_DAYS)
        .iter()
        .map(|day| -> Result<TrendPoint> {
            let records = store.query_range(owner, day)?;
            Ok(TrendPoint {
                day: day.start.date(),
                day_label: day.start.format(DAY_LABEL_FORMAT).to_string(),
                total_calories: total_calories(&records),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        "Summarized {} workouts for {} across {} categories",
        total_workouts_today,
        owner,
        category_breakdown.len()
    );

    Ok(DashboardSummary {
        total_calories_today,
        total_workouts_today,
        avg_calories_per_workout_today,
        category_breakdown,
        trend,
    })
}

pub(crate) fn total_calories(records: &[WorkoutRecord]) -> f64 {
    records.iter().map(|r| r.calories_burned).sum()
}

/// Wire shape of a dashboard summary
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_calories_burned: f64,
    pub total_workouts: u32,
    pub avg_calories_burned_per_workout: f64,
    pub weekly_trend: WeeklyTrend,
    pub pie_chart_data: Vec<PieSlice>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTrend {
    pub weeks: Vec<String>,
    pub calories_burned: Vec<f64>,
}

/// One category in the breakdown chart, `id` is its position
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PieSlice {
    pub id: usize,
    pub value: f64,
    pub label: String,
}

impl From<&DashboardSummary> for DashboardResponse {
    fn from(summary: &DashboardSummary) -> Self {
        Self {
            total_calories_burned: summary.total_calories_today,
            total_workouts: summary.total_workouts_today,
            avg_calories_burned_per_workout: summary.avg_calories_per_workout_today,
            weekly_trend: WeeklyTrend {
                weeks: summary.trend.iter().map(|p| p.day_label.clone()).collect(),
                calories_burned: summary.trend.iter().map(|p| p.total_calories).collect(),
            },
            pie_chart_data: summary
                .category_breakdown
                .iter()
                .enumerate()
                .map(|(id, total)| PieSlice {
                    id,
                    value: total.total_calories,
                    label: total.category.clone(),
                })
                .collect(),
        }
    }
}
