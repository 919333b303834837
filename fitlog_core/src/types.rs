//! Core domain types for the workout log.
//!
//! - Parsed workout entries and the records they become once stored
//! - Owner identifiers and registered users
//! - Dashboard summaries and per-day listings

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identity
// ============================================================================

/// Opaque key identifying the user who performed a workout
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A registered user
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: OwnerId,
    pub name: String,
    pub email: String,
    pub registered_at: NaiveDateTime,
}

// ============================================================================
// Workouts
// ============================================================================

/// One exercise performed in one session, as read from a workout log.
///
/// `calories_burned` is always derived by the estimator; the parser leaves
/// it at zero.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutEntry {
    pub category: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight_kg: f64,
    pub duration_min: f64,
    pub calories_burned: f64,
}

/// A workout entry attached to its owner and date. Written once, never
/// mutated.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WorkoutRecord {
    pub id: Uuid,
    pub owner_id: OwnerId,
    pub category: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub weight_kg: f64,
    pub duration_min: f64,
    pub calories_burned: f64,
    /// Local wall-clock time the workout was logged
    pub date: NaiveDateTime,
}

impl WorkoutRecord {
    pub fn new(owner_id: OwnerId, date: NaiveDateTime, entry: WorkoutEntry) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            category: entry.category,
            name: entry.name,
            sets: entry.sets,
            reps: entry.reps,
            weight_kg: entry.weight_kg,
            duration_min: entry.duration_min,
            calories_burned: entry.calories_burned,
            date,
        }
    }
}

impl From<&WorkoutRecord> for WorkoutEntry {
    fn from(record: &WorkoutRecord) -> Self {
        Self {
            category: record.category.clone(),
            name: record.name.clone(),
            sets: record.sets,
            reps: record.reps,
            weight_kg: record.weight_kg,
            duration_min: record.duration_min,
            calories_burned: record.calories_burned,
        }
    }
}

// ============================================================================
// Aggregates
// ============================================================================

/// Calories summed over one category
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total_calories: f64,
}

/// Calories summed over one calendar day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrendPoint {
    pub day: NaiveDate,
    pub day_label: String,
    pub total_calories: f64,
}

/// Dashboard statistics for one owner, recomputed per request
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DashboardSummary {
    pub total_calories_today: f64,
    pub total_workouts_today: u32,
    pub avg_calories_per_workout_today: f64,
    /// Sorted by category label
    pub category_breakdown: Vec<CategoryTotal>,
    /// Exactly seven points, oldest first, ending today
    pub trend: Vec<TrendPoint>,
}

/// Everything an owner logged on one calendar day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayWorkouts {
    pub todays_workouts: Vec<WorkoutRecord>,
    pub total_calories_burned: f64,
}
