//! Logging workouts and listing them by day.

use crate::dashboard::total_calories;
use crate::estimator;
use crate::parser::LogParser;
use crate::store::RecordStore;
use crate::users::UserDirectory;
use crate::window::TimeWindow;
use crate::{DayWorkouts, OwnerId, Result, WorkoutEntry, WorkoutRecord};
use chrono::{NaiveDate, NaiveDateTime};

/// Parse a workout log and price every entry, without storing anything
pub fn price_entries(parser: &LogParser, raw: &str) -> Result<Vec<WorkoutEntry>> {
    Ok(parser
        .parse(raw)?
        .into_iter()
        .map(estimator::price)
        .collect())
}

/// Parse, price and store a workout log for `owner`, dated `now`.
///
/// The records are written with a single [`RecordStore::append_batch`]
/// call: an unknown owner, a rejected log or a failed write all leave the
/// store as it was.
pub fn log_workouts<S, U>(
    store: &mut S,
    users: &U,
    parser: &LogParser,
    owner: &OwnerId,
    raw: &str,
    now: NaiveDateTime,
) -> Result<Vec<WorkoutRecord>>
where
    S: RecordStore + ?Sized,
    U: UserDirectory + ?Sized,
{
    users.require(owner)?;

    let records: Vec<WorkoutRecord> = price_entries(parser, raw)?
        .into_iter()
        .map(|entry| WorkoutRecord::new(owner.clone(), now, entry))
        .collect();

    store.append_batch(&records)?;

    tracing::info!("Logged {} workouts for {}", records.len(), owner);
    Ok(records)
}

/// Everything `owner` logged on `date`, in the order it was stored
pub fn workouts_on<S, U>(store: &S, users: &U, owner: &OwnerId, date: NaiveDate) -> Result<DayWorkouts>
where
    S: RecordStore + ?Sized,
    U: UserDirectory + ?Sized,
{
    users.require(owner)?;

    let todays_workouts = store.query_range(owner, &TimeWindow::day(date))?;
    let total_calories_burned = total_calories(&todays_workouts);

    Ok(DayWorkouts {
        todays_workouts,
        total_calories_burned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseErrorKind;
    use crate::store::{JournalStore, MemoryStore};
    use crate::users::UserRegistry;
    use crate::Error;

    const SQUAT: &str = "#Legs;#Squat;#3 sets 10 reps;#80kg;#30min";
    const TWO: &str = "#Legs\n#Squat\n#3 sets 10 reps\n#80kg\n#30min;\n\
                       #Arms\n#Curl\n#4 sets 12 reps\n#15.5kg\n#10.9min";

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, 2)
            .unwrap()
            .and_hms_opt(17, 45, 0)
            .unwrap()
    }

    fn registry() -> (UserRegistry, OwnerId) {
        let mut users = UserRegistry::default();
        let owner = users.register("Ada", "ada@example.com", now()).unwrap().id;
        (users, owner)
    }

    #[test]
    fn test_log_single_entry_end_to_end() {
        let (users, owner) = registry();
        let mut store = MemoryStore::new();

        let records =
            log_workouts(&mut store, &users, &LogParser::default(), &owner, SQUAT, now()).unwrap();

        assert_eq!(records.len(), 1);
        let squat = &records[0];
        assert_eq!(squat.category, "Legs");
        assert_eq!(squat.name, "Squat");
        assert_eq!((squat.sets, squat.reps), (3, 10));
        assert_eq!(squat.weight_kg, 80.0);
        assert_eq!(squat.duration_min, 30.0);
        assert_eq!(squat.calories_burned, 12000.0);
        assert_eq!(squat.owner_id, owner);
        assert_eq!(squat.date, now());
        assert_eq!(store.records(), records.as_slice());
    }

    #[test]
    fn test_prices_with_truncated_inputs() {
        let entries = price_entries(&LogParser::default(), TWO).unwrap();
        assert_eq!(entries[0].calories_burned, 12000.0);
        // 10.9 min at 15.5 kg prices as 10 * 15 * 5
        assert_eq!(entries[1].calories_burned, 750.0);
    }

    #[test]
    fn test_rejected_log_stores_nothing() {
        let (users, owner) = registry();
        let mut store = MemoryStore::new();
        let raw = format!("{};#Arms;#Curl;#4 sets 12 reps;#15kg", SQUAT);

        let err = log_workouts(&mut store, &users, &LogParser::default(), &owner, &raw, now())
            .unwrap_err();

        match err {
            Error::Validation(e) => {
                assert_eq!(e.group, 2);
                assert_eq!(e.kind, ParseErrorKind::IncompleteGroup { found: 3 });
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_owner_stores_nothing() {
        let (users, _) = registry();
        let mut store = MemoryStore::new();

        let err = log_workouts(
            &mut store,
            &users,
            &LogParser::default(),
            &OwnerId::new("ghost"),
            SQUAT,
            now(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(store.is_empty());
    }

    struct RejectingStore {
        batches: usize,
    }

    impl RecordStore for RejectingStore {
        fn append_batch(&mut self, _records: &[WorkoutRecord]) -> Result<()> {
            self.batches += 1;
            Err(Error::Store("write timed out".into()))
        }

        fn query_range(&self, _owner: &OwnerId, _window: &TimeWindow) -> Result<Vec<WorkoutRecord>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_write_failure_reported_once() {
        let (users, owner) = registry();
        let mut store = RejectingStore { batches: 0 };

        let err = log_workouts(&mut store, &users, &LogParser::default(), &owner, TWO, now())
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert!(err.is_retryable());
        assert_eq!(store.batches, 1);
    }

    #[test]
    fn test_workouts_on_lists_day_in_order() {
        let (users, owner) = registry();
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = JournalStore::new(
            temp_dir.path().join("workouts.jsonl"),
            temp_dir.path().join("workouts.csv"),
        );
        let parser = LogParser::default();

        log_workouts(&mut store, &users, &parser, &owner, TWO, now()).unwrap();
        let yesterday = now() - chrono::Duration::days(1);
        log_workouts(&mut store, &users, &parser, &owner, SQUAT, yesterday).unwrap();

        let day = workouts_on(&store, &users, &owner, now().date()).unwrap();
        let names: Vec<_> = day.todays_workouts.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Squat", "Curl"]);
        assert_eq!(day.total_calories_burned, 12750.0);

        let empty = workouts_on(&store, &users, &owner, now().date().succ_opt().unwrap()).unwrap();
        assert!(empty.todays_workouts.is_empty());
        assert_eq!(empty.total_calories_burned, 0.0);
    }
}
