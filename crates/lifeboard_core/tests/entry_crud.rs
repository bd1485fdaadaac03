use chrono::NaiveDate;
use lifeboard_core::db::open_db_in_memory;
use lifeboard_core::{
    EntryListQuery, EntryRepository, Habit, HabitEntry, HabitRepository, HabitService,
    HabitServiceError, RepoError, SqliteEntryRepository, SqliteHabitRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seed_habit(conn: &Connection) -> Habit {
    let habit = Habit::new("alice", "Read");
    SqliteHabitRepository::try_new(conn)
        .unwrap()
        .create_habit(&habit)
        .unwrap();
    habit
}

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let habit = seed_habit(&conn);
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let mut entry = HabitEntry::new(habit.uuid, "alice", date(2024, 1, 1));
    entry.note = Some("twenty pages".to_string());
    let id = repo.create_entry(&entry).unwrap();

    let loaded = repo.get_entry(id).unwrap().unwrap();
    assert_eq!(loaded, entry);
}

#[test]
fn second_entry_for_same_day_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let habit = seed_habit(&conn);
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    repo.create_entry(&HabitEntry::new(habit.uuid, "alice", date(2024, 1, 1)))
        .unwrap();
    let err = repo
        .create_entry(&HabitEntry::new(habit.uuid, "alice", date(2024, 1, 1)))
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::DuplicateEntry { habit_id, date: d }
            if habit_id == habit.uuid && d == date(2024, 1, 1)
    ));
}

#[test]
fn moving_an_entry_onto_an_occupied_date_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let habit = seed_habit(&conn);
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    repo.create_entry(&HabitEntry::new(habit.uuid, "alice", date(2024, 1, 1)))
        .unwrap();
    let mut second = HabitEntry::new(habit.uuid, "alice", date(2024, 1, 2));
    repo.create_entry(&second).unwrap();

    second.date = date(2024, 1, 1);
    let err = repo.update_entry(&second).unwrap_err();
    assert!(matches!(err, RepoError::DuplicateEntry { .. }));
}

#[test]
fn duplicate_surfaces_as_service_level_validation_failure() {
    let conn = open_db_in_memory().unwrap();
    let habit = seed_habit(&conn);
    let service = HabitService::new(
        SqliteHabitRepository::try_new(&conn).unwrap(),
        SqliteEntryRepository::try_new(&conn).unwrap(),
    );

    service
        .record_entry(&HabitEntry::new(habit.uuid, "alice", date(2024, 1, 1)))
        .unwrap();
    let err = service
        .record_entry(&HabitEntry::new(habit.uuid, "alice", date(2024, 1, 1)))
        .unwrap_err();

    assert!(matches!(err, HabitServiceError::DuplicateEntry { .. }));
}

#[test]
fn recording_against_a_missing_habit_fails_before_insert() {
    let conn = open_db_in_memory().unwrap();
    let service = HabitService::new(
        SqliteHabitRepository::try_new(&conn).unwrap(),
        SqliteEntryRepository::try_new(&conn).unwrap(),
    );

    let ghost = Uuid::new_v4();
    let err = service
        .record_entry(&HabitEntry::new(ghost, "alice", date(2024, 1, 1)))
        .unwrap_err();
    assert!(matches!(err, HabitServiceError::HabitNotFound(id) if id == ghost));
}

#[test]
fn find_entry_locates_the_unique_day_row() {
    let conn = open_db_in_memory().unwrap();
    let habit = seed_habit(&conn);
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let entry = HabitEntry::new(habit.uuid, "alice", date(2024, 1, 5));
    repo.create_entry(&entry).unwrap();

    let found = repo.find_entry(habit.uuid, date(2024, 1, 5)).unwrap();
    assert_eq!(found.map(|e| e.uuid), Some(entry.uuid));
    assert!(repo.find_entry(habit.uuid, date(2024, 1, 6)).unwrap().is_none());
}

#[test]
fn list_entries_filters_by_range_and_success() {
    let conn = open_db_in_memory().unwrap();
    let habit = seed_habit(&conn);
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    for day in 1..=5 {
        let mut entry = HabitEntry::new(habit.uuid, "alice", date(2024, 1, day));
        entry.success = day != 3;
        repo.create_entry(&entry).unwrap();
    }

    let query = EntryListQuery {
        habit_id: Some(habit.uuid),
        from: Some(date(2024, 1, 2)),
        to: Some(date(2024, 1, 4)),
        success: Some(true),
        ..EntryListQuery::default()
    };
    let listed = repo.list_entries(&query).unwrap();
    let days: Vec<u32> = listed
        .iter()
        .map(|e| chrono::Datelike::day(&e.date))
        .collect();
    assert_eq!(days, vec![2, 4]);
}

#[test]
fn successful_dates_are_ascending_and_exclude_failures() {
    let conn = open_db_in_memory().unwrap();
    let habit = seed_habit(&conn);
    let repo = SqliteEntryRepository::try_new(&conn).unwrap();

    // Insert out of calendar order.
    for day in [4, 1, 3] {
        repo.create_entry(&HabitEntry::new(habit.uuid, "alice", date(2024, 1, day)))
            .unwrap();
    }
    let mut failed = HabitEntry::new(habit.uuid, "alice", date(2024, 1, 2));
    failed.success = false;
    repo.create_entry(&failed).unwrap();

    let dates = repo.successful_dates(habit.uuid).unwrap();
    assert_eq!(
        dates,
        vec![date(2024, 1, 1), date(2024, 1, 3), date(2024, 1, 4)]
    );
}

#[test]
fn deleting_a_habit_cascades_to_its_entries() {
    let conn = open_db_in_memory().unwrap();
    let habit = seed_habit(&conn);
    let habit_repo = SqliteHabitRepository::try_new(&conn).unwrap();
    let entry_repo = SqliteEntryRepository::try_new(&conn).unwrap();

    let entry = HabitEntry::new(habit.uuid, "alice", date(2024, 1, 1));
    entry_repo.create_entry(&entry).unwrap();

    habit_repo.delete_habit(habit.uuid).unwrap();

    assert!(entry_repo.get_entry(entry.uuid).unwrap().is_none());
    let remaining: i64 = conn
        .query_row("SELECT COUNT(*) FROM habit_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(remaining, 0);
}

#[test]
fn batch_delete_recomputes_each_habit_once_and_all_of_them() {
    let conn = open_db_in_memory().unwrap();
    let habit_a = seed_habit(&conn);
    let habit_b = {
        let habit = Habit::new("alice", "Stretch");
        SqliteHabitRepository::try_new(&conn)
            .unwrap()
            .create_habit(&habit)
            .unwrap();
        habit
    };
    let service = HabitService::new(
        SqliteHabitRepository::try_new(&conn).unwrap(),
        SqliteEntryRepository::try_new(&conn).unwrap(),
    );

    let mut to_delete = Vec::new();
    for habit in [&habit_a, &habit_b] {
        for day in 1..=3 {
            let created = service
                .record_entry(&HabitEntry::new(habit.uuid, "alice", date(2024, 1, day)))
                .unwrap();
            if day == 2 {
                to_delete.push(created.uuid);
            }
        }
    }

    service.delete_entries(&to_delete).unwrap();

    for habit in [&habit_a, &habit_b] {
        let reloaded = service.get_habit(habit.uuid).unwrap().unwrap();
        assert_eq!(reloaded.current_streak, 1);
        assert_eq!(reloaded.longest_streak, 3);
    }
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    let result = SqliteEntryRepository::try_new(&conn);
    match result {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_required_tables() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!(
        "PRAGMA user_version = {};",
        lifeboard_core::db::migrations::latest_version()
    ))
    .unwrap();

    let result = SqliteHabitRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("habits"))
    ));
}
