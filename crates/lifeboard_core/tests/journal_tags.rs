use lifeboard_core::db::open_db_in_memory;
use lifeboard_core::{
    JournalEntry, JournalService, JournalServiceError, Mood, SqliteJournalRepository,
};
use uuid::Uuid;

#[test]
fn created_entry_carries_derived_mood_emoji_and_preview() {
    let mut conn = open_db_in_memory().unwrap();
    let service = JournalService::new(SqliteJournalRepository::try_new(&mut conn).unwrap());

    let mut entry = JournalEntry::new("alice", 1_700_000_000_000);
    entry.title = Some("Morning pages".to_string());
    entry.content = Some("<p>Slept <b>well</b>, went for a run.</p>".to_string());
    entry.mood = Some(Mood::Good);

    let view = service.create_entry(&entry).unwrap();
    assert_eq!(view.entry, entry);
    assert_eq!(view.mood_emoji, "🙂");
    assert_eq!(
        view.content_preview.as_deref(),
        Some("Slept well, went for a run.")
    );
    assert!(view.tags.is_empty());
}

#[test]
fn entry_without_mood_renders_the_note_glyph() {
    let mut conn = open_db_in_memory().unwrap();
    let service = JournalService::new(SqliteJournalRepository::try_new(&mut conn).unwrap());

    let view = service
        .create_entry(&JournalEntry::new("alice", 1_700_000_000_000))
        .unwrap();
    assert_eq!(view.mood_emoji, "📝");
    assert!(view.content_preview.is_none());
}

#[test]
fn long_content_preview_is_truncated_with_ellipsis() {
    let mut conn = open_db_in_memory().unwrap();
    let service = JournalService::new(SqliteJournalRepository::try_new(&mut conn).unwrap());

    let mut entry = JournalEntry::new("alice", 1_700_000_000_000);
    entry.content = Some(format!("<div>{}</div>", "word ".repeat(60)));

    let view = service.create_entry(&entry).unwrap();
    let preview = view.content_preview.unwrap();
    assert_eq!(preview.chars().count(), 103);
    assert!(preview.ends_with("..."));
}

#[test]
fn update_replaces_fields_and_rederives_projections() {
    let mut conn = open_db_in_memory().unwrap();
    let service = JournalService::new(SqliteJournalRepository::try_new(&mut conn).unwrap());

    let mut entry = JournalEntry::new("alice", 1_700_000_000_000);
    entry.mood = Some(Mood::Terrible);
    service.create_entry(&entry).unwrap();

    entry.mood = Some(Mood::Amazing);
    entry.content = Some("<p>Turned the day around.</p>".to_string());
    let view = service.update_entry(&entry).unwrap();

    assert_eq!(view.mood_emoji, "😄");
    assert_eq!(
        view.content_preview.as_deref(),
        Some("Turned the day around.")
    );
}

#[test]
fn set_tags_normalizes_deduplicates_and_replaces() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = JournalService::new(SqliteJournalRepository::try_new(&mut conn).unwrap());

    let entry = JournalEntry::new("alice", 1_700_000_000_000);
    service.create_entry(&entry).unwrap();

    let view = service
        .set_tags(
            entry.uuid,
            vec![
                "Gratitude".to_string(),
                "gratitude".to_string(),
                " Travel ".to_string(),
            ],
        )
        .unwrap();
    assert_eq!(view.tags, vec!["gratitude", "travel"]);

    // A second call replaces the whole set instead of appending.
    let view = service
        .set_tags(entry.uuid, vec!["focus".to_string()])
        .unwrap();
    assert_eq!(view.tags, vec!["focus"]);

    // Vocabulary keeps previously seen names.
    let known = service.list_tags().unwrap();
    assert_eq!(known, vec!["focus", "gratitude", "travel"]);
}

#[test]
fn blank_tag_input_is_rejected_before_any_write() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = JournalService::new(SqliteJournalRepository::try_new(&mut conn).unwrap());

    let entry = JournalEntry::new("alice", 1_700_000_000_000);
    service.create_entry(&entry).unwrap();
    service
        .set_tags(entry.uuid, vec!["keep".to_string()])
        .unwrap();

    let err = service
        .set_tags(entry.uuid, vec!["ok".to_string(), "   ".to_string()])
        .unwrap_err();
    assert!(matches!(err, JournalServiceError::InvalidTag(_)));

    let view = service.get_entry(entry.uuid).unwrap().unwrap();
    assert_eq!(view.tags, vec!["keep"]);
}

#[test]
fn set_tags_on_missing_entry_reports_not_found() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = JournalService::new(SqliteJournalRepository::try_new(&mut conn).unwrap());

    let ghost = Uuid::new_v4();
    let err = service
        .set_tags(ghost, vec!["anything".to_string()])
        .unwrap_err();
    assert!(matches!(err, JournalServiceError::EntryNotFound(id) if id == ghost));
}

#[test]
fn list_is_newest_first_and_filters_by_owner_and_tag() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = JournalService::new(SqliteJournalRepository::try_new(&mut conn).unwrap());

    let older = JournalEntry::new("alice", 1_000);
    let newer = JournalEntry::new("alice", 2_000);
    let other_owner = JournalEntry::new("bob", 3_000);
    for entry in [&older, &newer, &other_owner] {
        service.create_entry(entry).unwrap();
    }
    service
        .set_tags(older.uuid, vec!["travel".to_string()])
        .unwrap();

    let all_alice = service
        .list_entries(Some("alice".to_string()), None, None, 0)
        .unwrap();
    let ids: Vec<_> = all_alice.iter().map(|view| view.entry.uuid).collect();
    assert_eq!(ids, vec![newer.uuid, older.uuid]);

    // Tag filter matches case-insensitively against the normalized name.
    let tagged = service
        .list_entries(Some("alice".to_string()), Some("Travel".to_string()), None, 0)
        .unwrap();
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].entry.uuid, older.uuid);
}

#[test]
fn list_pagination_applies_limit_and_offset() {
    let mut conn = open_db_in_memory().unwrap();
    let service = JournalService::new(SqliteJournalRepository::try_new(&mut conn).unwrap());

    let mut created = Vec::new();
    for at in [1_000, 2_000, 3_000, 4_000] {
        let entry = JournalEntry::new("alice", at);
        service.create_entry(&entry).unwrap();
        created.push(entry.uuid);
    }

    let page = service.list_entries(None, None, Some(2), 1).unwrap();
    let ids: Vec<_> = page.iter().map(|view| view.entry.uuid).collect();
    // Newest first is 4000,3000,2000,1000; offset 1 limit 2 -> 3000,2000.
    assert_eq!(ids, vec![created[2], created[1]]);
}

#[test]
fn deleting_an_entry_drops_its_tag_links_but_keeps_the_vocabulary() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut service = JournalService::new(SqliteJournalRepository::try_new(&mut conn).unwrap());

        let entry = JournalEntry::new("alice", 1_700_000_000_000);
        service.create_entry(&entry).unwrap();
        service
            .set_tags(entry.uuid, vec!["gratitude".to_string()])
            .unwrap();

        service.delete_entry(entry.uuid).unwrap();
        assert!(service.get_entry(entry.uuid).unwrap().is_none());
        assert_eq!(service.list_tags().unwrap(), vec!["gratitude"]);
    }

    let links: i64 = conn
        .query_row("SELECT COUNT(*) FROM journal_entry_tags;", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(links, 0);
}
