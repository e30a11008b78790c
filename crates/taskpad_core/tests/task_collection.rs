use std::collections::HashSet;
use taskpad_core::db::{open_db, open_db_in_memory};
use taskpad_core::{
    Clock, FixedClock, MemorySlotRepository, RepoError, RepoResult, SlotRepository,
    SqliteSlotRepository, Task, TaskService, TASKS_SLOT_KEY,
};

fn texts(service: &TaskService<impl SlotRepository, impl Clock>) -> Vec<String> {
    service
        .tasks()
        .iter()
        .map(|task| task.text.clone())
        .collect()
}

#[test]
fn add_task_ids_are_pairwise_distinct_within_one_millisecond() {
    let repo = MemorySlotRepository::new();
    let clock = FixedClock::at_epoch_millis(1_700_000_000_000);
    let mut service = TaskService::with_clock(&repo, clock);

    for n in 0..100 {
        service.add_task(&format!("task {n}"));
    }

    assert_eq!(service.tasks().len(), 100);
    let ids: HashSet<_> = service.tasks().iter().map(|task| task.id.clone()).collect();
    assert_eq!(ids.len(), 100);
}

#[test]
fn duplicate_text_is_allowed() {
    let repo = MemorySlotRepository::new();
    let mut service = TaskService::open(&repo);

    let first = service.add_task("same");
    let second = service.add_task("same");

    assert_ne!(first, second);
    assert_eq!(texts(&service), ["same", "same"]);
}

#[test]
fn toggle_twice_restores_completed_flags() {
    let repo = MemorySlotRepository::new();
    let mut service = TaskService::open(&repo);
    let a = service.add_task("a");
    service.add_task("b");
    let original = service.tasks().to_vec();

    assert!(service.toggle_task(a.as_str()));
    assert!(service.find_task(a.as_str()).unwrap().completed);
    assert!(!service.tasks()[1].completed);

    assert!(service.toggle_task(a.as_str()));
    assert_eq!(service.tasks(), original.as_slice());
}

#[test]
fn second_delete_is_a_noop() {
    let repo = MemorySlotRepository::new();
    let mut service = TaskService::open(&repo);
    service.add_task("a");
    let b = service.add_task("b");
    service.add_task("c");

    assert!(service.delete_task(b.as_str()));
    let after_first = service.tasks().to_vec();
    let revision = service.revision();

    assert!(!service.delete_task(b.as_str()));
    assert_eq!(service.tasks(), after_first.as_slice());
    assert_eq!(service.revision(), revision);
    assert_eq!(texts(&service), ["a", "c"]);
}

#[test]
fn reorder_then_inverse_reorder_restores_order() {
    let repo = MemorySlotRepository::new();
    let mut service = TaskService::open(&repo);
    for text in ["a", "b", "c", "d", "e"] {
        service.add_task(text);
    }
    let original = service.tasks().to_vec();

    for (i, j) in [(0, 4), (4, 0), (1, 3), (3, 2), (2, 0)] {
        assert!(service.reorder_tasks(i, j));
        assert!(service.reorder_tasks(j, i));
        assert_eq!(service.tasks(), original.as_slice(), "reorder({i}, {j})");
    }
}

#[test]
fn persisted_format_round_trips_field_for_field() {
    let repo = MemorySlotRepository::new();
    let mut service = TaskService::open(&repo);
    let id = service.add_task("Buy milk");
    service.add_task("Walk dog");
    service.toggle_task(id.as_str());

    let raw = repo.raw_slot(TASKS_SLOT_KEY).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &value[0];
    assert_eq!(first["id"], id.as_str());
    assert_eq!(first["text"], "Buy milk");
    assert_eq!(first["completed"], true);
    assert!(first["createdAt"].is_i64());

    let decoded: Vec<Task> = serde_json::from_str(&raw).unwrap();
    assert_eq!(decoded, service.tasks());
    assert_eq!(serde_json::to_string(&decoded).unwrap(), raw);
}

#[test]
fn user_scenario_from_empty_list() {
    let repo = MemorySlotRepository::new();
    let mut service = TaskService::open(&repo);
    assert!(service.tasks().is_empty());

    let milk = service.add_task("Buy milk");
    assert_eq!(texts(&service), ["Buy milk"]);
    assert!(!service.tasks()[0].completed);

    service.toggle_task(milk.as_str());
    assert!(service.tasks()[0].completed);

    let dog = service.add_task("Walk dog");
    assert_eq!(texts(&service), ["Buy milk", "Walk dog"]);

    service.reorder_tasks(0, 1);
    assert_eq!(texts(&service), ["Walk dog", "Buy milk"]);

    service.delete_task(dog.as_str());
    assert_eq!(texts(&service), ["Buy milk"]);
    assert_eq!(service.tasks()[0].id, milk);
    assert!(service.tasks()[0].completed);
}

#[test]
fn malformed_slot_falls_back_to_empty_collection() {
    for raw in ["not json", "{\"id\":1}", "[{\"text\":\"missing id\"}]"] {
        let repo = MemorySlotRepository::with_slot(TASKS_SLOT_KEY, raw);
        let mut service = TaskService::open(&repo);
        assert!(service.tasks().is_empty(), "slot {raw:?}");

        service.add_task("recovered");
        let stored: Vec<Task> =
            serde_json::from_str(&repo.raw_slot(TASKS_SLOT_KEY).unwrap()).unwrap();
        assert_eq!(stored.len(), 1);
    }
}

#[test]
fn legacy_slot_written_by_earlier_sessions_is_loaded() {
    let repo = MemorySlotRepository::with_slot(
        TASKS_SLOT_KEY,
        r#"[{"id":"1700000000000k3j2h1g0f","text":"Old task","completed":true,"createdAt":1700000000000}]"#,
    );
    let mut service = TaskService::open(&repo);

    assert_eq!(service.tasks().len(), 1);
    assert!(service.toggle_task("1700000000000k3j2h1g0f"));
    assert!(!service.tasks()[0].completed);
}

#[test]
fn independent_instances_on_one_slot_diverge_until_reopened() {
    let repo = MemorySlotRepository::new();
    let mut first = TaskService::open(repo.clone());
    let second = TaskService::open(repo.clone());

    first.add_task("written by first");
    assert!(second.tasks().is_empty());

    let reopened = TaskService::open(repo);
    assert_eq!(reopened.tasks(), first.tasks());
}

#[test]
fn collection_survives_reopening_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("taskpad.sqlite3");

    let expected = {
        let conn = open_db(&path).unwrap();
        let mut service = TaskService::open(SqliteSlotRepository::new(&conn));
        let a = service.add_task("a");
        service.add_task("b");
        service.add_task("c");
        service.toggle_task(a.as_str());
        service.reorder_tasks(2, 0);
        let snapshot = service.tasks().to_vec();
        snapshot
    };

    let conn = open_db(&path).unwrap();
    let service = TaskService::open(SqliteSlotRepository::new(&conn));
    assert_eq!(service.tasks(), expected.as_slice());
    assert_eq!(texts(&service), ["c", "a", "b"]);
}

#[test]
fn corrupt_sqlite_slot_is_absorbed() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteSlotRepository::new(&conn);
    repo.write_slot(TASKS_SLOT_KEY, "[{broken").unwrap();

    let service = TaskService::open(repo);
    assert!(service.tasks().is_empty());
}

/// Storage that keeps its data but fails the first read.
struct FlakyReadRepo {
    inner: MemorySlotRepository,
    reads_to_fail: std::cell::Cell<u32>,
}

impl SlotRepository for FlakyReadRepo {
    fn read_slot(&self, key: &str) -> RepoResult<Option<String>> {
        let remaining = self.reads_to_fail.get();
        if remaining > 0 {
            self.reads_to_fail.set(remaining - 1);
            return Err(RepoError::Unavailable("storage busy".to_string()));
        }
        self.inner.read_slot(key)
    }

    fn write_slot(&self, key: &str, value: &str) -> RepoResult<()> {
        self.inner.write_slot(key, value)
    }

    fn remove_slot(&self, key: &str) -> RepoResult<()> {
        self.inner.remove_slot(key)
    }
}

#[test]
fn unreadable_slot_is_not_overwritten_by_later_changes() {
    let inner = MemorySlotRepository::new();
    {
        let mut seed = TaskService::open(&inner);
        for text in ["a", "b", "c"] {
            seed.add_task(text);
        }
    }
    let stored = inner.raw_slot(TASKS_SLOT_KEY).unwrap();

    let repo = FlakyReadRepo {
        inner: inner.clone(),
        reads_to_fail: std::cell::Cell::new(1),
    };
    let mut service = TaskService::open(&repo);
    assert!(service.load_failed());
    assert!(service.tasks().is_empty());

    service.add_task("d");
    assert_eq!(texts(&service), ["d"]);
    assert_eq!(inner.raw_slot(TASKS_SLOT_KEY).unwrap(), stored);

    let recovered = TaskService::open(&repo);
    assert!(!recovered.load_failed());
    assert_eq!(texts(&recovered), ["a", "b", "c"]);
}
