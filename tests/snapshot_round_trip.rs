use std::fs;
use std::path::PathBuf;

use factotum::construct::{Database, NAME, SHORT, Triple};
use factotum::error::FactotumError;
use factotum::persist::{PersistenceMode, Persistor, Snapshot};
use factotum::tag::TagRegistry;

#[test]
fn snapshots_round_trip() {
    let path = PathBuf::from("test_factotum_round_trip.json");
    let _ = fs::remove_file(&path);
    let triples = vec![
        Triple {
            subject: 1,
            predicate: NAME.to_string(),
            value: "foo".to_string(),
        },
        Triple {
            subject: 1,
            predicate: SHORT.to_string(),
            value: "f".to_string(),
        },
    ];
    let persistor = Persistor::new(PersistenceMode::File(path.clone()));
    persistor
        .save(&Snapshot::new(7, triples.clone()))
        .expect("save");
    let restored = persistor.load().expect("load").expect("snapshot");
    assert_eq!(restored.counter, 7);
    assert_eq!(restored.triples, triples);
    let _ = fs::remove_file(&path);
}

#[test]
fn in_memory_mode_neither_loads_nor_saves() {
    let persistor = Persistor::new(PersistenceMode::InMemory);
    assert!(persistor.load().expect("load").is_none());
    persistor.save(&Snapshot::new(0, Vec::new())).expect("save");
}

#[test]
fn restarts_keep_records_and_never_reuse_ids() {
    let path = PathBuf::from("test_factotum_restart.json");
    let _ = fs::remove_file(&path);
    let first_subject;
    {
        let mut database = Database::new(
            Persistor::new(PersistenceMode::File(path.clone())),
            TagRegistry::standard().expect("registry"),
        )
        .expect("database");
        first_subject = database.add_entry("foo", &[(SHORT.to_string(), "f".to_string())]);
        database.save().expect("save");
    }
    let mut database = Database::new(
        Persistor::new(PersistenceMode::File(path.clone())),
        TagRegistry::standard().expect("registry"),
    )
    .expect("database");
    let record = database.record(first_subject).expect("restored record");
    assert_eq!(record.get(NAME), Some("foo"));
    assert_eq!(record.get(SHORT), Some("f"));
    let next = database.add_entry("bar", &[]);
    assert!(next > first_subject);
    let _ = fs::remove_file(&path);
}

#[test]
fn tampered_snapshots_fail_to_load() {
    let path = PathBuf::from("test_factotum_tamper.json");
    let _ = fs::remove_file(&path);
    let persistor = Persistor::new(PersistenceMode::File(path.clone()));
    let triples = vec![Triple {
        subject: 1,
        predicate: NAME.to_string(),
        value: "foo".to_string(),
    }];
    persistor.save(&Snapshot::new(1, triples)).expect("save");
    let text = fs::read_to_string(&path).expect("read").replace("foo", "bar");
    fs::write(&path, &text).expect("write");
    let err = persistor.load().unwrap_err();
    assert!(matches!(err, FactotumError::DataCorruption { .. }));
    // dropping the seal makes the hand-edited snapshot loadable again
    let mut unsealed: serde_json::Value = serde_json::from_str(&text).expect("json");
    unsealed
        .as_object_mut()
        .expect("object")
        .remove("seal");
    fs::write(
        &path,
        serde_json::to_string_pretty(&unsealed).expect("render"),
    )
    .expect("write");
    let snapshot = persistor.load().expect("load").expect("snapshot");
    assert_eq!(snapshot.triples[0].value, "bar");
    let _ = fs::remove_file(&path);
}
