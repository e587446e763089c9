use factotum::construct::{ACTION, Database, SHORT, TYPE};
use factotum::persist::{PersistenceMode, Persistor};
use factotum::query::{Engine, Query, ResultSet};
use factotum::tag::TagRegistry;

fn setup() -> Database {
    Database::new(
        Persistor::new(PersistenceMode::InMemory),
        TagRegistry::standard().expect("registry"),
    )
    .expect("database")
}

#[test]
fn the_name_comes_first_and_sigils_sort_the_rest() {
    let mut database = setup();
    let subject = database.add_entry(
        "fire",
        &[
            (SHORT.to_string(), "f".to_string()),
            (ACTION.to_string(), "open".to_string()),
        ],
    );
    let record = database.record(subject).expect("record").clone();
    let engine = Engine::new(&database);
    // '"' sorts before '.', whatever order the fields were supplied in
    assert_eq!(engine.canonical(&record), "fire \"open .f");
}

#[test]
fn unregistered_predicates_are_not_rendered() {
    let mut database = setup();
    let subject = database.add_entry("fire", &[(SHORT.to_string(), "f".to_string())]);
    let record = database.record(subject).expect("record").clone();
    assert!(record.get(TYPE).is_some());
    let engine = Engine::new(&database);
    assert_eq!(engine.canonical(&record), "fire .f");
}

#[test]
fn canonical_strings_resolve_back_to_their_own_record() {
    let mut database = setup();
    let first = database.add_entry("foo", &[(SHORT.to_string(), "f".to_string())]);
    let second = database.add_entry("foo", &[(SHORT.to_string(), "g".to_string())]);
    let engine = Engine::new(&database);
    for subject in [first, second] {
        let record = database.record(subject).expect("record").clone();
        let rendered = engine.canonical(&record);
        let query = Query::parse(&rendered, database.tags()).expect("parse");
        assert_eq!(engine.evaluate(&query), ResultSet::One(subject));
    }
}
