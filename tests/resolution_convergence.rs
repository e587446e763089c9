use factotum::chooser::Chooser;
use factotum::construct::{Database, ITEM, SHORT, TYPE};
use factotum::error::Result;
use factotum::persist::{PersistenceMode, Persistor};
use factotum::query::Query;
use factotum::resolve::{Resolution, Resolver};
use factotum::tag::TagRegistry;

/// Plays back a fixed list of selections and records what it was shown.
struct ScriptedChooser {
    selections: Vec<Option<String>>,
    shown: Vec<Vec<String>>,
}

impl ScriptedChooser {
    fn new(selections: &[Option<&str>]) -> Self {
        Self {
            selections: selections
                .iter()
                .map(|selection| selection.map(String::from))
                .collect(),
            shown: Vec::new(),
        }
    }
}

impl Chooser for ScriptedChooser {
    fn choose(&mut self, candidates: &[String], _prompt: &str) -> Result<Option<String>> {
        self.shown.push(candidates.to_vec());
        Ok(self.selections.remove(0))
    }
}

fn setup() -> Database {
    let mut database = Database::new(
        Persistor::new(PersistenceMode::InMemory),
        TagRegistry::standard().expect("registry"),
    )
    .expect("database");
    // two records sharing a name, differing in their shortcut
    database.add_entry("foo", &[(SHORT.to_string(), "f".to_string())]);
    database.add_entry("foo", &[(SHORT.to_string(), "g".to_string())]);
    database
}

#[test]
fn ambiguity_converges_after_one_choice() {
    let database = setup();
    let mut chooser = ScriptedChooser::new(&[Some("foo .g")]);
    let query = Query::parse("foo", database.tags()).expect("parse");
    let resolution = {
        let mut resolver = Resolver::new(&database, &mut chooser).require(TYPE, ITEM);
        resolver.resolve(query).expect("resolve")
    };
    let Resolution::Resolved(record) = resolution else {
        panic!("expected a resolved record");
    };
    assert_eq!(record.subject(), 2);
    assert_eq!(record.get(SHORT), Some("g"));
    assert_eq!(
        chooser.shown,
        vec![vec!["foo .f".to_string(), "foo .g".to_string()]]
    );
}

#[test]
fn unknown_names_are_not_found() {
    let database = setup();
    let mut chooser = ScriptedChooser::new(&[]);
    let query = Query::parse("bar", database.tags()).expect("parse");
    let mut resolver = Resolver::new(&database, &mut chooser).require(TYPE, ITEM);
    let resolution = resolver.resolve(query).expect("resolve");
    assert!(matches!(resolution, Resolution::NotFound));
}

#[test]
fn a_cancelled_chooser_ends_the_resolution() {
    let database = setup();
    let mut chooser = ScriptedChooser::new(&[None]);
    let query = Query::parse("foo", database.tags()).expect("parse");
    let mut resolver = Resolver::new(&database, &mut chooser).require(TYPE, ITEM);
    let resolution = resolver.resolve(query).expect("resolve");
    assert!(matches!(resolution, Resolution::Cancelled));
}

#[test]
fn a_partial_selection_re_enters_the_chooser() {
    // the user types "foo" again instead of picking a candidate; the
    // protocol tolerates the renewed ambiguity and asks once more
    let database = setup();
    let mut chooser = ScriptedChooser::new(&[Some("foo"), Some("foo .f")]);
    let query = Query::parse("foo", database.tags()).expect("parse");
    let resolution = {
        let mut resolver = Resolver::new(&database, &mut chooser).require(TYPE, ITEM);
        resolver.resolve(query).expect("resolve")
    };
    let Resolution::Resolved(record) = resolution else {
        panic!("expected a resolved record");
    };
    assert_eq!(record.subject(), 1);
    assert_eq!(chooser.shown.len(), 2);
}
