//! Factotum – a fact store behind a disambiguating menu.
//!
//! Factotum keeps everything it knows as *triples*: `(subject, predicate,
//! value)` facts, where:
//! * A [`construct::Subject`] is an opaque identity (a simple `u64`),
//!   handed out monotonically by the [`construct::SubjectGenerator`] and
//!   never reused.
//! * A *record* ([`construct::Record`]) is the field map derived for one
//!   subject by grouping its triples.
//! * A *sigil* ([`tag::TagRegistry`]) is the short prefix that identifies a
//!   predicate inside a canonical string, such as `.` for `short`.
//!
//! A record renders to a *canonical string* (`firefox "open .f`) and that
//! very string parses back into a [`query::Query`] that resolves to the
//! record it came from. Queries are conjunctions of equality constraints,
//! answered by intersecting bitmap sets from the inverted
//! [`construct::PredicateIndex`].
//!
//! ## Modules
//! * [`construct`] – Triples, the store, both derived indices, the subject
//!   generator and the [`construct::Database`] context object.
//! * [`tag`] – The sigil bijection and token grammar.
//! * [`query`] – Parsing, evaluation and canonical rendering.
//! * [`resolve`] – The zero/one/many resolution protocol around the chooser.
//! * [`action`] – Named handlers, dispatched by a record's `action` field.
//! * [`chooser`] – The external chooser trait and a dmenu-style pipe.
//! * [`persist`] – JSON snapshot save/restore with a blake3 seal.
//! * [`settings`] – Snapshot path and chooser configuration.
//!
//! ## Quick Start
//! ```
//! use factotum::construct::Database;
//! use factotum::persist::{PersistenceMode, Persistor};
//! use factotum::query::{Engine, Query};
//! use factotum::tag::TagRegistry;
//! let persistor = Persistor::new(PersistenceMode::InMemory);
//! let mut database = Database::new(persistor, TagRegistry::standard().unwrap()).unwrap();
//! database.add_entry("browser", &[(String::from("short"), String::from("b"))]);
//! let engine = Engine::new(&database);
//! let matches = engine.evaluate(&Query::new().with("name", "browser"));
//! assert_eq!(matches.len(), 1);
//! ```
//!
//! ## Persistence
//! The store and the id counter are written as one human-inspectable JSON
//! snapshot at the end of a run and read back at the start of the next;
//! nothing is written in between. Two processes sharing a snapshot race
//! last-writer-wins, which is an accepted limitation of the single-user
//! model rather than something the store guards against.

pub mod action;
pub mod chooser;
pub mod construct;
pub mod error;
pub mod persist;
pub mod query;
pub mod resolve;
pub mod settings;
pub mod tag;
