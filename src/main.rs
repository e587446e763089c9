use std::env;
use std::path::Path;
use std::process;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use factotum::action::ActionRegistry;
use factotum::chooser::{Chooser, CommandChooser};
use factotum::construct::{Database, ITEM, SHORT, TYPE};
use factotum::error::{FactotumError, Result};
use factotum::persist::{PersistenceMode, Persistor};
use factotum::query::{Engine, Query};
use factotum::resolve::{Resolution, Resolver};
use factotum::settings::Settings;
use factotum::tag::TagRegistry;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    if let Err(error) = run() {
        tracing::error!(%error, "fatal");
        eprintln!("factotum: {error}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let settings = Settings::load()?;
    let persistor = Persistor::new(PersistenceMode::File(settings.snapshot.clone()));
    let mut database = Database::new(persistor, TagRegistry::standard()?)?;
    let mut actions = ActionRegistry::new();
    register_builtin_actions(&mut actions, &mut database, &settings);

    let arguments: Vec<String> = env::args().skip(1).collect();
    match arguments.split_first() {
        None => menu(&mut database, &actions, &settings)?,
        Some((command, rest)) => match command.as_str() {
            "add" => add(&mut database, rest)?,
            "file" => file(&mut database, rest)?,
            other => {
                return Err(FactotumError::Config(format!("unknown command: {other}")));
            }
        },
    }

    // the one and only write; losing it must be loud
    database.save()
}

/// The interactive flow: list every item canonically, let the user pick or
/// type a query, resolve it to one record and dispatch its action.
fn menu(database: &mut Database, actions: &ActionRegistry, settings: &Settings) -> Result<()> {
    let mut chooser = CommandChooser::new(&settings.menu_program, &settings.menu_arguments);
    let entries: Vec<String> = {
        let engine = Engine::new(database);
        let items = engine.evaluate(&Query::new().with(TYPE, ITEM));
        engine
            .project(&items, &[])
            .iter()
            .map(|record| engine.canonical(record))
            .collect()
    };
    let Some(selection) = chooser.choose(&entries, &settings.prompt)? else {
        debug!("menu cancelled");
        return Ok(());
    };
    let query = Query::parse(&selection, database.tags())?;
    let resolution = {
        let mut resolver = Resolver::new(database, &mut chooser)
            .require(TYPE, ITEM)
            .with_prompt(&settings.prompt);
        resolver.resolve(query)?
    };
    match resolution {
        Resolution::Resolved(record) => {
            info!(subject = record.subject(), "resolved");
            actions.dispatch(database, &record)?;
        }
        Resolution::NotFound => println!("no matching entry"),
        Resolution::Cancelled => debug!("resolution cancelled"),
    }
    Ok(())
}

/// `factotum add <name> [<sigil><value>...]`
fn add(database: &mut Database, arguments: &[String]) -> Result<()> {
    let Some((name, tagged)) = arguments.split_first() else {
        return Err(FactotumError::Config(String::from(
            "add needs a name and optional tagged fields",
        )));
    };
    let mut tags = Vec::new();
    for token in tagged {
        let (predicate, value) = database.tags().split_token(token)?;
        tags.push((predicate.to_string(), value.to_string()));
    }
    database.add_entry(name, &tags);
    Ok(())
}

/// `factotum file <path> <kind>`
fn file(database: &mut Database, arguments: &[String]) -> Result<()> {
    match arguments {
        [path, kind] => {
            database.add_file(Path::new(path), kind)?;
            Ok(())
        }
        _ => Err(FactotumError::Config(String::from(
            "file needs a path and a kind",
        ))),
    }
}

fn register_builtin_actions(
    actions: &mut ActionRegistry,
    database: &mut Database,
    settings: &Settings,
) {
    // rm: remove the resolved record from the menu
    actions.register(
        database,
        "rm",
        Box::new(|database, record| {
            database.delete_subject(record.subject());
            Ok(())
        }),
    );
    // cs: change the shortcut of the resolved record; the empty candidate
    // list turns the chooser into a free-text prompt
    let program = settings.menu_program.clone();
    let arguments = settings.menu_arguments.clone();
    actions.register(
        database,
        "cs",
        Box::new(move |database, record| {
            let mut chooser = CommandChooser::new(&program, &arguments);
            let Some(short) = chooser.choose(&[], "new shortcut")? else {
                return Ok(());
            };
            database.change_field(record.subject(), SHORT, &short);
            Ok(())
        }),
    );
}
