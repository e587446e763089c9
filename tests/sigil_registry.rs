use factotum::construct::{ACTION, NAME, SHORT};
use factotum::error::FactotumError;
use factotum::query::Query;
use factotum::tag::TagRegistry;

#[test]
fn standard_registry_is_a_bijection() {
    let tags = TagRegistry::standard().expect("registry");
    assert_eq!(tags.len(), 3);
    for predicate in [NAME, ACTION, SHORT] {
        let sigil = tags.sigil_of(predicate).expect("registered");
        assert_eq!(tags.predicate_of_sigil(sigil).expect("reverse"), predicate);
    }
}

#[test]
fn duplicate_sigils_are_rejected() {
    let err = TagRegistry::new(&[("name", ""), ("short", "."), ("alias", ".")]).unwrap_err();
    assert!(matches!(err, FactotumError::Invariant(_)));
}

#[test]
fn duplicate_predicates_are_rejected() {
    let err = TagRegistry::new(&[("name", ""), ("short", "."), ("short", ",")]).unwrap_err();
    assert!(matches!(err, FactotumError::Invariant(_)));
}

#[test]
fn the_empty_sigil_belongs_to_name() {
    // no name predicate at all
    let err = TagRegistry::new(&[("short", ".")]).unwrap_err();
    assert!(matches!(err, FactotumError::Invariant(_)));
    // name with a visible sigil
    let err = TagRegistry::new(&[("name", "@")]).unwrap_err();
    assert!(matches!(err, FactotumError::Invariant(_)));
}

#[test]
fn tokens_split_on_the_longest_sigil() {
    let tags =
        TagRegistry::new(&[("name", ""), ("short", "."), ("alias", "..")]).expect("registry");
    assert_eq!(tags.split_token(".f").expect("split"), ("short", "f"));
    assert_eq!(tags.split_token("..f").expect("split"), ("alias", "f"));
}

#[test]
fn unknown_sigils_fail_the_parse() {
    let tags = TagRegistry::standard().expect("registry");
    let err = tags.split_token("xfire").unwrap_err();
    assert!(matches!(err, FactotumError::UnknownSigil { .. }));
    let err = Query::parse("foo ~bar", &tags).unwrap_err();
    assert!(matches!(err, FactotumError::UnknownSigil { .. }));
}

#[test]
fn parse_keeps_constraints_in_supplied_order() {
    let tags = TagRegistry::standard().expect("registry");
    let query = Query::parse("foo .f \"open", &tags).expect("parse");
    let constraints: Vec<(&str, &str)> = query
        .constraints()
        .iter()
        .map(|(predicate, value)| (predicate.as_str(), value.as_str()))
        .collect();
    assert_eq!(
        constraints,
        vec![("name", "foo"), ("short", "f"), ("action", "open")]
    );
}

#[test]
fn empty_queries_are_parse_errors() {
    let tags = TagRegistry::standard().expect("registry");
    let err = Query::parse("   ", &tags).unwrap_err();
    assert!(matches!(err, FactotumError::Parse { .. }));
}
