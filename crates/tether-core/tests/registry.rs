//! Declaration catalog behavior: duplicate rejection, flipped-order
//! duplicates, tag independence, and identity-equal retrieval.

use std::rc::Rc;

use tether_core::{Config, ItemToItem, Registry, RegistryError, StoreError, TypeSet, db};

fn content_types() -> Rc<TypeSet> {
    let mut types = TypeSet::new();
    types.register("post").register("car").register("tire");
    Rc::new(types)
}

fn test_registry() -> Registry {
    let conn = Rc::new(db::open_in_memory().expect("open in-memory db"));
    Registry::new(conn, content_types())
}

#[test]
fn undeclared_relationships_do_not_exist() {
    let registry = test_registry();

    assert!(!registry.item_item_exists("post", "post", "basic"));
    assert!(registry.get_item_item("post", "post", "basic").is_none());
    assert!(!registry.item_principal_exists("post", "owner"));
    assert!(registry.get_item_principal("post", "owner").is_none());
}

#[test]
fn lookup_never_constructs() {
    let registry = test_registry();

    // A failed lookup must not declare the relationship as a side effect.
    assert!(registry.get_item_item("post", "post", "basic").is_none());
    assert!(!registry.item_item_exists("post", "post", "basic"));
}

#[test]
fn relationships_can_be_declared() {
    let mut registry = test_registry();

    let store = registry
        .declare_item_item("post", "post", "basic")
        .expect("declare post-post");
    assert_eq!(store.from_type(), "post");
    assert_eq!(store.to_type(), "post");
    assert_eq!(store.tag(), "basic");
    assert!(registry.item_item_exists("post", "post", "basic"));

    let owners = registry
        .declare_item_principal("post", "owner")
        .expect("declare post-owner");
    assert_eq!(owners.item_type(), "post");
    assert!(registry.item_principal_exists("post", "owner"));
}

#[test]
fn duplicate_declarations_fail() {
    let mut registry = test_registry();

    registry
        .declare_item_item("post", "post", "basic")
        .expect("first declaration");
    let err = registry
        .declare_item_item("post", "post", "basic")
        .expect_err("second declaration must fail");
    assert!(matches!(err, RegistryError::DuplicateItemItem { .. }));

    registry
        .declare_item_principal("post", "owner")
        .expect("first declaration");
    let err = registry
        .declare_item_principal("post", "owner")
        .expect_err("second declaration must fail");
    assert!(matches!(err, RegistryError::DuplicateItemPrincipal { .. }));
}

#[test]
fn flipped_order_is_still_a_duplicate() {
    let mut registry = test_registry();

    registry
        .declare_item_item("post", "car", "basic")
        .expect("declare post-car");
    let err = registry
        .declare_item_item("car", "post", "basic")
        .expect_err("flipped declaration must fail");
    assert!(matches!(err, RegistryError::DuplicateItemItem { .. }));
}

#[test]
fn distinct_tags_on_the_same_types_are_independent() {
    let mut registry = test_registry();

    let first = registry
        .declare_item_item("post", "post", "type1")
        .expect("declare type1");
    let second = registry
        .declare_item_item("post", "post", "type2")
        .expect("declare type2");

    assert!(!Rc::ptr_eq(&first, &second));
    assert!(Rc::ptr_eq(
        &first,
        &registry
            .get_item_item("post", "post", "type1")
            .expect("type1 declared")
    ));
    assert!(Rc::ptr_eq(
        &second,
        &registry
            .get_item_item("post", "post", "type2")
            .expect("type2 declared")
    ));
}

#[test]
fn retrieval_returns_the_declared_instance() {
    let mut registry = test_registry();

    // Declare every combination so a lookup cannot be right by luck.
    let pp = registry.declare_item_item("post", "post", "basic").expect("pp");
    let pc = registry.declare_item_item("post", "car", "basic").expect("pc");
    let pt = registry.declare_item_item("post", "tire", "basic").expect("pt");
    let ct = registry.declare_item_item("car", "tire", "basic").expect("ct");
    let cc = registry.declare_item_item("car", "car", "basic").expect("cc");

    assert!(Rc::ptr_eq(
        &pp,
        &registry.get_item_item("post", "post", "basic").expect("pp")
    ));
    assert!(Rc::ptr_eq(
        &pt,
        &registry.get_item_item("post", "tire", "basic").expect("pt")
    ));
    assert!(Rc::ptr_eq(
        &cc,
        &registry.get_item_item("car", "car", "basic").expect("cc")
    ));

    // Argument order must not matter.
    assert!(Rc::ptr_eq(
        &pc,
        &registry.get_item_item("car", "post", "basic").expect("pc flipped")
    ));
    let forward = registry.get_item_item("car", "tire", "basic").expect("ct");
    let flipped = registry.get_item_item("tire", "car", "basic").expect("ct flipped");
    assert!(Rc::ptr_eq(&forward, &flipped));
    assert!(Rc::ptr_eq(&forward, &ct));
}

#[test]
fn directly_constructed_stores_are_separate_instances() {
    let mut registry = test_registry();

    let declared = registry
        .declare_item_item("tire", "tire", "basic")
        .expect("declare tire-tire");

    let conn = Rc::new(db::open_in_memory().expect("open in-memory db"));
    let separate = Rc::new(
        ItemToItem::new(conn, content_types(), "tire", "tire", "basic")
            .expect("construct directly"),
    );

    assert!(!Rc::ptr_eq(&declared, &separate));
}

#[test]
fn item_principal_retrieval_is_identity_equal() {
    let mut registry = test_registry();

    let owners = registry
        .declare_item_principal("post", "owner")
        .expect("declare post-owner");
    let contribs = registry
        .declare_item_principal("post", "contrib")
        .expect("declare post-contrib");
    let car_owners = registry
        .declare_item_principal("car", "owner")
        .expect("declare car-owner");

    assert!(Rc::ptr_eq(
        &owners,
        &registry.get_item_principal("post", "owner").expect("owners")
    ));
    assert!(Rc::ptr_eq(
        &contribs,
        &registry
            .get_item_principal("post", "contrib")
            .expect("contribs")
    ));
    assert!(Rc::ptr_eq(
        &car_owners,
        &registry.get_item_principal("car", "owner").expect("car owners")
    ));
    assert!(!Rc::ptr_eq(&owners, &contribs));
}

#[test]
fn unknown_entity_types_fail_declaration() {
    let mut registry = test_registry();

    let err = registry
        .declare_item_item("post", "fakecpt", "basic")
        .expect_err("unknown to_type must fail");
    match err {
        RegistryError::Store(StoreError::UnknownType(name)) => assert_eq!(name, "fakecpt"),
        other => panic!("expected UnknownType, got {other}"),
    }

    let err = registry
        .declare_item_principal("fakecpt", "owner")
        .expect_err("unknown item_type must fail");
    assert!(matches!(
        err,
        RegistryError::Store(StoreError::UnknownType(_))
    ));

    // A failed declaration must not occupy the key.
    assert!(!registry.item_item_exists("post", "fakecpt", "basic"));
}

#[test]
fn blank_tags_fail_declaration() {
    let mut registry = test_registry();

    let err = registry
        .declare_item_item("post", "post", "  ")
        .expect_err("blank tag must fail");
    assert!(matches!(err, RegistryError::Store(StoreError::EmptyTag)));
}

#[test]
fn opening_from_config_applies_strict_inserts() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let config = Config {
        db_path: dir.path().join("relationships.sqlite3"),
        strict_inserts: true,
        ..Config::default()
    };

    let mut types = TypeSet::new();
    types.register("post").assign(1, "post").assign(2, "post");

    let mut registry = Registry::open(&config, Rc::new(types)).expect("open from config");
    let store = registry
        .declare_item_item("post", "post", "basic")
        .expect("declare post-post");

    store.add_relationship(1, 2).expect("typed pair is accepted");
    let err = store
        .add_relationship(1, 99)
        .expect_err("strict default rejects an unassigned partner");
    assert!(matches!(err, StoreError::TypeMismatch { id: 99, .. }));
}

#[test]
fn registries_do_not_share_declarations() {
    let conn = Rc::new(db::open_in_memory().expect("open in-memory db"));
    let mut first = Registry::new(Rc::clone(&conn), content_types());
    let mut second = Registry::new(conn, content_types());

    first
        .declare_item_item("post", "post", "basic")
        .expect("declare in first");

    assert!(!second.item_item_exists("post", "post", "basic"));
    second
        .declare_item_item("post", "post", "basic")
        .expect("same key is free in the second registry");
}
