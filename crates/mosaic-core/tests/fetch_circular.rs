use mosaic_core::boot::{Collection, Identifier, PersistentClass, Property, ToOne};
use mosaic_core::fetch::{DomainResult, FetchKind};
use mosaic_core::{BootModel, FetchGraph, Metamodel, Type};

use pretty_assertions::assert_eq;
use std::sync::Arc;

fn build(classes: Vec<PersistentClass>) -> Arc<Metamodel> {
    let boot = classes
        .into_iter()
        .fold(BootModel::new(), |boot, class| boot.entity(class));

    Metamodel::builder().build(&boot).unwrap()
}

fn entity(name: &str, table: &str) -> PersistentClass {
    PersistentClass::new(name)
        .table(table)
        .id(Identifier::simple("id", Type::I64, "id"))
}

fn kind<'a>(result: &'a DomainResult, path: &str) -> &'a FetchKind {
    &result
        .find(path)
        .unwrap_or_else(|| panic!("no fetch at `{path}`; fetches={:#?}", result.fetches))
        .kind
}

fn referenced(kind: &FetchKind) -> &str {
    match kind {
        FetchKind::Circular { referenced } | FetchKind::BidirectionalCircular { referenced } => {
            referenced.full_path()
        }
        other => panic!("expected a circular fetch, got {other:?}"),
    }
}

fn person_and_passport() -> Vec<PersistentClass> {
    vec![
        entity("Person", "people").property(Property::new(
            "passport",
            ToOne::one_to_one("Passport").mapped_by("owner"),
        )),
        entity("Passport", "passports").property(Property::new(
            "owner",
            ToOne::one_to_one("Person").column("person_id"),
        )),
    ]
}

#[test]
fn self_reference_stops_at_the_second_hop() {
    let mm = build(vec![entity("Employee", "employees")
        .property(Property::basic("name", Type::String, "name"))
        .property(Property::new(
            "manager",
            ToOne::many_to_one("Employee").column("manager_id"),
        ))]);

    let result = FetchGraph::builder(&mm).build("Employee").unwrap();

    assert_eq!(result.path.full_path(), "Employee");
    assert!(matches!(kind(&result, "Employee.name"), FetchKind::Basic));
    assert!(matches!(
        kind(&result, "Employee.manager"),
        FetchKind::Entity { .. }
    ));

    let nested = result.find("Employee.manager.manager").unwrap();
    assert!(nested.is_circular());
    assert!(matches!(nested.kind, FetchKind::Circular { .. }));
    assert_eq!(referenced(&nested.kind), "Employee.manager");

    assert!(result.find("Employee.manager.manager.manager").is_none());
}

#[test]
fn bidirectional_one_to_one_points_back_at_the_root() {
    let mm = build(person_and_passport());

    let from_person = FetchGraph::builder(&mm).build("Person").unwrap();
    assert!(matches!(
        kind(&from_person, "Person.passport"),
        FetchKind::Entity { .. }
    ));

    let back = kind(&from_person, "Person.passport.owner");
    assert!(matches!(back, FetchKind::BidirectionalCircular { .. }));
    assert_eq!(referenced(back), "Person");

    let from_passport = FetchGraph::builder(&mm).build("Passport").unwrap();
    let back = kind(&from_passport, "Passport.owner.passport");
    assert!(matches!(back, FetchKind::BidirectionalCircular { .. }));
    assert_eq!(referenced(back), "Passport");
}

#[test]
fn bidirectional_detection_holds_at_any_depth_limit() {
    let mm = build(person_and_passport());

    for max_depth in 3..6 {
        let result = FetchGraph::builder(&mm)
            .max_depth(max_depth)
            .build("Person")
            .unwrap();

        assert_eq!(
            referenced(kind(&result, "Person.passport.owner")),
            "Person",
            "max_depth={max_depth}"
        );
        assert!(result.find("Person.passport.owner.passport").is_none());
    }
}

#[test]
fn collection_elements_point_back_at_their_owner() {
    let mm = build(vec![
        entity("Customer", "customers").property(
            Property::new(
                "orders",
                Collection::one_to_many("Order").mapped_by("customer"),
            )
            .eager(),
        ),
        entity("Order", "orders").property(Property::new(
            "customer",
            ToOne::many_to_one("Customer").column("customer_id"),
        )),
    ]);

    let result = FetchGraph::builder(&mm).build("Customer").unwrap();

    assert!(matches!(
        kind(&result, "Customer.orders"),
        FetchKind::Collection { .. }
    ));

    let back = kind(&result, "Customer.orders.{element}.customer");
    assert!(matches!(back, FetchKind::BidirectionalCircular { .. }));
    assert_eq!(referenced(back), "Customer");
}

#[test]
fn collections_are_delayed_by_default() {
    let mm = build(vec![
        entity("Customer", "customers").property(Property::new(
            "orders",
            Collection::one_to_many("Order").mapped_by("customer"),
        )),
        entity("Order", "orders").property(Property::new(
            "customer",
            ToOne::many_to_one("Customer").column("customer_id"),
        )),
    ]);

    let result = FetchGraph::builder(&mm).build("Customer").unwrap();
    assert_eq!(kind(&result, "Customer.orders"), &FetchKind::Delayed);
}

#[test]
fn joins_stop_at_the_depth_limit() {
    let mm = build(vec![
        entity("A", "a").property(Property::new("b", ToOne::many_to_one("B"))),
        entity("B", "b").property(Property::new("c", ToOne::many_to_one("C"))),
        entity("C", "c").property(Property::new("d", ToOne::many_to_one("D"))),
        entity("D", "d").property(Property::basic("label", Type::String, "label")),
    ]);

    let result = FetchGraph::builder(&mm).max_depth(2).build("A").unwrap();

    assert!(matches!(kind(&result, "A.b"), FetchKind::Entity { .. }));
    assert!(matches!(kind(&result, "A.b.c"), FetchKind::Entity { .. }));
    assert_eq!(kind(&result, "A.b.c.d"), &FetchKind::Delayed);

    let deeper = FetchGraph::builder(&mm).max_depth(3).build("A").unwrap();
    assert!(matches!(kind(&deeper, "A.b.c.d"), FetchKind::Entity { .. }));
    assert!(matches!(kind(&deeper, "A.b.c.d.label"), FetchKind::Basic));
}

#[test]
fn lazy_associations_are_delayed() {
    let mm = build(vec![
        entity("Employee", "employees").property(
            Property::new(
                "manager",
                ToOne::many_to_one("Employee").column("manager_id"),
            )
            .lazy(),
        ),
    ]);

    let result = FetchGraph::builder(&mm).build("Employee").unwrap();
    assert_eq!(kind(&result, "Employee.manager"), &FetchKind::Delayed);
}

#[test]
fn unknown_entity() {
    let mm = build(vec![entity("Employee", "employees")]);

    let err = FetchGraph::builder(&mm).build("Manager").unwrap_err();
    assert_eq!(err.to_string(), "unknown entity `Manager`");
}
