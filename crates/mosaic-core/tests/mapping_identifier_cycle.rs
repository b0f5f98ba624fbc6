use mosaic_core::boot::{IdClass, Identifier, PersistentClass, Property, ToOne};
use mosaic_core::mapping::{AttributeMapping, EntityIdentifierMapping, ForeignKeyDescriptor};
use mosaic_core::{BootModel, Metamodel, Type, Value};

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std_util::prelude::*;

fn build(classes: Vec<PersistentClass>) -> mosaic_core::Result<Arc<Metamodel>> {
    let boot = classes
        .into_iter()
        .fold(BootModel::new(), |boot, class| boot.entity(class));

    Metamodel::builder().build(&boot)
}

fn order() -> PersistentClass {
    PersistentClass::new("Order")
        .table("orders")
        .id(Identifier::simple("id", Type::I64, "id"))
}

fn order_line(identifier: Identifier) -> PersistentClass {
    PersistentClass::new("OrderLine")
        .table("order_lines")
        .id(identifier)
        .property(Property::basic("quantity", Type::I32, "quantity"))
}

fn line_identifier() -> Identifier {
    Identifier::non_aggregated(vec![
        Property::new("order", ToOne::many_to_one("Order")),
        Property::basic("line_no", Type::I32, "line_no"),
    ])
}

#[test]
fn identifiers_referencing_each_other_deadlock() {
    let a = PersistentClass::new("A")
        .table("a")
        .id(Identifier::non_aggregated(vec![Property::new(
            "b",
            ToOne::many_to_one("B"),
        )]));

    let b = PersistentClass::new("B")
        .table("b")
        .id(Identifier::non_aggregated(vec![Property::new(
            "a",
            ToOne::many_to_one("A"),
        )]));

    let err = build(vec![a, b]).unwrap_err();
    assert!(err.is_creation_deadlock(), "{err}");

    let stuck = err.stuck_steps().unwrap();
    let names: Vec<_> = stuck.iter().map(|step| step.name.as_str()).collect();

    assert!(
        names.iter().any(|name| name.ends_with("#keySelectables")),
        "{names:?}"
    );
    assert!(names.iter().any(|name| name.starts_with("ToOneAttributeMapping(A.")), "{names:?}");
    assert!(names.iter().any(|name| name.starts_with("ToOneAttributeMapping(B.")), "{names:?}");

    for step in stuck {
        assert_ne!(step.waiting_on, "nothing", "{} reported no reason", step.name);
    }
}

#[test]
fn key_to_one_identifier_resolves() {
    let mm = build(vec![order_line(line_identifier()), order()]).unwrap();

    let line = mm.entity_by_name("OrderLine").unwrap();
    let identifier = line.identifier().unwrap();

    assert_eq!(identifier.role().full_path(), "OrderLine.{id}");
    assert!(!identifier.is_simple());

    let columns: Vec<_> = identifier
        .selectables(&mm)
        .unwrap()
        .iter()
        .map(|selectable| selectable.name.clone())
        .collect();
    assert_eq!(columns, ["order_id", "line_no"]);

    let fk = mm.foreign_key_of("OrderLine.{id}.order").unwrap();
    assert_eq!(fk.association_key().to_string(), "(order_lines, [order_id])");
    assert_eq!(fk.target_table(), "orders");
}

#[test]
fn key_to_one_identifier_resolves_in_any_declaration_order() {
    let shipment = PersistentClass::new("Shipment")
        .table("shipments")
        .id(Identifier::simple("id", Type::I64, "id"))
        .property(Property::new("line", ToOne::many_to_one("OrderLine")));

    for seed in 0..12 {
        let mut classes = vec![shipment.clone(), order_line(line_identifier()), order()];
        classes.shuffle_with_seed(seed);

        let mm = build(classes).unwrap_or_else(|err| panic!("seed={seed}: {err}"));
        let fk = mm.foreign_key_of("Shipment.line").unwrap();

        assert_eq!(fk.target_table(), "order_lines", "seed={seed}");
        assert_eq!(fk.column_count(), 2, "seed={seed}");
    }
}

#[test]
fn composite_key_with_key_to_one_can_be_referenced() {
    let shipment = PersistentClass::new("Shipment")
        .table("shipments")
        .id(Identifier::simple("id", Type::I64, "id"))
        .property(Property::new("line", ToOne::many_to_one("OrderLine")));

    let mm = build(vec![shipment, order_line(line_identifier()), order()]).unwrap();

    let ForeignKeyDescriptor::Embedded(fk) = mm.foreign_key_of("Shipment.line").unwrap() else {
        panic!("expected an embedded foreign key");
    };

    let key_columns: Vec<_> = fk
        .key
        .selectables
        .iter()
        .map(|selectable| selectable.name.as_str())
        .collect();
    assert_eq!(key_columns, ["line_order_id", "line_line_no"]);

    // The key-side composite mirrors the key to-one with the sliced column,
    // sharing the original's foreign key target.
    let key = mm.embeddable(fk.key_embeddable);
    let Some(AttributeMapping::ToOne(mirrored)) = key.attribute("order").unwrap() else {
        panic!("expected a mirrored to-one");
    };

    let mirrored_columns: Vec<_> = mirrored
        .key_selectables()
        .unwrap()
        .iter()
        .map(|selectable| selectable.name.as_str())
        .collect();
    assert_eq!(mirrored_columns, ["line_order_id"]);
    assert_eq!(mirrored.key_table, "shipments");
}

#[test]
fn virtual_identifier_assembles_to_a_record() {
    let mm = build(vec![order_line(line_identifier()), order()]).unwrap();
    let identifier = mm.entity_by_name("OrderLine").unwrap().identifier().unwrap();

    let EntityIdentifierMapping::NonAggregatedComposite(non_aggregated) = identifier else {
        panic!("expected a non-aggregated identifier");
    };
    assert_eq!(non_aggregated.id_class, None);

    let value = identifier
        .assemble(&mm, &[Value::I64(7), Value::I32(2)])
        .unwrap();
    assert_eq!(
        value,
        Value::Record(vec![Value::reference("Order", Value::I64(7)), Value::I32(2)])
    );
}

#[test]
fn id_class_names_the_assembled_type() {
    let identifier =
        line_identifier().with_id_class(IdClass::new("OrderLineId", &["order", "line_no"]));
    let mm = build(vec![order_line(identifier), order()]).unwrap();

    let identifier = mm.entity_by_name("OrderLine").unwrap().identifier().unwrap();
    let EntityIdentifierMapping::NonAggregatedComposite(non_aggregated) = identifier else {
        panic!("expected a non-aggregated identifier");
    };

    assert_eq!(non_aggregated.id_class.as_deref(), Some("OrderLineId"));
    assert_eq!(
        mm.embeddable(non_aggregated.embeddable).type_name.as_deref(),
        Some("OrderLineId")
    );
}

#[test]
fn id_class_with_extra_attribute() {
    let identifier = line_identifier().with_id_class(IdClass::new(
        "OrderLineId",
        &["order", "line_no", "revision"],
    ));

    let err = build(vec![order_line(identifier), order()]).unwrap_err();

    assert!(err.is_invalid_mapping());
    assert!(
        err.to_string()
            .contains("id class `OrderLineId` declares `revision`"),
        "{err}"
    );
}

#[test]
fn id_class_missing_an_attribute() {
    let identifier = line_identifier().with_id_class(IdClass::new("OrderLineId", &["order"]));

    let err = build(vec![order_line(identifier), order()]).unwrap_err();

    assert!(err.is_invalid_mapping());
    assert!(
        err.to_string()
            .contains("identifier attribute `line_no` has no match in id class `OrderLineId`"),
        "{err}"
    );
}
