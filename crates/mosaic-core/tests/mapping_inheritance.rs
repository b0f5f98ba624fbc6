use mosaic_core::boot::{
    BasicValue, Identifier, InheritanceStrategy, PersistentClass, Property, ToOne,
};
use mosaic_core::context::Dialect;
use mosaic_core::{BootModel, Builder, Metamodel, Type, Value};

use pretty_assertions::assert_eq;
use std::sync::Arc;

fn build(classes: Vec<PersistentClass>) -> mosaic_core::Result<Arc<Metamodel>> {
    build_with(&Builder::new(), classes)
}

fn build_with(
    builder: &Builder,
    classes: Vec<PersistentClass>,
) -> mosaic_core::Result<Arc<Metamodel>> {
    let boot = classes
        .into_iter()
        .fold(BootModel::new(), |boot, class| boot.entity(class));

    builder.build(&boot)
}

fn columns(mm: &Metamodel, entity: &str) -> Vec<String> {
    mm.entity_by_name(entity)
        .unwrap()
        .selectables()
        .unwrap()
        .iter()
        .map(|selectable| format!("{}.{}", selectable.table, selectable.name))
        .collect()
}

fn animals() -> Vec<PersistentClass> {
    vec![
        PersistentClass::new("Animal")
            .table("animals")
            .id(Identifier::simple("id", Type::I64, "id"))
            .discriminator(BasicValue::new(Type::String, "kind"))
            .property(Property::basic("name", Type::String, "name")),
        PersistentClass::new("Dog")
            .extends("Animal")
            .property(Property::basic("barks", Type::Bool, "barks")),
        PersistentClass::new("Cat")
            .extends("Animal")
            .discriminator_value("C"),
    ]
}

#[test]
fn single_table_hierarchy_shares_the_root_table() {
    let mm = build(animals()).unwrap();

    let dog = mm.entity_by_name("Dog").unwrap();
    assert_eq!(dog.table, "animals");
    assert_eq!(dog.root, mm.entity_by_name("Animal").unwrap().id);
    assert!(!dog.is_root());

    let names: Vec<_> = dog
        .attributes()
        .unwrap()
        .iter()
        .map(|attr| attr.name())
        .collect();
    assert_eq!(names, ["name", "barks"]);

    assert_eq!(
        columns(&mm, "Dog"),
        ["animals.id", "animals.name", "animals.barks", "animals.kind"]
    );
}

#[test]
fn discriminator_values_default_to_the_entity_name() {
    let mm = build(animals()).unwrap();

    let dog = mm.entity_by_name("Dog").unwrap();
    let cat = mm.entity_by_name("Cat").unwrap();

    assert_eq!(dog.discriminator_value, Some(Value::from("Dog")));
    assert_eq!(cat.discriminator_value, Some(Value::from("C")));

    let discriminator = dog.discriminator().unwrap().unwrap();
    assert_eq!(discriminator.role.full_path(), "Dog.{discriminator}");
    assert_eq!(discriminator.resolve(&Value::from("C")), Some(cat.id));
    assert_eq!(discriminator.resolve(&Value::from("Dog")), Some(dog.id));
    assert_eq!(discriminator.resolve(&Value::from("Bird")), None);
    assert_eq!(discriminator.value_for(cat.id), Some(&Value::from("C")));
}

#[test]
fn single_table_hierarchy_needs_a_discriminator() {
    let mut classes = animals();
    classes[0].discriminator = None;

    let err = build(classes).unwrap_err();
    assert!(err.is_invalid_mapping());
    assert!(
        err.to_string()
            .contains("single-table hierarchy `Animal` declares no discriminator"),
        "{err}"
    );
}

#[test]
fn discriminator_values_are_unique_in_a_hierarchy() {
    let mut classes = animals();
    classes[2].discriminator_value = Some(Value::from("Dog"));

    let err = build(classes).unwrap_err();
    assert!(
        err.to_string()
            .contains("is used by both `Dog` and `Cat`"),
        "{err}"
    );
}

#[test]
fn joined_subclass_spreads_attributes_over_tables() {
    let mm = build(vec![
        PersistentClass::new("Vehicle")
            .table("vehicles")
            .inheritance(InheritanceStrategy::Joined)
            .id(Identifier::simple("id", Type::I64, "id"))
            .property(Property::basic("wheels", Type::I32, "wheels")),
        PersistentClass::new("Car")
            .table("cars")
            .extends("Vehicle")
            .property(Property::basic("doors", Type::I32, "doors")),
    ])
    .unwrap();

    let car = mm.entity_by_name("Car").unwrap();
    assert_eq!(car.table, "cars");
    assert_eq!(car.inheritance, InheritanceStrategy::Joined);
    assert_eq!(
        columns(&mm, "Car"),
        ["vehicles.id", "vehicles.wheels", "cars.doors"]
    );
}

#[test]
fn union_subclass_owns_every_column() {
    let mm = build(vec![
        PersistentClass::new("Payment")
            .table("payments")
            .inheritance(InheritanceStrategy::Union)
            .id(Identifier::simple("id", Type::I64, "id"))
            .property(Property::basic("amount", Type::I64, "amount")),
        PersistentClass::new("CardPayment")
            .table("card_payments")
            .extends("Payment")
            .property(Property::basic("last4", Type::String, "last4")),
    ])
    .unwrap();

    assert_eq!(
        columns(&mm, "CardPayment"),
        [
            "card_payments.id",
            "card_payments.amount",
            "card_payments.last4"
        ]
    );
}

#[test]
fn subclass_cannot_redeclare_the_identifier() {
    let mut classes = animals();
    classes[1].identifier = Some(Identifier::simple("dog_id", Type::I64, "dog_id"));

    let err = build(classes).unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid mapping at `Dog`: a subclass cannot redeclare the identifier"
    );
}

#[test]
fn unknown_superclass() {
    let err = build(vec![PersistentClass::new("Dog")
        .table("dogs")
        .extends("Wolf")])
    .unwrap_err();

    assert!(err.to_string().contains("unknown superclass `Wolf`"), "{err}");
}

#[test]
fn implicit_table_names() {
    let line_item = || {
        PersistentClass::new("LineItem")
            .id(Identifier::simple("id", Type::I64, "id"))
            .property(Property::basic("sku", Type::String, "sku"))
    };

    let mm = build(vec![line_item()]).unwrap();
    assert_eq!(mm.entity_by_name("LineItem").unwrap().table, "line_items");

    let mut builder = Builder::new();
    builder.table_name_prefix("app_");
    let mm = build_with(&builder, vec![line_item()]).unwrap();
    assert_eq!(mm.entity_by_name("LineItem").unwrap().table, "app_line_items");

    let mut builder = Builder::new();
    builder.implicit_table_names(false);
    let err = build_with(&builder, vec![line_item()]).unwrap_err();
    assert!(
        err.to_string().contains("entity `LineItem` declares no table"),
        "{err}"
    );
}

#[test]
fn reserved_table_names_are_quoted() {
    let order = || {
        PersistentClass::new("Order")
            .table("order")
            .id(Identifier::simple("id", Type::I64, "id"))
    };

    let mm = build(vec![order()]).unwrap();
    assert_eq!(mm.entity_by_name("Order").unwrap().table, "\"order\"");

    let mut builder = Builder::new();
    builder.dialect(Dialect::Mysql);
    let mm = build_with(&builder, vec![order()]).unwrap();
    assert_eq!(mm.entity_by_name("Order").unwrap().table, "`order`");
}

fn parties(supplier_id: Type) -> Vec<PersistentClass> {
    vec![
        PersistentClass::new("Party")
            .table("parties")
            .id(Identifier::simple("id", Type::I64, "id"))
            .discriminator(BasicValue::new(Type::String, "kind")),
        PersistentClass::new("Buyer").extends("Party").property(Property::new(
            "owner",
            ToOne::many_to_one("Customer").column("owner_id"),
        )),
        PersistentClass::new("Seller").extends("Party").property(Property::new(
            "owner",
            ToOne::many_to_one("Supplier").column("owner_id"),
        )),
        PersistentClass::new("Customer")
            .table("customers")
            .id(Identifier::simple("id", Type::I64, "id")),
        PersistentClass::new("Supplier")
            .table("suppliers")
            .id(Identifier::simple("id", supplier_id, "id")),
    ]
}

#[test]
fn sibling_subclasses_reuse_a_column_for_different_targets() {
    let mm = build(parties(Type::I64)).unwrap();

    let buyer = mm.foreign_key_of("Buyer.owner").unwrap();
    let seller = mm.foreign_key_of("Seller.owner").unwrap();

    assert_ne!(buyer.id(), seller.id());
    assert_eq!(buyer.association_key(), seller.association_key());
    assert_eq!(buyer.association_key().to_string(), "(parties, [owner_id])");
    assert_eq!(buyer.target_table(), "customers");
    assert_eq!(seller.target_table(), "suppliers");

    let shared: Vec<_> = mm
        .foreign_keys_by_association_key(buyer.association_key())
        .map(|fk| fk.id())
        .collect();
    assert_eq!(shared.len(), 2);
    assert!(shared.contains(&buyer.id()) && shared.contains(&seller.id()));
}

#[test]
fn reused_key_column_must_keep_one_type() {
    let err = build(parties(Type::Uuid)).unwrap_err();

    assert!(err.is_invalid_mapping(), "{err}");
    let message = err.to_string();
    assert!(message.contains("key column `owner_id`"), "{err}");
    assert!(message.contains("is already mapped as"), "{err}");
}
