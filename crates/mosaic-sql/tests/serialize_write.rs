use mosaic_core::boot::{
    BasicValue, Column, Identifier, InheritanceStrategy, PersistentClass, Property, Selectable,
    ToOne,
};
use mosaic_core::{BootModel, Metamodel, Type, Value};
use mosaic_sql::stmt::{Insert, Update};
use mosaic_sql::{Serializer, Statement};

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std_util::prelude::*;

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

fn orders(total: Property) -> Vec<PersistentClass> {
    vec![
        entity("Order", "orders")
            .property(Property::basic("number", Type::String, "number"))
            .property(Property::new(
                "customer",
                ToOne::many_to_one("Customer").column("customer_id"),
            ))
            .property(total),
        entity("Customer", "customers"),
    ]
}

fn order_instance() -> Value {
    Value::object(
        "Order",
        vec![
            Value::I64(1),
            Value::from("A-1"),
            Value::reference("Customer", Value::I64(9)),
            Value::I64(100),
        ],
    )
}

fn serialize(serializer: &Serializer, stmt: impl Into<Statement>) -> (String, Vec<Value>) {
    let mut params = vec![];
    let sql = serializer.serialize(&stmt.into(), &mut params);
    (sql, params)
}

#[test]
fn insert_entity_row() {
    let mm = build(orders(Property::basic("total", Type::I64, "total")));
    let order = mm.entity_by_name("Order").unwrap();

    let mut inserts = Insert::entity(&mm, order, &order_instance()).unwrap();
    assert_eq!(inserts.len(), 1);

    let (sql, params) = serialize(&Serializer::postgresql(), inserts.remove(0));
    assert_eq!(
        sql,
        "INSERT INTO orders (id, number, customer_id, total) VALUES ($1, $2, $3, $4);"
    );
    assert_eq!(
        params,
        [Value::I64(1), Value::from("A-1"), Value::I64(9), Value::I64(100)]
    );
}

#[test]
fn update_entity_row() {
    let mm = build(orders(Property::basic("total", Type::I64, "total")));
    let order = mm.entity_by_name("Order").unwrap();

    let mut updates = Update::entity(&mm, order, &order_instance()).unwrap();
    assert_eq!(updates.len(), 1);

    let (sql, params) = serialize(&Serializer::sqlite(), updates.remove(0));
    assert_eq!(
        sql,
        "UPDATE orders SET number = ?1, customer_id = ?2, total = ?3 WHERE id = ?4;"
    );
    assert_eq!(
        params,
        [Value::from("A-1"), Value::I64(9), Value::I64(100), Value::I64(1)]
    );
}

#[test]
fn read_only_columns_are_not_written() {
    let mm = build(orders(Property::basic("total", Type::I64, "total").read_only()));
    let order = mm.entity_by_name("Order").unwrap();

    let inserts = Insert::entity(&mm, order, &order_instance()).unwrap();
    let (sql, _) = serialize(&Serializer::mysql(), inserts[0].clone());
    assert_eq!(
        sql,
        "INSERT INTO orders (id, number, customer_id) VALUES (?, ?, ?);"
    );

    let updates = Update::entity(&mm, order, &order_instance()).unwrap();
    let (sql, _) = serialize(&Serializer::mysql(), updates[0].clone());
    assert_eq!(sql, "UPDATE orders SET number = ?, customer_id = ? WHERE id = ?;");
}

#[test]
fn custom_writes_and_formulas() {
    let mm = build(vec![entity("Account", "accounts")
        .property(Property::basic(
            "secret",
            Type::String,
            Column::new("secret").write("encrypt(?)"),
        ))
        .property(Property::new(
            "masked",
            BasicValue::new(Type::String, Selectable::formula("mask({alias}.secret)")),
        ))]);

    let account = mm.entity_by_name("Account").unwrap();
    let instance = Value::object(
        "Account",
        vec![Value::I64(3), Value::from("hunter2"), Value::from("*******")],
    );

    let inserts = Insert::entity(&mm, account, &instance).unwrap();
    let (sql, params) = serialize(&Serializer::postgresql(), inserts[0].clone());

    assert_eq!(sql, "INSERT INTO accounts (id, secret) VALUES ($1, encrypt($2));");
    assert_eq!(params, [Value::I64(3), Value::from("hunter2")]);
}

#[test]
fn joined_hierarchy_writes_one_statement_per_table() {
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
    ]);

    let car = mm.entity_by_name("Car").unwrap();
    let instance = Value::object("Car", vec![Value::I64(5), Value::I32(4), Value::I32(3)]);

    let serializer = Serializer::postgresql();

    let inserts: Vec<_> = Insert::entity(&mm, car, &instance)
        .unwrap()
        .into_iter()
        .map(|insert| serialize(&serializer, insert))
        .collect();

    assert_eq!(
        inserts,
        [
            (
                "INSERT INTO vehicles (id, wheels) VALUES ($1, $2);".to_string(),
                vec![Value::I64(5), Value::I32(4)]
            ),
            (
                "INSERT INTO cars (id, doors) VALUES ($1, $2);".to_string(),
                vec![Value::I64(5), Value::I32(3)]
            ),
        ]
    );

    let updates: Vec<_> = Update::entity(&mm, car, &instance)
        .unwrap()
        .into_iter()
        .map(|update| serialize(&serializer, update).0)
        .collect();

    assert_eq!(
        updates,
        [
            "UPDATE vehicles SET wheels = $1 WHERE id = $2;",
            "UPDATE cars SET doors = $1 WHERE id = $2;",
        ]
    );
}

#[test]
fn values_of_the_wrong_shape_are_rejected() {
    let mm = build(orders(Property::basic("total", Type::I64, "total")));
    let order = mm.entity_by_name("Order").unwrap();

    let instance = Value::object("Order", vec![Value::I64(1), Value::I32(2)]);
    let err = assert_err!(Insert::entity(&mm, order, &instance));
    assert!(err.is_invalid_value(), "{err}");
}
