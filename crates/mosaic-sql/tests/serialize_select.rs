use mosaic_core::boot::{
    BasicValue, Collection, Column, Component, Identifier, InheritanceStrategy, PersistentClass,
    Property, Selectable, ToOne,
};
use mosaic_core::context::Dialect;
use mosaic_core::mapping::AttributeMapping;
use mosaic_core::{BootModel, Builder, Metamodel, Type, Value};
use mosaic_sql::stmt::{Expr, Select};
use mosaic_sql::{Serializer, Statement};

use pretty_assertions::assert_eq;
use std::sync::Arc;

fn build(classes: Vec<PersistentClass>) -> Arc<Metamodel> {
    build_with(&Builder::new(), classes)
}

fn build_with(builder: &Builder, classes: Vec<PersistentClass>) -> Arc<Metamodel> {
    let boot = classes
        .into_iter()
        .fold(BootModel::new(), |boot, class| boot.entity(class));

    builder.build(&boot).unwrap()
}

fn entity(name: &str, table: &str) -> PersistentClass {
    PersistentClass::new(name)
        .table(table)
        .id(Identifier::simple("id", Type::I64, "id"))
}

fn orders() -> Vec<PersistentClass> {
    vec![
        entity("Order", "orders")
            .property(Property::basic("number", Type::String, "number"))
            .property(Property::new(
                "customer",
                ToOne::many_to_one("Customer").column("customer_id"),
            ))
            .property(Property::basic("total", Type::I64, "total")),
        entity("Customer", "customers").property(Property::basic("name", Type::String, "name")),
    ]
}

fn serialize(serializer: &Serializer, stmt: impl Into<Statement>) -> (String, Vec<Value>) {
    let mut params = vec![];
    let sql = serializer.serialize(&stmt.into(), &mut params);
    (sql, params)
}

#[test]
fn entity_row() {
    let mm = build(orders());
    let select = Select::entity(&mm, mm.entity_by_name("Order").unwrap()).unwrap();

    let (sql, params) = serialize(&Serializer::postgresql(), select);
    assert_eq!(
        sql,
        "SELECT tbl_0.id, tbl_0.number, tbl_0.customer_id, tbl_0.total FROM orders AS tbl_0;"
    );
    assert!(params.is_empty());
}

#[test]
fn joins_the_target_of_a_foreign_key() {
    let mm = build(orders());
    let customer = mm.entity_by_name("Customer").unwrap();

    let mut select = Select::entity(&mm, mm.entity_by_name("Order").unwrap()).unwrap();
    let alias = select.join_foreign_key(mm.foreign_key_of("Order.customer").unwrap(), "tbl_0");
    select.columns(&alias, customer.selectables().unwrap());

    let (sql, _) = serialize(&Serializer::postgresql(), select);
    assert_eq!(
        sql,
        "SELECT tbl_0.id, tbl_0.number, tbl_0.customer_id, tbl_0.total, tbl_1.id, tbl_1.name \
         FROM orders AS tbl_0 \
         LEFT JOIN customers AS tbl_1 ON tbl_0.customer_id = tbl_1.id;"
    );
}

#[test]
fn composite_join_predicate() {
    let account_id = Component::new("AccountId")
        .property(Property::basic("bank", Type::String, "bank"))
        .property(Property::basic("branch", Type::I32, "branch"));

    let mm = build(vec![
        PersistentClass::new("Account")
            .table("accounts")
            .id(Identifier::embedded("id", account_id)),
        entity("Transfer", "transfers").property(Property::new(
            "account",
            ToOne::many_to_one("Account").columns(["fk_bank", "fk_branch"]),
        )),
    ]);

    let fk = mm.foreign_key_of("Transfer.account").unwrap();
    let sql = Serializer::postgresql().serialize_expr(&fk.join_predicate("t", "a"), &mut vec![]);

    assert_eq!(sql, "t.fk_bank = a.bank AND t.fk_branch = a.branch");
}

#[test]
fn joined_hierarchy_reads_every_table() {
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

    let select = Select::entity(&mm, mm.entity_by_name("Car").unwrap()).unwrap();
    let (sql, _) = serialize(&Serializer::sqlite(), select);

    assert_eq!(
        sql,
        "SELECT tbl_0.id, tbl_0.wheels, tbl_1.doors \
         FROM vehicles AS tbl_0 \
         INNER JOIN cars AS tbl_1 ON tbl_1.id = tbl_0.id;"
    );
}

#[test]
fn custom_reads_and_formulas() {
    let mm = build(vec![entity("Product", "products")
        .property(Property::basic(
            "name",
            Type::String,
            Column::new("name").read("lower(?)"),
        ))
        .property(Property::new(
            "total",
            BasicValue::new(Type::I64, Selectable::formula("{alias}.price * {alias}.qty")),
        ))]);

    let select = Select::entity(&mm, mm.entity_by_name("Product").unwrap()).unwrap();
    let (sql, _) = serialize(&Serializer::postgresql(), select);

    assert_eq!(
        sql,
        "SELECT tbl_0.id, lower(tbl_0.name), tbl_0.price * tbl_0.qty FROM products AS tbl_0;"
    );
}

#[test]
fn placeholders_follow_the_flavor() {
    let mm = build(orders());
    let order = mm.entity_by_name("Order").unwrap();

    let cases = [
        (Serializer::postgresql(), "$1"),
        (Serializer::mysql(), "?"),
        (Serializer::sqlite(), "?1"),
    ];

    for (serializer, placeholder) in cases {
        let select = Select::entity_by_identifier(&mm, order, &Value::I64(7)).unwrap();
        let (sql, params) = serialize(&serializer, select);

        assert!(
            sql.ends_with(&format!("FROM orders AS tbl_0 WHERE tbl_0.id = {placeholder};")),
            "{sql}"
        );
        assert_eq!(params, [Value::I64(7)]);
    }
}

#[test]
fn reserved_names_keep_the_dialect_quoting() {
    let mut builder = Builder::new();
    builder.dialect(Dialect::Mysql);

    let mm = build_with(&builder, vec![entity("Order", "order")
        .property(Property::basic("key", Type::String, "key"))]);

    let select = Select::entity(&mm, mm.entity_by_name("Order").unwrap()).unwrap();
    let (sql, _) = serialize(&Serializer::for_metamodel(&mm), select);

    assert_eq!(sql, "SELECT tbl_0.id, tbl_0.`key` FROM `order` AS tbl_0;");
}

#[test]
fn many_to_many_through_the_collection_table() {
    let mm = build(vec![
        entity("Student", "students").property(Property::new(
            "courses",
            Collection::many_to_many("Course", "enrollments"),
        )),
        entity("Course", "courses").property(Property::basic("title", Type::String, "title")),
    ]);

    let Some(AttributeMapping::Plural(courses)) = mm.attribute_by_role("Student.courses") else {
        panic!("expected a collection");
    };

    let key = mm.foreign_key(courses.key_descriptor().unwrap());
    let element = mm.foreign_key(courses.element.foreign_key().unwrap().unwrap());
    let student = mm.entity_by_name("Student").unwrap();
    let course = mm.entity_by_name("Course").unwrap();

    let mut select = Select::from_table(&student.table);
    let enrollments = select.join_key_table(key, "tbl_0");
    let target = select.join_foreign_key(element, &enrollments);
    select.columns(&target, course.selectables().unwrap());

    let id = student.identifier().unwrap().selectables(&mm).unwrap();
    select.and_filter(Expr::eq(Expr::column("tbl_0", &id[0]), Value::I64(1)));

    let (sql, params) = serialize(&Serializer::postgresql(), select);
    assert_eq!(
        sql,
        "SELECT tbl_2.id, tbl_2.title \
         FROM students AS tbl_0 \
         LEFT JOIN enrollments AS tbl_1 ON tbl_1.student_id = tbl_0.id \
         LEFT JOIN courses AS tbl_2 ON tbl_1.course_id = tbl_2.id \
         WHERE tbl_0.id = $1;"
    );
    assert_eq!(params, [Value::I64(1)]);
}
