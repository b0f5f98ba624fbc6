use mosaic_core::boot::{
    BasicValue, Component, ComponentSubtype, Identifier, PersistentClass, Property,
};
use mosaic_core::mapping::{AttributeMapping, EmbeddableMappingType, PartRef};
use mosaic_core::{AccessorTable, BootModel, Metamodel, PropertyAccess, Type, Value};

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn shape() -> Component {
    Component::new("Shape")
        .property(Property::basic("a", Type::I32, "a"))
        .property(Property::basic("b", Type::String, "b"))
        .property(Property::basic("c", Type::I64, "c"))
        .discriminator(BasicValue::new(Type::String, "kind"))
        .subtype(ComponentSubtype::new("S1", "s1", &["a", "b"]))
        .subtype(ComponentSubtype::new("S2", "s2", &["a", "c"]))
}

fn drawing(shape: Component) -> PersistentClass {
    PersistentClass::new("Drawing")
        .table("drawings")
        .id(Identifier::simple("id", Type::I64, "id"))
        .property(Property::new("shape", shape))
}

fn build(shape: Component) -> mosaic_core::Result<Arc<Metamodel>> {
    Metamodel::builder().build(&BootModel::new().entity(drawing(shape)))
}

fn shape_of(mm: &Metamodel) -> &EmbeddableMappingType {
    let Some(AttributeMapping::Embedded(attr)) = mm.attribute_by_role("Drawing.shape") else {
        panic!("expected an embedded attribute at `Drawing.shape`");
    };
    mm.embeddable(attr.embeddable)
}

/// Accessor reading field `index` that counts its invocations.
fn counting(index: usize, calls: &Arc<AtomicUsize>) -> PropertyAccess {
    let positional = PropertyAccess::positional(index);
    let get_calls = calls.clone();
    let set_calls = calls.clone();
    let setter = positional.clone();

    PropertyAccess::new(
        move |owner| {
            get_calls.fetch_add(1, Ordering::SeqCst);
            positional.get(owner)
        },
        move |owner, value| {
            set_calls.fetch_add(1, Ordering::SeqCst);
            setter.set(owner, value)
        },
    )
}

#[test]
fn columns_end_with_the_discriminator() {
    let mm = build(shape()).unwrap();
    let shape = shape_of(&mm);

    assert!(shape.is_polymorphic());

    let columns: Vec<_> = shape
        .selectables()
        .unwrap()
        .iter()
        .map(|selectable| selectable.name.as_str())
        .collect();
    assert_eq!(columns, ["a", "b", "c", "kind"]);

    let discriminator = shape.discriminator.as_ref().unwrap();
    assert_eq!(discriminator.role.full_path(), "Drawing.shape.{discriminator}");
    assert!(matches!(
        mm.part("Drawing.shape.{discriminator}"),
        Some(PartRef::Discriminator(_))
    ));

    assert_eq!(shape.column_order(&mm).unwrap(), [0, 1, 2, 3]);
}

#[test]
fn attributes_know_their_declaring_subtypes() {
    let mm = build(shape()).unwrap();
    let shape = shape_of(&mm);

    let s1 = shape.subtype_named("S1").unwrap();
    let s2 = shape.subtype_for(&Value::from("s2")).unwrap();
    assert_eq!(s2.type_name, "S2");

    let declared: Vec<_> = shape
        .attributes()
        .unwrap()
        .iter()
        .map(|attr| (attr.name(), s1.declares(attr), s2.declares(attr)))
        .collect();

    assert_eq!(
        declared,
        [("a", true, true), ("b", true, false), ("c", false, true)]
    );
}

#[test]
fn undeclared_attributes_are_null() {
    let mm = build(shape()).unwrap();
    let shape = shape_of(&mm);

    let s1 = Value::object("S1", vec![Value::I32(1), Value::from("x")]);
    let s2 = Value::object("S2", vec![Value::I32(2), Value::I64(5)]);

    let mut row = vec![];
    shape.disassemble(&mm, &s1, &mut row).unwrap();
    assert_eq!(
        row,
        [Value::I32(1), Value::from("x"), Value::Null, Value::from("s1")]
    );

    row.clear();
    shape.disassemble(&mm, &s2, &mut row).unwrap();
    assert_eq!(
        row,
        [Value::I32(2), Value::Null, Value::I64(5), Value::from("s2")]
    );

    assert_eq!(shape.attribute_value(&s1, "c").unwrap(), Value::Null);
    assert_eq!(shape.attribute_value(&s2, "c").unwrap(), Value::I64(5));
}

#[test]
fn assembly_picks_the_subtype_from_the_discriminator() {
    let mm = build(shape()).unwrap();
    let shape = shape_of(&mm);

    let value = shape
        .assemble(
            &mm,
            &[Value::I32(2), Value::Null, Value::I64(5), Value::from("s2")],
        )
        .unwrap();
    assert_eq!(value, Value::object("S2", vec![Value::I32(2), Value::I64(5)]));

    let null = shape
        .assemble(&mm, &[Value::Null, Value::Null, Value::Null, Value::Null])
        .unwrap();
    assert_eq!(null, Value::Null);

    let err = shape
        .assemble(
            &mm,
            &[Value::I32(1), Value::Null, Value::Null, Value::from("s9")],
        )
        .unwrap_err();
    assert!(err.is_invalid_value());
    assert!(err.to_string().contains("no subtype"), "{err}");
}

#[test]
fn accessors_of_undeclared_attributes_are_never_invoked() {
    let s1_calls = Arc::new(AtomicUsize::new(0));
    let composite_calls = Arc::new(AtomicUsize::new(0));

    let shape = Component::new("Shape")
        .property(Property::basic("a", Type::I32, "a"))
        .property(Property::basic("b", Type::String, "b"))
        .property(Property::basic("c", Type::I64, "c"))
        .discriminator(BasicValue::new(Type::String, "kind"))
        // Composite-level accessors only serve non-polymorphic access.
        .accessors(AccessorTable::new().with("c", counting(2, &composite_calls)))
        .subtype(
            ComponentSubtype::new("S1", "s1", &["a", "b"])
                .accessors(AccessorTable::new().with("b", counting(1, &s1_calls))),
        )
        .subtype(ComponentSubtype::new("S2", "s2", &["a", "c"]));

    let mm = build(shape).unwrap();
    let shape = shape_of(&mm);

    let s2 = Value::object("S2", vec![Value::I32(2), Value::I64(5)]);
    let mut row = vec![];
    shape.disassemble(&mm, &s2, &mut row).unwrap();
    shape.assemble(&mm, &row).unwrap();

    assert_eq!(s1_calls.load(Ordering::SeqCst), 0);
    assert_eq!(composite_calls.load(Ordering::SeqCst), 0);

    let s1 = Value::object("S1", vec![Value::I32(1), Value::from("x")]);
    row.clear();
    shape.disassemble(&mm, &s1, &mut row).unwrap();

    assert_eq!(s1_calls.load(Ordering::SeqCst), 1);
    assert_eq!(composite_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn subtypes_require_a_discriminator() {
    let mut shape = shape();
    shape.discriminator = None;

    let err = build(shape).unwrap_err();
    assert!(err.is_invalid_mapping());
    assert!(err.to_string().contains("require a discriminator"), "{err}");
}

#[test]
fn discriminator_values_are_distinct() {
    let shape = Component::new("Shape")
        .property(Property::basic("a", Type::I32, "a"))
        .discriminator(BasicValue::new(Type::String, "kind"))
        .subtype(ComponentSubtype::new("S1", "s", &["a"]))
        .subtype(ComponentSubtype::new("S2", "s", &["a"]));

    let err = build(shape).unwrap_err();
    assert!(err.to_string().contains("`S1` and `S2` are not distinct"), "{err}");
}

#[test]
fn discriminator_values_have_the_discriminator_type() {
    let shape = Component::new("Shape")
        .property(Property::basic("a", Type::I32, "a"))
        .discriminator(BasicValue::new(Type::I32, "kind"))
        .subtype(ComponentSubtype::new("S1", "s1", &["a"]));

    let err = build(shape).unwrap_err();
    assert!(err.is_invalid_mapping());
    assert!(err.to_string().contains("is not of type i32"), "{err}");
}

#[test]
fn subtype_attributes_must_exist() {
    let shape = Component::new("Shape")
        .property(Property::basic("a", Type::I32, "a"))
        .discriminator(BasicValue::new(Type::String, "kind"))
        .subtype(ComponentSubtype::new("S1", "s1", &["a", "z"]));

    let err = build(shape).unwrap_err();
    assert!(
        err.to_string().contains("declares unknown attribute `z`"),
        "{err}"
    );
}

#[test]
fn every_attribute_has_a_declaring_subtype() {
    let shape = Component::new("Shape")
        .property(Property::basic("a", Type::I32, "a"))
        .property(Property::basic("orphan", Type::I32, "orphan"))
        .discriminator(BasicValue::new(Type::String, "kind"))
        .subtype(ComponentSubtype::new("S1", "s1", &["a"]));

    let err = build(shape).unwrap_err();
    assert!(
        err.to_string().contains("`orphan` is declared by no subtype"),
        "{err}"
    );
}
