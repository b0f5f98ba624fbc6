use mosaic_core::boot::{
    BasicValue, Collection, CollectionNature, Component, Identifier, PersistentClass, Property,
};
use mosaic_core::mapping::{
    AttributeMapping, CollectionPart, CollectionPartNature, PartRef, PluralAttributeMapping,
};
use mosaic_core::{BootModel, Metamodel, Type};

use pretty_assertions::assert_eq;
use std::sync::Arc;

fn build(classes: Vec<PersistentClass>) -> mosaic_core::Result<Arc<Metamodel>> {
    let boot = classes
        .into_iter()
        .fold(BootModel::new(), |boot, class| boot.entity(class));

    Metamodel::builder().build(&boot)
}

fn entity(name: &str, table: &str) -> PersistentClass {
    PersistentClass::new(name)
        .table(table)
        .id(Identifier::simple("id", Type::I64, "id"))
}

fn plural<'a>(mm: &'a Metamodel, role: &str) -> &'a PluralAttributeMapping {
    match mm.attribute_by_role(role) {
        Some(AttributeMapping::Plural(plural)) => plural,
        other => panic!("expected a collection at `{role}`, got {other:?}"),
    }
}

fn students_and_courses(courses: Collection) -> Vec<PersistentClass> {
    vec![
        entity("Student", "students").property(Property::new("courses", courses)),
        entity("Course", "courses").property(Property::new(
            "students",
            Collection::many_to_many("Student", "enrollments").mapped_by("courses"),
        )),
    ]
}

#[test]
fn join_table_keys() {
    let mut classes = students_and_courses(
        Collection::many_to_many("Course", "enrollments")
            .key_column("student_id")
            .element_column("course_id"),
    );
    // The inverse side is declared first.
    classes.reverse();

    let mm = build(classes).unwrap();
    let courses = plural(&mm, "Student.courses");

    assert_eq!(courses.collection_table, "enrollments");

    let key = mm.foreign_key(courses.key_descriptor().unwrap());
    assert_eq!(key.association_key().to_string(), "(enrollments, [student_id])");
    assert_eq!(key.target_table(), "students");
    assert_eq!(key.role().full_path(), "Student.courses.{fk}");

    let element = mm.foreign_key(courses.element.foreign_key().unwrap().unwrap());
    assert_eq!(element.association_key().to_string(), "(enrollments, [course_id])");
    assert_eq!(element.target_table(), "courses");
    assert_eq!(element.role().full_path(), "Student.courses.{element}.{fk}");
    assert_eq!(
        element.key_side().part,
        PartRef::CollectionPart {
            attribute: courses.meta.declaring.attribute(courses.meta.position),
            nature: CollectionPartNature::Element,
        }
    );
}

#[test]
fn inverse_side_swaps_key_and_element() {
    let collection = Collection::many_to_many("Course", "enrollments");
    let mm = build(students_and_courses(collection)).unwrap();

    let courses = plural(&mm, "Student.courses");
    let students = plural(&mm, "Course.students");

    assert_eq!(
        students.key_descriptor(),
        courses.element.foreign_key().unwrap()
    );
    assert_eq!(
        students.element.foreign_key().unwrap(),
        courses.key_descriptor()
    );

    assert_eq!(mm.foreign_keys().len(), 2);
}

#[test]
fn implicit_join_columns() {
    let collection = Collection::many_to_many("Course", "enrollments");
    let mm = build(students_and_courses(collection)).unwrap();
    let courses = plural(&mm, "Student.courses");

    let key = mm.foreign_key(courses.key_descriptor().unwrap());
    assert_eq!(key.association_key().columns, ["student_id"]);

    let element = mm.foreign_key(courses.element.foreign_key().unwrap().unwrap());
    assert_eq!(element.association_key().columns, ["course_id"]);
}

#[test]
fn mapped_by_must_name_a_many_to_many() {
    let err = build(vec![
        entity("Student", "students").property(Property::basic("name", Type::String, "name")),
        entity("Course", "courses").property(Property::new(
            "students",
            Collection::many_to_many("Student", "enrollments").mapped_by("name"),
        )),
    ])
    .unwrap_err();

    assert!(err.is_invalid_mapping(), "{err}");
    assert!(err.to_string().contains("Course.students"), "{err}");
}

#[test]
fn basic_element_collection() {
    let mm = build(vec![entity("Person", "people").property(Property::new(
        "nicknames",
        Collection::elements(BasicValue::new(Type::String, "nickname"), "person_nicknames")
            .list(BasicValue::new(Type::I32, "position")),
    ))])
    .unwrap();

    let nicknames = plural(&mm, "Person.nicknames");
    assert_eq!(nicknames.nature, CollectionNature::List);

    let CollectionPart::Basic { selectable, role } = &nicknames.element else {
        panic!("expected basic elements");
    };
    assert_eq!(role.full_path(), "Person.nicknames.{element}");
    assert_eq!(selectable[0].table, "person_nicknames");
    assert_eq!(selectable[0].name, "nickname");

    let index = nicknames.index.as_ref().unwrap();
    assert_eq!(index.role().full_path(), "Person.nicknames.{index}");
    assert!(matches!(
        mm.part("Person.nicknames.{index}"),
        Some(PartRef::CollectionPart {
            nature: CollectionPartNature::Index,
            ..
        })
    ));

    let key = mm.foreign_key_of("Person.nicknames").unwrap();
    assert_eq!(key.association_key().to_string(), "(person_nicknames, [person_id])");
}

#[test]
fn id_bag_row_identifier() {
    let mm = build(vec![entity("Person", "people").property(Property::new(
        "tags",
        Collection::elements(BasicValue::new(Type::String, "tag"), "person_tags")
            .id_bag(BasicValue::new(Type::I64, "row_id")),
    ))])
    .unwrap();

    let tags = plural(&mm, "Person.tags");
    assert_eq!(tags.nature, CollectionNature::IdBag);
    assert_eq!(
        tags.identifier.as_ref().unwrap().role().full_path(),
        "Person.tags.{collection-id}"
    );
}

#[test]
fn composite_element_collection() {
    let address = Component::new("Address")
        .property(Property::basic("street", Type::String, "street"))
        .property(Property::basic("city", Type::String, "city"));

    let mm = build(vec![entity("Person", "people").property(Property::new(
        "addresses",
        Collection::components(address, "person_addresses").set(),
    ))])
    .unwrap();

    let addresses = plural(&mm, "Person.addresses");
    let CollectionPart::Embedded { embeddable, .. } = &addresses.element else {
        panic!("expected composite elements");
    };

    let embeddable = mm.embeddable(*embeddable);
    assert_eq!(embeddable.role.full_path(), "Person.addresses.{element}");
    assert_eq!(embeddable.table, "person_addresses");

    let columns: Vec<_> = embeddable
        .selectables()
        .unwrap()
        .iter()
        .map(|selectable| selectable.name.as_str())
        .collect();
    assert_eq!(columns, ["street", "city"]);

    assert!(mm.attribute_by_role("Person.addresses.{element}.city").is_some());
}

#[test]
fn value_collections_need_a_table() {
    let mut tags = Collection::elements(BasicValue::new(Type::String, "tag"), "unused");
    tags.table = None;

    let err = build(vec![entity("Person", "people").property(Property::new("tags", tags))])
        .unwrap_err();

    assert!(
        err.to_string()
            .contains("a collection of basic elements requires a collection table"),
        "{err}"
    );
}
