use mosaic_core::boot::{Identifier, PersistentClass};
use mosaic_core::context::{Dialect, MappingSettings};
use mosaic_core::{BootModel, Builder, Type};

use pretty_assertions::assert_eq;

#[test]
fn missing_settings_take_defaults() {
    let settings: MappingSettings = serde_json::from_str(
        r#"{ "table_name_prefix": "app_", "max_fetch_depth": 5 }"#,
    )
    .unwrap();

    assert_eq!(
        settings,
        MappingSettings {
            table_name_prefix: Some("app_".to_string()),
            max_fetch_depth: 5,
            ..MappingSettings::default()
        }
    );

    let settings: MappingSettings = serde_json::from_str("{}").unwrap();
    assert_eq!(settings, MappingSettings::default());
}

#[test]
fn dialects_use_lowercase_names() {
    assert_eq!(serde_json::to_string(&Dialect::Postgresql).unwrap(), r#""postgresql""#);

    let dialect: Dialect = serde_json::from_str(r#""mysql""#).unwrap();
    assert_eq!(dialect, Dialect::Mysql);

    assert!(serde_json::from_str::<Dialect>(r#""oracle""#).is_err());
}

#[test]
fn deserialized_settings_drive_the_builder() {
    let settings: MappingSettings =
        serde_json::from_str(r#"{ "table_name_prefix": "app_" }"#).unwrap();

    let boot = BootModel::new().entity(
        PersistentClass::new("LineItem").id(Identifier::simple("id", Type::I64, "id")),
    );

    let mm = Builder::new().settings(settings).build(&boot).unwrap();
    assert_eq!(mm.entity_by_name("LineItem").unwrap().table, "app_line_items");
}
