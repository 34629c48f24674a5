use parquet::basic::{Repetition, Type as PhysicalType};
use parquet_codec::traits::SchemaInspector;
use parquet_codec::*;
use std::sync::Arc;

fn leaf(name: &str, repetition: Repetition) -> SchemaElement {
    SchemaElement::primitive(name, PhysicalType::BYTE_ARRAY, repetition)
}

#[test]
fn test_repeated_group_optional_leaf_levels() {
    let schema = SchemaBuilder::new()
        .with_elements([
            SchemaElement::root("schema", 1),
            SchemaElement::group("entries", Repetition::REPEATED, 1),
            leaf("x", Repetition::OPTIONAL),
        ])
        .build()
        .unwrap();

    let (path, column) = schema.columns().get_index(0).unwrap();
    assert_eq!(path, "entries.x");
    assert_eq!(column.max_definition_level(), 2);
    assert_eq!(column.max_repetition_level(), 1);
    assert_eq!(column.name(), "x");
}

#[test]
fn test_top_level_leaves_have_bare_names() {
    let schema = Schema::from_elements(&[
        SchemaElement::root("schema", 3),
        leaf("a", Repetition::REQUIRED),
        leaf("b", Repetition::OPTIONAL),
        leaf("c", Repetition::REPEATED),
    ])
    .unwrap();

    let columns: Vec<(&str, u16, u16)> = schema
        .leaves()
        .map(|c| (c.path(), c.max_definition_level(), c.max_repetition_level()))
        .collect();
    assert_eq!(columns, vec![("a", 0, 0), ("b", 1, 0), ("c", 1, 1)]);
    assert!(schema.get_column_by_name(".a").is_none());
}

#[test]
fn test_map_like_structure() {
    // optional group my_map (MAP) {
    //   repeated group key_value { required binary key; optional binary value; }
    // }
    let schema = Schema::from_elements(&[
        SchemaElement::root("schema", 2),
        SchemaElement::primitive("id", PhysicalType::INT64, Repetition::REQUIRED),
        SchemaElement::group("my_map", Repetition::OPTIONAL, 1),
        SchemaElement::group("key_value", Repetition::REPEATED, 2),
        leaf("key", Repetition::REQUIRED),
        leaf("value", Repetition::OPTIONAL),
    ])
    .unwrap();

    let key = schema.get_column_by_name("my_map.key_value.key").unwrap();
    assert_eq!(key.max_definition_level(), 2);
    assert_eq!(key.max_repetition_level(), 1);

    let value = schema.get_column_by_name("my_map.key_value.value").unwrap();
    assert_eq!(value.max_definition_level(), 3);
    assert_eq!(value.max_repetition_level(), 1);

    assert_eq!(schema.num_columns(), 3);
}

#[test]
fn test_nested_repeated_lists() {
    // repeated list of repeated list of optional values
    let schema = Schema::from_elements(&[
        SchemaElement::root("schema", 1),
        SchemaElement::group("outer", Repetition::REPEATED, 1),
        SchemaElement::group("inner", Repetition::REPEATED, 1),
        leaf("v", Repetition::OPTIONAL),
    ])
    .unwrap();

    let v = schema.get_column_by_name("outer.inner.v").unwrap();
    assert_eq!(v.max_definition_level(), 3);
    assert_eq!(v.max_repetition_level(), 2);
}

#[test]
fn test_levels_never_decrease_along_paths() {
    let schema = Schema::from_elements(&[
        SchemaElement::root("schema", 2),
        SchemaElement::group("a", Repetition::OPTIONAL, 2),
        SchemaElement::group("b", Repetition::REQUIRED, 1),
        leaf("c", Repetition::REQUIRED),
        SchemaElement::group("d", Repetition::REPEATED, 1),
        leaf("e", Repetition::OPTIONAL),
        leaf("f", Repetition::REQUIRED),
    ])
    .unwrap();

    fn check(node: &SchemaNode, d: u16, r: u16) {
        assert!(node.max_definition_level() >= d, "{}", node.name());
        assert!(node.max_repetition_level() >= r, "{}", node.name());
        for child in node.children() {
            check(child, node.max_definition_level(), node.max_repetition_level());
        }
    }
    for child in schema.root().children() {
        check(child, 0, 0);
    }

    let paths: Vec<&String> = schema.columns().keys().collect();
    assert_eq!(paths, vec!["a.b.c", "a.d.e", "f"]);
    assert_eq!(schema.get_column_by_name("a.b.c").unwrap().max_definition_level(), 1);
    assert_eq!(schema.get_column_by_name("a.d.e").unwrap().max_definition_level(), 3);
}

#[test]
fn test_tree_preserves_schema_order() {
    let schema = Schema::from_elements(&[
        SchemaElement::root("schema", 3),
        leaf("z", Repetition::REQUIRED),
        SchemaElement::group("m", Repetition::OPTIONAL, 2),
        leaf("y", Repetition::REQUIRED),
        leaf("x", Repetition::REQUIRED),
        leaf("a", Repetition::REQUIRED),
    ])
    .unwrap();

    let names: Vec<&str> = schema.root().children().iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["z", "m", "a"]);
    assert_eq!(
        schema.all_field_paths(),
        vec!["z", "m", "m.y", "m.x", "a"]
    );
    assert_eq!(schema.field_count(), 6);
}

#[test]
fn test_column_keeps_its_element() {
    let schema = Schema::from_elements(&[
        SchemaElement::root("schema", 1),
        SchemaElement::fixed_len_byte_array("hash", 32, Repetition::OPTIONAL),
    ])
    .unwrap();

    let hash = schema.get_column_by_name("hash").unwrap();
    assert_eq!(hash.physical_type(), PhysicalType::FIXED_LEN_BYTE_ARRAY);
    assert_eq!(hash.type_length(), Some(32));
    assert_eq!(hash.element().repetition, Some(Repetition::OPTIONAL));

    let as_column: Arc<dyn Column + Send + Sync> = hash.clone();
    assert_eq!(as_column.path(), "hash");
}

#[test]
fn test_inspector_lookups_reach_groups() {
    let schema = Schema::from_elements(&[
        SchemaElement::root("schema", 1),
        SchemaElement::group("outer", Repetition::OPTIONAL, 1),
        leaf("inner", Repetition::OPTIONAL),
    ])
    .unwrap();

    let outer = schema.get_field_by_path("outer").unwrap();
    assert!(outer.is_group());
    assert_eq!(outer.max_definition_level(), 1);
    // groups are not columns
    assert!(schema.get_column_by_name("outer").is_none());
    assert!(schema.has_field("outer.inner"));
}

fn optional_chain(depth: usize) -> Vec<SchemaElement> {
    let mut elements = vec![SchemaElement::root("schema", 1)];
    for i in 0..depth {
        elements.push(SchemaElement::group(format!("g{}", i), Repetition::OPTIONAL, 1));
    }
    elements.push(leaf("v", Repetition::REQUIRED));
    elements
}

#[test]
fn test_deep_schema_on_default_stack() {
    let schema = Schema::from_elements(&optional_chain(10_000)).unwrap();
    assert_eq!(schema.num_columns(), 1);

    let leaf = schema.leaves().next().unwrap();
    assert_eq!(leaf.max_definition_level(), 10_000);
    assert!(leaf.path().starts_with("g0.g1.g2."));
    assert!(leaf.path().ends_with(".g9999.v"));

    // root, 10000 groups, one leaf
    assert_eq!(schema.field_count(), 10_002);
    assert!(schema.has_field(leaf.path()));
    assert_eq!(schema.all_field_paths().len(), 10_001);
    assert!(format!("{:?}", schema).contains("g9999.v"));
}

#[test]
fn test_deep_schema_at_level_limit() {
    let schema = Schema::from_elements(&optional_chain(u16::MAX as usize)).unwrap();
    let leaf = schema.leaves().next().unwrap();
    assert_eq!(leaf.max_definition_level(), u16::MAX);
    assert_eq!(leaf.max_repetition_level(), 0);
}

#[test]
fn test_definition_level_overflow() {
    let err = Schema::from_elements(&optional_chain(u16::MAX as usize + 1)).unwrap_err();
    assert!(matches!(
        err,
        ParquetError::LevelOverflow {
            kind: LevelKind::Definition,
            level: 65536
        }
    ));
}

#[test]
fn test_deep_schema_error_unwinds_cleanly() {
    // every group is built, then the last one runs out of elements
    let mut elements = optional_chain(5_000);
    elements.pop();
    let err = Schema::from_elements(&elements).unwrap_err();
    assert!(matches!(err, ParquetError::Schema(_)));
}
