//! Test utilities for parquet-codec

#[cfg(test)]
pub mod test {
    use crate::SchemaElement;
    use parquet::basic::{Repetition, Type as PhysicalType};

    /// Flat schema with four top-level leaves
    pub fn sample_elements() -> Vec<SchemaElement> {
        vec![
            SchemaElement::root("schema", 4),
            SchemaElement::primitive("id", PhysicalType::INT64, Repetition::REQUIRED),
            SchemaElement::primitive("name", PhysicalType::BYTE_ARRAY, Repetition::OPTIONAL),
            SchemaElement::primitive("age", PhysicalType::INT32, Repetition::OPTIONAL),
            SchemaElement::fixed_len_byte_array("payload", 16, Repetition::REQUIRED),
        ]
    }

    /// Schema with an optional struct and a three-level list
    pub fn nested_elements() -> Vec<SchemaElement> {
        vec![
            SchemaElement::root("schema", 3),
            SchemaElement::primitive("id", PhysicalType::INT64, Repetition::REQUIRED),
            SchemaElement::group("address", Repetition::OPTIONAL, 2),
            SchemaElement::primitive("street", PhysicalType::BYTE_ARRAY, Repetition::REQUIRED),
            SchemaElement::primitive("city", PhysicalType::BYTE_ARRAY, Repetition::OPTIONAL),
            SchemaElement::group("tags", Repetition::OPTIONAL, 1),
            SchemaElement::group("list", Repetition::REPEATED, 1),
            SchemaElement::primitive("element", PhysicalType::BYTE_ARRAY, Repetition::OPTIONAL),
        ]
    }
}
