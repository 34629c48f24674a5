//! Traits for inspecting built schemas

pub mod schema;

pub use schema::SchemaInspector;
