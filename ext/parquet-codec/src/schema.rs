//! Schema tree construction from the flat schema element list.
//!
//! File metadata stores the schema as a pre-order list of elements, where a
//! group announces how many children follow it. [`Schema::from_elements`]
//! rebuilds the tree and flattens it into leaf columns, each annotated with
//! the maximum definition and repetition levels needed to reassemble nested
//! optional and repeated values.

use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use parquet::basic::{Repetition, Type as PhysicalType};

use crate::error::{LevelKind, ParquetError, Result};

/// One entry of the flat pre-order schema list
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaElement {
    pub name: String,
    /// Absent for groups
    pub physical_type: Option<PhysicalType>,
    /// Byte width of FIXED_LEN_BYTE_ARRAY values
    pub type_length: Option<i32>,
    pub repetition: Option<Repetition>,
    /// Number of direct children, groups only
    pub num_children: Option<i32>,
}

impl SchemaElement {
    /// The schema root: a group without repetition
    pub fn root<S: Into<String>>(name: S, num_children: i32) -> Self {
        Self {
            name: name.into(),
            physical_type: None,
            type_length: None,
            repetition: None,
            num_children: Some(num_children),
        }
    }

    pub fn group<S: Into<String>>(name: S, repetition: Repetition, num_children: i32) -> Self {
        Self {
            name: name.into(),
            physical_type: None,
            type_length: None,
            repetition: Some(repetition),
            num_children: Some(num_children),
        }
    }

    pub fn primitive<S: Into<String>>(
        name: S,
        physical_type: PhysicalType,
        repetition: Repetition,
    ) -> Self {
        Self {
            name: name.into(),
            physical_type: Some(physical_type),
            type_length: None,
            repetition: Some(repetition),
            num_children: None,
        }
    }

    pub fn fixed_len_byte_array<S: Into<String>>(
        name: S,
        type_length: i32,
        repetition: Repetition,
    ) -> Self {
        Self {
            type_length: Some(type_length),
            ..Self::primitive(name, PhysicalType::FIXED_LEN_BYTE_ARRAY, repetition)
        }
    }

    pub fn is_group(&self) -> bool {
        self.physical_type.is_none()
    }
}

/// A flattened leaf column
pub trait Column {
    /// The leaf's own name
    fn name(&self) -> &str;

    /// Dotted path from the first level below the root, e.g. `a.b.c`.
    ///
    /// Top-level leaves have a bare path (`a`), so keys written as `.a` by
    /// other tools do not match.
    fn path(&self) -> &str;

    fn max_definition_level(&self) -> u16;

    fn max_repetition_level(&self) -> u16;

    /// The schema element this column was built from
    fn element(&self) -> &SchemaElement;
}

/// Represents a node in the schema tree
#[derive(Debug)]
pub enum SchemaNode {
    /// An interior node with ordered children
    Group(GroupNode),
    /// A leaf column, shared with the schema's column map
    Primitive(Arc<PrimitiveNode>),
}

pub struct GroupNode {
    element: SchemaElement,
    max_definition_level: u16,
    max_repetition_level: u16,
    children: Vec<SchemaNode>,
}

// Only direct children are listed; nesting depth is bounded by the levels,
// not by the native stack.
impl std::fmt::Debug for GroupNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupNode")
            .field("element", &self.element)
            .field("max_definition_level", &self.max_definition_level)
            .field("max_repetition_level", &self.max_repetition_level)
            .field(
                "children",
                &self.children.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Drop for GroupNode {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let SchemaNode::Group(mut group) = node {
                pending.append(&mut group.children);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrimitiveNode {
    element: SchemaElement,
    physical_type: PhysicalType,
    max_definition_level: u16,
    max_repetition_level: u16,
    path: String,
}

impl SchemaNode {
    /// Get the name of this schema node
    pub fn name(&self) -> &str {
        &self.element().name
    }

    pub fn max_definition_level(&self) -> u16 {
        match self {
            SchemaNode::Group(g) => g.max_definition_level,
            SchemaNode::Primitive(p) => p.max_definition_level,
        }
    }

    pub fn max_repetition_level(&self) -> u16 {
        match self {
            SchemaNode::Group(g) => g.max_repetition_level,
            SchemaNode::Primitive(p) => p.max_repetition_level,
        }
    }

    pub fn element(&self) -> &SchemaElement {
        match self {
            SchemaNode::Group(g) => &g.element,
            SchemaNode::Primitive(p) => &p.element,
        }
    }

    /// Children of a group, empty for a leaf
    pub fn children(&self) -> &[SchemaNode] {
        match self {
            SchemaNode::Group(g) => &g.children,
            SchemaNode::Primitive(_) => &[],
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, SchemaNode::Group(_))
    }
}

impl GroupNode {
    pub fn name(&self) -> &str {
        &self.element.name
    }

    pub fn max_definition_level(&self) -> u16 {
        self.max_definition_level
    }

    pub fn max_repetition_level(&self) -> u16 {
        self.max_repetition_level
    }

    pub fn element(&self) -> &SchemaElement {
        &self.element
    }

    pub fn children(&self) -> &[SchemaNode] {
        &self.children
    }
}

impl PrimitiveNode {
    pub fn name(&self) -> &str {
        &self.element.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn max_definition_level(&self) -> u16 {
        self.max_definition_level
    }

    pub fn max_repetition_level(&self) -> u16 {
        self.max_repetition_level
    }

    pub fn element(&self) -> &SchemaElement {
        &self.element
    }

    pub fn physical_type(&self) -> PhysicalType {
        self.physical_type
    }

    pub fn type_length(&self) -> Option<i32> {
        self.element.type_length
    }
}

impl Column for PrimitiveNode {
    fn name(&self) -> &str {
        PrimitiveNode::name(self)
    }

    fn path(&self) -> &str {
        PrimitiveNode::path(self)
    }

    fn max_definition_level(&self) -> u16 {
        PrimitiveNode::max_definition_level(self)
    }

    fn max_repetition_level(&self) -> u16 {
        PrimitiveNode::max_repetition_level(self)
    }

    fn element(&self) -> &SchemaElement {
        PrimitiveNode::element(self)
    }
}

/// Core schema representation: the tree plus its flattened leaf columns
pub struct Schema {
    root: GroupNode,
    columns: IndexMap<String, Arc<PrimitiveNode>>,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("root", &self.root.name())
            .field("columns", &self.columns)
            .finish()
    }
}

impl Schema {
    /// Build the schema tree from a flat pre-order element list.
    ///
    /// Every element must belong to exactly one node.
    pub fn from_elements(elements: &[SchemaElement]) -> Result<Self> {
        let mut builder = TreeBuilder {
            elements,
            cursor: 0,
            path: String::new(),
            columns: IndexMap::new(),
        };
        let root = builder.build()?;

        if builder.cursor != elements.len() {
            return Err(ParquetError::schema(format!(
                "too many schema elements, only {} out of {} have been used",
                builder.cursor,
                elements.len()
            )));
        }

        debug!(
            "built schema '{}' with {} leaf columns from {} elements",
            root.name(),
            builder.columns.len(),
            elements.len()
        );
        Ok(Self {
            root,
            columns: builder.columns,
        })
    }

    pub fn root(&self) -> &GroupNode {
        &self.root
    }

    /// All leaf columns keyed by dotted path, in schema order
    pub fn columns(&self) -> &IndexMap<String, Arc<PrimitiveNode>> {
        &self.columns
    }

    /// Leaf column at the dotted `path`, if any
    pub fn get_column_by_name(&self, path: &str) -> Option<&Arc<PrimitiveNode>> {
        self.columns.get(path)
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Leaf columns in schema order
    pub fn leaves(&self) -> impl Iterator<Item = &Arc<PrimitiveNode>> {
        self.columns.values()
    }
}

/// Builder for creating schemas element by element
pub struct SchemaBuilder {
    elements: Vec<SchemaElement>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    pub fn with_element(mut self, element: SchemaElement) -> Self {
        self.elements.push(element);
        self
    }

    pub fn with_elements<I: IntoIterator<Item = SchemaElement>>(mut self, elements: I) -> Self {
        self.elements.extend(elements);
        self
    }

    pub fn build(self) -> Result<Schema> {
        Schema::from_elements(&self.elements)
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn to_level(level: usize, kind: LevelKind) -> Result<u16> {
    u16::try_from(level).map_err(|_| ParquetError::LevelOverflow { kind, level })
}

/// Levels after entering a node with the given repetition
fn apply_repetition(repetition: Option<Repetition>, d_level: usize, r_level: usize) -> (usize, usize) {
    match repetition {
        Some(Repetition::OPTIONAL) => (d_level + 1, r_level),
        Some(Repetition::REPEATED) => (d_level + 1, r_level + 1),
        Some(Repetition::REQUIRED) | None => (d_level, r_level),
    }
}

/// Pre-order walk over the element list.
///
/// `cursor` always points at the next unconsumed element and `path` holds
/// the dotted name of the innermost open group. Open groups live on an
/// explicit stack, so nesting depth is bounded by the levels, not by the
/// native stack.
struct TreeBuilder<'a> {
    elements: &'a [SchemaElement],
    cursor: usize,
    path: String,
    columns: IndexMap<String, Arc<PrimitiveNode>>,
}

/// A group whose children are still being consumed
struct OpenGroup<'a> {
    element: &'a SchemaElement,
    // Levels inherited by the children
    d_level: usize,
    r_level: usize,
    max_definition_level: u16,
    max_repetition_level: u16,
    remaining: usize,
    children: Vec<SchemaNode>,
    // Length of `path` before this group's segment was pushed
    parent_len: usize,
}

impl OpenGroup<'_> {
    fn finish(self) -> GroupNode {
        GroupNode {
            element: self.element.clone(),
            max_definition_level: self.max_definition_level,
            max_repetition_level: self.max_repetition_level,
            children: self.children,
        }
    }
}

impl<'a> TreeBuilder<'a> {
    fn build(&mut self) -> Result<GroupNode> {
        let mut root = self.open_group(0, 0)?;
        let mut open: Vec<OpenGroup<'a>> = Vec::new();

        loop {
            let current = open.last_mut().unwrap_or(&mut root);
            if current.remaining == 0 {
                match open.pop() {
                    Some(group) => {
                        self.path.truncate(group.parent_len);
                        let node = SchemaNode::Group(group.finish());
                        open.last_mut().unwrap_or(&mut root).children.push(node);
                    }
                    None => {
                        self.path.truncate(root.parent_len);
                        return Ok(root.finish());
                    }
                }
                continue;
            }
            current.remaining -= 1;
            let (d_level, r_level) = (current.d_level, current.r_level);

            let elements = self.elements;
            let child = elements.get(self.cursor).ok_or_else(|| {
                ParquetError::schema(format!("schema index {} out of bound", self.cursor))
            })?;
            if child.is_group() {
                let group = self.open_group(d_level, r_level)?;
                open.push(group);
            } else {
                let leaf = self.build_primitive(d_level, r_level)?;
                open.last_mut()
                    .unwrap_or(&mut root)
                    .children
                    .push(SchemaNode::Primitive(leaf));
            }
        }
    }

    /// Validate the group at the cursor and enter it
    fn open_group(&mut self, d_level: usize, r_level: usize) -> Result<OpenGroup<'a>> {
        let elements = self.elements;
        let idx = self.cursor;
        let element = elements
            .get(idx)
            .ok_or_else(|| ParquetError::schema(format!("schema index {} out of bound", idx)))?;

        if element.physical_type.is_some() {
            return Err(ParquetError::schema(format!(
                "field type is set on the group '{}' in index {}",
                element.name, idx
            )));
        }
        let num_children = match element.num_children {
            None => {
                return Err(ParquetError::schema(format!(
                    "the field num_children is missing in index {}",
                    idx
                )))
            }
            Some(n) if n <= 0 => {
                return Err(ParquetError::schema(format!(
                    "the field num_children is {} in index {}",
                    n, idx
                )))
            }
            Some(n) => n as usize,
        };
        if elements.len() <= idx + num_children {
            return Err(ParquetError::schema(format!(
                "not enough elements in the schema list for the {} children of index {}",
                num_children, idx
            )));
        }

        let (d_level, r_level) = apply_repetition(element.repetition, d_level, r_level);
        let max_definition_level = to_level(d_level, LevelKind::Definition)?;
        let max_repetition_level = to_level(r_level, LevelKind::Repetition)?;

        let parent_len = self.path.len();
        if idx != 0 {
            self.push_segment(&element.name);
        }
        self.cursor += 1;

        Ok(OpenGroup {
            element,
            d_level,
            r_level,
            max_definition_level,
            max_repetition_level,
            remaining: num_children,
            children: Vec::with_capacity(num_children),
            parent_len,
        })
    }

    fn build_primitive(&mut self, d_level: usize, r_level: usize) -> Result<Arc<PrimitiveNode>> {
        let elements = self.elements;
        let idx = self.cursor;
        let element = elements
            .get(idx)
            .ok_or_else(|| ParquetError::schema(format!("schema index {} out of bound", idx)))?;

        let physical_type = element.physical_type.ok_or_else(|| {
            ParquetError::schema(format!("field type is missing in index {}", idx))
        })?;
        let repetition = element.repetition.ok_or_else(|| {
            ParquetError::schema(format!(
                "field repetition is missing on '{}' in index {}",
                element.name, idx
            ))
        })?;
        let (d_level, r_level) = apply_repetition(Some(repetition), d_level, r_level);

        let parent_len = self.path.len();
        self.push_segment(&element.name);
        let path = self.path.clone();
        self.path.truncate(parent_len);

        if self.columns.contains_key(&path) {
            return Err(ParquetError::schema(format!(
                "duplicate column path '{}' in index {}",
                path, idx
            )));
        }

        let node = Arc::new(PrimitiveNode {
            element: element.clone(),
            physical_type,
            max_definition_level: to_level(d_level, LevelKind::Definition)?,
            max_repetition_level: to_level(r_level, LevelKind::Repetition)?,
            path: path.clone(),
        });
        self.columns.insert(path, Arc::clone(&node));
        self.cursor += 1;
        Ok(node)
    }

    fn push_segment(&mut self, name: &str) {
        if !self.path.is_empty() {
            self.path.push('.');
        }
        self.path.push_str(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test::{nested_elements, sample_elements};

    #[test]
    fn test_schema_creation() {
        let schema = Schema::from_elements(&sample_elements()).unwrap();

        assert_eq!(schema.root().name(), "schema");
        assert_eq!(schema.num_columns(), 4);
        let paths: Vec<&str> = schema.columns().keys().map(|k| k.as_str()).collect();
        assert_eq!(paths, vec!["id", "name", "age", "payload"]);

        let name = schema.get_column_by_name("name").unwrap();
        assert_eq!(name.max_definition_level(), 1);
        assert_eq!(name.max_repetition_level(), 0);
        assert_eq!(name.physical_type(), PhysicalType::BYTE_ARRAY);
    }

    #[test]
    fn test_repeated_group_with_optional_leaf() {
        let schema = SchemaBuilder::new()
            .with_element(SchemaElement::root("schema", 1))
            .with_element(SchemaElement::group("items", Repetition::REPEATED, 1))
            .with_element(SchemaElement::primitive(
                "x",
                PhysicalType::BYTE_ARRAY,
                Repetition::OPTIONAL,
            ))
            .build()
            .unwrap();

        let x = schema.get_column_by_name("items.x").unwrap();
        assert_eq!(x.max_definition_level(), 2);
        assert_eq!(x.max_repetition_level(), 1);
        assert_eq!(x.name(), "x");
        assert_eq!(x.path(), "items.x");
    }

    #[test]
    fn test_nested_levels() {
        let schema = Schema::from_elements(&nested_elements()).unwrap();

        let levels: Vec<(&str, u16, u16)> = schema
            .leaves()
            .map(|c| (c.path(), c.max_definition_level(), c.max_repetition_level()))
            .collect();
        assert_eq!(
            levels,
            vec![
                ("id", 0, 0),
                ("address.street", 1, 0),
                ("address.city", 2, 0),
                ("tags.list.element", 3, 1),
            ]
        );

        let root = schema.root();
        assert_eq!(root.children().len(), 3);
        let tags = &root.children()[2];
        assert!(tags.is_group());
        assert_eq!(tags.max_definition_level(), 1);
        assert_eq!(tags.children()[0].max_repetition_level(), 1);
    }

    #[test]
    fn test_tree_and_map_share_leaves() {
        let schema = Schema::from_elements(&sample_elements()).unwrap();
        let SchemaNode::Primitive(id) = &schema.root().children()[0] else {
            panic!("expected a leaf");
        };
        assert!(Arc::ptr_eq(id, schema.get_column_by_name("id").unwrap()));
    }

    #[test]
    fn test_column_trait_object() {
        let schema = Schema::from_elements(&sample_elements()).unwrap();
        let column: &dyn Column = schema.get_column_by_name("payload").unwrap().as_ref();
        assert_eq!(column.name(), "payload");
        assert_eq!(column.element().type_length, Some(16));
        assert_eq!(column.max_definition_level(), 0);
    }

    #[test]
    fn test_to_level_bounds() {
        assert_eq!(to_level(65535, LevelKind::Definition).unwrap(), 65535);
        assert!(matches!(
            to_level(65536, LevelKind::Definition),
            Err(ParquetError::LevelOverflow {
                kind: LevelKind::Definition,
                level: 65536
            })
        ));
    }

    #[test]
    fn test_apply_repetition() {
        assert_eq!(apply_repetition(None, 1, 1), (1, 1));
        assert_eq!(apply_repetition(Some(Repetition::REQUIRED), 1, 1), (1, 1));
        assert_eq!(apply_repetition(Some(Repetition::OPTIONAL), 1, 1), (2, 1));
        assert_eq!(apply_repetition(Some(Repetition::REPEATED), 1, 1), (2, 2));
    }

    #[test]
    fn test_group_with_zero_children() {
        let err = Schema::from_elements(&[
            SchemaElement::root("schema", 1),
            SchemaElement::group("empty", Repetition::OPTIONAL, 0),
            SchemaElement::primitive("x", PhysicalType::INT32, Repetition::REQUIRED),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("num_children is 0 in index 1"));
    }

    #[test]
    fn test_leftover_elements() {
        let mut elements = sample_elements();
        elements.push(SchemaElement::primitive(
            "extra",
            PhysicalType::INT32,
            Repetition::REQUIRED,
        ));
        let err = Schema::from_elements(&elements).unwrap_err();
        assert!(err.to_string().contains("only 5 out of 6"));
    }
}
