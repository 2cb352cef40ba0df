//! Employee - The persisted entity
//!
//! Employee is an Entity identified by an integer id. Name and age are
//! plain scalars. [`EmployeeMapper`] is its document mapper.

use crate::model::document::{compose_key, Document};
use crate::repository::entity_mapper::{EntityMapper, MappingError};

/// Primary key of an Employee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmployeeId(i32);

impl EmployeeId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl core::fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for EmployeeId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// Employee
///
/// Equality compares every attribute, so a value read back from the store
/// equals the value written only if nothing was lost on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    id: EmployeeId,
    name: String,
    age: i32,
}

impl Employee {
    pub fn new(id: impl Into<EmployeeId>, name: impl Into<String>, age: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            age,
        }
    }

    /// An Employee carrying only its primary key, used for lookups by id
    pub fn key_only(id: impl Into<EmployeeId>) -> Self {
        Self::new(id, String::new(), 0)
    }

    /// Builder: set name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Builder: set age
    pub fn with_age(mut self, age: i32) -> Self {
        self.age = age;
        self
    }

    // ========== Getters ==========

    pub fn id(&self) -> EmployeeId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn age(&self) -> i32 {
        self.age
    }
}

/// Document mapper for [`Employee`]
///
/// Stored as entity `employee`, mapping tag `Employee`.
/// Every field, numeric ones included, is written as a string.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmployeeMapper;

impl EmployeeMapper {
    pub const ENTITY: &'static str = "employee";
    pub const MAPPING: &'static str = "Employee";

    const FIELD_ID: &'static str = "id";
    const FIELD_NAME: &'static str = "name";
    const FIELD_AGE: &'static str = "age";

    fn required<'a>(document: &'a Document, field: &'static str) -> Result<&'a str, MappingError> {
        document
            .get(field)
            .ok_or(MappingError::MissingField { field })
    }

    fn parse_i32(document: &Document, field: &'static str) -> Result<i32, MappingError> {
        let raw = Self::required(document, field)?;
        raw.trim()
            .parse::<i32>()
            .map_err(|e| MappingError::InvalidField {
                field,
                value: raw.to_string(),
                reason: e.to_string(),
            })
    }
}

impl EntityMapper for EmployeeMapper {
    type Entity = Employee;

    fn entity_name(&self) -> &str {
        Self::ENTITY
    }

    fn mapping(&self) -> &str {
        Self::MAPPING
    }

    fn key_of(&self, bean: &Employee) -> String {
        compose_key([bean.id()])
    }

    fn to_document(&self, bean: &Employee) -> Document {
        Document::new()
            .with_field(Self::FIELD_ID, bean.id())
            .with_field(Self::FIELD_NAME, bean.name())
            .with_field(Self::FIELD_AGE, bean.age())
    }

    fn from_document(&self, document: &Document) -> Result<Employee, MappingError> {
        let id = Self::parse_i32(document, Self::FIELD_ID)?;
        let age = Self::parse_i32(document, Self::FIELD_AGE)?;
        let name = Self::required(document, Self::FIELD_NAME)?;
        Ok(Employee::new(id, name, age))
    }
}
