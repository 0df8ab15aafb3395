use serde::Serialize;

use super::types::NormalizedName;

/// A named schema after type mapping.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IrSchema {
    Object(IrObjectSchema),
    Enum(IrEnumSchema),
    Alias(IrAliasSchema),
    Union(IrUnionSchema),
}

impl IrSchema {
    pub fn name(&self) -> &NormalizedName {
        match self {
            IrSchema::Object(o) => &o.name,
            IrSchema::Enum(e) => &e.name,
            IrSchema::Alias(a) => &a.name,
            IrSchema::Union(u) => &u.name,
        }
    }
}

/// An object schema with typed fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrObjectSchema {
    pub name: NormalizedName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<IrField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<IrType>,
}

/// A field on an object schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrField {
    pub name: NormalizedName,
    pub original_name: String,
    pub field_type: IrType,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub read_only: bool,
    pub write_only: bool,
}

/// A string enum schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrEnumSchema {
    pub name: NormalizedName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub variants: Vec<String>,
}

/// A type alias (e.g., `type Foo = string`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrAliasSchema {
    pub name: NormalizedName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub target: IrType,
}

/// A union type (oneOf / anyOf).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IrUnionSchema {
    pub name: NormalizedName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub variants: Vec<IrType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<IrDiscriminator>,
}

/// Discriminator for union types; mapping values are PascalCase type names.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IrDiscriminator {
    pub property_name: String,
    pub mapping: Vec<(String, String)>,
}

/// A resolved type reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "of", rename_all = "snake_case")]
pub enum IrType {
    String,
    StringLiteral(String),
    Number,
    Integer,
    /// `format: int64` with `int64_type: big_int`.
    BigInt,
    Boolean,
    Null,
    Array(Box<IrType>),
    Object(Vec<(String, IrType, bool)>), // inline object: (name, type, required)
    Map(Box<IrType>),                    // string-keyed record of T
    Ref(String),                         // reference to a named schema (PascalCase)
    Union(Vec<IrType>),
    Intersection(Vec<IrType>),
    Any,
    /// The `false` schema: no value is valid.
    Never,
    /// `format: date`/`date-time` with `date_type: date`.
    Date,
    Binary,
}
