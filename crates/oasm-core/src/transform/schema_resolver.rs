use indexmap::IndexMap;

use crate::config::{DateType, EnumStyle, Int64Type, ModelOptions};
use crate::ir::{
    IrAliasSchema, IrDiscriminator, IrEnumSchema, IrField, IrObjectSchema, IrSchema, IrType,
    IrUnionSchema,
};
use crate::parse::schema::{Schema, SchemaOrRef, SchemaType, TypeSet, ref_target_name};

use super::discriminator::DiscriminatorInfo;
use super::name_normalizer::{normalize_name, schema_name_from_uri};

/// PascalCase type name for a schema reference.
///
/// Pointer references use their last segment; whole-document references use
/// the file name.
pub fn ref_type_name(ref_path: &str) -> String {
    let has_pointer = ref_path
        .split_once('#')
        .is_some_and(|(_, fragment)| fragment.contains('/'));
    if has_pointer {
        normalize_name(&ref_target_name(ref_path)).pascal_case
    } else {
        schema_name_from_uri(ref_path)
    }
}

/// Maps parsed schemas onto the IR, steered by the type-mapping options.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'o> {
    options: &'o ModelOptions,
}

impl<'o> TypeMapper<'o> {
    pub fn new(options: &'o ModelOptions) -> Self {
        Self { options }
    }

    /// Convert a parsed `SchemaOrRef` to an `IrType`.
    pub fn ir_type(&self, schema_or_ref: &SchemaOrRef) -> IrType {
        match schema_or_ref {
            SchemaOrRef::Ref { ref_path, .. } => IrType::Ref(ref_type_name(ref_path)),
            SchemaOrRef::Boolean(true) => IrType::Any,
            SchemaOrRef::Boolean(false) => IrType::Never,
            SchemaOrRef::Schema(schema) => self.schema_type(schema),
        }
    }

    /// Convert a parsed `Schema` to an `IrType`.
    pub fn schema_type(&self, schema: &Schema) -> IrType {
        let variants = schema.union_variants();
        if !variants.is_empty() {
            return IrType::Union(variants.iter().map(|v| self.ir_type(v)).collect());
        }
        if !schema.all_of.is_empty() {
            if schema.all_of.len() == 1 && schema.properties.is_empty() {
                return self.ir_type(&schema.all_of[0]);
            }
            return IrType::Intersection(self.intersection_parts(schema));
        }

        if !schema.enum_values.is_empty() {
            let literals = string_values(&schema.enum_values);
            return match literals.len() {
                0 => IrType::String,
                1 => IrType::StringLiteral(literals[0].clone()),
                _ => IrType::Union(literals.into_iter().map(IrType::StringLiteral).collect()),
            };
        }

        if let Some(value) = &schema.const_value {
            return match value.as_str() {
                Some(s) => IrType::StringLiteral(s.to_string()),
                None => IrType::String,
            };
        }

        match &schema.schema_type {
            Some(TypeSet::Single(t)) => self.single_type(t, schema),
            Some(TypeSet::Multiple(types)) => {
                let non_null: Vec<&SchemaType> =
                    types.iter().filter(|t| **t != SchemaType::Null).collect();
                let has_null = types.contains(&SchemaType::Null);
                let mut variants: Vec<IrType> =
                    non_null.iter().map(|t| self.single_type(t, schema)).collect();
                match (variants.len(), has_null) {
                    (0, true) => IrType::Null,
                    (0, false) => IrType::Any,
                    (1, false) => variants.remove(0),
                    _ => {
                        if has_null {
                            variants.push(IrType::Null);
                        }
                        IrType::Union(variants)
                    }
                }
            }
            None if !schema.properties.is_empty() => self.object_type(schema),
            None => match &schema.items {
                Some(items) => IrType::Array(Box::new(self.ir_type(items))),
                None => IrType::Any,
            },
        }
    }

    fn single_type(&self, t: &SchemaType, schema: &Schema) -> IrType {
        let base = match t {
            SchemaType::String => match schema.format.as_deref() {
                Some("date-time" | "date") if self.options.date_type == DateType::Date => {
                    IrType::Date
                }
                Some("binary" | "byte") => IrType::Binary,
                _ => IrType::String,
            },
            SchemaType::Integer if schema.format.as_deref() == Some("int64") => {
                match self.options.int64_type {
                    Int64Type::Number => IrType::Integer,
                    Int64Type::BigInt => IrType::BigInt,
                    Int64Type::String => IrType::String,
                }
            }
            SchemaType::Integer => IrType::Integer,
            SchemaType::Number => IrType::Number,
            SchemaType::Boolean => IrType::Boolean,
            SchemaType::Null => IrType::Null,
            SchemaType::File => IrType::Binary,
            SchemaType::Array => match &schema.items {
                Some(items) => IrType::Array(Box::new(self.ir_type(items))),
                None => IrType::Array(Box::new(IrType::Any)),
            },
            SchemaType::Object => self.object_type(schema),
        };
        if schema.nullable == Some(true) {
            IrType::Union(vec![base, IrType::Null])
        } else {
            base
        }
    }

    fn object_type(&self, schema: &Schema) -> IrType {
        if schema.properties.is_empty() {
            return match self.additional_type(schema) {
                Some(value) => IrType::Map(Box::new(value)),
                None => IrType::Any,
            };
        }
        let fields = schema
            .properties
            .iter()
            .map(|(name, prop)| {
                (
                    name.clone(),
                    self.ir_type(prop),
                    schema.required.contains(name),
                )
            })
            .collect();
        IrType::Object(fields)
    }

    fn additional_type(&self, schema: &Schema) -> Option<IrType> {
        match schema.additional_properties.as_deref() {
            None | Some(SchemaOrRef::Boolean(false)) => None,
            Some(SchemaOrRef::Boolean(true)) => Some(IrType::Any),
            Some(other) => Some(self.ir_type(other)),
        }
    }

    fn intersection_parts(&self, schema: &Schema) -> Vec<IrType> {
        let mut parts: Vec<IrType> = schema
            .all_of
            .iter()
            .map(|part| match part {
                SchemaOrRef::Schema(s) if !s.properties.is_empty() => {
                    IrType::Object(inline_fields(self.build_fields(&s.properties, &s.required)))
                }
                other => self.ir_type(other),
            })
            .collect();
        if !schema.properties.is_empty() {
            let extra = self.build_fields(&schema.properties, &schema.required);
            parts.push(IrType::Object(inline_fields(extra)));
        }
        parts
    }

    /// Convert a named component schema to an `IrSchema`.
    pub fn ir_schema(
        &self,
        name: &str,
        schema: &Schema,
        discriminator: Option<&DiscriminatorInfo>,
    ) -> IrSchema {
        let normalized = normalize_name(name);
        let description = schema.description.clone();

        if !schema.enum_values.is_empty() {
            let variants = string_values(&schema.enum_values);
            if self.options.enum_style == EnumStyle::Enum && !variants.is_empty() {
                return IrSchema::Enum(IrEnumSchema {
                    name: normalized,
                    description,
                    variants,
                });
            }
            return IrSchema::Alias(IrAliasSchema {
                name: normalized,
                description,
                target: self.schema_type(schema),
            });
        }

        let variants = schema.union_variants();
        if !variants.is_empty() {
            let discriminator = discriminator
                .map(|d| IrDiscriminator {
                    property_name: d.property_name.clone(),
                    mapping: d
                        .mapping
                        .iter()
                        .map(|(value, target)| (value.clone(), normalize_name(target).pascal_case))
                        .collect(),
                })
                .or_else(|| {
                    schema.discriminator.as_ref().map(|d| IrDiscriminator {
                        property_name: d.property_name.clone(),
                        mapping: d
                            .mapping
                            .iter()
                            .map(|(value, target)| (value.clone(), ref_type_name(target)))
                            .collect(),
                    })
                });
            return IrSchema::Union(IrUnionSchema {
                name: normalized,
                description,
                variants: variants.iter().map(|v| self.ir_type(v)).collect(),
                discriminator,
            });
        }

        if !schema.all_of.is_empty() {
            if schema.all_of.iter().any(|s| s.ref_path().is_some()) {
                return IrSchema::Alias(IrAliasSchema {
                    name: normalized,
                    description,
                    target: IrType::Intersection(self.intersection_parts(schema)),
                });
            }
            return IrSchema::Object(IrObjectSchema {
                name: normalized,
                description,
                fields: self.merge_all_of(&schema.all_of, &schema.properties, &schema.required),
                additional_properties: None,
            });
        }

        let is_object = matches!(schema.schema_type, None | Some(TypeSet::Single(SchemaType::Object)));
        if is_object && !schema.properties.is_empty() {
            return IrSchema::Object(IrObjectSchema {
                name: normalized,
                description,
                fields: self.build_fields(&schema.properties, &schema.required),
                additional_properties: self.additional_type(schema),
            });
        }

        IrSchema::Alias(IrAliasSchema {
            name: normalized,
            description,
            target: self.schema_type(schema),
        })
    }

    fn build_fields(
        &self,
        properties: &IndexMap<String, SchemaOrRef>,
        required: &[String],
    ) -> Vec<IrField> {
        properties
            .iter()
            .map(|(name, prop)| {
                let (description, read_only, write_only) = match prop {
                    SchemaOrRef::Schema(s) => (
                        s.description.clone(),
                        s.read_only.unwrap_or(false),
                        s.write_only.unwrap_or(false),
                    ),
                    SchemaOrRef::Ref { description, .. } => (description.clone(), false, false),
                    SchemaOrRef::Boolean(_) => (None, false, false),
                };
                IrField {
                    name: normalize_name(name),
                    original_name: name.clone(),
                    field_type: self.ir_type(prop),
                    required: required.contains(name),
                    description,
                    read_only,
                    write_only,
                }
            })
            .collect()
    }

    fn merge_all_of(
        &self,
        all_of: &[SchemaOrRef],
        extra_properties: &IndexMap<String, SchemaOrRef>,
        extra_required: &[String],
    ) -> Vec<IrField> {
        let mut fields = Vec::new();
        for item in all_of {
            if let SchemaOrRef::Schema(schema) = item {
                fields.extend(self.build_fields(&schema.properties, &schema.required));
                if !schema.all_of.is_empty() {
                    fields.extend(self.merge_all_of(&schema.all_of, &IndexMap::new(), &[]));
                }
            }
        }
        fields.extend(self.build_fields(extra_properties, extra_required));
        fields
    }
}

fn inline_fields(fields: Vec<IrField>) -> Vec<(String, IrType, bool)> {
    fields
        .into_iter()
        .map(|f| (f.original_name, f.field_type, f.required))
        .collect()
}

fn string_values(values: &[serde_json::Value]) -> Vec<String> {
    values
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}
