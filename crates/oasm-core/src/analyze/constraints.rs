use indexmap::IndexMap;
use serde::Serialize;

use crate::parse::schema::{ExclusiveBound, Schema, SchemaOrRef};
use crate::resolve::{ReferenceResolver, inline_schema};

/// A value constraint declared by a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ValidationRule {
    Required,
    MinLength { value: u64 },
    MaxLength { value: u64 },
    Minimum { value: f64, exclusive: bool },
    Maximum { value: f64, exclusive: bool },
    Pattern { value: String },
    MinItems { value: u64 },
    MaxItems { value: u64 },
    UniqueItems,
    MultipleOf { value: f64 },
    MinProperties { value: u64 },
    MaxProperties { value: u64 },
}

impl ValidationRule {
    /// Human-readable form used in generated messages.
    pub fn describe(&self) -> String {
        match self {
            ValidationRule::Required => "is required".to_string(),
            ValidationRule::MinLength { value } => format!("must be at least {value} characters"),
            ValidationRule::MaxLength { value } => format!("must be at most {value} characters"),
            ValidationRule::Minimum {
                value,
                exclusive: true,
            } => format!("must be greater than {value}"),
            ValidationRule::Minimum { value, .. } => format!("must be at least {value}"),
            ValidationRule::Maximum {
                value,
                exclusive: true,
            } => format!("must be less than {value}"),
            ValidationRule::Maximum { value, .. } => format!("must be at most {value}"),
            ValidationRule::Pattern { value } => format!("must match /{value}/"),
            ValidationRule::MinItems { value } => format!("must have at least {value} items"),
            ValidationRule::MaxItems { value } => format!("must have at most {value} items"),
            ValidationRule::UniqueItems => "must not contain duplicate items".to_string(),
            ValidationRule::MultipleOf { value } => format!("must be a multiple of {value}"),
            ValidationRule::MinProperties { value } => {
                format!("must have at least {value} properties")
            }
            ValidationRule::MaxProperties { value } => {
                format!("must have at most {value} properties")
            }
        }
    }
}

/// Rules of a schema value, `Required` first when `required`.
pub fn validation_rules(schema: &Schema, required: bool) -> Vec<ValidationRule> {
    let mut rules = Vec::new();
    if required {
        rules.push(ValidationRule::Required);
    }
    if let Some(value) = schema.min_length {
        rules.push(ValidationRule::MinLength { value });
    }
    if let Some(value) = schema.max_length {
        rules.push(ValidationRule::MaxLength { value });
    }
    rules.extend(lower_bound(schema));
    rules.extend(upper_bound(schema));
    if let Some(value) = &schema.pattern {
        rules.push(ValidationRule::Pattern {
            value: value.clone(),
        });
    }
    if let Some(value) = schema.min_items {
        rules.push(ValidationRule::MinItems { value });
    }
    if let Some(value) = schema.max_items {
        rules.push(ValidationRule::MaxItems { value });
    }
    if schema.unique_items == Some(true) {
        rules.push(ValidationRule::UniqueItems);
    }
    if let Some(value) = schema.multiple_of {
        rules.push(ValidationRule::MultipleOf { value });
    }
    if let Some(value) = schema.min_properties {
        rules.push(ValidationRule::MinProperties { value });
    }
    if let Some(value) = schema.max_properties {
        rules.push(ValidationRule::MaxProperties { value });
    }
    rules
}

/// Rules of each property of an object schema, in declaration order.
/// Properties without rules are left out.
pub fn property_rules(
    schema: &Schema,
    resolver: Option<&ReferenceResolver<'_>>,
) -> IndexMap<String, Vec<ValidationRule>> {
    schema
        .properties
        .iter()
        .filter_map(|(name, prop)| {
            let required = schema.required.contains(name);
            let rules = match inline_schema(prop, resolver) {
                Some(prop) => validation_rules(&prop, required),
                None if required => vec![ValidationRule::Required],
                None => Vec::new(),
            };
            (!rules.is_empty()).then(|| (name.clone(), rules))
        })
        .collect()
}

/// Rules of a possibly referenced schema.
pub fn schema_rules(
    schema: &SchemaOrRef,
    required: bool,
    resolver: Option<&ReferenceResolver<'_>>,
) -> Vec<ValidationRule> {
    match inline_schema(schema, resolver) {
        Some(s) => validation_rules(&s, required),
        None if required => vec![ValidationRule::Required],
        None => Vec::new(),
    }
}

// 3.0 pairs `minimum` with a boolean flag; 3.1 puts the bound in
// `exclusiveMinimum` itself.
fn lower_bound(schema: &Schema) -> Option<ValidationRule> {
    match (&schema.exclusive_minimum, schema.minimum) {
        (Some(ExclusiveBound::Value(value)), _) => Some(ValidationRule::Minimum {
            value: *value,
            exclusive: true,
        }),
        (Some(ExclusiveBound::Flag(exclusive)), Some(value)) => Some(ValidationRule::Minimum {
            value,
            exclusive: *exclusive,
        }),
        (_, Some(value)) => Some(ValidationRule::Minimum {
            value,
            exclusive: false,
        }),
        _ => None,
    }
}

fn upper_bound(schema: &Schema) -> Option<ValidationRule> {
    match (&schema.exclusive_maximum, schema.maximum) {
        (Some(ExclusiveBound::Value(value)), _) => Some(ValidationRule::Maximum {
            value: *value,
            exclusive: true,
        }),
        (Some(ExclusiveBound::Flag(exclusive)), Some(value)) => Some(ValidationRule::Maximum {
            value,
            exclusive: *exclusive,
        }),
        (_, Some(value)) => Some(ValidationRule::Maximum {
            value,
            exclusive: false,
        }),
        _ => None,
    }
}
