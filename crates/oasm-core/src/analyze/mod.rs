//! Serialization analysis of parameters, bodies and responses.

pub mod body;
pub mod constraints;
pub mod decode;
pub mod media;
pub mod params;
pub mod responses;
pub mod xml;

pub use body::{BodyVariant, FormField, PartEncoding};
pub use constraints::ValidationRule;
pub use decode::DecodeHint;
pub use media::MediaKind;
pub use params::{ParamSerialization, ParamStyle, SerializationLink};
pub use responses::{ResponseKind, ResponseVariant};
pub use xml::XmlConfig;

use crate::diagnostics::Diagnostics;
use crate::ir::PathInfo;
use crate::parse::parameter::Parameter;
use crate::parse::schema::SchemaOrRef;
use crate::resolve::ReferenceResolver;

/// Per-operation serialization analysis against one resolver.
pub struct SerializationAnalyzer<'r, 'a> {
    resolver: Option<&'r ReferenceResolver<'a>>,
    diagnostics: &'r Diagnostics,
    auto_decode_depth: usize,
}

impl<'r, 'a> SerializationAnalyzer<'r, 'a> {
    pub fn new(
        resolver: Option<&'r ReferenceResolver<'a>>,
        diagnostics: &'r Diagnostics,
        auto_decode_depth: usize,
    ) -> Self {
        Self {
            resolver,
            diagnostics,
            auto_decode_depth,
        }
    }

    pub fn parameter(&self, param: &Parameter) -> Option<ParamSerialization> {
        params::analyze_parameter(param, self.diagnostics)
    }

    /// Serializations of every non-body parameter of an operation.
    pub fn parameters(&self, info: &PathInfo) -> Vec<ParamSerialization> {
        info.parameters
            .iter()
            .filter_map(|p| self.parameter(p))
            .collect()
    }

    pub fn body(&self, info: &PathInfo) -> Option<BodyVariant> {
        body::analyze_body(info, self.resolver, self.diagnostics)
    }

    pub fn responses(&self, info: &PathInfo) -> Vec<ResponseVariant> {
        responses::analyze_responses(info, self.resolver, self.auto_decode_depth)
    }

    pub fn decode_hints(&self, schema: &SchemaOrRef) -> Vec<DecodeHint> {
        decode::decode_hints(schema, self.resolver, self.auto_decode_depth)
    }

    pub fn xml_config(&self, schema: &SchemaOrRef) -> XmlConfig {
        let name = xml::root_name(schema, self.resolver);
        xml::xml_config(schema, &name, self.resolver)
    }

    pub fn validation_rules(&self, schema: &SchemaOrRef, required: bool) -> Vec<ValidationRule> {
        constraints::schema_rules(schema, required, self.resolver)
    }
}
