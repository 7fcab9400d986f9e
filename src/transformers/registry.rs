//! Registry of transformer definitions.
//!
//! The registry is an explicit value built once during initialization and passed by reference to
//! whoever instantiates transformers.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::config::TransformerConfig;
use crate::error::{MaskingError, MaskingResult};
use crate::generators::{build_generator, GeneratorKind};
use crate::parameters::{resolve_parameters, ParameterDefinition, ValidationWarnings};
use crate::types::Schema;

use super::integer::register_integer_transformers;
use super::{NewTransformerFn, Transformer, TransformerContext};

/// Name and description of a registered transformer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformerProperties {
    pub name: String,
    pub description: String,
}

impl TransformerProperties {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Everything needed to build a transformer from configuration.
#[derive(Clone)]
pub struct TransformerDefinition {
    pub properties: TransformerProperties,
    pub new: NewTransformerFn,
    pub parameters: Vec<ParameterDefinition>,
    /// Bytes of generator output the transformer consumes per value.
    pub generator_output_length: usize,
    pub generator_kind: GeneratorKind,
}

impl fmt::Debug for TransformerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformerDefinition")
            .field("properties", &self.properties)
            .field("parameters", &self.parameters.len())
            .field("generator_output_length", &self.generator_output_length)
            .field("generator_kind", &self.generator_kind)
            .finish()
    }
}

/// Transformer definitions keyed by unique name.
#[derive(Debug, Default)]
pub struct TransformerRegistry {
    definitions: BTreeMap<String, TransformerDefinition>,
}

impl TransformerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every transformer shipped with this crate.
    pub fn with_builtin() -> MaskingResult<Self> {
        let mut registry = Self::new();
        register_integer_transformers(&mut registry)?;
        Ok(registry)
    }

    /// Adds a definition. Fails if the name is already taken.
    pub fn register(&mut self, definition: TransformerDefinition) -> MaskingResult<()> {
        let name = definition.properties.name.clone();
        if self.definitions.contains_key(&name) {
            return Err(MaskingError::DuplicateTransformer(name));
        }
        debug!(
            transformer = %name,
            kind = %definition.generator_kind,
            parameters = definition.parameters.len(),
            "transformer registered"
        );
        self.definitions.insert(name, definition);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TransformerDefinition> {
        self.definitions.get(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Builds the transformer described by `config` against `schema`.
    ///
    /// Parameters are validated before the generator or transformer is built; a fatal
    /// validation outcome is returned as [`MaskingError::FatalValidation`].
    pub fn instantiate(
        &self,
        config: &TransformerConfig,
        schema: &Schema,
    ) -> MaskingResult<(Box<dyn Transformer>, ValidationWarnings)> {
        let definition = self
            .get(&config.name)
            .ok_or_else(|| MaskingError::UnknownTransformer(config.name.clone()))?;

        let (parameters, mut warnings) =
            resolve_parameters(&definition.parameters, &config.params, &config.dynamic_params, schema)?;
        if warnings.is_fatal() {
            return Err(MaskingError::FatalValidation(warnings));
        }

        let generator = build_generator(
            definition.generator_kind,
            config.seed,
            config.salt.as_deref(),
            definition.generator_output_length,
        )?;

        let (transformer, transformer_warnings) = (definition.new)(TransformerContext {
            name: &definition.properties.name,
            schema,
            parameters,
            generator,
        })?;
        warnings.extend(transformer_warnings);
        Ok((transformer, warnings))
    }
}

/// Registers `Random<name>` and `Deterministic<name>` sharing one constructor and parameter set.
pub fn register_random_and_deterministic(
    registry: &mut TransformerRegistry,
    name: &str,
    description: &str,
    new: NewTransformerFn,
    parameters: Vec<ParameterDefinition>,
    generator_output_length: usize,
) -> MaskingResult<()> {
    for kind in [GeneratorKind::Random, GeneratorKind::Deterministic] {
        registry.register(TransformerDefinition {
            properties: TransformerProperties::new(format!("{}{name}", kind.prefix()), description),
            new,
            parameters: parameters.clone(),
            generator_output_length,
            generator_kind: kind,
        })?;
    }
    Ok(())
}
