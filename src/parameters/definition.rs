use super::value::ParamsValue;

/// Properties of a parameter whose value names a column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnProperties {
    /// The transformer writes to the referenced column.
    pub affected: bool,
    /// Column types accepted for the referenced column. Empty means any.
    pub allowed_types: Vec<String>,
}

impl ColumnProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_affected(mut self, affected: bool) -> Self {
        self.affected = affected;
        self
    }

    pub fn with_allowed_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_types = types.into_iter().map(Into::into).collect();
        self
    }
}

/// Permits binding a parameter to a sibling column, read per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicModeProperties {
    /// Column types that may supply the value.
    pub compatible_types: Vec<String>,
}

impl DynamicModeProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compatible_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compatible_types = types.into_iter().map(Into::into).collect();
        self
    }
}

/// Declaration of one named transformer parameter.
///
/// Definitions are fixed at registration time and shared by every transformer instance built from
/// the same registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDefinition {
    pub name: String,
    pub description: String,
    pub required: bool,
    pub default_value: Option<ParamsValue>,
    /// Set when the parameter value is a column name.
    pub column_properties: Option<ColumnProperties>,
    /// Name of the column parameter whose type governs how literal values are decoded.
    pub link_parameter: Option<String>,
    /// Set when the parameter may be bound to a sibling column.
    pub dynamic_mode: Option<DynamicModeProperties>,
}

impl ParameterDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            required: false,
            default_value: None,
            column_properties: None,
            link_parameter: None,
            dynamic_mode: None,
        }
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn with_default_value(mut self, value: impl Into<ParamsValue>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_column(mut self, props: ColumnProperties) -> Self {
        self.column_properties = Some(props);
        self
    }

    pub fn with_link_parameter(mut self, name: impl Into<String>) -> Self {
        self.link_parameter = Some(name.into());
        self
    }

    pub fn with_dynamic_mode(mut self, props: DynamicModeProperties) -> Self {
        self.dynamic_mode = Some(props);
        self
    }

    pub fn is_column(&self) -> bool {
        self.column_properties.is_some()
    }

    pub fn supports_dynamic_mode(&self) -> bool {
        self.dynamic_mode.is_some()
    }
}
