//! Declared argument shapes for tools and prompts, and field-by-field validation.

use serde_json::{json, Map, Value};

use crate::types::{McpError, McpResult, PromptArgument};

/// Validated arguments handed to a tool executor or prompt renderer.
pub type Arguments = Map<String, Value>;

/// Primitive type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
}

impl FieldType {
    /// JSON Schema type name.
    pub fn name(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Boolean => value.is_boolean(),
        }
    }
}

/// One named field of an input shape.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub description: Option<String>,
}

/// Ordered set of fields a tool or prompt accepts.
#[derive(Debug, Clone, Default)]
pub struct InputShape {
    fields: Vec<FieldSpec>,
}

impl InputShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field.
    pub fn required(self, name: &str, field_type: FieldType, description: &str) -> Self {
        self.field(name, field_type, true, description)
    }

    /// Add an optional field.
    pub fn optional(self, name: &str, field_type: FieldType, description: &str) -> Self {
        self.field(name, field_type, false, description)
    }

    fn field(mut self, name: &str, field_type: FieldType, required: bool, description: &str) -> Self {
        self.fields.push(FieldSpec {
            name: name.to_string(),
            field_type,
            required,
            description: (!description.is_empty()).then(|| description.to_string()),
        });
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Check `args` against the shape. The first offending field is named in
    /// the error. `null` values count as absent and are dropped.
    pub fn validate(&self, args: Option<Value>) -> McpResult<Arguments> {
        let mut map = match args {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map,
            Some(other) => {
                return Err(McpError::invalid_argument(
                    "arguments",
                    format!("expected an object, got {}", type_name(&other)),
                ))
            }
        };
        map.retain(|_, v| !v.is_null());

        for field in &self.fields {
            match map.get(&field.name) {
                None if field.required => {
                    return Err(McpError::invalid_argument(
                        &field.name,
                        "required argument is missing",
                    ));
                }
                None => {}
                Some(value) if !field.field_type.accepts(value) => {
                    return Err(McpError::invalid_argument(
                        &field.name,
                        format!(
                            "expected {}, got {}",
                            field.field_type.name(),
                            type_name(value)
                        ),
                    ));
                }
                Some(_) => {}
            }
        }

        if let Some(unknown) = map
            .keys()
            .find(|key| !self.fields.iter().any(|f| &f.name == *key))
        {
            return Err(McpError::invalid_argument(
                unknown.as_str(),
                "unexpected argument",
            ));
        }

        Ok(map)
    }

    /// JSON Schema advertised by `tools/list`.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut prop = json!({ "type": field.field_type.name() });
            if let Some(description) = &field.description {
                prop["description"] = Value::String(description.clone());
            }
            properties.insert(field.name.clone(), prop);
        }
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Argument list advertised by `prompts/list`.
    pub fn to_prompt_arguments(&self) -> Vec<PromptArgument> {
        self.fields
            .iter()
            .map(|f| PromptArgument {
                name: f.name.clone(),
                description: f.description.clone(),
                required: f.required,
            })
            .collect()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fetch a string argument that validation already guaranteed.
pub fn str_arg<'a>(args: &'a Arguments, name: &str) -> McpResult<&'a str> {
    args.get(name)
        .and_then(Value::as_str)
        .ok_or_else(|| McpError::invalid_argument(name, "expected string"))
}

/// Fetch an optional string argument.
pub fn opt_str_arg<'a>(args: &'a Arguments, name: &str) -> Option<&'a str> {
    args.get(name).and_then(Value::as_str)
}
