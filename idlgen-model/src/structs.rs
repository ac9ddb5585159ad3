use serde::Serialize;

use crate::{StructConfig, Tags, Type};

/// A plain data structure with ordered fields.
#[derive(Debug, Clone, Serialize)]
pub struct Struct {
    pub name: String,
    pub comment: String,
    pub fields: Vec<Field>,
    pub tags: Tags,
    pub config: StructConfig,
}

impl Struct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            fields: Vec::new(),
            tags: Tags::new(),
            config: StructConfig::default(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A typed field of a struct.
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
    pub comment: String,
    pub tags: Tags,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            comment: String::new(),
            tags: Tags::new(),
        }
    }
}
