use serde::Serialize;

use crate::{EnumConfig, Tags};

/// An enumeration or flag set with ordered members.
#[derive(Debug, Clone, Serialize)]
pub struct Enum {
    pub name: String,
    pub is_flag: bool,
    pub comment: String,
    pub members: Vec<EnumMember>,
    pub tags: Tags,
    pub config: EnumConfig,
}

impl Enum {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            is_flag: false,
            comment: String::new(),
            members: members.into_iter().map(EnumMember::new).collect(),
            tags: Tags::new(),
            config: EnumConfig::default(),
        }
    }

    /// Same as [`Enum::new`] but declared as a flag.
    pub fn flag<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            is_flag: true,
            ..Self::new(name, members)
        }
    }

    pub fn with_tags(mut self, tags: Tags) -> Self {
        self.tags = tags;
        self
    }

    pub fn first_member(&self) -> Option<&EnumMember> {
        self.members.first()
    }

    pub fn last_member(&self) -> Option<&EnumMember> {
        self.members.last()
    }

    pub fn member(&self, name: &str) -> Option<&EnumMember> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// A single enum member.
#[derive(Debug, Clone, Serialize)]
pub struct EnumMember {
    pub name: String,
    pub value: Option<i64>,
    pub comment: String,
    pub tags: Tags,
}

impl EnumMember {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            comment: String::new(),
            tags: Tags::new(),
        }
    }

    pub fn with_value(mut self, value: i64) -> Self {
        self.value = Some(value);
        self
    }
}
