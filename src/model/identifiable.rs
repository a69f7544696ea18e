//! Identifiable metadata objects.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Anything that can be addressed through an identifier scheme.
pub trait Identifiable {
    fn id(&self) -> i64;
    fn uid(&self) -> &str;
    fn uuid(&self) -> Option<&str>;
    fn code(&self) -> Option<&str>;
    fn name(&self) -> &str;
    fn attribute_value(&self, attribute_uid: &str) -> Option<&str>;
}

/// Identity shared by all metadata objects the planner consumes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BaseObject {
    pub id: i64,
    pub uid: String,
    pub uuid: Option<String>,
    pub code: Option<String>,
    pub name: String,
    pub short_name: Option<String>,
    pub attribute_values: BTreeMap<String, String>,
}

impl BaseObject {
    pub fn new(uid: &str, name: &str) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn with_uuid(mut self, uuid: &str) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_short_name(mut self, short_name: &str) -> Self {
        self.short_name = Some(short_name.into());
        self
    }

    pub fn with_attribute_value(mut self, attribute_uid: &str, value: &str) -> Self {
        self.attribute_values
            .insert(attribute_uid.into(), value.into());
        self
    }

    /// Short name, or the name when no short name is set.
    pub fn display_short_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }
}

impl Identifiable for BaseObject {
    fn id(&self) -> i64 {
        self.id
    }

    fn uid(&self) -> &str {
        &self.uid
    }

    fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn attribute_value(&self, attribute_uid: &str) -> Option<&str> {
        self.attribute_values.get(attribute_uid).map(String::as_str)
    }
}
