//! Organisation units and the org-unit field of event data.

use serde::{Deserialize, Serialize};

use super::identifiable::{BaseObject, Identifiable};

/// An organisation unit at a level of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgUnit {
    #[serde(flatten)]
    pub base: BaseObject,
    /// Hierarchy level, 1 being the root.
    pub level: u32,
    /// Slash-separated ancestor UID path, e.g. `/ImspTQPwCqd/O6uvpzGd5pu`.
    #[serde(default)]
    pub path: String,
}

impl OrgUnit {
    pub fn new(uid: &str, name: &str, level: u32) -> Self {
        Self {
            base: BaseObject::new(uid, name),
            level,
            path: format!("/{}", uid),
        }
    }

    pub fn with_path(mut self, path: &str) -> Self {
        self.path = path.into();
        self
    }

    pub fn uid(&self) -> &str {
        &self.base.uid
    }

    /// Column holding the UID of this unit's level in analytics tables.
    pub fn level_column(&self) -> String {
        level_column(self.level)
    }
}

/// Column holding org-unit UIDs of a hierarchy level.
pub fn level_column(level: u32) -> String {
    format!("uidlevel{}", level)
}

impl Identifiable for OrgUnit {
    fn id(&self) -> i64 {
        self.base.id()
    }

    fn uid(&self) -> &str {
        self.base.uid()
    }

    fn uuid(&self) -> Option<&str> {
        self.base.uuid()
    }

    fn code(&self) -> Option<&str> {
        self.base.code()
    }

    fn name(&self) -> &str {
        self.base.name()
    }

    fn attribute_value(&self, attribute_uid: &str) -> Option<&str> {
        self.base.attribute_value(attribute_uid)
    }
}

/// Which org unit an event or enrollment is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrgUnitField {
    /// The org unit the event was captured at.
    #[default]
    Default,
    /// An org-unit valued attribute or data element.
    Attribute(String),
    Registration,
    Enrollment,
    OwnerAtStart,
    OwnerAtEnd,
}

impl OrgUnitField {
    /// Parse a configured field name. Unknown names denote an attribute UID.
    pub fn from(field: Option<&str>) -> Self {
        match field {
            None => OrgUnitField::Default,
            Some(f) => match f.to_uppercase().as_str() {
                "" | "DEFAULT" => OrgUnitField::Default,
                "REGISTRATION" => OrgUnitField::Registration,
                "ENROLLMENT" => OrgUnitField::Enrollment,
                "OWNER_AT_START" => OrgUnitField::OwnerAtStart,
                "OWNER_AT_END" => OrgUnitField::OwnerAtEnd,
                _ => OrgUnitField::Attribute(f.to_string()),
            },
        }
    }

    /// Whether the field is an ownership, which can change over time.
    pub fn is_ownership(&self) -> bool {
        matches!(self, OrgUnitField::OwnerAtStart | OrgUnitField::OwnerAtEnd)
    }

    /// Column holding the org unit UID.
    pub fn column(&self) -> String {
        match self {
            OrgUnitField::Default => "ou".to_string(),
            OrgUnitField::Attribute(uid) => uid.clone(),
            OrgUnitField::Registration => "registrationou".to_string(),
            OrgUnitField::Enrollment => "enrollmentou".to_string(),
            OrgUnitField::OwnerAtStart | OrgUnitField::OwnerAtEnd => "ownerou".to_string(),
        }
    }
}
