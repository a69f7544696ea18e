//! Identifier schemes.
//!
//! An identifier scheme decides which stable property of a metadata object
//! (internal id, UID, UUID, code, name, or the value of a custom attribute)
//! represents that object in a request or a response.
//!
//! Wire form:
//!
//! ```text
//! ID | UID | UUID | CODE | NAME | ATTRIBUTE:<11-char uid>
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use cubeplan::idscheme::IdScheme;
//!
//! let scheme: IdScheme = "code".parse()?;
//! assert_eq!(scheme.name(), "CODE");
//!
//! let attr: IdScheme = "ATTRIBUTE:Jy1YeKp4Ae7".parse()?;
//! assert_eq!(attr.attribute(), Some("Jy1YeKp4Ae7"));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::Identifiable;

/// Prefix of the attribute scheme wire form.
pub const ATTRIBUTE_PREFIX: &str = "ATTRIBUTE:";

/// Length of a UID.
pub const UID_LENGTH: usize = 11;

/// Total length of an attribute scheme token (`ATTRIBUTE:` + UID).
pub const ATTRIBUTE_SCHEME_LENGTH: usize = ATTRIBUTE_PREFIX.len() + UID_LENGTH;

/// Errors raised while parsing identifier schemes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdSchemeError {
    #[error("Invalid enum value for identifier scheme: '{0}'")]
    InvalidEnumValue(String),

    #[error("Malformed attribute identifier scheme '{0}': expected 'ATTRIBUTE:' followed by an 11 character UID")]
    MalformedAttribute(String),
}

/// The property an identifier scheme selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifiableProperty {
    Id,
    Uid,
    Uuid,
    Code,
    Name,
    Attribute,
}

impl IdentifiableProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentifiableProperty::Id => "ID",
            IdentifiableProperty::Uid => "UID",
            IdentifiableProperty::Uuid => "UUID",
            IdentifiableProperty::Code => "CODE",
            IdentifiableProperty::Name => "NAME",
            IdentifiableProperty::Attribute => "ATTRIBUTE",
        }
    }
}

/// An identifier scheme.
///
/// `Attribute` always carries a non-empty attribute UID; equality and
/// hashing are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IdScheme {
    #[default]
    Null,
    Id,
    Uid,
    Uuid,
    Code,
    Name,
    Attribute(String),
}

impl IdScheme {
    /// Parse an optional wire token. Absent input yields [`IdScheme::Null`].
    pub fn from(scheme: Option<&str>) -> Result<Self, IdSchemeError> {
        match scheme {
            None => Ok(IdScheme::Null),
            Some(s) => s.parse(),
        }
    }

    /// Copy an optional scheme. Absent input yields [`IdScheme::Null`].
    pub fn from_scheme(scheme: Option<&IdScheme>) -> Self {
        scheme.cloned().unwrap_or_default()
    }

    /// Whether a token has the attribute scheme form.
    pub fn is_attribute_token(token: &str) -> bool {
        token.len() == ATTRIBUTE_SCHEME_LENGTH && has_attribute_prefix(token)
    }

    /// The property this scheme selects, `None` for the null scheme.
    pub fn property(&self) -> Option<IdentifiableProperty> {
        match self {
            IdScheme::Null => None,
            IdScheme::Id => Some(IdentifiableProperty::Id),
            IdScheme::Uid => Some(IdentifiableProperty::Uid),
            IdScheme::Uuid => Some(IdentifiableProperty::Uuid),
            IdScheme::Code => Some(IdentifiableProperty::Code),
            IdScheme::Name => Some(IdentifiableProperty::Name),
            IdScheme::Attribute(_) => Some(IdentifiableProperty::Attribute),
        }
    }

    /// The wire form: the property name, or `ATTRIBUTE:<uid>`.
    pub fn name(&self) -> String {
        match self {
            IdScheme::Null => "NULL".to_string(),
            IdScheme::Attribute(uid) => format!("{}{}", ATTRIBUTE_PREFIX, uid),
            other => other
                .property()
                .map(|p| p.as_str().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, IdScheme::Null)
    }

    pub fn is_not_null(&self) -> bool {
        !self.is_null()
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, IdScheme::Attribute(_))
    }

    /// The attribute UID of an attribute scheme.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            IdScheme::Attribute(uid) => Some(uid),
            _ => None,
        }
    }

    /// Whether this scheme selects the given property.
    pub fn is(&self, property: IdentifiableProperty) -> bool {
        self.property() == Some(property)
    }

    /// Resolve the identifier of an object under this scheme.
    ///
    /// Returns `None` for the null scheme, or when the object has no value
    /// for the selected property (no code, no UUID, attribute not set).
    pub fn identifier_of<T: Identifiable + ?Sized>(&self, object: &T) -> Option<String> {
        match self {
            IdScheme::Null => None,
            IdScheme::Id => Some(object.id().to_string()),
            IdScheme::Uid => Some(object.uid().to_string()),
            IdScheme::Uuid => object.uuid().map(str::to_string),
            IdScheme::Code => object.code().map(str::to_string),
            IdScheme::Name => Some(object.name().to_string()),
            IdScheme::Attribute(uid) => object.attribute_value(uid).map(str::to_string),
        }
    }

    /// Resolve the identifier under this scheme, falling back to the UID.
    pub fn identifier_or_uid<T: Identifiable + ?Sized>(&self, object: &T) -> String {
        self.identifier_of(object)
            .unwrap_or_else(|| object.uid().to_string())
    }
}

fn has_attribute_prefix(token: &str) -> bool {
    token
        .get(..ATTRIBUTE_PREFIX.len())
        .is_some_and(|p| p.eq_ignore_ascii_case(ATTRIBUTE_PREFIX))
}

impl FromStr for IdScheme {
    type Err = IdSchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if has_attribute_prefix(s) {
            if s.len() != ATTRIBUTE_SCHEME_LENGTH {
                return Err(IdSchemeError::MalformedAttribute(s.to_string()));
            }
            return Ok(IdScheme::Attribute(s[ATTRIBUTE_PREFIX.len()..].to_string()));
        }

        match s.to_uppercase().as_str() {
            "NULL" => Ok(IdScheme::Null),
            "ID" => Ok(IdScheme::Id),
            "UID" => Ok(IdScheme::Uid),
            "UUID" => Ok(IdScheme::Uuid),
            "CODE" => Ok(IdScheme::Code),
            "NAME" => Ok(IdScheme::Name),
            _ => Err(IdSchemeError::InvalidEnumValue(s.to_string())),
        }
    }
}

impl TryFrom<String> for IdScheme {
    type Error = IdSchemeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IdScheme> for String {
    fn from(scheme: IdScheme) -> Self {
        scheme.name()
    }
}

impl fmt::Display for IdScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
