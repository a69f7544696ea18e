//! Identifier scheme parsing and resolution.

use cubeplan::idscheme::{IdScheme, IdSchemeError};
use cubeplan::model::BaseObject;

#[test]
fn test_round_trip_through_name() {
    let schemes = [
        IdScheme::Id,
        IdScheme::Uid,
        IdScheme::Uuid,
        IdScheme::Code,
        IdScheme::Name,
        IdScheme::Attribute("Jy1YeKp4Ae7".to_string()),
    ];
    for scheme in schemes {
        assert_eq!(IdScheme::from(Some(&scheme.name())).unwrap(), scheme);
    }
}

#[test]
fn test_absent_is_null() {
    assert_eq!(IdScheme::from(None).unwrap(), IdScheme::Null);
    assert!(IdScheme::from(None).unwrap().is_null());
    assert_eq!(IdScheme::from_scheme(None), IdScheme::Null);
    assert_eq!(IdScheme::from_scheme(Some(&IdScheme::Code)), IdScheme::Code);
}

#[test]
fn test_property_names_are_case_insensitive() {
    assert_eq!(IdScheme::from(Some("uid")).unwrap(), IdScheme::Uid);
    assert_eq!(IdScheme::from(Some("Name")).unwrap(), IdScheme::Name);
    assert_eq!(IdScheme::from(Some("CODE")).unwrap().to_string(), "CODE");
}

#[test]
fn test_attribute_scheme() {
    let scheme = IdScheme::from(Some("ATTRIBUTE:Jy1YeKp4Ae7")).unwrap();
    assert!(scheme.is_attribute());
    assert_eq!(scheme.attribute(), Some("Jy1YeKp4Ae7"));
    assert_eq!(scheme.name(), "ATTRIBUTE:Jy1YeKp4Ae7");
}

#[test]
fn test_invalid_schemes() {
    assert_eq!(
        IdScheme::from(Some("SHORTNAME")),
        Err(IdSchemeError::InvalidEnumValue("SHORTNAME".to_string()))
    );
    assert_eq!(
        IdScheme::from(Some("ATTRIBUTE:short")),
        Err(IdSchemeError::MalformedAttribute("ATTRIBUTE:short".to_string()))
    );
    assert!(IdScheme::from(Some("ATTRIBUTE:Jy1YeKp4Ae7x")).is_err());
}

#[test]
fn test_identifier_of_object() {
    let object = BaseObject::new("ImspTQPwCqd", "Sierra Leone")
        .with_id(42)
        .with_code("OU_525")
        .with_attribute_value("Jy1YeKp4Ae7", "SL");

    assert_eq!(IdScheme::Id.identifier_of(&object), Some("42".to_string()));
    assert_eq!(IdScheme::Uid.identifier_of(&object), Some("ImspTQPwCqd".to_string()));
    assert_eq!(IdScheme::Code.identifier_of(&object), Some("OU_525".to_string()));
    assert_eq!(IdScheme::Name.identifier_of(&object), Some("Sierra Leone".to_string()));
    assert_eq!(
        IdScheme::Attribute("Jy1YeKp4Ae7".to_string()).identifier_of(&object),
        Some("SL".to_string())
    );
    assert_eq!(IdScheme::Uuid.identifier_of(&object), None);
    assert_eq!(IdScheme::Uuid.identifier_or_uid(&object), "ImspTQPwCqd");
    assert_eq!(IdScheme::Null.identifier_of(&object), None);
}

#[test]
fn test_serde_uses_wire_form() {
    let json = serde_json::to_string(&IdScheme::Attribute("Jy1YeKp4Ae7".to_string())).unwrap();
    assert_eq!(json, "\"ATTRIBUTE:Jy1YeKp4Ae7\"");
    let scheme: IdScheme = serde_json::from_str("\"code\"").unwrap();
    assert_eq!(scheme, IdScheme::Code);
    assert!(serde_json::from_str::<IdScheme>("\"bogus\"").is_err());
}
