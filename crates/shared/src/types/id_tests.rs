use super::*;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_typed_id_creation() {
    let id = VehicleId::new();
    assert!(Uuid::parse_str(id.as_str()).is_ok());
}

#[test]
fn test_typed_id_from_uuid() {
    let uuid = Uuid::new_v4();
    let id = ImageId::from_uuid(uuid);
    assert_eq!(id.into_inner(), uuid.to_string());
}

#[test]
fn test_typed_ids_are_time_ordered() {
    let first = ImageId::new();
    let second = ImageId::new();
    assert!(first < second);
}

#[test]
fn test_typed_id_display() {
    let id = VehicleId::from_str("veh-1712345678-42").unwrap();
    assert_eq!(format!("{id}"), "veh-1712345678-42");
}

#[test]
fn test_typed_id_from_str_trims() {
    let id = ImageId::from_str("  img-1  ").unwrap();
    assert_eq!(id.as_str(), "img-1");
}

#[test]
fn test_typed_id_from_str_error() {
    assert_eq!(ImageId::from_str("   "), Err(EmptyIdError));
}

#[test]
fn test_typed_id_serde_transparent() {
    let id = MessageId::from_str("msg-7").unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"msg-7\"");

    let back: MessageId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
