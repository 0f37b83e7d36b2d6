//! Room documents

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::ids::RoomId;
use crate::repository::Document;

/// Room category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomCategory {
    King,
    Single,
    Twins,
}

/// Hosted image of a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomImage {
    pub public_id: String,
    pub url: String,
}

/// A bookable room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    #[serde(rename = "_id")]
    pub id: RoomId,
    pub name: String,
    pub description: String,
    pub price_per_night: f64,
    pub address: String,
    pub guest_capacity: u32,
    pub num_of_beds: u32,
    #[serde(default)]
    pub is_internet: bool,
    #[serde(default)]
    pub is_breakfast: bool,
    #[serde(default)]
    pub is_air_conditioned: bool,
    #[serde(default)]
    pub is_pets_allowed: bool,
    #[serde(default)]
    pub is_room_cleaning: bool,
    #[serde(default)]
    pub ratings: f64,
    #[serde(default)]
    pub num_of_reviews: u32,
    #[serde(default)]
    pub images: Vec<RoomImage>,
    pub category: RoomCategory,
    #[serde(serialize_with = "serialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// RFC 3339 with a fixed nine fractional digits, so stored timestamps sort as strings
fn serialize_timestamp<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

/// Body of a create request
///
/// Identifier and creation time are assigned by the collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoom {
    pub name: String,
    pub description: String,
    pub price_per_night: f64,
    pub address: String,
    pub guest_capacity: u32,
    pub num_of_beds: u32,
    #[serde(default)]
    pub is_internet: bool,
    #[serde(default)]
    pub is_breakfast: bool,
    #[serde(default)]
    pub is_air_conditioned: bool,
    #[serde(default)]
    pub is_pets_allowed: bool,
    #[serde(default)]
    pub is_room_cleaning: bool,
    #[serde(default)]
    pub ratings: f64,
    #[serde(default)]
    pub num_of_reviews: u32,
    #[serde(default)]
    pub images: Vec<RoomImage>,
    pub category: RoomCategory,
}

impl Document for Room {
    type Id = RoomId;
    type Draft = NewRoom;

    const ENTITY: &'static str = "Room";
    const ID_FIELD: &'static str = "_id";
    const IMMUTABLE_FIELDS: &'static [&'static str] = &["_id", "createdAt"];

    fn id(&self) -> &RoomId {
        &self.id
    }

    fn from_draft(draft: NewRoom) -> Self {
        Self {
            id: RoomId::new(),
            name: draft.name,
            description: draft.description,
            price_per_night: draft.price_per_night,
            address: draft.address,
            guest_capacity: draft.guest_capacity,
            num_of_beds: draft.num_of_beds,
            is_internet: draft.is_internet,
            is_breakfast: draft.is_breakfast,
            is_air_conditioned: draft.is_air_conditioned,
            is_pets_allowed: draft.is_pets_allowed,
            is_room_cleaning: draft.is_room_cleaning,
            ratings: draft.ratings,
            num_of_reviews: draft.num_of_reviews,
            images: draft.images,
            category: draft.category,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A valid create body with the given name, address and price
    pub fn new_room(name: &str, address: &str, price: f64) -> NewRoom {
        NewRoom {
            name: name.to_string(),
            description: format!("{name} description"),
            price_per_night: price,
            address: address.to_string(),
            guest_capacity: 2,
            num_of_beds: 1,
            is_internet: true,
            is_breakfast: false,
            is_air_conditioned: false,
            is_pets_allowed: false,
            is_room_cleaning: false,
            ratings: 0.0,
            num_of_reviews: 0,
            images: Vec::new(),
            category: RoomCategory::King,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_room_serializes_with_wire_names() {
        let room = Room::from_draft(fixtures::new_room("Sea View", "1 Beach Rd", 120.0));
        let value = serde_json::to_value(&room).unwrap();

        assert!(value["_id"].as_str().unwrap().starts_with("room_"));
        assert_eq!(value["pricePerNight"], json!(120.0));
        assert_eq!(value["isInternet"], json!(true));
        assert_eq!(value["category"], json!("King"));
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_created_at_has_fixed_precision() {
        let mut room = Room::from_draft(fixtures::new_room("Sea View", "1 Beach Rd", 120.0));

        room.created_at = "2024-05-01T12:00:00.123Z".parse().unwrap();
        let early = serde_json::to_value(&room).unwrap()["createdAt"].clone();
        assert_eq!(early, json!("2024-05-01T12:00:00.123000000Z"));

        room.created_at = "2024-05-01T12:00:00.123000500Z".parse().unwrap();
        let late = serde_json::to_value(&room).unwrap()["createdAt"].clone();
        assert!(early.as_str().unwrap() < late.as_str().unwrap());

        let parsed: Room = serde_json::from_value(serde_json::to_value(&room).unwrap()).unwrap();
        assert_eq!(parsed.created_at, room.created_at);
    }

    #[test]
    fn test_new_room_defaults() {
        let draft: NewRoom = serde_json::from_value(json!({
            "name": "Loft",
            "description": "Top floor",
            "pricePerNight": 80,
            "address": "12 Lake St",
            "guestCapacity": 3,
            "numOfBeds": 2,
            "category": "Twins"
        }))
        .unwrap();

        assert!(!draft.is_breakfast);
        assert_eq!(draft.ratings, 0.0);
        assert!(draft.images.is_empty());
        assert_eq!(draft.category, RoomCategory::Twins);
    }

    #[test]
    fn test_new_room_rejects_unknown_category() {
        let result = serde_json::from_value::<NewRoom>(json!({
            "name": "Loft",
            "description": "Top floor",
            "pricePerNight": 80,
            "address": "12 Lake St",
            "guestCapacity": 3,
            "numOfBeds": 2,
            "category": "Queen"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_draft_assigns_fresh_ids() {
        let a = Room::from_draft(fixtures::new_room("A", "x", 1.0));
        let b = Room::from_draft(fixtures::new_room("B", "y", 1.0));
        assert_ne!(a.id, b.id);
        assert_eq!(a.id(), &a.id);
    }
}
