//! Recommended places near the locations of a trip

use serde::{Deserialize, Serialize};

use super::location::{Location, LocationId};

/// Which part of the trip a recommendation was fetched near
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaKind {
    Source,
    Stop,
    Destination,
}

impl AreaKind {
    /// Heading used when listing recommendations of this kind
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AreaKind::Source => "Source Area",
            AreaKind::Stop => "Stop Area",
            AreaKind::Destination => "Destination Area",
        }
    }
}

/// Originating area of a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Area {
    pub id: LocationId,
    pub kind: AreaKind,
    pub label: String,
}

impl Area {
    /// Area for a location playing the given role in the trip
    #[must_use]
    pub fn for_location(location: &Location, kind: AreaKind) -> Self {
        let label = match kind {
            AreaKind::Source | AreaKind::Destination => kind.label().to_string(),
            AreaKind::Stop => format!("Near {}", location.short_name()),
        };
        Self {
            id: location.id,
            kind,
            label,
        }
    }
}

/// A point of interest suggested to the traveller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Map marker glyph, see [`icon_for`]
    pub icon: String,
    pub description: String,
    pub lat: f64,
    pub lng: f64,
    /// Display label of the originating area
    pub area: String,
    pub area_id: LocationId,
    pub area_kind: AreaKind,
}

/// Identity of a recommended place: name plus exact coordinates
pub type PlaceKey = (String, u64, u64);

impl Recommendation {
    /// Two recommendations with equal keys describe the same place
    #[must_use]
    pub fn place_key(&self) -> PlaceKey {
        (self.name.clone(), self.lat.to_bits(), self.lng.to_bits())
    }
}

/// Map marker glyph for a place type
#[must_use]
pub fn icon_for(kind: &str) -> &'static str {
    match kind {
        "attraction" => "🎯",
        "museum" | "historic" => "🏛️",
        "gallery" => "🖼️",
        "zoo" => "🦁",
        "theme_park" => "🎢",
        "park" => "🌳",
        "fort" | "palace" => "🏰",
        "temple" => "🛕",
        "church" => "⛪",
        "monument" => "🗿",
        _ => "📍",
    }
}

/// A restaurant suggestion for the dinner slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub cuisine: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(name: &str, kind: &str, lat: f64, lng: f64) -> Recommendation {
        let origin = Location::new(0.0, 0.0, "Origin");
        let area = Area::for_location(&origin, AreaKind::Source);
        Recommendation {
            name: name.to_string(),
            kind: kind.to_string(),
            icon: icon_for(kind).to_string(),
            description: String::new(),
            lat,
            lng,
            area: area.label,
            area_id: area.id,
            area_kind: area.kind,
        }
    }

    #[test]
    fn test_place_key_uses_name_and_coordinates() {
        let a = rec("Gateway of India", "attraction", 18.9220, 72.8347);
        let b = rec("Gateway of India", "monument", 18.9220, 72.8347);
        let c = rec("Gateway of India", "attraction", 18.9221, 72.8347);
        assert_eq!(a.place_key(), b.place_key());
        assert_ne!(a.place_key(), c.place_key());
    }

    #[test]
    fn test_icon_defaults_to_pin() {
        assert_eq!(icon_for("museum"), "🏛️");
        assert_eq!(icon_for("theme_park"), "🎢");
        assert_eq!(icon_for("viewpoint"), "📍");
    }

    #[test]
    fn test_area_labels() {
        let stop = Location::new(18.75, 73.4, "Lonavala, Pune District, India");
        assert_eq!(Area::for_location(&stop, AreaKind::Stop).label, "Near Lonavala");
        assert_eq!(
            Area::for_location(&stop, AreaKind::Destination).label,
            "Destination Area"
        );
    }

    #[test]
    fn test_serializes_type_field() {
        let json = serde_json::to_value(rec("Fort", "fort", 1.0, 2.0)).unwrap();
        assert_eq!(json["type"], "fort");
        assert_eq!(json["icon"], "🏰");
        assert_eq!(json["areaKind"], "source");
    }
}
