//! # GeoJSON
//!
//! Point records in, Features out.
//!
//! - Coordinates are WGS84 (SRID 4326) and always ordered `[longitude, latitude]`
//! - A Feature carries the record id, a Point geometry and one label property,
//!   `species` for sightings, `name` for important locations
//! - Records stored without a location are left out of collections
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const MAX_LABEL_CHARS: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lon: f64, lat: f64) -> Result<Self, String> {
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err("lon must be between -180 and 180".to_string());
        }

        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err("lat must be between -90 and 90".to_string());
        }

        Ok(Self { lon, lat })
    }

    pub fn coordinates(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Sighting,
    ImportantLocation,
}

impl RecordKind {
    pub fn label_field(self) -> &'static str {
        match self {
            RecordKind::Sighting => "species",
            RecordKind::ImportantLocation => "name",
        }
    }

    pub fn collection(self) -> &'static str {
        match self {
            RecordKind::Sighting => "sightings",
            RecordKind::ImportantLocation => "important_locations",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: u64,
    #[serde(default)]
    pub label: String,
    pub location: Option<Point>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub label: String,
    pub location: Point,
}

impl NewRecord {
    pub fn into_record(self, id: u64) -> Record {
        Record {
            id,
            label: self.label,
            location: Some(self.location),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct Feature {
    pub id: u64,
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(kind: RecordKind, id: u64, label: &str, location: Point) -> Self {
        let mut properties = Map::new();
        properties.insert(
            kind.label_field().to_string(),
            Value::String(label.to_string()),
        );

        Self {
            id,
            geometry: Geometry::Point {
                coordinates: location.coordinates(),
            },
            properties,
        }
    }

    /// `None` for records stored without a location.
    pub fn from_record(kind: RecordKind, record: &Record) -> Option<Self> {
        let location = record.location?;

        Some(Self::new(kind, record.id, &record.label, location))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn from_records(kind: RecordKind, records: &[Record]) -> Self {
        Self {
            features: records
                .iter()
                .filter_map(|record| Feature::from_record(kind, record))
                .collect(),
        }
    }
}
