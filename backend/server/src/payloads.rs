//! Request bodies.
//!
//! Each POST body decodes into one of these and is validated once, see
//! [`crate::utils::decode`]. Text fields are trimmed while decoding, so a
//! whitespace-only value counts as blank.
use serde::{Deserialize, Deserializer};
use validator::Validate;

use crate::geo::{MAX_LABEL_CHARS, NewRecord, Point, RecordKind};

#[derive(Debug, Deserialize, Validate)]
pub struct SendOtp {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtp {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 6, max = 6))]
    pub otp: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SendConfirmation {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1, max = 200))]
    pub inquiry_type: String,
    #[serde(deserialize_with = "trimmed")]
    #[validate(length(min = 1))]
    pub message: String,
}

fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = String::deserialize(deserializer)?;

    Ok(value.trim().to_string())
}

#[derive(Debug, Deserialize)]
pub struct CreateSighting {
    pub lon: f64,
    pub lat: f64,
    #[serde(default)]
    pub species: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateImportantLocation {
    pub lon: f64,
    pub lat: f64,
    #[serde(default)]
    pub name: Option<String>,
}

/// A POST body that becomes one stored point record.
pub trait FeaturePayload {
    const KIND: RecordKind;

    fn into_new_record(self) -> Result<NewRecord, String>;
}

impl FeaturePayload for CreateSighting {
    const KIND: RecordKind = RecordKind::Sighting;

    fn into_new_record(self) -> Result<NewRecord, String> {
        new_record(self.lon, self.lat, self.species, Self::KIND)
    }
}

impl FeaturePayload for CreateImportantLocation {
    const KIND: RecordKind = RecordKind::ImportantLocation;

    fn into_new_record(self) -> Result<NewRecord, String> {
        new_record(self.lon, self.lat, self.name, Self::KIND)
    }
}

fn new_record(
    lon: f64,
    lat: f64,
    label: Option<String>,
    kind: RecordKind,
) -> Result<NewRecord, String> {
    let location = Point::new(lon, lat)?;
    let label = label.as_deref().map(str::trim).unwrap_or_default();

    if label.chars().count() > MAX_LABEL_CHARS {
        return Err(format!(
            "{} must be at most {MAX_LABEL_CHARS} characters",
            kind.label_field()
        ));
    }

    Ok(NewRecord {
        label: label.to_string(),
        location,
    })
}
