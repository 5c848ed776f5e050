use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{ConnectInfo, Request},
};
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use validator::Validate;

use crate::{error::AppError, geo::NewRecord, payloads::FeaturePayload};

const ANONYMOUS_CLIENT: &str = "anonymous";

/// Decodes and validates a form-like body. Any failure collapses into the
/// endpoint's fixed `message`.
pub fn decode<T>(body: &Bytes, message: &'static str) -> Result<T, AppError>
where
    T: DeserializeOwned + Validate,
{
    let payload: T = serde_json::from_slice(body).map_err(|_| AppError::MalformedPayload(message))?;
    payload
        .validate()
        .map_err(|_| AppError::MalformedPayload(message))?;

    Ok(payload)
}

pub fn decode_feature<P>(body: &Bytes) -> Result<NewRecord, AppError>
where
    P: FeaturePayload + DeserializeOwned,
{
    let payload: P = serde_json::from_slice(body).map_err(|e| {
        AppError::InvalidFeature(match e.classify() {
            Category::Data => "lon and lat are required and must be numeric".to_string(),
            _ => "Malformed JSON body".to_string(),
        })
    })?;

    payload.into_new_record().map_err(AppError::InvalidFeature)
}

/// First `X-Forwarded-For` hop, then the peer address.
pub fn client_key(request: &Request) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .or_else(|| {
            request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(address)| address.ip().to_string())
        })
        .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string())
}
