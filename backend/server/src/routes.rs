use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State as AxumState,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::{debug, info};

use crate::{
    contact::confirmation_email,
    error::AppError,
    geo::{Feature, FeatureCollection, RecordKind},
    otp::{Verification, send_otp, verify_otp},
    payloads::{
        CreateImportantLocation, CreateSighting, FeaturePayload, SendConfirmation, SendOtp,
        VerifyOtp,
    },
    state::State,
    utils::{decode, decode_feature},
};

pub const ENDPOINTS: [&str; 7] = [
    "/api/ping",
    "/api/send-otp",
    "/api/verify-otp",
    "/api/send-confirmation",
    "/api/sightings/",
    "/api/important-locations/",
    "/",
];

pub async fn root_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "sightings",
        "endpoints": ENDPOINTS,
    }))
}

pub async fn ping_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn send_otp_handler(
    AxumState(state): AxumState<Arc<State>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload: SendOtp = decode(&body, "Email is required")?;

    send_otp(
        state.cache.as_ref(),
        state.mailer.as_ref(),
        state.config.otp_ttl,
        &payload.email,
    )
    .await?;

    Ok(message(StatusCode::OK, "OTP sent successfully"))
}

pub async fn verify_otp_handler(
    AxumState(state): AxumState<Arc<State>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload: VerifyOtp = decode(&body, "Email and OTP are required")?;

    match verify_otp(state.cache.as_ref(), &payload.email, &payload.otp).await? {
        Verification::Verified => Ok(message(StatusCode::OK, "OTP verified successfully")),
        Verification::Rejected => Err(AppError::InvalidOtp),
    }
}

pub async fn send_confirmation_handler(
    AxumState(state): AxumState<Arc<State>>,
    body: Bytes,
) -> Result<Response, AppError> {
    let payload: SendConfirmation =
        decode(&body, "All fields are required to send confirmation email")?;

    state
        .mailer
        .send(confirmation_email(&payload))
        .await
        .map_err(|source| AppError::Delivery {
            message: "Failed to send confirmation email",
            source,
        })?;

    info!("Confirmation sent");
    debug!("Confirmation sent to {}", payload.email);

    Ok(message(StatusCode::OK, "Confirmation email sent successfully"))
}

pub async fn list_sightings_handler(
    AxumState(state): AxumState<Arc<State>>,
) -> Result<Response, AppError> {
    list_features(&state, RecordKind::Sighting).await
}

pub async fn create_sighting_handler(
    AxumState(state): AxumState<Arc<State>>,
    body: Bytes,
) -> Result<Response, AppError> {
    create_feature::<CreateSighting>(&state, &body).await
}

pub async fn list_important_locations_handler(
    AxumState(state): AxumState<Arc<State>>,
) -> Result<Response, AppError> {
    list_features(&state, RecordKind::ImportantLocation).await
}

pub async fn create_important_location_handler(
    AxumState(state): AxumState<Arc<State>>,
    body: Bytes,
) -> Result<Response, AppError> {
    create_feature::<CreateImportantLocation>(&state, &body).await
}

async fn list_features(state: &State, kind: RecordKind) -> Result<Response, AppError> {
    let records = state.store.all(kind).await?;

    Ok(Json(FeatureCollection::from_records(kind, &records)).into_response())
}

async fn create_feature<P>(state: &State, body: &Bytes) -> Result<Response, AppError>
where
    P: FeaturePayload + serde::de::DeserializeOwned,
{
    let new_record = decode_feature::<P>(body)?;
    let location = new_record.location;
    let record = state.store.create(P::KIND, new_record).await?;

    info!("Created {} {}", P::KIND.collection(), record.id);

    let feature = Feature::new(P::KIND, record.id, &record.label, location);

    Ok((StatusCode::CREATED, Json(feature)).into_response())
}

fn message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}
