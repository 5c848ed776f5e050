//! # One-time codes
//!
//! Email ownership check.
//!
//! ## Flow
//!
//! - `send-otp`: six digit code (100000-999999) stored under `otp:<lowercased email>`
//!   with the configured TTL, then emailed
//! - If the email cannot be delivered the stored code is deleted again
//! - `send-otp` again for the same email overwrites the previous code
//! - `verify-otp`: a matching code is deleted in the same cache operation that
//!   compares it, so it verifies exactly once and a superseded code never does
//! - A wrong code and a missing/expired code produce the same answer
//! - Logs never carry the code, and addresses only at `debug`
use std::time::Duration;

use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    cache::{Cache, CacheError},
    mail::{MailError, Mailer, OutgoingEmail},
};

pub const OTP_SUBJECT: &str = "Your OTP for Verification";

#[derive(Error, Debug)]
pub enum OtpError {
    #[error("Failed to store OTP: {0}")]
    Cache(#[from] CacheError),

    #[error("Failed to deliver OTP: {0}")]
    Delivery(#[from] MailError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    Verified,
    Rejected,
}

pub fn otp_key(email: &str) -> String {
    format!("otp:{}", email.to_lowercase())
}

pub fn generate_otp() -> String {
    rand::rng().random_range(100_000u32..=999_999).to_string()
}

pub async fn send_otp(
    cache: &dyn Cache,
    mailer: &dyn Mailer,
    ttl: Duration,
    email: &str,
) -> Result<(), OtpError> {
    let key = otp_key(email);
    let otp = generate_otp();

    cache.set(&key, &otp, ttl).await?;

    let message = OutgoingEmail {
        subject: OTP_SUBJECT.to_string(),
        body: otp_body(&otp, ttl),
        recipients: vec![email.to_string()],
    };

    if let Err(e) = mailer.send(message).await {
        // a newer code from a concurrent resend stays
        if let Err(cleanup) = cache.delete_if_eq(&key, &otp).await {
            warn!("Failed to remove undelivered OTP: {cleanup}");
        }

        return Err(OtpError::Delivery(e));
    }

    info!("OTP sent");
    debug!("OTP sent to {email}");

    Ok(())
}

pub async fn verify_otp(
    cache: &dyn Cache,
    email: &str,
    otp: &str,
) -> Result<Verification, CacheError> {
    if cache.delete_if_eq(&otp_key(email), otp).await? {
        return Ok(Verification::Verified);
    }

    debug!("Rejected OTP for {email}");

    Ok(Verification::Rejected)
}

fn otp_body(otp: &str, ttl: Duration) -> String {
    format!("Your OTP is {otp}. It will expire in {}.", lifetime(ttl))
}

fn lifetime(ttl: Duration) -> String {
    let seconds = ttl.as_secs();

    match (seconds / 60, seconds % 60) {
        (0, 1) => "1 second".to_string(),
        (1, 0) => "1 minute".to_string(),
        (minutes, 0) if minutes > 0 => format!("{minutes} minutes"),
        _ => format!("{seconds} seconds"),
    }
}
