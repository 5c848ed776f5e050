//! # Redis
//!
//! RAM database, shared by the OTP cache and the record store.
//!
//! ## Layout
//!
//! - OTP codes: plain string keys `otp:<email>` written with `SET EX`, so Redis
//!   itself expires them
//! - Records: one hash per kind (`<prefix>:sightings`, `<prefix>:important_locations`),
//!   field = record id, value = JSON record
//! - Ids: one counter per kind (`<prefix>:<kind>:next_id`) bumped with `INCR`
//!
//! Every operation touches a single key, so Redis' own command queue gives us
//! the atomicity we need without transactions.
use std::time::Duration;

use redis::{
    Client, RedisResult,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tracing::info;

pub async fn init_redis(redis_url: &str) -> RedisResult<ConnectionManager> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    info!("Connected to Redis");

    Ok(connection_manager)
}
