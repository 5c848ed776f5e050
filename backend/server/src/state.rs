use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::{
    cache::{Cache, MemoryCache, RedisCache},
    config::Config,
    database::init_redis,
    mail::{LogMailer, Mailer, SmtpMailer},
    rate_limiter::RateLimiter,
    store::{MemoryStore, RecordStore, RedisStore},
};

pub struct State {
    pub config: Config,
    pub cache: Arc<dyn Cache>,
    pub store: Arc<dyn RecordStore>,
    pub mailer: Arc<dyn Mailer>,
    pub otp_limiter: RateLimiter,
}

impl State {
    pub async fn new(config: Config) -> Result<Arc<Self>> {
        let (cache, store): (Arc<dyn Cache>, Arc<dyn RecordStore>) = match &config.redis_url {
            Some(redis_url) => {
                let connection = init_redis(redis_url).await?;

                (
                    Arc::new(RedisCache::new(connection.clone())),
                    Arc::new(RedisStore::new(connection, &config.redis_prefix)),
                )
            }
            None => {
                info!("REDIS_URL not set, using in-memory cache and store");

                (Arc::new(MemoryCache::new()), Arc::new(MemoryStore::new()))
            }
        };

        let mailer: Arc<dyn Mailer> = match &config.smtp {
            Some(smtp) => {
                info!("Sending email through {}:{}", smtp.host, smtp.port);
                Arc::new(SmtpMailer::new(smtp, &config.mail_from)?)
            }
            None => Arc::new(LogMailer),
        };

        Ok(Self::with_backends(config, cache, store, mailer))
    }

    pub fn with_backends(
        config: Config,
        cache: Arc<dyn Cache>,
        store: Arc<dyn RecordStore>,
        mailer: Arc<dyn Mailer>,
    ) -> Arc<Self> {
        Arc::new(Self {
            otp_limiter: RateLimiter::new(config.otp_rate_limit.clone()),
            config,
            cache,
            store,
            mailer,
        })
    }
}
