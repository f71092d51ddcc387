use async_trait::async_trait;
use std::error::Error;
use std::time::Duration;

use skylark_core::repository::SearchCache;

use crate::redis_repo::RedisClient;

/// Redis-backed [`SearchCache`] holding serialized search result sets.
pub struct RedisSearchCache {
    client: RedisClient,
}

impl RedisSearchCache {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchCache for RedisSearchCache {
    async fn get(&self, key: &str) -> Result<Option<String>, Box<dyn Error + Send + Sync>> {
        Ok(self.client.cache_get(key).await?)
    }

    async fn put(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Ok(self.client.cache_put_ex(key, value, ttl).await?)
    }
}
