use redis::{AsyncCommands, RedisResult};
use std::time::Duration;

const RELEASE_SCRIPT: &str = r#"
if redis.call("GET", KEYS[1]) == ARGV[1] then
    return redis.call("DEL", KEYS[1])
else
    return 0
end
"#;

/// Shared Redis handle for lease and search-cache operations. The client
/// is cheap to clone and hands out multiplexed async connections.
#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Single acquisition attempt: SET NX PX with the holder's token as
    /// the value. Returns false when the key is already held.
    pub async fn try_acquire(&self, key: &str, token: &str, ttl: Duration) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(token)
            .arg("NX")
            .arg("PX")
            .arg(ttl.as_millis() as u64)
            .query_async(&mut conn)
            .await?;
        Ok(reply.is_some())
    }

    /// Compare-and-delete: the key is removed only while it still carries
    /// the holder's token, so a lease that expired and was re-acquired by
    /// someone else is left alone. Returns true when the key was deleted
    /// by this call.
    pub async fn release_lock(&self, key: &str, token: &str) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let deleted: i64 = redis::Script::new(RELEASE_SCRIPT)
            .key(key)
            .arg(token)
            .invoke_async(&mut conn)
            .await?;
        Ok(deleted == 1)
    }

    pub async fn cache_get(&self, key: &str) -> RedisResult<Option<String>> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.get(key).await
    }

    pub async fn cache_put_ex(&self, key: &str, value: &str, ttl: Duration) -> RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await?;
        Ok(())
    }
}
