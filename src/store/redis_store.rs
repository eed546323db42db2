use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::collections::HashMap;

use super::{KEY_PATTERN, StudentStore, id_from_key, student_key};
use crate::error::Result;

/// Store backed by a Redis server
///
/// Uses a `ConnectionManager`, which reconnects on its own after the
/// server goes away; each call works on a cheap clone of it.
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// Connect to Redis
    ///
    /// # Arguments
    /// * `url` - Connection URL such as `redis://127.0.0.1:6379`
    ///
    /// # Returns
    /// * `Result<RedisStore>` - The connected store or the connection error
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)?;
        let manager = ConnectionManager::new(client).await?;
        log::info!("Connected to Redis at {}", url);

        Ok(RedisStore { manager })
    }
}

#[async_trait]
impl StudentStore for RedisStore {
    async fn put_fields(&self, id: &str, fields: &[(&'static str, String)]) -> Result<()> {
        let mut conn = self.manager.clone();
        let key = student_key(id);

        for (field, value) in fields {
            let _added: i64 = redis::cmd("HSET")
                .arg(&key)
                .arg(*field)
                .arg(value)
                .query_async(&mut conn)
                .await?;
        }

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<HashMap<String, String>>> {
        let mut conn = self.manager.clone();
        let hash: HashMap<String, String> = redis::cmd("HGETALL")
            .arg(student_key(id))
            .query_async(&mut conn)
            .await?;

        if hash.is_empty() {
            Ok(None)
        } else {
            Ok(Some(hash))
        }
    }

    async fn list(&self) -> Result<Vec<(String, HashMap<String, String>)>> {
        let mut conn = self.manager.clone();
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(KEY_PATTERN)
            .query_async(&mut conn)
            .await?;

        let mut students = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(id) = id_from_key(&key) else {
                continue;
            };
            let hash: HashMap<String, String> = redis::cmd("HGETALL")
                .arg(&key)
                .query_async(&mut conn)
                .await?;
            // Key may have been deleted between KEYS and HGETALL
            if !hash.is_empty() {
                students.push((id.to_string(), hash));
            }
        }

        Ok(students)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        let _removed: i64 = redis::cmd("DEL")
            .arg(student_key(id))
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}
