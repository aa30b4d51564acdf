use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use super::store::{KeyValueStore, StoreStats};
use crate::error::StoreError;

#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl RedisStore {
    pub fn from_connection(connection: MultiplexedConnection) -> Self {
        Self { connection }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut connection = self.connection.clone();
        let value: Option<String> = connection.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let _: () = connection.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();
        let pong: String = redis::cmd("PING").query_async(&mut connection).await?;

        if pong != "PONG" {
            return Err(StoreError::Unavailable(format!("Unexpected PING reply: {}", pong)));
        }

        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        let mut connection = self.connection.clone();
        let info: String = redis::cmd("INFO").query_async(&mut connection).await?;
        Ok(parse_info(&info))
    }
}

/// Extracts the fields we report from a Redis `INFO` reply.
pub fn parse_info(info: &str) -> StoreStats {
    let mut stats = StoreStats {
        used_memory: "0B".to_string(),
        ..Default::default()
    };

    for line in info.lines() {
        let Some((name, value)) = line.trim().split_once(':') else {
            continue;
        };

        match name {
            "connected_clients" => stats.connected_clients = value.parse().unwrap_or(0),
            "used_memory_human" => stats.used_memory = value.to_string(),
            "keyspace_hits" => stats.keyspace_hits = value.parse().unwrap_or(0),
            "keyspace_misses" => stats.keyspace_misses = value.parse().unwrap_or(0),
            _ => {}
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info() {
        let info = "# Clients\r\nconnected_clients:3\r\nblocked_clients:0\r\n\r\n# Memory\r\nused_memory:1048576\r\nused_memory_human:1.00M\r\n# Stats\r\nkeyspace_hits:42\r\nkeyspace_misses:8\r\n";

        let stats = parse_info(info);

        assert_eq!(stats.connected_clients, 3);
        assert_eq!(stats.used_memory, "1.00M");
        assert_eq!(stats.keyspace_hits, 42);
        assert_eq!(stats.keyspace_misses, 8);
        assert_eq!(stats.hit_ratio(), 84.0);
    }

    #[test]
    fn test_parse_info_missing_fields() {
        let stats = parse_info("# Server\r\nredis_version:7.2.4\r\n");
        assert_eq!(stats.connected_clients, 0);
        assert_eq!(stats.used_memory, "0B");
    }
}
