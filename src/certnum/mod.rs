//! Certificate number generation.
//!
//! Numbers have the form `CERT-YYYYMMDD-####` where the last field is a
//! zero-padded daily sequence handed out by an atomic counter. The counter is
//! never read without incrementing; atomicity belongs entirely to the backing
//! store. When the store is unreachable the generator degrades to a random
//! hex suffix instead of failing the request — a collision is theoretically
//! possible on that path and is not checked or retried.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use uuid::Uuid;

/// Counter keys older than two days are dead weight, let them expire.
const COUNTER_TTL_SECS: i64 = 172_800;

/// Increment-and-get over a keyed counter store.
#[async_trait]
pub trait DailyCounter: Send + Sync {
    /// Atomically increments the counter for `date_key` (format `yyyy-MM-dd`)
    /// and returns the new value. The first call of a day returns 1.
    async fn increment_and_get(&self, date_key: &str) -> anyhow::Result<i64>;
}

/// Production counter backed by Redis `INCR`.
#[derive(Clone)]
pub struct RedisCounter {
    manager: ConnectionManager,
}

impl RedisCounter {
    pub async fn connect(redis_url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(redis_url)?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl DailyCounter for RedisCounter {
    async fn increment_and_get(&self, date_key: &str) -> anyhow::Result<i64> {
        let key = format!("vetcert:certseq:{}", date_key);
        let mut conn = self.manager.clone();
        let seq: i64 = redis::cmd("INCR").arg(&key).query_async(&mut conn).await?;
        if seq == 1 {
            let _: i64 = redis::cmd("EXPIRE")
                .arg(&key)
                .arg(COUNTER_TTL_SECS)
                .query_async(&mut conn)
                .await?;
        }
        Ok(seq)
    }
}

/// Builds the number for a certificate issued at `now`.
///
/// Sequences past 9999 simply widen the field; there is no rollover.
pub async fn generate_certificate_number(counter: &dyn DailyCounter, now: DateTime<Utc>) -> String {
    let date_key = now.format("%Y-%m-%d").to_string();
    let compact = now.format("%Y%m%d");

    match counter.increment_and_get(&date_key).await {
        Ok(seq) => format!("CERT-{}-{:04}", compact, seq),
        Err(e) => {
            tracing::warn!(
                "Counter unavailable for {}, falling back to random suffix: {}",
                date_key,
                e
            );
            let suffix: String = Uuid::new_v4()
                .simple()
                .to_string()
                .chars()
                .take(4)
                .collect::<String>()
                .to_uppercase();
            format!("CERT-{}-{}", compact, suffix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct MemoryCounter {
        values: Mutex<HashMap<String, i64>>,
    }

    #[async_trait]
    impl DailyCounter for MemoryCounter {
        async fn increment_and_get(&self, date_key: &str) -> anyhow::Result<i64> {
            let mut values = self.values.lock().await;
            let entry = values.entry(date_key.to_string()).or_insert(0);
            *entry += 1;
            Ok(*entry)
        }
    }

    struct FailingCounter;

    #[async_trait]
    impl DailyCounter for FailingCounter {
        async fn increment_and_get(&self, _date_key: &str) -> anyhow::Result<i64> {
            Err(anyhow::anyhow!("counter store unreachable"))
        }
    }

    fn jan_15() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn first_number_of_the_day() {
        let counter = MemoryCounter::default();
        let number = generate_certificate_number(&counter, jan_15()).await;
        assert_eq!(number, "CERT-20240115-0001");
    }

    #[tokio::test]
    async fn sequential_numbers_share_the_date_key() {
        let counter = MemoryCounter::default();
        let first = generate_certificate_number(&counter, jan_15()).await;
        let second = generate_certificate_number(&counter, jan_15()).await;
        assert_eq!(first, "CERT-20240115-0001");
        assert_eq!(second, "CERT-20240115-0002");
    }

    #[tokio::test]
    async fn sequence_format_matches_contract() {
        let counter = MemoryCounter::default();
        let number = generate_certificate_number(&counter, jan_15()).await;
        let re = regex::Regex::new(r"^CERT-\d{8}-\d{4}$").unwrap();
        assert!(re.is_match(&number), "unexpected format: {}", number);
    }

    #[tokio::test]
    async fn fallback_uses_hex_suffix() {
        let number = generate_certificate_number(&FailingCounter, jan_15()).await;
        let re = regex::Regex::new(r"^CERT-20240115-[0-9A-F]{4}$").unwrap();
        assert!(re.is_match(&number), "unexpected fallback: {}", number);
    }

    #[tokio::test]
    async fn sequence_past_9999_widens() {
        let counter = MemoryCounter::default();
        {
            let mut values = counter.values.lock().await;
            values.insert("2024-01-15".to_string(), 9999);
        }
        let number = generate_certificate_number(&counter, jan_15()).await;
        assert_eq!(number, "CERT-20240115-10000");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn ten_thousand_concurrent_numbers_are_unique() {
        let counter = Arc::new(MemoryCounter::default());
        let mut handles = Vec::with_capacity(10_000);

        for _ in 0..10_000 {
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                generate_certificate_number(counter.as_ref(), jan_15()).await
            }));
        }

        let mut seen = std::collections::HashSet::new();
        for handle in handles {
            let number = handle.await.unwrap();
            assert!(seen.insert(number.clone()), "duplicate number: {}", number);
        }
        assert_eq!(seen.len(), 10_000);
    }
}
