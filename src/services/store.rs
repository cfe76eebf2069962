use crate::{error::BadgeError, models::PaymentRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Last-write-wins storage of one `PaymentRecord` per recipient.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Overwrites the record for `record.recipient`.
    async fn put(&self, record: &PaymentRecord) -> Result<(), BadgeError>;

    /// `None` means no qualifying payment was ever recorded.
    async fn get(&self, recipient: &str) -> Result<Option<PaymentRecord>, BadgeError>;

    async fn ping(&self) -> bool;
}

pub fn record_key(recipient: &str) -> String {
    format!("address:{}", recipient)
}

/// Fractional UNIX seconds, the format of the `when` hash field.
pub fn encode_when(at: DateTime<Utc>) -> String {
    let micros = at.timestamp_micros();
    let sign = if micros < 0 { "-" } else { "" };
    let abs = micros.unsigned_abs();
    format!("{}{}.{:06}", sign, abs / 1_000_000, abs % 1_000_000)
}

pub fn decode_when(raw: &str) -> Option<DateTime<Utc>> {
    let secs: f64 = raw.trim().parse().ok()?;
    if !secs.is_finite() {
        return None;
    }
    let whole = secs.floor();
    let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
    DateTime::from_timestamp(whole as i64, nanos)
}

/// Hash fields written for a record.
pub fn encode_record(record: &PaymentRecord) -> [(&'static str, String); 2] {
    [
        ("amount", record.amount_text.clone()),
        ("when", encode_when(record.observed_at)),
    ]
}

/// Builds a record from the fields of an `address:<recipient>` hash.
pub fn decode_record(
    recipient: &str,
    fields: &HashMap<String, String>,
) -> Result<Option<PaymentRecord>, BadgeError> {
    if fields.is_empty() {
        return Ok(None);
    }

    let corrupt = |reason: String| BadgeError::CorruptRecord {
        key: record_key(recipient),
        reason,
    };

    let amount_text = fields
        .get("amount")
        .ok_or_else(|| corrupt("missing amount".to_string()))?;
    let amount: f64 = amount_text
        .trim()
        .parse()
        .map_err(|_| corrupt(format!("invalid amount {:?}", amount_text)))?;

    let when = fields
        .get("when")
        .ok_or_else(|| corrupt("missing when".to_string()))?;
    let observed_at = decode_when(when).ok_or_else(|| corrupt(format!("invalid when {:?}", when)))?;

    Ok(Some(
        PaymentRecord::new(recipient, amount, observed_at).with_amount_text(amount_text.as_str()),
    ))
}

pub struct RedisStore {
    redis: redis::aio::ConnectionManager,
}

impl RedisStore {
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url).context("Invalid Redis URL")?;
        let redis = client
            .get_connection_manager()
            .await
            .context("Redis connection failed")?;

        tracing::info!("Redis connected successfully");

        Ok(Self { redis })
    }
}

#[async_trait]
impl RecordStore for RedisStore {
    async fn put(&self, record: &PaymentRecord) -> Result<(), BadgeError> {
        let mut redis = self.redis.clone();
        let key = record_key(&record.recipient);

        // Single HSET with both fields so readers never see a half-written record.
        let fields = encode_record(record);
        redis.hset_multiple::<_, _, _, ()>(&key, &fields).await?;

        tracing::debug!("Stored record for key: {}", key);
        Ok(())
    }

    async fn get(&self, recipient: &str) -> Result<Option<PaymentRecord>, BadgeError> {
        let mut redis = self.redis.clone();
        let fields: HashMap<String, String> = redis.hgetall(record_key(recipient)).await?;
        decode_record(recipient, &fields)
    }

    async fn ping(&self) -> bool {
        let mut redis = self.redis.clone();
        redis::cmd("PING")
            .query_async::<_, String>(&mut redis)
            .await
            .is_ok()
    }
}

/// In-process store for local runs and tests. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, PaymentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn put(&self, record: &PaymentRecord) -> Result<(), BadgeError> {
        self.records
            .write()
            .await
            .insert(record_key(&record.recipient), record.clone());
        Ok(())
    }

    async fn get(&self, recipient: &str) -> Result<Option<PaymentRecord>, BadgeError> {
        Ok(self.records.read().await.get(&record_key(recipient)).cloned())
    }

    async fn ping(&self) -> bool {
        true
    }
}
