//! Opaque pagination cursors.
//!
//! A cursor names a position relative to the queue's sort key — the
//! `(created_at, id)` pair of the last item seen — never an offset into
//! an array. Inserts and removals elsewhere in the set leave
//! outstanding cursors valid.

use anyhow::{Context, Result, anyhow};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl Cursor {
    pub fn new(created_at: DateTime<Utc>, id: Uuid) -> Self {
        Cursor { created_at, id }
    }

    /// Encode as a URL-safe base64 token.
    pub fn encode(&self) -> String {
        let raw = format!("{}:{}", self.created_at.timestamp_micros(), self.id);
        URL_SAFE_NO_PAD.encode(raw.as_bytes())
    }

    /// Decode a token previously produced by [`Cursor::encode`].
    pub fn decode(token: &str) -> Result<Self> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .context("invalid cursor: not valid base64")?;
        let raw = String::from_utf8(bytes).context("invalid cursor: not utf-8")?;
        let (micros, id) = raw
            .split_once(':')
            .ok_or_else(|| anyhow!("invalid cursor: missing separator"))?;
        let micros: i64 = micros.parse().context("invalid cursor: bad timestamp")?;
        let created_at = DateTime::from_timestamp_micros(micros)
            .ok_or_else(|| anyhow!("invalid cursor: timestamp out of range"))?;
        let id = Uuid::parse_str(id).context("invalid cursor: bad id")?;
        Ok(Cursor { created_at, id })
    }
}
