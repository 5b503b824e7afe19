//! Opaque pagination cursors.
//!
//! A cursor is base64-encoded JSON `{"offset": N, "checksum": V}` where `V` is
//! the index version the full result set was computed against. A cursor is
//! only honored while the index is still at that version; any mutation in
//! between invalidates it so pages never skip or repeat rows.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{IndexError, IndexResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorToken {
    pub offset: usize,
    pub checksum: u64,
}

impl CursorToken {
    pub fn encode(&self) -> IndexResult<String> {
        let payload =
            serde_json::to_vec(self).map_err(|e| IndexError::InvalidCursor(e.to_string()))?;
        Ok(STANDARD.encode(payload))
    }

    /// Decode a cursor. An empty string is the start of the listing.
    pub fn decode(cursor: &str) -> IndexResult<Option<Self>> {
        if cursor.is_empty() {
            return Ok(None);
        }
        let bytes = STANDARD
            .decode(cursor)
            .map_err(|e| IndexError::InvalidCursor(e.to_string()))?;
        let token: CursorToken =
            serde_json::from_slice(&bytes).map_err(|e| IndexError::InvalidCursor(e.to_string()))?;
        Ok(Some(token))
    }
}

/// One page of results plus the cursor for the next page (`None` when done).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
        }
    }
}

/// Slice `items` according to `cursor`, checking the cursor against `checksum`.
pub fn paginate<T: Clone>(
    items: &[T],
    limit: usize,
    cursor: &str,
    checksum: u64,
) -> IndexResult<Page<T>> {
    let offset = match CursorToken::decode(cursor)? {
        None => 0,
        Some(token) if token.checksum != checksum => {
            return Err(IndexError::InvalidCursor(format!(
                "cursor was issued at version {}, index is at version {}",
                token.checksum, checksum
            )));
        }
        Some(token) => token.offset,
    };

    if offset > items.len() {
        return Ok(Page::empty());
    }

    let end = offset.saturating_add(limit).min(items.len());
    let next_cursor = if end < items.len() {
        Some(
            CursorToken {
                offset: end,
                checksum,
            }
            .encode()?,
        )
    } else {
        None
    };

    Ok(Page {
        items: items[offset..end].to_vec(),
        next_cursor,
    })
}
