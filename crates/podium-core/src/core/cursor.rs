// crates/podium-core/src/core/cursor.rs
// ============================================================================
// Module: Pagination Cursors
// Description: Opaque continuation tokens for record and catalog listings.
// Purpose: Encode/decode cursors bound to a leaderboard and expiry epoch.
// Dependencies: serde, serde_json, base64, thiserror
// ============================================================================

//! ## Overview
//! Cursors are self-contained values, not server-side session references.
//! The payload is a self-describing JSON document (so decoding survives
//! field addition) wrapped in base64 for transport. Record cursors use the
//! URL-safe alphabet; catalog cursors use the standard padded alphabet. The
//! two encodings are deliberately distinct and never normalized into one.
//!
//! A record cursor is only valid against the `(leaderboard_id, expiry_time)`
//! pair it was minted for; any mismatch is rejected rather than silently
//! reinterpreted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use base64::Engine;
use base64::engine::general_purpose::STANDARD as CatalogTransport;
use base64::engine::general_purpose::URL_SAFE as RecordTransport;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// A cursor that failed transport decoding, payload parsing, or binding
/// validation.
///
/// # Invariants
/// - Carries no detail on purpose; cursors are opaque to clients and the
///   failure reason is not actionable for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("leaderboard cursor invalid")]
pub struct InvalidCursorError;

// ============================================================================
// SECTION: Record Cursors
// ============================================================================

/// Continuation token for record listings.
///
/// # Invariants
/// - `(leaderboard_id, expiry_time)` bind the cursor; decoding rejects any
///   mismatch against the request's resolved values.
/// - `rank` is a continuation hint seeded into the pagination counter, not a
///   source of truth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordCursor {
    /// Paging direction relative to the natural sort order.
    pub is_next: bool,
    /// Leaderboard the cursor is bound to.
    pub leaderboard_id: String,
    /// Expiry epoch the cursor is bound to.
    pub expiry_time: i64,
    /// Boundary row score.
    pub score: i64,
    /// Boundary row subscore.
    pub subscore: i64,
    /// Boundary row owner identifier.
    pub owner_id: String,
    /// 1-based rank of the boundary row.
    pub rank: i64,
}

/// Encodes a record cursor into its URL-safe transport form.
#[must_use]
pub fn encode_record_cursor(cursor: &RecordCursor) -> String {
    // A plain field struct serializes infallibly.
    let payload = serde_json::to_vec(cursor).unwrap_or_default();
    RecordTransport.encode(payload)
}

/// Decodes a record cursor token against the request's resolved binding.
///
/// Returns `Ok(None)` for an empty token.
///
/// # Errors
///
/// Returns [`InvalidCursorError`] when the transport encoding fails, the
/// payload does not parse, or the cursor is bound to a different
/// `(leaderboard_id, expiry_time)` pair (including expiry rollover since the
/// cursor was minted).
pub fn decode_record_cursor(
    leaderboard_id: &str,
    expiry_time: i64,
    token: &str,
) -> Result<Option<RecordCursor>, InvalidCursorError> {
    if token.is_empty() {
        return Ok(None);
    }

    let payload = RecordTransport.decode(token).map_err(|_| InvalidCursorError)?;
    let cursor: RecordCursor =
        serde_json::from_slice(&payload).map_err(|_| InvalidCursorError)?;

    if cursor.leaderboard_id != leaderboard_id {
        // Cursor was minted for a different leaderboard.
        return Err(InvalidCursorError);
    }
    if cursor.expiry_time != expiry_time {
        // Expiry has rolled over since the cursor was minted.
        return Err(InvalidCursorError);
    }

    Ok(Some(cursor))
}

// ============================================================================
// SECTION: Catalog Cursors
// ============================================================================

/// Continuation token for catalog (definition) listings.
///
/// # Invariants
/// - `resume_id` is the id of the last definition already returned; listing
///   resumes strictly after it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogCursor {
    /// Identifier of the last definition the previous page returned.
    pub resume_id: String,
}

/// Encodes a catalog cursor into its standard-padded transport form.
#[must_use]
pub fn encode_catalog_cursor(cursor: &CatalogCursor) -> String {
    // A plain field struct serializes infallibly.
    let payload = serde_json::to_vec(cursor).unwrap_or_default();
    CatalogTransport.encode(payload)
}

/// Decodes a catalog cursor token.
///
/// Returns `Ok(None)` for an empty token.
///
/// # Errors
///
/// Returns [`InvalidCursorError`] when the transport encoding fails or the
/// payload does not parse.
pub fn decode_catalog_cursor(token: &str) -> Result<Option<CatalogCursor>, InvalidCursorError> {
    if token.is_empty() {
        return Ok(None);
    }

    let payload = CatalogTransport.decode(token).map_err(|_| InvalidCursorError)?;
    let cursor: CatalogCursor =
        serde_json::from_slice(&payload).map_err(|_| InvalidCursorError)?;
    Ok(Some(cursor))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
