//! JSON encoding of [`StoreSnapshot`].

use chirp_types::StoreSnapshot;

use crate::error::StoreResult;

/// Encode a snapshot as a JSON document.
pub fn encode(snapshot: &StoreSnapshot) -> StoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(snapshot)?)
}

/// Decode a JSON document into a snapshot.
///
/// Malformed input is reported as [`StoreError::Codec`](crate::StoreError::Codec).
pub fn decode(bytes: &[u8]) -> StoreResult<StoreSnapshot> {
    Ok(serde_json::from_slice(bytes)?)
}
