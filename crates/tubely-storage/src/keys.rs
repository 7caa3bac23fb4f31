//! Storage key generation.
//!
//! Key format: `{classification prefix}/{base64url(32 random bytes)}.{media subtype}`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::rngs::OsRng;
use rand::TryRngCore;
use tubely_core::AspectRatio;

use crate::traits::{StorageError, StorageResult};

const RANDOM_ID_BYTES: usize = 32;

/// Derive a fresh key for a processed video.
///
/// Uniqueness comes from 256 bits of OS randomness; the store is not consulted. Fails with
/// an IO error only when the OS random source is unavailable.
pub fn name_key(aspect_ratio: AspectRatio, media_subtype: &str) -> StorageResult<String> {
    let subtype = media_subtype.trim().to_ascii_lowercase();
    if subtype.is_empty()
        || !subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '+')
    {
        return Err(StorageError::InvalidKey(format!(
            "invalid media subtype: {}",
            media_subtype
        )));
    }

    let mut raw = [0u8; RANDOM_ID_BYTES];
    OsRng
        .try_fill_bytes(&mut raw)
        .map_err(|e| StorageError::IoError(std::io::Error::other(e.to_string())))?;

    Ok(format!(
        "{}/{}.{}",
        aspect_ratio.key_prefix(),
        URL_SAFE_NO_PAD.encode(raw),
        subtype
    ))
}
