//! Signed-URL constants and validation.

use std::time::Duration;

/// How long a minted access URL stays valid. The URL is captured in the
/// file record at upload time and never refreshed, so it expires
/// independently of the record's lifetime.
pub const SIGNED_URL_TTL: Duration = Duration::from_secs(60 * 60);

/// Maximum signed URL expiry (7 days for S3).
pub const MAX_PRESIGN_EXPIRY: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Validate a signed URL expiry duration.
pub fn validate_expiry(expires_in: Duration) -> Result<(), String> {
    if expires_in > MAX_PRESIGN_EXPIRY {
        Err(format!(
            "Expiry duration {:?} exceeds maximum allowed {:?}",
            expires_in, MAX_PRESIGN_EXPIRY
        ))
    } else if expires_in.is_zero() {
        Err("Expiry duration must be greater than zero".to_string())
    } else {
        Ok(())
    }
}
