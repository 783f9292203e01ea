//! Error types for license issuing and verification.

use thiserror::Error;

/// Licensing errors.
///
/// A license key that is well-formed but does not match its record is not an
/// error: [`check`](crate::LicenseAuthority::check) reports it as `Ok(false)`.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// The key source is malformed, unsupported, or holds no usable key.
    #[error("failed to load key material: {0}")]
    KeyLoad(String),

    /// The operation needs a key half that was not loaded.
    #[error("{0}")]
    State(&'static str),

    /// The signing engine failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// The license key text is not valid base64.
    #[error("license key is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The decoded signature is malformed or could not be checked.
    #[error("verification failed: {0}")]
    Verification(String),
}

impl LicenseError {
    /// Returns true if the error was caused by a malformed license key supplied
    /// by the caller (bad base64 or a broken signature structure).
    ///
    /// Applications that only show "invalid license" to the user can treat
    /// these the same as a non-matching key.
    #[must_use]
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Verification(_))
    }
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;
