//! License key signing.

use crate::engine::SignatureEngine;
use crate::error::{LicenseError, LicenseResult};
use crate::key::KeyMaterial;
use base64::{engine::general_purpose::STANDARD, Engine};

/// Signs `message` and returns the license key text: standard base64 with
/// padding and no line breaks.
///
/// # Errors
///
/// Returns [`LicenseError::State`] if no private key is loaded and
/// [`LicenseError::Signing`] if the engine fails.
pub fn sign<E: SignatureEngine>(keys: &KeyMaterial<E>, message: &[u8]) -> LicenseResult<String> {
    let private = keys
        .private_key()
        .ok_or(LicenseError::State("cannot sign: no private key"))?;
    let signature = E::sign(private, message)?;
    Ok(STANDARD.encode(signature))
}
