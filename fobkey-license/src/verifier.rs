//! License key verification.
//!
//! Three outcomes are kept apart: `Ok(true)` for a matching key, `Ok(false)`
//! for a well-formed key that does not match, and an error for text that is not
//! a license key at all.

use crate::engine::SignatureEngine;
use crate::error::{LicenseError, LicenseResult};
use crate::key::KeyMaterial;
use base64::alphabet;
use base64::engine::{GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use tracing::debug;

/// Standard alphabet with padding, accepting non-zero bits in the last symbol
/// the way other base64 decoders do.
const LICENSE_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// Checks license key text against `message`.
///
/// Surrounding ASCII whitespace is ignored. Text that decodes to a signature
/// but is not its canonical encoding (non-zero trailing bits) was altered after
/// issue and never checks as valid.
///
/// # Errors
///
/// - [`LicenseError::State`] if no public key is loaded.
/// - [`LicenseError::Decode`] if the text is not valid base64.
/// - [`LicenseError::Verification`] if the decoded bytes are not a signature.
pub fn verify<E: SignatureEngine>(
    keys: &KeyMaterial<E>,
    message: &[u8],
    signature_text: &str,
) -> LicenseResult<bool> {
    let public = keys
        .public_key()
        .ok_or(LicenseError::State("cannot verify: no public key"))?;
    let text = signature_text.trim_ascii();
    let signature = LICENSE_BASE64.decode(text)?;
    let valid = E::verify(public, message, &signature)?;

    if valid && LICENSE_BASE64.encode(&signature) != text {
        debug!("License key has non-canonical trailing bits");
        return Ok(false);
    }
    Ok(valid)
}
