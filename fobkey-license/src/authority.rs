//! The license authority: issues and checks license keys for records.

use crate::engine::{P256Sha256, SignatureEngine};
use crate::error::LicenseResult;
use crate::key::{KeyMaterial, KeyMode};
use crate::record::Canonicalize;
use crate::{signer, verifier};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Issues and checks license keys with one set of key material.
///
/// Built from a private key it can do both; built from a public key it can
/// only check. The authority is read-only after construction and can be shared
/// between threads.
///
/// ```no_run
/// use fobkey_license::{LicenseAuthority, LicenseData};
///
/// let authority = LicenseAuthority::from_path("privkey.pem")?;
/// let record = LicenseData::new("MyApp", "Jane Doe")?.with_email("jane@example.com")?;
/// let key = authority.issue(&record)?;
/// assert!(authority.check(&record, &key)?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct LicenseAuthority<E: SignatureEngine = P256Sha256> {
    keys: KeyMaterial<E>,
}

impl LicenseAuthority {
    /// Creates an authority from PEM text.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::KeyLoad`](crate::LicenseError::KeyLoad) if the
    /// text holds no usable key.
    pub fn from_pem(source: impl AsRef<[u8]>) -> LicenseResult<Self> {
        KeyMaterial::from_pem(source).map(Self::new)
    }

    /// Creates an authority from a stream of PEM text.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::KeyLoad`](crate::LicenseError::KeyLoad) if the
    /// stream cannot be read or holds no usable key.
    pub fn from_reader(reader: impl Read) -> LicenseResult<Self> {
        KeyMaterial::from_reader(reader).map(Self::new)
    }

    /// Creates an authority from a PEM file.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::KeyLoad`](crate::LicenseError::KeyLoad) if the
    /// file cannot be read or holds no usable key.
    pub fn from_path(path: impl AsRef<Path>) -> LicenseResult<Self> {
        KeyMaterial::from_path(path).map(Self::new)
    }
}

impl<E: SignatureEngine> LicenseAuthority<E> {
    /// Creates an authority over already loaded key material.
    #[must_use]
    pub fn new(keys: KeyMaterial<E>) -> Self {
        Self { keys }
    }

    /// Returns the key material.
    #[must_use]
    pub fn key_material(&self) -> &KeyMaterial<E> {
        &self.keys
    }

    /// Returns true if this authority can issue licenses.
    #[must_use]
    pub fn can_sign(&self) -> bool {
        self.keys.can_sign()
    }

    /// Returns true if this authority can check licenses.
    #[must_use]
    pub fn can_verify(&self) -> bool {
        self.keys.can_verify()
    }

    /// Returns the mode the key material was loaded in.
    #[must_use]
    pub fn mode(&self) -> KeyMode {
        self.keys.mode()
    }

    /// Issues a license key for `record`.
    ///
    /// Each call uses a fresh nonce, so repeated calls return different keys
    /// that all check against the same record.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::State`](crate::LicenseError::State) for a
    /// verify-only authority and
    /// [`LicenseError::Signing`](crate::LicenseError::Signing) if the engine
    /// fails.
    pub fn issue<R: Canonicalize + ?Sized>(&self, record: &R) -> LicenseResult<String> {
        let message = record.canonicalize();
        let key = signer::sign(&self.keys, &message)?;
        debug!(message_len = message.len(), "License issued");
        Ok(key)
    }

    /// Checks `license` against `record`.
    ///
    /// Returns `Ok(false)` when the key is well-formed but was not issued for
    /// this record.
    ///
    /// # Errors
    ///
    /// - [`LicenseError::State`](crate::LicenseError::State) if no public key
    ///   is loaded.
    /// - [`LicenseError::Decode`](crate::LicenseError::Decode) if `license` is
    ///   not valid base64.
    /// - [`LicenseError::Verification`](crate::LicenseError::Verification) if
    ///   the decoded bytes are not a signature.
    pub fn check<R: Canonicalize + ?Sized>(&self, record: &R, license: &str) -> LicenseResult<bool> {
        let message = record.canonicalize();
        let valid = verifier::verify(&self.keys, &message, license)?;
        debug!(message_len = message.len(), valid, "License checked");
        Ok(valid)
    }

    /// Like [`check`](Self::check), but a malformed license key counts as
    /// not valid instead of an error.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::State`](crate::LicenseError::State) if no
    /// public key is loaded.
    pub fn check_lenient<R: Canonicalize + ?Sized>(
        &self,
        record: &R,
        license: &str,
    ) -> LicenseResult<bool> {
        match self.check(record, license) {
            Err(e) if e.is_malformed_input() => {
                debug!(error = %e, "Malformed license key treated as invalid");
                Ok(false)
            }
            other => other,
        }
    }
}
