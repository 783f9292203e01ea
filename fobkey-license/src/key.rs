//! Key material loading.
//!
//! A key source is PEM text holding either a private key (issuer mode, the
//! public half is derived from it) or a public key alone (deployed mode).
//! Accepted blocks:
//!
//! - `EC PRIVATE KEY` (SEC1), optionally preceded by `EC PARAMETERS`
//! - `PRIVATE KEY` (PKCS#8, unencrypted)
//! - `PUBLIC KEY` (SubjectPublicKeyInfo)
//!
//! Loading first resolves the source into a [`KeyLoadResult`] and then into an
//! immutable [`KeyMaterial`]. There is no way to build an empty `KeyMaterial`.

use crate::engine::{P256Sha256, PrivateKeyFormat, SignatureEngine};
use crate::error::{LicenseError, LicenseResult};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

const SEC1_PRIVATE_LABEL: &str = "EC PRIVATE KEY";
const PKCS8_PRIVATE_LABEL: &str = "PRIVATE KEY";
const PUBLIC_LABEL: &str = "PUBLIC KEY";
const EC_PARAMETERS_LABEL: &str = "EC PARAMETERS";

/// What a key source turned out to contain.
pub enum KeyLoadResult<E: SignatureEngine = P256Sha256> {
    /// A private key and its public half.
    PrivateAndPublic(E::SigningKey, E::VerifyingKey),
    /// A public key only.
    PublicOnly(E::VerifyingKey),
    /// Nothing usable, with the reason.
    Invalid(String),
}

impl<E: SignatureEngine> KeyLoadResult<E> {
    /// Parses and classifies a PEM key source.
    #[must_use]
    pub fn classify(source: &[u8]) -> Self {
        let Ok(text) = std::str::from_utf8(source) else {
            return Self::Invalid("key source is not UTF-8 text".to_string());
        };

        let (private, public) = match read_keys::<E>(text) {
            Ok(keys) => keys,
            Err(reason) => return Self::Invalid(reason),
        };

        match (private, public) {
            (Some(private), Some(public)) => {
                if E::verifying_key(&private) == public {
                    Self::PrivateAndPublic(private, public)
                } else {
                    Self::Invalid("public key does not match private key".to_string())
                }
            }
            (Some(private), None) => {
                let public = E::verifying_key(&private);
                Self::PrivateAndPublic(private, public)
            }
            (None, Some(public)) => Self::PublicOnly(public),
            (None, None) => {
                Self::Invalid("key source contains no private or public key".to_string())
            }
        }
    }
}

/// Which operations a [`KeyMaterial`] supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyMode {
    /// Private and public key present: can issue and check licenses.
    SignAndVerify,
    /// Public key only: can check licenses.
    VerifyOnly,
}

/// Loaded key material.
///
/// Immutable after construction and safe to share across threads.
pub struct KeyMaterial<E: SignatureEngine = P256Sha256> {
    private_key: Option<E::SigningKey>,
    public_key: Option<E::VerifyingKey>,
}

impl<E: SignatureEngine> KeyMaterial<E> {
    /// Loads key material from PEM text.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::KeyLoad`] if the source holds no usable key,
    /// an unsupported key type, or malformed encoding.
    pub fn from_pem(source: impl AsRef<[u8]>) -> LicenseResult<Self> {
        let material = Self::try_from(KeyLoadResult::<E>::classify(source.as_ref()))?;
        debug!(algorithm = E::ALGORITHM, mode = ?material.mode(), "Key material loaded");
        Ok(material)
    }

    /// Reads the whole stream and loads key material from it.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::KeyLoad`] if reading fails or the content is
    /// not a usable key.
    pub fn from_reader(mut reader: impl Read) -> LicenseResult<Self> {
        let mut source = Vec::new();
        reader
            .read_to_end(&mut source)
            .map_err(|e| LicenseError::KeyLoad(format!("failed to read key source: {e}")))?;
        Self::from_pem(source)
    }

    /// Loads key material from a PEM file.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::KeyLoad`] if the file cannot be opened or read,
    /// or its content is not a usable key.
    pub fn from_path(path: impl AsRef<Path>) -> LicenseResult<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            LicenseError::KeyLoad(format!("failed to open {}: {e}", path.display()))
        })?;
        Self::from_reader(file)
    }

    /// Returns true if a private key is present.
    #[must_use]
    pub fn can_sign(&self) -> bool {
        self.private_key.is_some()
    }

    /// Returns true if a public key is present.
    #[must_use]
    pub fn can_verify(&self) -> bool {
        self.public_key.is_some()
    }

    /// Returns the mode this material was loaded in.
    #[must_use]
    pub fn mode(&self) -> KeyMode {
        if self.can_sign() {
            KeyMode::SignAndVerify
        } else {
            KeyMode::VerifyOnly
        }
    }

    /// Returns the private key, if loaded.
    pub(crate) fn private_key(&self) -> Option<&E::SigningKey> {
        self.private_key.as_ref()
    }

    /// Returns the public key, if loaded.
    #[must_use]
    pub fn public_key(&self) -> Option<&E::VerifyingKey> {
        self.public_key.as_ref()
    }

    /// Encodes the public key as a `PUBLIC KEY` PEM block.
    ///
    /// This is the key to ship with a deployed application.
    ///
    /// # Errors
    ///
    /// Returns [`LicenseError::State`] if no public key is loaded and
    /// [`LicenseError::KeyLoad`] if the engine cannot encode the key.
    pub fn public_key_pem(&self) -> LicenseResult<String> {
        let public = self
            .public_key
            .as_ref()
            .ok_or(LicenseError::State("cannot export: no public key"))?;
        E::public_key_pem(public)
    }
}

impl<E: SignatureEngine> TryFrom<KeyLoadResult<E>> for KeyMaterial<E> {
    type Error = LicenseError;

    fn try_from(result: KeyLoadResult<E>) -> LicenseResult<Self> {
        match result {
            KeyLoadResult::PrivateAndPublic(private, public) => Ok(Self {
                private_key: Some(private),
                public_key: Some(public),
            }),
            KeyLoadResult::PublicOnly(public) => Ok(Self {
                private_key: None,
                public_key: Some(public),
            }),
            KeyLoadResult::Invalid(reason) => Err(LicenseError::KeyLoad(reason)),
        }
    }
}

impl<E: SignatureEngine> fmt::Debug for KeyMaterial<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("algorithm", &E::ALGORITHM)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("can_verify", &self.can_verify())
            .finish()
    }
}

type ReadKeys<E> = (
    Option<<E as SignatureEngine>::SigningKey>,
    Option<<E as SignatureEngine>::VerifyingKey>,
);

/// Parses every key block in `text`.
fn read_keys<E: SignatureEngine>(text: &str) -> Result<ReadKeys<E>, String> {
    let mut private = None;
    let mut public = None;

    let blocks = pem::parse_many(text).map_err(|e| format!("malformed PEM: {e}"))?;

    for block in &blocks {
        let format = match block.tag() {
            SEC1_PRIVATE_LABEL => Some(PrivateKeyFormat::Sec1),
            PKCS8_PRIVATE_LABEL => Some(PrivateKeyFormat::Pkcs8),
            _ => None,
        };

        if let Some(format) = format {
            if private.is_some() {
                return Err("key source holds more than one private key".to_string());
            }
            private = Some(E::read_private_key(format, block.contents()).map_err(reason)?);
        } else if block.tag() == PUBLIC_LABEL {
            if public.is_some() {
                return Err("key source holds more than one public key".to_string());
            }
            public = Some(E::read_public_key(block.contents()).map_err(reason)?);
        } else if block.tag() != EC_PARAMETERS_LABEL {
            warn!(label = block.tag(), "Skipping unsupported PEM block");
        }
    }

    Ok((private, public))
}

fn reason(err: LicenseError) -> String {
    match err {
        LicenseError::KeyLoad(reason) => reason,
        other => other.to_string(),
    }
}
