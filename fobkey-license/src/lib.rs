//! License key issuing and verification.
//!
//! A license key is an ECDSA signature over a license record (product,
//! licensee name, optional email), handed to the user as base64 text. The
//! issuer holds the private key and can mint and check keys; a deployed
//! application ships only the public key and can check keys but never mint
//! them.
//!
//! # Design Principles
//!
//! - **No embedded data**: the key carries nothing but the signature; the
//!   verifying side rebuilds the record from what the user entered
//! - **Three-way check**: a key either matches, does not match (`Ok(false)`),
//!   or is not a key at all (an error)
//! - **Explicit engine**: the signature algorithm is a type parameter, not a
//!   process-wide registration
//!
//! # License Key Format
//!
//! Standard base64 (with padding, no line breaks) of a DER-encoded ECDSA
//! P-256 signature over the SHA-256 digest of the record's canonical bytes.

mod authority;
mod engine;
mod error;
mod key;
mod record;
mod signer;
mod verifier;

pub use authority::LicenseAuthority;
pub use engine::{P256Sha256, PrivateKeyFormat, SignatureEngine};
pub use error::{LicenseError, LicenseResult};
pub use key::{KeyLoadResult, KeyMaterial, KeyMode};
pub use record::{Canonicalize, LicenseData, RecordError};
pub use signer::sign;
pub use verifier::verify;
