//! License records and their canonical byte form.
//!
//! A license key carries no data of its own; it is a signature over the
//! canonical bytes of a record that the verifying application rebuilds from
//! what the user entered. Whatever implements [`Canonicalize`] must therefore
//! be deterministic, and every field that matters must change the bytes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Deterministic conversion of a record into the message that gets signed.
pub trait Canonicalize {
    /// Returns the canonical bytes of this record.
    fn canonicalize(&self) -> Vec<u8>;
}

impl Canonicalize for [u8] {
    fn canonicalize(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl<const N: usize> Canonicalize for [u8; N] {
    fn canonicalize(&self) -> Vec<u8> {
        self.to_vec()
    }
}

impl Canonicalize for Vec<u8> {
    fn canonicalize(&self) -> Vec<u8> {
        self.clone()
    }
}

impl Canonicalize for str {
    fn canonicalize(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl Canonicalize for String {
    fn canonicalize(&self) -> Vec<u8> {
        self.as_bytes().to_vec()
    }
}

impl<T: Canonicalize + ?Sized> Canonicalize for &T {
    fn canonicalize(&self) -> Vec<u8> {
        (**self).canonicalize()
    }
}

/// Separator between fields in the canonical form.
const SEPARATOR: char = ',';

/// Errors building a [`LicenseData`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A required field is empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// A field contains the field separator.
    #[error("{0} must not contain ','")]
    Separator(&'static str),
}

/// The stock license record: product, licensee name and optional email.
///
/// Canonical form is `product,name` or `product,name,email` in UTF-8. This is
/// the layout existing verifiers expect, so it must not change. Fields never
/// contain `,`, so distinct records always have distinct canonical bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "LicenseDataFields")]
pub struct LicenseData {
    product: String,
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

/// Unvalidated serde form of [`LicenseData`].
#[derive(Deserialize)]
struct LicenseDataFields {
    product: String,
    name: String,
    #[serde(default)]
    email: Option<String>,
}

impl TryFrom<LicenseDataFields> for LicenseData {
    type Error = RecordError;

    fn try_from(fields: LicenseDataFields) -> Result<Self, RecordError> {
        let record = Self::new(fields.product, fields.name)?;
        match fields.email {
            Some(email) => record.with_email(email),
            None => Ok(record),
        }
    }
}

impl LicenseData {
    /// Creates a record for a product and licensee.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError`] if either field is empty or contains `,`.
    pub fn new(product: impl Into<String>, name: impl Into<String>) -> Result<Self, RecordError> {
        Ok(Self {
            product: checked("product", product.into(), true)?,
            name: checked("name", name.into(), true)?,
            email: None,
        })
    }

    /// Adds the licensee email.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Separator`] if the email contains `,`.
    pub fn with_email(mut self, email: impl Into<String>) -> Result<Self, RecordError> {
        self.email = Some(checked("email", email.into(), false)?);
        Ok(self)
    }

    /// Returns the product code.
    #[must_use]
    pub fn product(&self) -> &str {
        &self.product
    }

    /// Returns the licensee name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the licensee email.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the canonical string that is signed.
    #[must_use]
    pub fn to_license_string(&self) -> String {
        let mut out = format!("{}{SEPARATOR}{}", self.product, self.name);
        if let Some(email) = &self.email {
            out.push(SEPARATOR);
            out.push_str(email);
        }
        out
    }
}

fn checked(field: &'static str, value: String, required: bool) -> Result<String, RecordError> {
    if required && value.is_empty() {
        return Err(RecordError::Empty(field));
    }
    if value.contains(SEPARATOR) {
        return Err(RecordError::Separator(field));
    }
    Ok(value)
}

impl Canonicalize for LicenseData {
    fn canonicalize(&self) -> Vec<u8> {
        self.to_license_string().into_bytes()
    }
}
