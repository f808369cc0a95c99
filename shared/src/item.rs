use std::borrow::Cow;
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capabilities::MAX_PATH_LENGTH;

pub const IMAGE_ENDPOINT: &str = "/api/img";
pub const CAPTION_ENDPOINT: &str = "/api/caption";

const LONGEST_ENDPOINT: usize = if IMAGE_ENDPOINT.len() > CAPTION_ENDPOINT.len() {
    IMAGE_ENDPOINT.len()
} else {
    CAPTION_ENDPOINT.len()
};

/// Longest escaped identifier that still fits every endpoint path.
pub const MAX_ENCODED_LENGTH: usize = MAX_PATH_LENGTH - LONGEST_ENDPOINT - 1;

/// Everything except the characters `encodeURIComponent` leaves alone.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemIdError {
    #[error("item identifier cannot be empty")]
    Empty,
    #[error("encoded item identifier exceeds {max} bytes")]
    TooLong { max: usize },
    #[error("encoded identifier is not valid UTF-8: {0}")]
    InvalidEncoding(String),
}

/// Opaque identifier of one dataset item (image plus caption). Never mutated
/// once constructed; only ever percent-encoded on the way out.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct DatasetItemId(String);

impl DatasetItemId {
    /// Escaping can triple the length, so the bound applies to the escaped
    /// form: every id accepted here yields valid image and caption paths.
    pub fn new(id: impl Into<String>) -> Result<Self, ItemIdError> {
        let id = id.into();
        if id.is_empty() {
            return Err(ItemIdError::Empty);
        }
        let too_long = ItemIdError::TooLong {
            max: MAX_ENCODED_LENGTH,
        };
        if id.len() > MAX_ENCODED_LENGTH {
            return Err(too_long);
        }
        let encoded_len: usize = utf8_percent_encode(&id, COMPONENT).map(str::len).sum();
        if encoded_len > MAX_ENCODED_LENGTH {
            return Err(too_long);
        }
        Ok(Self(id))
    }

    /// Inverse of [`DatasetItemId::encoded`].
    pub fn decode(encoded: &str) -> Result<Self, ItemIdError> {
        let decoded = percent_decode_str(encoded)
            .decode_utf8()
            .map_err(|e| ItemIdError::InvalidEncoding(e.to_string()))?;
        Self::new(decoded.into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The identifier as a single path segment, escaped like
    /// `encodeURIComponent`.
    pub fn encoded(&self) -> Cow<'_, str> {
        utf8_percent_encode(&self.0, COMPONENT).into()
    }

    pub fn image_path(&self) -> String {
        format!("{IMAGE_ENDPOINT}/{}", self.encoded())
    }

    pub fn caption_path(&self) -> String {
        format!("{CAPTION_ENDPOINT}/{}", self.encoded())
    }
}

impl fmt::Display for DatasetItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DatasetItemId {
    type Error = ItemIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<DatasetItemId> for String {
    fn from(id: DatasetItemId) -> Self {
        id.0
    }
}
