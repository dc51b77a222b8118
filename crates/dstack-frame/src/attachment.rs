use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use dstack_handler::FrameData;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::encryption::EncryptionMethod;
use crate::error::{FrameError, Result};

/// Commit parameters: string keys mapped to scalar JSON values.
pub type Params = BTreeMap<String, Value>;

/// One committed object as it appears in the push envelope.
///
/// Optional fields are omitted from the JSON when unset, never sent as
/// `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    content_type: String,
    data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    params: Option<Params>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    preview: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    encryption: Option<Map<String, Value>>,
}

impl Attachment {
    /// Build an attachment from encoded frame data.
    ///
    /// Params are validated before anything is encrypted. The preview is
    /// kept only when the payload travels in the clear, since it would
    /// otherwise leak a plaintext excerpt.
    pub fn from_frame_data(
        frame: FrameData,
        description: Option<&str>,
        params: Option<Params>,
        encryption: &dyn EncryptionMethod,
    ) -> Result<Self> {
        let params = validate_params(params)?;
        let sealed = encryption.encrypt(&frame.data)?;
        let encrypted = !sealed.metadata.is_empty();

        let preview = match frame.preview {
            Some(preview) if !encrypted => Some(BASE64.encode(preview)),
            _ => None,
        };

        Ok(Self {
            content_type: frame.content_type,
            data: BASE64.encode(&sealed.data),
            description: description.map(str::to_string),
            params,
            preview,
            encryption: encrypted.then_some(sealed.metadata),
        })
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Base64 payload exactly as sent.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn params(&self) -> Option<&Params> {
        self.params.as_ref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn encryption(&self) -> Option<&Map<String, Value>> {
        self.encryption.as_ref()
    }

    /// Payload bytes after base64 decoding, still encrypted if they were.
    pub fn decode_data(&self) -> Result<Vec<u8>> {
        Ok(BASE64.decode(&self.data)?)
    }

    /// Original payload bytes, undoing `encryption`.
    pub fn decrypt(&self, encryption: &dyn EncryptionMethod) -> Result<Vec<u8>> {
        let data = self.decode_data()?;
        let empty = Map::new();
        let metadata = self.encryption.as_ref().unwrap_or(&empty);
        Ok(encryption.decrypt(&data, metadata)?)
    }
}

fn validate_params(params: Option<Params>) -> Result<Option<Params>> {
    let Some(params) = params else {
        return Ok(None);
    };
    if let Some((key, _)) = params
        .iter()
        .find(|(_, value)| !matches!(value, Value::String(_) | Value::Number(_) | Value::Bool(_)))
    {
        return Err(FrameError::InvalidParam { key: key.clone() });
    }
    Ok((!params.is_empty()).then_some(params))
}
