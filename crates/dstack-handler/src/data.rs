use bytes::Bytes;

/// The serialized form of a committed object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameData {
    /// Content type tag, e.g. `image/svg` or `text/csv`.
    pub content_type: String,
    /// Encoded payload.
    pub data: Bytes,
    /// Optional lightweight preview of the payload.
    pub preview: Option<Bytes>,
}

impl FrameData {
    pub fn new(content_type: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            content_type: content_type.into(),
            data: data.into(),
            preview: None,
        }
    }

    pub fn with_preview(mut self, preview: impl Into<Bytes>) -> Self {
        self.preview = Some(preview.into());
        self
    }
}
