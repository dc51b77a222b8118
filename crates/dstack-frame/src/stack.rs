use std::any::Any;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use dstack_handler::{encode, FrameData, Handler};
use dstack_protocol::{Protocol, ACCESS_ENDPOINT, PUSH_ENDPOINT};
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::attachment::{Attachment, Params};
use crate::encryption::EncryptionMethod;
use crate::envelope::Envelope;
use crate::error::{FrameError, Result};
use crate::path::normalize_stack_path;

/// What the server returned for a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushResult {
    /// Frame id the push was sent with.
    pub id: String,
    /// Where the pushed stack can be viewed.
    pub url: String,
}

impl PushResult {
    fn from_response(id: &str, response: &Value) -> Result<Self> {
        let url = response
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| FrameError::MissingUrl(response.to_string()))?;
        Ok(Self {
            id: id.to_string(),
            url: url.to_string(),
        })
    }
}

impl fmt::Display for PushResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// A push session: objects are committed one by one and pushed together.
///
/// Without auto-push, [`StackFrame::push`] sends every attachment in a single
/// request. With auto-push, each commit delivers its attachment immediately
/// together with its 0-based `index`, and the final push only reports how
/// many were delivered (`size`). Delivered attachments are never re-sent.
///
/// A commit always keeps its attachment. If an auto-push delivery fails, the
/// attachment stays pending and goes out with the next commit or push.
/// A failed push changes nothing, so pushing again sends the same envelope.
pub struct StackFrame {
    stack: String,
    token: String,
    handler: Box<dyn Handler>,
    protocol: Box<dyn Protocol>,
    encryption: Box<dyn EncryptionMethod>,
    auto_push: bool,
    access: Option<String>,
    id: String,
    timestamp: u64,
    attachments: Vec<Attachment>,
    index: usize,
}

impl StackFrame {
    /// Create a frame for `stack`, owned by `user` unless the path is absolute.
    pub fn new(
        stack: &str,
        user: &str,
        token: impl Into<String>,
        handler: Box<dyn Handler>,
        protocol: Box<dyn Protocol>,
        encryption: Box<dyn EncryptionMethod>,
        auto_push: bool,
    ) -> Result<Self> {
        let stack = normalize_stack_path(user, stack)?;
        let id = Uuid::new_v4().to_string();
        debug!(%stack, %id, auto_push, "created stack frame");

        Ok(Self {
            stack,
            token: token.into(),
            handler,
            protocol,
            encryption,
            auto_push,
            access: None,
            id,
            timestamp: now_millis(),
            attachments: Vec::new(),
            index: 0,
        })
    }

    /// Access level requested for the pushed stack (e.g. `public`, `private`).
    pub fn with_access(mut self, access: impl Into<String>) -> Self {
        self.access = Some(access.into());
        self
    }

    /// Normalized `<owner>/<path>` stack name.
    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation time in milliseconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn access(&self) -> Option<&str> {
        self.access.as_deref()
    }

    pub fn auto_push(&self) -> bool {
        self.auto_push
    }

    /// Attachments committed so far, in commit order.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Number of attachments already delivered by auto-push.
    pub fn delivered(&self) -> usize {
        self.index
    }

    /// Ask the server whether these credentials may push to this stack.
    pub fn send_access(&self) -> Result<()> {
        let payload = json!({ "stack": self.stack, "token": self.token });
        self.protocol.send(ACCESS_ENDPOINT, &payload)?;
        info!(stack = %self.stack, "access granted");
        Ok(())
    }

    /// Encode `obj` with the frame's handler and append it.
    ///
    /// Encoding happens before any network call, so an unsupported object
    /// never reaches the server.
    pub fn commit<T: Any>(
        &mut self,
        obj: &T,
        description: Option<&str>,
        params: Option<Params>,
    ) -> Result<()> {
        let frame = encode(&*self.handler, obj)?;
        self.append(frame, description, params)
    }

    /// Like [`StackFrame::commit`], with an explicit handler for this object.
    pub fn commit_with<T: Any>(
        &mut self,
        handler: &dyn Handler,
        obj: &T,
        description: Option<&str>,
        params: Option<Params>,
    ) -> Result<()> {
        let frame = encode(handler, obj)?;
        self.append(frame, description, params)
    }

    fn append(
        &mut self,
        frame: FrameData,
        description: Option<&str>,
        params: Option<Params>,
    ) -> Result<()> {
        let content_type = frame.content_type.clone();
        let attachment =
            Attachment::from_frame_data(frame, description, params, &*self.encryption)?;
        self.attachments.push(attachment);
        debug!(%content_type, count = self.attachments.len(), "committed attachment");

        if self.auto_push {
            self.deliver_pending()?;
        }
        Ok(())
    }

    /// Send each attachment not yet delivered, one request per attachment.
    ///
    /// `index` only moves past an attachment once the server accepted it.
    fn deliver_pending(&mut self) -> Result<()> {
        while let Some(attachment) = self.attachments.get(self.index) {
            let mut envelope = self.base_envelope(None);
            envelope.attachments = Some(std::slice::from_ref(attachment));
            envelope.index = Some(self.index);
            let result = self.send_push(&envelope)?;
            debug!(index = self.index, url = %result.url, "attachment delivered");
            self.index += 1;
        }
        Ok(())
    }

    /// Send the frame and return where it can be viewed.
    ///
    /// With auto-push, attachments whose delivery failed earlier are sent
    /// first.
    pub fn push(&mut self) -> Result<PushResult> {
        self.push_inner(None)
    }

    /// Send the frame with a commit message.
    pub fn push_with_message(&mut self, message: &str) -> Result<PushResult> {
        self.push_inner(Some(message))
    }

    /// JSON body [`StackFrame::push`] would send.
    pub fn envelope(&self, message: Option<&str>) -> Result<Value> {
        Ok(serde_json::to_value(self.push_envelope(message))?)
    }

    fn push_inner(&mut self, message: Option<&str>) -> Result<PushResult> {
        if self.auto_push {
            self.deliver_pending()?;
        }
        let result = self.send_push(&self.push_envelope(message))?;
        info!(
            stack = %self.stack,
            attachments = self.attachments.len(),
            url = %result.url,
            "pushed frame"
        );
        Ok(result)
    }

    fn push_envelope<'a>(&'a self, message: Option<&'a str>) -> Envelope<'a> {
        let mut envelope = self.base_envelope(message);
        if self.auto_push {
            envelope.size = Some(self.index);
        } else {
            envelope.attachments = Some(&self.attachments);
        }
        envelope
    }

    fn base_envelope<'a>(&'a self, message: Option<&'a str>) -> Envelope<'a> {
        let mut envelope = Envelope::new(&self.stack, &self.token, &self.id, self.timestamp);
        envelope.message = message;
        envelope.access = self.access.as_deref();
        envelope.encryption = self.encryption.info();
        envelope
    }

    fn send_push(&self, envelope: &Envelope<'_>) -> Result<PushResult> {
        let payload = serde_json::to_value(envelope)?;
        let response = self.protocol.send(PUSH_ENDPOINT, &payload)?;
        PushResult::from_response(&self.id, &response)
    }
}

impl fmt::Debug for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackFrame")
            .field("stack", &self.stack)
            .field("token", &format_args!("<redacted:{} bytes>", self.token.len()))
            .field("handler", &self.handler.name())
            .field("auto_push", &self.auto_push)
            .field("access", &self.access)
            .field("id", &self.id)
            .field("attachments", &self.attachments.len())
            .finish()
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
