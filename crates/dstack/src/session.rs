use std::any::Any;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use dstack_config::{ConfigFactory, FileConfigFactory, DEFAULT_PROFILE};
use dstack_frame::{EncryptionMethod, NoEncryption, Params, PushResult, StackFrame};
use dstack_handler::{AutoHandler, Handler};
use dstack_protocol::{JsonProtocol, Protocol};
use tracing::debug;

use crate::error::Result;

static CONFIG_FACTORY: RwLock<Option<Arc<dyn ConfigFactory>>> = RwLock::new(None);

/// Replace the process-wide configuration source used by frame creation.
///
/// Until called, configuration is read from files (see [`FileConfigFactory`]).
pub fn configure(factory: impl ConfigFactory + 'static) {
    let factory: Arc<dyn ConfigFactory> = Arc::new(factory);
    *CONFIG_FACTORY
        .write()
        .unwrap_or_else(PoisonError::into_inner) = Some(factory);
}

/// Go back to file-based configuration.
pub fn reset_configuration() {
    *CONFIG_FACTORY
        .write()
        .unwrap_or_else(PoisonError::into_inner) = None;
}

fn default_factory() -> Arc<dyn ConfigFactory> {
    CONFIG_FACTORY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .unwrap_or_else(|| Arc::new(FileConfigFactory::new()))
}

/// Options for creating a [`StackFrame`].
///
/// Defaults: profile `default`, [`AutoHandler`], [`JsonProtocol`] to the
/// profile's server, no encryption, no auto-push, access checked on build.
pub struct FrameBuilder {
    stack: String,
    profile: String,
    handler: Option<Box<dyn Handler>>,
    protocol: Option<Box<dyn Protocol>>,
    config: Option<Arc<dyn ConfigFactory>>,
    encryption: Option<Box<dyn EncryptionMethod>>,
    auto_push: bool,
    check_access: bool,
    access: Option<String>,
    timeout: Option<Duration>,
}

impl FrameBuilder {
    pub fn new(stack: impl Into<String>) -> Self {
        Self {
            stack: stack.into(),
            profile: DEFAULT_PROFILE.to_string(),
            handler: None,
            protocol: None,
            config: None,
            encryption: None,
            auto_push: false,
            check_access: true,
            access: None,
            timeout: None,
        }
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    pub fn handler(mut self, handler: impl Handler + 'static) -> Self {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn protocol(mut self, protocol: impl Protocol + 'static) -> Self {
        self.protocol = Some(Box::new(protocol));
        self
    }

    /// Configuration source for this frame only, instead of the process-wide one.
    pub fn config(mut self, config: impl ConfigFactory + 'static) -> Self {
        self.config = Some(Arc::new(config));
        self
    }

    pub fn encryption(mut self, encryption: impl EncryptionMethod + 'static) -> Self {
        self.encryption = Some(Box::new(encryption));
        self
    }

    /// Deliver every commit immediately.
    pub fn auto_push(mut self, auto_push: bool) -> Self {
        self.auto_push = auto_push;
        self
    }

    /// Verify credentials with the server before returning the frame.
    pub fn check_access(mut self, check_access: bool) -> Self {
        self.check_access = check_access;
        self
    }

    pub fn access(mut self, access: impl Into<String>) -> Self {
        self.access = Some(access.into());
        self
    }

    /// Request timeout for the default protocol.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the profile and create the frame.
    pub fn build(self) -> Result<StackFrame> {
        let factory = self.config.unwrap_or_else(default_factory);
        let profile = factory.get_config()?.get_profile(&self.profile)?;
        debug!(profile = profile.name(), server = profile.server(), "resolved profile");

        let protocol: Box<dyn Protocol> = match self.protocol {
            Some(protocol) => protocol,
            None => Box::new(JsonProtocol::with_timeout(profile.server(), self.timeout)?),
        };
        let handler: Box<dyn Handler> = match self.handler {
            Some(handler) => handler,
            None => Box::new(AutoHandler::new()),
        };
        let encryption: Box<dyn EncryptionMethod> = match self.encryption {
            Some(encryption) => encryption,
            None => Box::new(NoEncryption),
        };

        let mut frame = StackFrame::new(
            &self.stack,
            profile.user(),
            profile.token(),
            handler,
            protocol,
            encryption,
            self.auto_push,
        )?;
        if let Some(access) = self.access {
            frame = frame.with_access(access);
        }
        if self.check_access {
            frame.send_access()?;
        }
        Ok(frame)
    }
}

/// Create a frame for `stack` with the default options, checking access.
pub fn create_frame(stack: &str) -> Result<StackFrame> {
    FrameBuilder::new(stack).build()
}

/// Create a frame, commit `obj` and push it in one call.
///
/// Access is not checked separately; the push itself fails on bad
/// credentials.
pub fn push_frame<T: Any>(
    stack: &str,
    obj: &T,
    description: Option<&str>,
    params: Option<Params>,
) -> Result<PushResult> {
    push_frame_with(FrameBuilder::new(stack), obj, description, params)
}

/// [`push_frame`] with explicit frame options.
pub fn push_frame_with<T: Any>(
    builder: FrameBuilder,
    obj: &T,
    description: Option<&str>,
    params: Option<Params>,
) -> Result<PushResult> {
    let mut frame = builder.check_access(false).build()?;
    frame.commit(obj, description, params)?;
    Ok(frame.push()?)
}
