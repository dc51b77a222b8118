use serde::Serialize;
use serde_json::Value;

use crate::attachment::Attachment;

/// Client name reported in every push envelope.
pub const CLIENT_NAME: &str = "dstack-rs";

/// Host description sent with each push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientSettings {
    pub os: OsInfo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OsInfo {
    pub sysname: String,
    pub machine: String,
}

impl ClientSettings {
    /// Settings describing the running host.
    pub fn current() -> Self {
        Self {
            os: OsInfo {
                sysname: std::env::consts::OS.to_string(),
                machine: std::env::consts::ARCH.to_string(),
            },
        }
    }
}

/// Body of a `stacks/push` request.
#[derive(Debug, Serialize)]
pub(crate) struct Envelope<'a> {
    pub stack: &'a str,
    pub token: &'a str,
    pub id: &'a str,
    pub timestamp: u64,
    pub client: &'static str,
    pub version: &'static str,
    pub settings: ClientSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encryption: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<&'a [Attachment]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl<'a> Envelope<'a> {
    pub fn new(stack: &'a str, token: &'a str, id: &'a str, timestamp: u64) -> Self {
        Self {
            stack,
            token,
            id,
            timestamp,
            client: CLIENT_NAME,
            version: env!("CARGO_PKG_VERSION"),
            settings: ClientSettings::current(),
            message: None,
            access: None,
            encryption: None,
            attachments: None,
            index: None,
            size: None,
        }
    }
}
