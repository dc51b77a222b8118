use std::sync::{Arc, Mutex};

use dstack::config::{ConfigError, InPlaceConfig, Profile};
use dstack::frame::{AesGcmEncryption, FrameError, Params};
use dstack::handler::{Svg, TextHandler};
use dstack::protocol::{Protocol, ProtocolError, ACCESS_ENDPOINT, PUSH_ENDPOINT};
use dstack::{configure, push_frame_with, reset_configuration, Error, FrameBuilder};
use serde_json::{json, Value};

#[derive(Clone, Default)]
struct RecordingProtocol {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
    status: Option<u16>,
}

impl RecordingProtocol {
    fn rejecting(status: u16) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    fn endpoints(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(endpoint, _)| endpoint.clone())
            .collect()
    }

    fn last(&self) -> Value {
        self.requests.lock().unwrap().last().unwrap().1.clone()
    }
}

impl Protocol for RecordingProtocol {
    fn send(&self, endpoint: &str, payload: &Value) -> dstack::protocol::Result<Value> {
        if let Some(status) = self.status {
            return Err(ProtocolError::Status {
                endpoint: endpoint.to_string(),
                status,
                body: r#"{"error":"unauthorized"}"#.to_string(),
            });
        }
        self.requests
            .lock()
            .unwrap()
            .push((endpoint.to_string(), payload.clone()));
        Ok(json!({"status": 0, "url": "https://api.dstack.ai/user/plots/my_plot"}))
    }
}

fn test_config() -> InPlaceConfig {
    InPlaceConfig::from_profiles([
        Profile::with_default_server("default", "user", "my_token").unwrap(),
        Profile::with_default_server("other", "someone", "other_token").unwrap(),
    ])
}

#[test]
fn build_checks_access_by_default() {
    let protocol = RecordingProtocol::default();
    let frame = FrameBuilder::new("plots/my_plot")
        .config(test_config())
        .protocol(protocol.clone())
        .build()
        .unwrap();

    assert_eq!(frame.stack(), "user/plots/my_plot");
    assert_eq!(protocol.endpoints(), vec![ACCESS_ENDPOINT.to_string()]);
    assert_eq!(
        protocol.last(),
        json!({"stack": "user/plots/my_plot", "token": "my_token"})
    );
}

#[test]
fn rejected_access_fails_frame_creation() {
    let err = FrameBuilder::new("plots/my_plot")
        .config(test_config())
        .protocol(RecordingProtocol::rejecting(401))
        .build()
        .unwrap_err();

    assert!(matches!(err, Error::Protocol(_)));
    assert_eq!(err.status(), Some(401));
}

#[test]
fn missing_profile_is_config_error() {
    let err = FrameBuilder::new("plots/my_plot")
        .config(test_config())
        .profile("absent")
        .protocol(RecordingProtocol::default())
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::ProfileNotFound(ref name)) if name == "absent"
    ));
}

#[test]
fn named_profile_supplies_credentials() {
    let protocol = RecordingProtocol::default();
    let mut frame = FrameBuilder::new("charts/c")
        .config(test_config())
        .profile("other")
        .protocol(protocol.clone())
        .check_access(false)
        .access("public")
        .build()
        .unwrap();
    assert!(protocol.endpoints().is_empty());

    frame.commit(&Svg::new("<svg/>"), None, None).unwrap();
    frame.push().unwrap();

    let envelope = protocol.last();
    assert_eq!(envelope["stack"], "someone/charts/c");
    assert_eq!(envelope["token"], "other_token");
    assert_eq!(envelope["access"], "public");
}

#[test]
fn push_frame_commits_and_pushes_once() {
    let protocol = RecordingProtocol::default();
    let mut params = Params::new();
    params.insert("run".to_string(), json!(7));

    let result = push_frame_with(
        FrameBuilder::new("plots/my_plot")
            .config(test_config())
            .protocol(protocol.clone())
            .handler(TextHandler)
            .encryption(AesGcmEncryption::new([5u8; 32])),
        &String::from("notes"),
        Some("My first plot"),
        Some(params),
    )
    .unwrap();

    assert_eq!(result.url, "https://api.dstack.ai/user/plots/my_plot");
    assert_eq!(protocol.endpoints(), vec![PUSH_ENDPOINT.to_string()]);

    let envelope = protocol.last();
    assert_eq!(envelope["encryption"]["method"], "aes-256-gcm");
    let attachment = &envelope["attachments"][0];
    assert_eq!(attachment["type"], "text/plain");
    assert_eq!(attachment["description"], "My first plot");
    assert_eq!(attachment["params"], json!({"run": 7}));
}

#[test]
fn unsupported_object_surfaces_as_frame_error() {
    let protocol = RecordingProtocol::default();
    let err = push_frame_with(
        FrameBuilder::new("plots/my_plot")
            .config(test_config())
            .protocol(protocol.clone()),
        &(1u8, 2u8),
        None,
        None,
    )
    .unwrap_err();

    assert!(matches!(err, Error::Frame(FrameError::Handler(_))));
    assert!(protocol.endpoints().is_empty());
}

#[test]
fn configure_sets_the_process_default() {
    configure(test_config());
    let frame = FrameBuilder::new("/team/board")
        .protocol(RecordingProtocol::default())
        .check_access(false)
        .build();
    reset_configuration();

    assert_eq!(frame.unwrap().stack(), "team/board");
}
