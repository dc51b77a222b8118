use std::sync::{Arc, Mutex};

use dstack_frame::{
    AesGcmEncryption, FrameError, NoEncryption, Params, StackFrame, CLIENT_NAME,
};
use dstack_handler::{AutoHandler, Svg, Table, TextHandler};
use dstack_protocol::{Protocol, ProtocolError, ACCESS_ENDPOINT, PUSH_ENDPOINT};
use serde_json::{json, Value};

#[derive(Default)]
struct Recorded {
    requests: Vec<(String, Value)>,
    broken: bool,
}

/// In-process protocol that records every request and can be broken.
#[derive(Clone, Default)]
struct RecordingProtocol {
    state: Arc<Mutex<Recorded>>,
}

impl RecordingProtocol {
    fn broke(&self) {
        self.state.lock().unwrap().broken = true;
    }

    fn fix(&self) {
        self.state.lock().unwrap().broken = false;
    }

    fn requests(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().requests.clone()
    }

    fn last_push(&self) -> Value {
        self.requests()
            .into_iter()
            .rev()
            .find(|(endpoint, _)| endpoint == PUSH_ENDPOINT)
            .map(|(_, payload)| payload)
            .expect("a push should have been sent")
    }
}

impl Protocol for RecordingProtocol {
    fn send(&self, endpoint: &str, payload: &Value) -> dstack_protocol::Result<Value> {
        let mut state = self.state.lock().unwrap();
        if state.broken {
            return Err(ProtocolError::Other("protocol is broken".to_string()));
        }
        state.requests.push((endpoint.to_string(), payload.clone()));
        let stack = payload["stack"].as_str().unwrap_or_default();
        Ok(json!({"status": 0, "url": format!("https://api.dstack.ai/{stack}")}))
    }
}

fn frame(stack: &str, protocol: &RecordingProtocol, auto_push: bool) -> StackFrame {
    StackFrame::new(
        stack,
        "user",
        "my_token",
        Box::new(AutoHandler::new()),
        Box::new(protocol.clone()),
        Box::new(NoEncryption),
        auto_push,
    )
    .expect("frame should be created")
}

fn params(pairs: &[(&str, Value)]) -> Params {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

#[test]
fn single_plot_envelope() {
    let protocol = RecordingProtocol::default();
    let mut frame = frame("plots/my_plot", &protocol, false);
    frame.send_access().unwrap();
    frame
        .commit(&Svg::new("<svg/>"), Some("My first plot"), None)
        .unwrap();
    let result = frame.push().unwrap();

    assert_eq!(result.url, "https://api.dstack.ai/user/plots/my_plot");
    assert_eq!(result.id, frame.id());
    assert_eq!(result.to_string(), result.url);

    let requests = protocol.requests();
    assert_eq!(requests[0].0, ACCESS_ENDPOINT);
    assert_eq!(
        requests[0].1,
        json!({"stack": "user/plots/my_plot", "token": "my_token"})
    );

    let envelope = protocol.last_push();
    assert_eq!(envelope["stack"], "user/plots/my_plot");
    assert_eq!(envelope["token"], "my_token");
    assert_eq!(envelope["id"], frame.id());
    assert_eq!(envelope["client"], CLIENT_NAME);
    assert!(envelope.get("encryption").is_none());
    assert!(envelope.get("message").is_none());

    let attachments = envelope["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0]["type"], "image/svg");
    assert_eq!(attachments[0]["description"], "My first plot");
    assert!(attachments[0].get("params").is_none());
}

#[test]
fn commits_keep_their_order_and_params() {
    let protocol = RecordingProtocol::default();
    let mut frame = frame("plots/series", &protocol, false);

    let mut table = Table::new(["x", "y"]);
    table.push_row(vec![json!(1), json!(2)]).unwrap();

    frame
        .commit(&Svg::new("<svg>1</svg>"), None, Some(params(&[("x", json!(1))])))
        .unwrap();
    frame.commit(&table, Some("table"), None).unwrap();
    frame
        .commit(&json!({"k": "v"}), None, Some(params(&[("x", json!(3))])))
        .unwrap();
    frame.push_with_message("three things").unwrap();

    let envelope = protocol.last_push();
    assert_eq!(envelope["message"], "three things");
    let attachments = envelope["attachments"].as_array().unwrap();
    let types: Vec<_> = attachments.iter().map(|a| a["type"].clone()).collect();
    assert_eq!(
        types,
        vec![json!("image/svg"), json!("text/csv"), json!("application/json")]
    );
    assert_eq!(attachments[0]["params"], json!({"x": 1}));
    assert!(attachments[1].get("params").is_none());
    assert_eq!(attachments[2]["params"], json!({"x": 3}));
}

#[test]
fn absolute_stack_path_skips_user_prefix() {
    let protocol = RecordingProtocol::default();
    let mut frame = frame("/other/my_plot", &protocol, false);
    frame.commit(&Svg::new("<svg/>"), None, None).unwrap();
    frame.push().unwrap();

    assert_eq!(protocol.last_push()["stack"], "other/my_plot");
}

#[test]
fn broken_access_check_fails_before_any_push() {
    let protocol = RecordingProtocol::default();
    protocol.broke();
    let frame = frame("plots/my_plot", &protocol, false);

    let err = frame.send_access().unwrap_err();
    assert!(matches!(err, FrameError::Protocol(_)));
    assert!(protocol.requests().is_empty());
}

#[test]
fn failed_push_can_be_retried_with_the_same_envelope() {
    let protocol = RecordingProtocol::default();
    let mut frame = frame("plots/my_plot", &protocol, false);
    frame
        .commit(&Svg::new("<svg/>"), Some("My first plot"), None)
        .unwrap();
    let before = frame.envelope(None).unwrap();

    protocol.broke();
    assert!(matches!(frame.push(), Err(FrameError::Protocol(_))));
    assert_eq!(frame.attachments().len(), 1);

    protocol.fix();
    frame.push().unwrap();
    assert_eq!(protocol.last_push(), before);
}

#[test]
fn empty_push_sends_empty_attachment_list() {
    let protocol = RecordingProtocol::default();
    let mut frame = frame("plots/empty", &protocol, false);
    frame.push().unwrap();

    assert_eq!(protocol.last_push()["attachments"], json!([]));
}

#[test]
fn auto_push_delivers_each_attachment_once() {
    let protocol = RecordingProtocol::default();
    let mut frame = frame("plots/live", &protocol, true);

    frame.commit(&Svg::new("<svg>a</svg>"), None, None).unwrap();
    frame.commit(&Svg::new("<svg>b</svg>"), None, None).unwrap();
    assert_eq!(frame.delivered(), 2);
    frame.push().unwrap();

    let pushes: Vec<Value> = protocol
        .requests()
        .into_iter()
        .filter(|(endpoint, _)| endpoint == PUSH_ENDPOINT)
        .map(|(_, payload)| payload)
        .collect();
    assert_eq!(pushes.len(), 3);

    for (index, push) in pushes[..2].iter().enumerate() {
        assert_eq!(push["index"], index);
        assert_eq!(push["attachments"].as_array().unwrap().len(), 1);
        assert!(push.get("size").is_none());
        assert_eq!(push["id"], frame.id());
    }

    let closing = &pushes[2];
    assert_eq!(closing["size"], 2);
    assert!(closing.get("attachments").is_none());
    assert!(closing.get("index").is_none());
}

#[test]
fn failed_auto_push_keeps_the_attachment_for_the_next_push() {
    let protocol = RecordingProtocol::default();
    let mut frame = frame("plots/live", &protocol, true);

    protocol.broke();
    assert!(frame.commit(&Svg::new("<svg>A</svg>"), Some("A"), None).is_err());
    assert_eq!(frame.delivered(), 0);
    assert_eq!(frame.attachments().len(), 1);

    protocol.fix();
    frame.push().unwrap();
    assert_eq!(frame.delivered(), 1);

    let pushes: Vec<Value> = protocol
        .requests()
        .into_iter()
        .filter(|(endpoint, _)| endpoint == PUSH_ENDPOINT)
        .map(|(_, payload)| payload)
        .collect();
    assert_eq!(pushes.len(), 2);
    assert_eq!(pushes[0]["index"], 0);
    assert_eq!(pushes[0]["attachments"][0]["description"], "A");
    assert_eq!(pushes[1]["size"], 1);
    assert!(pushes[1].get("attachments").is_none());
}

#[test]
fn failed_auto_push_is_retried_by_the_next_commit() {
    let protocol = RecordingProtocol::default();
    let mut frame = frame("plots/live", &protocol, true);

    protocol.broke();
    assert!(frame.commit(&Svg::new("<svg>a</svg>"), None, None).is_err());

    protocol.fix();
    frame.commit(&Svg::new("<svg>b</svg>"), None, None).unwrap();
    assert_eq!(frame.delivered(), 2);

    let indexes: Vec<Value> = protocol
        .requests()
        .into_iter()
        .filter(|(endpoint, _)| endpoint == PUSH_ENDPOINT)
        .map(|(_, payload)| payload["index"].clone())
        .collect();
    assert_eq!(indexes, vec![json!(0), json!(1)]);
}

#[test]
fn unsupported_object_fails_before_network() {
    let protocol = RecordingProtocol::default();
    let mut frame = frame("plots/my_plot", &protocol, true);

    let err = frame.commit(&42u64, None, None).unwrap_err();
    match err {
        FrameError::Handler(inner) => assert!(inner.to_string().contains("u64")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(protocol.requests().is_empty());
    assert!(frame.attachments().is_empty());
}

#[test]
fn commit_with_uses_the_given_handler() {
    let protocol = RecordingProtocol::default();
    let mut frame = frame("notes/today", &protocol, false);

    frame
        .commit_with(&TextHandler, &String::from("hello"), None, None)
        .unwrap();
    assert_eq!(frame.attachments()[0].content_type(), "text/plain");
    assert_eq!(frame.attachments()[0].decode_data().unwrap(), b"hello");
}

#[test]
fn encrypted_frame_reports_method_and_round_trips() {
    let protocol = RecordingProtocol::default();
    let method = AesGcmEncryption::new([3u8; 32]);
    let mut frame = StackFrame::new(
        "plots/secret",
        "user",
        "my_token",
        Box::new(AutoHandler::new()),
        Box::new(protocol.clone()),
        Box::new(method.clone()),
        false,
    )
    .unwrap()
    .with_access("private");

    frame.commit(&Svg::new("<svg/>"), None, None).unwrap();
    frame.push().unwrap();

    let envelope = protocol.last_push();
    assert_eq!(envelope["encryption"], json!({"method": "aes-256-gcm"}));
    assert_eq!(envelope["access"], "private");
    assert!(envelope["attachments"][0]["encryption"]["nonce"].is_string());
    assert_eq!(frame.attachments()[0].decrypt(&method).unwrap(), b"<svg/>");
}

#[test]
fn invalid_stack_is_rejected() {
    let protocol = RecordingProtocol::default();
    let result = StackFrame::new(
        "/",
        "user",
        "t",
        Box::new(AutoHandler::new()),
        Box::new(protocol),
        Box::new(NoEncryption),
        false,
    );
    assert!(matches!(result, Err(FrameError::InvalidStack(_))));
}

#[test]
fn missing_url_in_response_is_an_error() {
    struct Silent;

    impl Protocol for Silent {
        fn send(&self, _endpoint: &str, _payload: &Value) -> dstack_protocol::Result<Value> {
            Ok(json!({"status": 0}))
        }
    }

    let mut frame = StackFrame::new(
        "plots/x",
        "user",
        "t",
        Box::new(AutoHandler::new()),
        Box::new(Silent),
        Box::new(NoEncryption),
        false,
    )
    .unwrap();
    assert!(matches!(frame.push(), Err(FrameError::MissingUrl(_))));
}
