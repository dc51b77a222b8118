use std::sync::Arc;

use serde_json::Value;

use crate::error::Result;

/// Endpoint used to validate credentials and stack path before pushing.
pub const ACCESS_ENDPOINT: &str = "stacks/access";

/// Endpoint receiving frame envelopes.
pub const PUSH_ENDPOINT: &str = "stacks/push";

/// Sends a JSON payload to a named endpoint and returns the JSON response.
///
/// One request per call, no retries. Implementations return an error for
/// any non-success answer so callers never have to inspect status codes.
pub trait Protocol: Send + Sync {
    fn send(&self, endpoint: &str, payload: &Value) -> Result<Value>;
}

impl<P: Protocol + ?Sized> Protocol for Box<P> {
    fn send(&self, endpoint: &str, payload: &Value) -> Result<Value> {
        (**self).send(endpoint, payload)
    }
}

impl<P: Protocol + ?Sized> Protocol for Arc<P> {
    fn send(&self, endpoint: &str, payload: &Value) -> Result<Value> {
        (**self).send(endpoint, payload)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;

    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Protocol for Recorder {
        fn send(&self, endpoint: &str, payload: &Value) -> Result<Value> {
            self.calls.lock().unwrap().push(endpoint.to_string());
            Ok(payload.clone())
        }
    }

    #[test]
    fn shared_protocol_forwards_calls() {
        let inner = Arc::new(Recorder {
            calls: Mutex::new(Vec::new()),
        });
        let boxed: Box<dyn Protocol> = Box::new(Arc::clone(&inner));

        let echoed = boxed.send(PUSH_ENDPOINT, &json!({"x": 1})).unwrap();
        assert_eq!(echoed, json!({"x": 1}));
        assert_eq!(inner.calls.lock().unwrap().as_slice(), [PUSH_ENDPOINT]);
    }
}
