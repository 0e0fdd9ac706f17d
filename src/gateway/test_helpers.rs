use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::{HttpRequest, HttpResponse, Transport, TransportError};

/// Transport that replays canned replies and records every request.
pub(crate) struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(replies: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self { replies: Mutex::new(replies.into()), requests: Mutex::new(Vec::new()) })
    }

    pub(crate) fn json(status: u16, body: serde_json::Value) -> Arc<Self> {
        Self::new(vec![Ok(HttpResponse { status, body: body.to_string() })])
    }

    /// One successful envelope per `data` value, in order.
    pub(crate) fn ok_each(data: Vec<serde_json::Value>) -> Arc<Self> {
        Self::new(
            data.into_iter()
                .map(|d| {
                    let body = serde_json::json!({ "code": 0, "message": "ok", "data": d });
                    Ok(HttpResponse { status: 200, body: body.to_string() })
                })
                .collect(),
        )
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Request("no scripted reply".into())))
    }
}
