//! In-process stand-in for Chrome's remote-debugging endpoints.

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub(crate) const PAGE_HTML: &str =
    "<html><head><title>Service Status</title></head><body>All Systems Operational</body></html>";

/// HTTP discovery served by wiremock, commands by a WebSocket task that
/// answers everything except the methods it was told to ignore.
pub(crate) struct FakeChrome {
    http: MockServer,
    ws_task: JoinHandle<()>,
}

impl FakeChrome {
    pub(crate) async fn start(ignored: &'static [&'static str]) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_addr = listener.local_addr().unwrap();
        let ws_task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, ignored));
            }
        });

        let http = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Browser": "HeadlessChrome/120.0.6099.109",
                "webSocketDebuggerUrl": format!("ws://{}/devtools/browser/fake", ws_addr),
            })))
            .mount(&http)
            .await;
        Mock::given(method("PUT"))
            .and(path("/json/new"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "T1",
                "type": "page",
                "url": "about:blank",
            })))
            .mount(&http)
            .await;

        Self { http, ws_task }
    }

    pub(crate) fn endpoint(&self) -> String {
        self.http.uri()
    }
}

impl Drop for FakeChrome {
    fn drop(&mut self) {
        self.ws_task.abort();
    }
}

async fn serve(stream: TcpStream, ignored: &'static [&'static str]) {
    let Ok(ws) = tokio_tungstenite::accept_async(stream).await else {
        return;
    };
    let (mut tx, mut rx) = ws.split();

    while let Some(Ok(Message::Text(text))) = rx.next().await {
        let request: Value = serde_json::from_str(&text).unwrap();
        let cdp_method = request["method"].as_str().unwrap_or_default();
        if ignored.contains(&cdp_method) {
            continue;
        }

        let result = match cdp_method {
            "Target.attachToTarget" => json!({"sessionId": "S1"}),
            "Page.navigate" => json!({"frameId": "F1"}),
            "Runtime.evaluate" => json!({
                "result": {"type": "string", "value": evaluate(&request["params"]["expression"])}
            }),
            _ => json!({}),
        };
        let reply = json!({"id": request["id"], "result": result});
        if tx.send(Message::Text(reply.to_string().into())).await.is_err() {
            return;
        }
    }
}

fn evaluate(expression: &Value) -> &'static str {
    match expression.as_str() {
        Some("document.readyState") => "complete",
        Some("document.title") => "Service Status",
        Some("document.documentElement.outerHTML") => PAGE_HTML,
        _ => "",
    }
}
