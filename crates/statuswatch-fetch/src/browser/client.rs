//! CDP WebSocket client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace, warn};

use super::error::CdpError;
use super::protocol::{BrowserVersion, CdpRequest, CdpResponse, PageInfo};
use super::session::PageSession;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<Result<Value, CdpError>>>>>;

/// Upper bound for a single CDP command round trip.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Browser-wide WebSocket connection shared by the client and its page sessions.
pub(crate) struct Connection {
    ws_tx: tokio::sync::Mutex<WsSink>,
    request_id: AtomicU64,
    pending: PendingMap,
    connected: Arc<AtomicBool>,
}

impl Connection {
    /// Send a CDP command and wait for its response.
    pub(crate) async fn call(
        &self,
        method: &str,
        params: Option<Value>,
        session_id: Option<&str>,
    ) -> Result<Value, CdpError> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(CdpError::SessionClosed);
        }

        let id = self.request_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: session_id.map(str::to_string),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP send: {}", json);

        let (tx, rx) = oneshot::channel();
        self.pending.lock().insert(id, tx);
        // Removes the entry on every exit, including the caller dropping this future.
        let _pending = PendingGuard {
            pending: &self.pending,
            id,
        };

        {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await?;
        }

        match tokio::time::timeout(COMMAND_TIMEOUT, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => Err(CdpError::Timeout(format!("Request {} timed out", method))),
        }
    }
}

struct PendingGuard<'a> {
    pending: &'a PendingMap,
    id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.id);
    }
}

/// CDP client attached to one running Chrome instance.
pub struct CdpClient {
    /// HTTP endpoint for tab management.
    http_endpoint: String,
    http: reqwest::Client,
    connection: Arc<Connection>,
    recv_task: tokio::task::JoinHandle<()>,
}

impl CdpClient {
    /// Connect to Chrome at the given endpoint (e.g. `http://127.0.0.1:9222`).
    pub async fn connect(endpoint: &str) -> Result<Self, CdpError> {
        let http_endpoint = endpoint.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(COMMAND_TIMEOUT)
            .build()?;

        let version_url = format!("{}/json/version", http_endpoint);
        debug!("Fetching browser version from {}", version_url);

        let version: BrowserVersion = http
            .get(&version_url)
            .send()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?
            .json()
            .await
            .map_err(|e| CdpError::ChromeNotAvailable(format!("{}: {}", endpoint, e)))?;

        let (ws_stream, _) = tokio_tungstenite::connect_async(&version.web_socket_debugger_url)
            .await
            .map_err(|e| CdpError::ConnectionFailed(format!("WebSocket: {}", e)))?;

        let (ws_sink, ws_source) = ws_stream.split();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));
        let connected = Arc::new(AtomicBool::new(true));

        let recv_task = {
            let pending = pending.clone();
            let connected = connected.clone();
            tokio::spawn(async move {
                Self::receive_loop(ws_source, pending.clone()).await;
                connected.store(false, Ordering::SeqCst);
                // Dropping the senders fails every in-flight call with SessionClosed.
                pending.lock().clear();
            })
        };

        debug!("Connected to browser: {}", version.browser);

        Ok(Self {
            http_endpoint,
            http,
            connection: Arc::new(Connection {
                ws_tx: tokio::sync::Mutex::new(ws_sink),
                request_id: AtomicU64::new(1),
                pending,
                connected,
            }),
            recv_task,
        })
    }

    /// Routes command responses to their callers. Events are not consumed.
    async fn receive_loop(mut ws_source: WsSource, pending: PendingMap) {
        while let Some(msg) = ws_source.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    trace!("CDP recv: {}", text);
                    let resp = match serde_json::from_str::<CdpResponse>(&text) {
                        Ok(resp) => resp,
                        Err(e) => {
                            warn!("Failed to parse CDP message: {}", e);
                            continue;
                        }
                    };
                    let Some(id) = resp.id else { continue };
                    let Some(tx) = pending.lock().remove(&id) else {
                        continue;
                    };
                    let result = match resp.error {
                        Some(error) => Err(CdpError::Protocol {
                            code: error.code,
                            message: error.message,
                        }),
                        None => Ok(resp.result.unwrap_or(Value::Null)),
                    };
                    let _ = tx.send(result);
                }
                Ok(Message::Close(_)) => {
                    debug!("Browser WebSocket closed");
                    break;
                }
                Err(e) => {
                    warn!("Browser WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    }

    /// Whether the browser WebSocket is still open.
    pub fn is_connected(&self) -> bool {
        self.connection.connected.load(Ordering::SeqCst)
    }

    #[cfg(test)]
    pub(crate) fn pending_requests(&self) -> usize {
        self.connection.pending.lock().len()
    }

    /// Send a browser-level CDP command.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.connection.call(method, params, None).await
    }

    /// Open a blank tab and attach a session to it.
    pub async fn new_page(&self) -> Result<PageSession, CdpError> {
        // Chrome requires PUT for /json/new
        let create_url = format!("{}/json/new?about:blank", self.http_endpoint);
        let page_info: PageInfo = self.http.put(&create_url).send().await?.json().await?;
        debug!("Created new {}: {} - {}", page_info.page_type, page_info.id, page_info.url);

        let session = match self.attach(&page_info.id).await {
            Ok(session) => session,
            Err(e) => {
                let _ = self.close_page(&page_info.id).await;
                return Err(e);
            }
        };

        if let Err(e) = session.enable_domains().await {
            let _ = self.close_page(&page_info.id).await;
            return Err(e);
        }

        Ok(session)
    }

    async fn attach(&self, target_id: &str) -> Result<PageSession, CdpError> {
        let result = self
            .call(
                "Target.attachToTarget",
                Some(json!({
                    "targetId": target_id,
                    "flatten": true
                })),
            )
            .await?;

        let session_id = result["sessionId"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing sessionId".to_string()))?
            .to_string();

        Ok(PageSession::new(
            target_id.to_string(),
            session_id,
            self.connection.clone(),
        ))
    }

    /// Close a tab.
    pub async fn close_page(&self, target_id: &str) -> Result<(), CdpError> {
        self.call("Target.closeTarget", Some(json!({"targetId": target_id})))
            .await?;
        debug!("Closed page {}", target_id);
        Ok(())
    }
}

impl Drop for CdpClient {
    fn drop(&mut self) {
        self.recv_task.abort();
    }
}
