//! Tandem integration test harness.
//!
//! Each test spins up a real server on an ephemeral port and drives it
//! with WebSocket clients, asserting on the JSON frames pushed back.
//! The shared `ApiState` is kept so tests can also assert on engine
//! snapshots and the report store directly.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use tandem_api::{new_connection_map, ApiState};
use tandem_core::config::TandemConfig;
use tandem_engine::{Engine, ReportStore};

mod matching;
mod signaling;

// ── Harness ───────────────────────────────────────────────────────────────────

/// Spawn a server on an ephemeral port. Returns its address and the
/// shared state for direct assertions.
pub async fn spawn_server() -> Result<(SocketAddr, ApiState)> {
    let config = TandemConfig::default();
    let state = ApiState {
        engine: Engine::new(&config),
        connections: new_connection_map(),
        reports: ReportStore::new(),
        started_at: Instant::now(),
    };
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(tandem_api::serve_on(state.clone(), listener));
    Ok((addr, state))
}

/// One WebSocket client talking to the server under test.
pub struct Client {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl Client {
    pub async fn connect(addr: SocketAddr) -> Result<Self> {
        let (ws, _) = connect_async(format!("ws://{addr}/ws"))
            .await
            .context("websocket connect failed")?;
        Ok(Self { ws })
    }

    pub async fn send(&mut self, event: Value) -> Result<()> {
        self.ws.send(Message::text(event.to_string())).await?;
        Ok(())
    }

    /// Next JSON frame, or error after 2 seconds.
    pub async fn recv(&mut self) -> Result<Value> {
        loop {
            let frame = tokio::time::timeout(Duration::from_secs(2), self.ws.next())
                .await
                .context("timed out waiting for a frame")?;
            match frame {
                Some(Ok(msg)) if msg.is_text() => {
                    return Ok(serde_json::from_str(msg.to_text()?)?);
                }
                Some(Ok(_)) => continue,
                Some(Err(e)) => bail!("socket error: {e}"),
                None => bail!("socket closed"),
            }
        }
    }

    /// Assert that no text frame arrives within `quiet`.
    pub async fn expect_silence(&mut self, quiet: Duration) -> Result<()> {
        let deadline = tokio::time::Instant::now() + quiet;
        loop {
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return Ok(());
            }
            match tokio::time::timeout(remaining, self.ws.next()).await {
                Err(_) => return Ok(()),
                Ok(Some(Ok(msg))) if msg.is_text() => {
                    bail!("unexpected frame: {}", msg.to_text()?)
                }
                Ok(Some(Ok(_))) => continue,
                Ok(Some(Err(e))) => bail!("socket error: {e}"),
                Ok(None) => bail!("socket closed while expecting silence"),
            }
        }
    }

    pub async fn close(mut self) -> Result<()> {
        self.ws.close(None).await?;
        Ok(())
    }
}

// ── Fixtures ──────────────────────────────────────────────────────────────────

pub fn join_request(name: &str, institution: &str) -> Value {
    json!({
        "event": "join-queue",
        "data": {
            "email": format!("{name}@state.edu"),
            "name": name,
            "institution": institution,
        }
    })
}

/// Connect two clients and pair them. Returns each client along with its
/// partner's connection id (from its own `match-found`).
pub async fn pair(addr: SocketAddr) -> Result<(Client, String, Client, String)> {
    let mut x = Client::connect(addr).await?;
    x.send(join_request("xena", "Alpha")).await?;
    let waiting = x.recv().await?;
    assert_eq!(waiting["event"], "waiting-for-match");
    assert_eq!(waiting["data"]["position"], 1);

    let mut y = Client::connect(addr).await?;
    y.send(join_request("yuri", "Beta")).await?;

    let x_match = x.recv().await?;
    let y_match = y.recv().await?;
    assert_eq!(x_match["event"], "match-found");
    assert_eq!(y_match["event"], "match-found");

    let x_partner = x_match["data"]["partnerId"]
        .as_str()
        .context("missing partnerId")?
        .to_string();
    let y_partner = y_match["data"]["partnerId"]
        .as_str()
        .context("missing partnerId")?
        .to_string();
    assert_ne!(
        x_partner, y_partner,
        "the two sides must be distinct identities"
    );

    Ok((x, x_partner, y, y_partner))
}

/// Poll until `check` passes or ~2 seconds elapse.
pub async fn eventually<F, Fut>(mut check: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    for _ in 0..40 {
        if check().await {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    bail!("condition not reached in time")
}

// ── Smoke test ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn server_accepts_and_releases_connections() -> Result<()> {
    let (addr, state) = spawn_server().await?;

    let client = Client::connect(addr).await?;
    client.close().await?;

    // A connection that never joined leaves no trace behind.
    eventually(|| async {
        let snap = state.engine.snapshot().await;
        snap.registered == 0 && snap.queued == 0
    })
    .await
}
