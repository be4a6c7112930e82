//! /ws handler — one WebSocket connection per identity.
//!
//! The socket task parses inbound frames into events, runs them through
//! the engine, and pushes the resulting outbound events after the engine
//! op has committed. Delivery failures flag the target as disconnected;
//! its own close frame will finish the teardown.

use std::net::SocketAddr;

use axum::extract::connect_info::ConnectInfo;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use tandem_core::{ClientEvent, ConnId, ServerEvent};
use tandem_engine::{LeaveMode, Outbound, SignalKind};

use super::ApiState;

pub async fn handle_ws(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<ApiState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection_loop(socket, state, addr))
}

async fn connection_loop(socket: WebSocket, state: ApiState, addr: SocketAddr) {
    let id = ConnId::generate();
    tracing::info!(conn = id.short(), %addr, "client connected");

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    state.connections.insert(id.clone(), tx);

    // Writer task: drains the outbound channel so a slow socket never
    // blocks the task that produced the event. Exits when the channel
    // closes at teardown.
    let writer = {
        let id = id.clone();
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::warn!(conn = id.short(), error = %e, "event serialization failed");
                        continue;
                    }
                };
                if sink.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        })
    };

    while let Some(frame) = stream.next().await {
        let msg = match frame {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(conn = id.short(), error = %e, "socket error");
                break;
            }
        };
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientEvent>(text.as_str()) {
                Ok(event) => dispatch(&state, &id, addr, event).await,
                Err(e) => {
                    tracing::debug!(conn = id.short(), error = %e, "unparseable frame dropped");
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // Teardown: channel out first so no further events are queued, then
    // let the engine notify the partner and forget the identity.
    state.connections.remove(&id);
    let out = state.engine.leave(&id, LeaveMode::Disconnect).await;
    push_all(&state, out).await;
    let _ = writer.await;
    tracing::info!(conn = id.short(), "client disconnected");
}

async fn dispatch(state: &ApiState, id: &ConnId, addr: SocketAddr, event: ClientEvent) {
    let out = match event {
        ClientEvent::JoinQueue(req) => state.engine.join_queue(id, req, Some(addr)).await,
        ClientEvent::Offer { offer, target } => {
            state
                .engine
                .forward_signal(id, SignalKind::Offer, offer, &target)
                .await
        }
        ClientEvent::Answer { answer, target } => {
            state
                .engine
                .forward_signal(id, SignalKind::Answer, answer, &target)
                .await
        }
        ClientEvent::IceCandidate { candidate, target } => {
            state
                .engine
                .forward_signal(id, SignalKind::IceCandidate, candidate, &target)
                .await
        }
        ClientEvent::ChatMessage { message } => state.engine.forward_chat(id, &message).await,
        ClientEvent::NextConnection => state.engine.leave(id, LeaveMode::Next).await,
        ClientEvent::ReportUser(payload) => {
            let reported = state.engine.partner_of(id).await;
            state.reports.add(
                id.to_string(),
                reported.map(|p| p.to_string()),
                payload,
            );
            tracing::info!(conn = id.short(), "report stored");
            Vec::new()
        }
    };
    push_all(state, out).await;
}

/// Deliver outbound events. A dead channel marks the target disconnected
/// so the waiting queue skips it until its close frame is processed.
async fn push_all(state: &ApiState, events: Vec<Outbound>) {
    for Outbound { to, event } in events {
        let delivered = state
            .connections
            .get(&to)
            .map(|tx| tx.send(event).is_ok())
            .unwrap_or(false);
        if !delivered {
            tracing::debug!(conn = to.short(), "push to dead connection dropped");
            state.engine.set_connected(&to, false).await;
        }
    }
}
