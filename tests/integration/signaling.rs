use std::time::Duration;

use anyhow::Result;
use serde_json::json;

use crate::*;

/// Offer, answer, and candidate all flow to the partner verbatim,
/// tagged with the sender's id.
#[tokio::test]
async fn handshake_events_are_relayed() -> Result<()> {
    let (addr, _state) = spawn_server().await?;
    let (mut x, x_partner, mut y, y_partner) = pair(addr).await?;

    x.send(json!({
        "event": "offer",
        "data": {"offer": {"type": "offer", "sdp": "v=0"}, "target": x_partner}
    }))
    .await?;
    let offer = y.recv().await?;
    assert_eq!(offer["event"], "offer");
    assert_eq!(offer["data"]["offer"]["sdp"], "v=0");
    assert_eq!(offer["data"]["sender"], y_partner);

    y.send(json!({
        "event": "answer",
        "data": {"answer": {"type": "answer", "sdp": "v=1"}, "target": y_partner}
    }))
    .await?;
    let answer = x.recv().await?;
    assert_eq!(answer["event"], "answer");
    assert_eq!(answer["data"]["answer"]["sdp"], "v=1");
    assert_eq!(answer["data"]["sender"], x_partner);

    x.send(json!({
        "event": "ice-candidate",
        "data": {"candidate": {"candidate": "cand", "sdpMid": "0"}, "target": x_partner}
    }))
    .await?;
    let candidate = y.recv().await?;
    assert_eq!(candidate["event"], "ice-candidate");
    assert_eq!(candidate["data"]["candidate"]["sdpMid"], "0");
    Ok(())
}

/// A signal aimed at anything but the current partner vanishes without
/// an error frame — probing targets learns nothing.
#[tokio::test]
async fn stale_target_is_silently_dropped() -> Result<()> {
    let (addr, _state) = spawn_server().await?;
    let (mut x, _x_partner, mut y, _y_partner) = pair(addr).await?;

    x.send(json!({
        "event": "offer",
        "data": {"offer": {"sdp": "v=0"}, "target": "not-my-partner"}
    }))
    .await?;

    y.expect_silence(Duration::from_millis(300)).await?;
    x.expect_silence(Duration::from_millis(100)).await?;
    Ok(())
}

/// Signals from an identity that was never paired go nowhere.
#[tokio::test]
async fn unpaired_signal_is_dropped() -> Result<()> {
    let (addr, _state) = spawn_server().await?;

    let mut x = Client::connect(addr).await?;
    x.send(join_request("xena", "Alpha")).await?;
    x.recv().await?; // waiting-for-match

    x.send(json!({
        "event": "offer",
        "data": {"offer": {"sdp": "v=0"}, "target": "anyone"}
    }))
    .await?;
    x.expect_silence(Duration::from_millis(300)).await?;
    Ok(())
}
