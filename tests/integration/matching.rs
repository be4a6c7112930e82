use std::time::Duration;

use anyhow::Result;
use serde_json::json;

use crate::*;

/// First joiner waits; second joiner pairs both sides.
#[tokio::test]
async fn two_joins_form_a_pairing() -> Result<()> {
    let (addr, state) = spawn_server().await?;

    let (_x, x_partner, _y, y_partner) = pair(addr).await?;
    assert_ne!(x_partner, y_partner);

    let snap = state.engine.snapshot().await;
    assert_eq!(snap.registered, 2);
    assert_eq!(snap.queued, 0, "queue drains back to empty on match");
    assert_eq!(snap.paired, 2);
    Ok(())
}

/// Partner info is sanitized: defaults applied, email never exposed.
#[tokio::test]
async fn match_found_carries_sanitized_partner_info() -> Result<()> {
    let (addr, _state) = spawn_server().await?;

    let mut x = Client::connect(addr).await?;
    x.send(join_request("xena", "Alpha")).await?;
    x.recv().await?; // waiting-for-match

    let mut y = Client::connect(addr).await?;
    y.send(json!({
        "event": "join-queue",
        "data": {
            "email": "yuri@state.edu",
            "name": "yuri",
            "institution": "Beta",
            "program": "Physics",
            "year": "2027",
        }
    }))
    .await?;

    let x_match = x.recv().await?;
    let info = &x_match["data"]["partnerInfo"];
    assert_eq!(info["name"], "yuri");
    assert_eq!(info["institution"], "Beta");
    assert_eq!(info["program"], "Physics");
    assert_eq!(info["year"], "2027");
    assert!(info.get("email").is_none(), "email must never cross over");

    let y_match = y.recv().await?;
    let info = &y_match["data"]["partnerInfo"];
    assert_eq!(info["name"], "xena");
    assert_eq!(info["program"], "Undeclared");
    assert_eq!(info["year"], "Unknown");
    Ok(())
}

/// The joiner's own filters gate candidates; an incompatible queued user
/// is left alone.
#[tokio::test]
async fn institution_filter_blocks_match() -> Result<()> {
    let (addr, state) = spawn_server().await?;

    let mut y = Client::connect(addr).await?;
    y.send(join_request("yuri", "Beta")).await?;
    let waiting = y.recv().await?;
    assert_eq!(waiting["event"], "waiting-for-match");

    let mut x = Client::connect(addr).await?;
    x.send(json!({
        "event": "join-queue",
        "data": {
            "email": "xena@state.edu",
            "name": "xena",
            "institution": "Alpha",
            "filters": {"sameInstitution": true},
        }
    }))
    .await?;

    let waiting = x.recv().await?;
    assert_eq!(waiting["event"], "waiting-for-match");
    assert_eq!(waiting["data"]["position"], 2);

    // Y hears nothing; both remain queued.
    y.expect_silence(Duration::from_millis(300)).await?;
    let snap = state.engine.snapshot().await;
    assert_eq!(snap.queued, 2);
    assert_eq!(snap.paired, 0);
    Ok(())
}

/// A non-institutional email is refused without touching any state.
#[tokio::test]
async fn bad_email_is_rejected() -> Result<()> {
    let (addr, state) = spawn_server().await?;

    let mut x = Client::connect(addr).await?;
    x.send(json!({
        "event": "join-queue",
        "data": {
            "email": "xena@gmail.com",
            "name": "xena",
            "institution": "Alpha",
        }
    }))
    .await?;

    let rejected = x.recv().await?;
    assert_eq!(rejected["event"], "join-rejected");
    assert!(rejected["data"]["reason"]
        .as_str()
        .unwrap()
        .contains(".edu"));

    let snap = state.engine.snapshot().await;
    assert_eq!(snap.registered, 0);
    assert_eq!(snap.queued, 0);
    Ok(())
}
