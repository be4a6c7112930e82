//! /status and /reports handlers — read-only ops surface.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use tandem_engine::ReportRecord;

use super::ApiState;

// ── /status ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct StatusResponse {
    pub registered: usize,
    pub queued: usize,
    pub paired: usize,
    pub uptime_secs: u64,
}

pub async fn handle_status(State(state): State<ApiState>) -> Json<StatusResponse> {
    let snapshot = state.engine.snapshot().await;
    Json(StatusResponse {
        registered: snapshot.registered,
        queued: snapshot.queued,
        paired: snapshot.paired,
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
}

// ── /reports ──────────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct ReportsResponse {
    pub count: usize,
    pub reports: Vec<ReportRecord>,
}

pub async fn handle_reports(State(state): State<ApiState>) -> Json<ReportsResponse> {
    let reports = state.reports.all();
    Json(ReportsResponse {
        count: reports.len(),
        reports,
    })
}
