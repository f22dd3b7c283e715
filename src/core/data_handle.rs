use axum::extract::ws::{Message, WebSocket};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::core::constants::TIME_COLUMN;
use crate::core::reader::Snapshot;

#[derive(Serialize)]
struct SignalPayload {
    timestamp: f64,
    value: Option<f64>,
    desc: String,
    seq: u64,
    end_flag: bool,
}

/// (Time, value) points of one column; rows without a Time are skipped.
pub fn column_points(snapshot: &Snapshot, column: &str) -> Option<Vec<(f64, Option<f64>)>> {
    let table = snapshot.snapshot();
    let data = &table.column(column)?.data;
    let time = table.time()?;
    Some(
        time.iter()
            .enumerate()
            .filter_map(|(row, t)| t.map(|t| (t, data.get_f64(row))))
            .collect(),
    )
}

pub async fn handle_ws_fetch(
    mut socket: WebSocket,
    snapshot: Arc<RwLock<Snapshot>>,
    column: String,
) {
    info!("ws_fetch streaming started: {}", column);

    // Copy the points out so the snapshot lock is not held across sends
    let (points, desc) = {
        let guard = snapshot.read().await;
        let points = match column_points(&guard, &column) {
            Some(p) => p,
            None => {
                error!("column not found or no numeric Time: {}", column);
                return;
            }
        };
        let desc = guard
            .pid_info()
            .get(&column)
            .map(|d| d.description.clone())
            .unwrap_or_default();
        (points, desc)
    };

    let mut seq: u64 = 0;
    for (timestamp, value) in points {
        let payload = SignalPayload {
            timestamp,
            value,
            desc: desc.clone(),
            seq,
            end_flag: false,
        };

        let json = match serde_json::to_string(&payload) {
            Ok(j) => j,
            Err(e) => {
                error!("json serialize error: {}", e);
                return;
            }
        };

        if let Err(e) = socket.send(Message::Text(json.into())).await {
            warn!("ws send failed: {}", e);
            return;
        }

        seq += 1;
    }

    let end_payload = SignalPayload {
        timestamp: 0.0,
        value: None,
        desc: String::new(),
        seq,
        end_flag: true,
    };

    if let Ok(json) = serde_json::to_string(&end_payload) {
        let _ = socket.send(Message::Text(json.into())).await;
    }

    info!("ws_fetch finished: {} ({} points, time axis '{}')", column, seq, TIME_COLUMN);
}
