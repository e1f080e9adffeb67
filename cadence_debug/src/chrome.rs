// Copyright 2026 the Cadence Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chrome Trace Event Format exporter.
//!
//! [`export`] writes recorded events as [Chrome Trace Event Format][spec]
//! JSON, suitable for loading into `chrome://tracing` or
//! [Perfetto](https://ui.perfetto.dev/).
//!
//! Scheduler events carry no wall-clock timestamps of their own, so the
//! exporter spaces them one microsecond apart in decision order: the
//! resulting trace visualizes *ordering* per monitor (`pid` rows), not
//! durations. Events that do carry times (vblank arming) expose them in
//! `args`.
//!
//! [spec]: https://docs.google.com/document/d/1CvAClvFfyA5R-PhYUmn5OOQtYMH4h6I0nSsKchNAySU

use std::io::{self, Write};

use serde_json::{Value, json};

use crate::recorder::RecordedEvent;

/// Exports recorded events as Chrome Trace Event Format JSON.
pub fn export(events: &[RecordedEvent], writer: &mut dyn Write) -> io::Result<()> {
    let mut out: Vec<Value> = Vec::with_capacity(events.len());

    for (index, event) in events.iter().enumerate() {
        let ts = index as u64;
        let pid = event.monitor().0;
        out.push(match event {
            RecordedEvent::Registered { mode, .. } => instant(
                "Registered",
                ts,
                pid,
                json!({ "mode": format!("{mode:?}") }),
            ),
            RecordedEvent::DuplicateRegister { .. } => {
                instant("DuplicateRegister", ts, pid, json!({ "warn": true }))
            }
            RecordedEvent::Unregistered { .. } => instant("Unregistered", ts, pid, json!({})),
            RecordedEvent::FrameDeferred { .. } => instant("FrameDeferred", ts, pid, json!({})),
            RecordedEvent::RenderSkipped { reason, .. } => instant(
                "RenderSkipped",
                ts,
                pid,
                json!({ "reason": format!("{reason:?}") }),
            ),
            RecordedEvent::Render { torn, fenced, .. } => instant(
                "Render",
                ts,
                pid,
                json!({ "torn": torn, "fenced": fenced }),
            ),
            RecordedEvent::VblankArmed {
                deadline, delay, ..
            } => instant(
                "VblankArmed",
                ts,
                pid,
                json!({
                    "deadline_us": deadline.ticks() / 1_000,
                    "delay_us": delay.ticks() / 1_000,
                }),
            ),
            RecordedEvent::FrameDelayed { .. } => instant("FrameDelayed", ts, pid, json!({})),
            RecordedEvent::CatchupRender { .. } => instant("CatchupRender", ts, pid, json!({})),
            RecordedEvent::Anomaly { anomaly, .. } => instant(
                "Anomaly",
                ts,
                pid,
                json!({ "warn": true, "kind": format!("{anomaly:?}") }),
            ),
        });
    }

    serde_json::to_writer(writer, &Value::Array(out)).map_err(io::Error::other)
}

fn instant(name: &str, ts: u64, pid: u32, args: Value) -> Value {
    json!({
        "ph": "i",
        "name": name,
        "cat": "Scheduler",
        "ts": ts,
        "pid": pid,
        "tid": 0,
        "s": "g",
        "args": args,
    })
}
