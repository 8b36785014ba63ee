//! Human-facing progress rendering and formatting helpers.

use std::io::{IsTerminal, Write};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rget_core::progress::{sample_eta, sample_rate, ProgressSink, ProgressTime, ProgressTotal};

/// Bytes as a base-1024 figure with a one-letter unit, e.g. `1.21M`.
pub fn human_bytes(size: f64) -> String {
    const BASE: f64 = 1024.0;
    const NAMES: [&str; 5] = ["B", "K", "M", "G", "T"];
    let mut based = size;
    let mut i = 0;
    while based > BASE && i < NAMES.len() - 1 {
        based /= BASE;
        i += 1;
    }
    format!("{:.2}{}", based, NAMES[i])
}

/// Duration as `h:mm:ss`; `-:--:--` when unknown.
pub fn human_duration(duration: Option<Duration>) -> String {
    let Some(duration) = duration else {
        return "-:--:--".to_string();
    };
    let total_secs = duration.as_secs_f64().round() as u64;
    let (minutes, s) = (total_secs / 60, total_secs % 60);
    let (h, m) = (minutes / 60, minutes % 60);
    format!("{}:{:02}:{:02}", h, m, s)
}

fn sample_line(time: &ProgressTime, total: &ProgressTotal) -> String {
    let elapsed = human_duration(Some(time.duration));
    let percent = format!("{:.2}%", total.fraction() * 100.0);
    let amount = format!(
        "{} ({}) / {} ({})",
        human_bytes(total.current as f64),
        total.current,
        human_bytes(total.total as f64),
        total.total
    );
    let rate = format!(
        "{}/s",
        human_bytes(sample_rate(time, total).unwrap_or(0.0))
    );
    let eta = human_duration(sample_eta(time, total));
    [elapsed, percent, amount, rate, eta].join("  ")
}

fn interactive() -> bool {
    std::io::stdout().is_terminal()
}

/// Progress sink for one transfer: overwrite-in-place on a terminal, one line
/// per sample otherwise. Pads to the longest line seen so a shrinking message
/// leaves no stale tail.
pub fn progress_sink() -> ProgressSink {
    let longest = Mutex::new(0usize);
    Arc::new(move |time: &ProgressTime, total: &ProgressTotal| {
        let message = sample_line(time, total);
        let mut longest = longest.lock().unwrap();
        *longest = (*longest).max(message.len());
        let padded = format!("{:<width$}", message, width = *longest);

        if interactive() {
            let mut out = std::io::stdout().lock();
            let _ = write!(out, "\r{padded}\r");
            let _ = out.flush();
        } else {
            println!("{padded}");
        }
    })
}

/// Moves past the in-place progress line once a transfer ends.
pub fn progress_done() {
    if interactive() {
        println!();
    }
}
