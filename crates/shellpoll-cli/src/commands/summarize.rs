//! `shellpoll summarize`: summary statistics for a saved snapshot.

use std::path::Path;

use shellpoll_core::{SessionSummary, load_snapshot};

pub fn run(snapshot_path: &str) {
    let snapshots = match load_snapshot(Path::new(snapshot_path)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading snapshot {snapshot_path}: {e}");
            std::process::exit(1);
        }
    };

    println!("Snapshot: {snapshot_path}");
    let summary = SessionSummary::from_snapshots(&snapshots);
    if let Err(e) = summary.render(&mut std::io::stdout().lock()) {
        eprintln!("Error printing summary: {e}");
        std::process::exit(1);
    }
}
