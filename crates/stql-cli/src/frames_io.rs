//! Reads a perception frame stream from newline-delimited JSON. Frames are
//! read once and never written back; the monitor holds no persisted state
//! of its own beyond the sliding window.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use stql_frames::Frame;

pub fn read_jsonl(path: &Path) -> Result<Vec<Frame>> {
    let file = File::open(path).with_context(|| format!("opening frame file {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut frames = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {} of {}", lineno + 1, path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let frame: Frame = serde_json::from_str(&line)
            .with_context(|| format!("parsing frame at line {} of {}", lineno + 1, path.display()))?;
        frames.push(frame);
    }
    Ok(frames)
}
