// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only log of window and resource changes
//!
//! One JSON record per line, each tagged with its position in the log. The
//! store replays the log into [`crate::MaterializedState`] at startup and
//! appends to it before every change becomes visible.

use crate::Operation;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("unreadable log record at line {line}: {source}")]
    Corrupt {
        line: usize,
        source: serde_json::Error,
    },
    #[error("cannot encode log record: {0}")]
    Json(#[from] serde_json::Error),
}

/// Open handle on the change log, positioned at its end
pub struct Wal {
    file: File,
    sequence: u64,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct Record {
    seq: u64,
    op: Operation,
}

impl Wal {
    /// Open the log for appending, creating it if needed.
    ///
    /// Numbering resumes after the last record already on disk. A torn
    /// final record is cut off so new records start on a clean line.
    pub fn open(path: &Path) -> Result<Self, WalError> {
        let log = read_log(path)?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if file.metadata()?.len() > log.intact_len {
            file.set_len(log.intact_len)?;
        } else if log.unterminated {
            writeln!(file)?;
        }
        let sequence = log.records.last().map_or(0, |record| record.seq);
        Ok(Self { file, sequence })
    }

    /// Durably record `op`; returns its position in the log
    pub fn append(&mut self, op: &Operation) -> Result<u64, WalError> {
        let seq = self.sequence + 1;
        let record = serde_json::to_string(&Record {
            seq,
            op: op.clone(),
        })?;
        writeln!(self.file, "{}", record)?;
        self.file.sync_all()?;
        self.sequence = seq;
        Ok(seq)
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Every change on disk, oldest first. A missing log is an empty one.
    pub fn replay(path: &Path) -> Result<Vec<Operation>, WalError> {
        Ok(read_log(path)?
            .records
            .into_iter()
            .map(|record| record.op)
            .collect())
    }
}

#[derive(Default)]
struct Log {
    records: Vec<Record>,
    /// Bytes up to the end of the last readable line
    intact_len: u64,
    /// Last readable line has no newline after it
    unterminated: bool,
}

fn read_log(path: &Path) -> Result<Log, WalError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Log::default()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = BufReader::new(file);
    let mut log = Log::default();
    let mut buf = String::new();
    let mut line = 0;
    loop {
        buf.clear();
        let read = reader.read_line(&mut buf)?;
        if read == 0 {
            break;
        }
        line += 1;
        let text = buf.trim();
        if text.is_empty() {
            log.intact_len += read as u64;
            continue;
        }
        match serde_json::from_str::<Record>(text) {
            Ok(record) => {
                log.records.push(record);
                log.intact_len += read as u64;
                log.unterminated = !buf.ends_with('\n');
            }
            // Final line cut short by a crash mid-append; that change never happened
            Err(_) if !buf.ends_with('\n') => {
                tracing::warn!(line, "dropping torn record at end of log");
                break;
            }
            Err(source) => return Err(WalError::Corrupt { line, source }),
        }
    }
    Ok(log)
}

#[cfg(test)]
#[path = "wal_tests.rs"]
mod tests;
