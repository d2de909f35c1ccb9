//! History Ledger
//!
//! Append-only text log of claim attempts. It is the recovery source of truth:
//! on restart each token's schedule is rebuilt from its most recent success.
//! A crash mid-write can only tear the last line, and readers skip lines they
//! cannot parse.

use chrono::{DateTime, Utc};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info, warn};

use super::claim_line::{format_line, parse_line};
use crate::clock::Clock;
use crate::domain::{ClaimOutcome, ClaimRecord, TokenId};
use crate::error::{KeeperError, Result};

/// File-backed claim history shared by all schedulers
pub struct HistoryLedger {
    path: PathBuf,
    clock: Arc<dyn Clock>,
    /// Serialises appends; holds the timestamp of the last record written here
    last_written: Mutex<Option<DateTime<Utc>>>,
}

impl HistoryLedger {
    /// Open the ledger at `path`. The file is created lazily on first append.
    pub fn open(path: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            path: path.into(),
            clock,
            last_written: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. Storage failures are logged, never returned.
    pub fn append(&self, token_id: TokenId, outcome: ClaimOutcome, detail: &str) {
        if let Err(e) = self.try_append(token_id, outcome, detail) {
            error!(
                "[TokenID: {}] Failed to record {} in {}: {}",
                token_id,
                outcome,
                self.path.display(),
                e
            );
        }
    }

    fn try_append(
        &self,
        token_id: TokenId,
        outcome: ClaimOutcome,
        detail: &str,
    ) -> Result<ClaimRecord> {
        let mut last_written = self
            .last_written
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Records carry the real claim time; recovery depends on it
        let timestamp = self.clock.now();
        if let Some(last) = *last_written {
            if timestamp < last {
                warn!(
                    "[TokenID: {}] Clock stepped back {}ms since the previous claim record",
                    token_id,
                    (last - timestamp).num_milliseconds()
                );
            }
        }

        let record = ClaimRecord {
            timestamp,
            token_id,
            outcome,
            detail: detail.to_string(),
        };
        let mut line = format_line(&record);

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| KeeperError::LedgerWrite(format!("open failed: {}", e)))?;

        // A torn last line from a crash must not swallow this record
        if ends_mid_line(&mut file)? {
            warn!("Claim log {} ends with a partial line", self.path.display());
            line.insert(0, '\n');
        }

        file.write_all(line.as_bytes())
            .map_err(|e| KeeperError::LedgerWrite(format!("write failed: {}", e)))?;

        *last_written = Some(timestamp);
        info!("[TokenID: {}] Recorded {} in claim log", token_id, outcome);
        Ok(record)
    }

    /// Timestamp of the most recent success for `token_id`, if any.
    ///
    /// Missing or unreadable storage reads as "never claimed".
    pub fn last_success(&self, token_id: TokenId) -> Option<DateTime<Utc>> {
        if !self.path.exists() {
            info!(
                "[TokenID: {}] No claim log at {}, treating as first run",
                token_id,
                self.path.display()
            );
            return None;
        }

        let found = self
            .records()
            .into_iter()
            .rev()
            .find(|r| r.token_id == token_id && r.is_success())
            .map(|r| r.timestamp);

        if found.is_none() {
            info!(
                "[TokenID: {}] No successful claim found in claim log",
                token_id
            );
        }
        found
    }

    /// Most recent failure for `token_id`, if any
    pub fn last_failure(&self, token_id: TokenId) -> Option<ClaimRecord> {
        self.records()
            .into_iter()
            .rev()
            .find(|r| r.token_id == token_id && !r.is_success())
    }

    /// All records for one token in write order
    pub fn history(&self, token_id: TokenId) -> Vec<ClaimRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.token_id == token_id)
            .collect()
    }

    /// All parseable records in write order
    pub fn records(&self) -> Vec<ClaimRecord> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("Failed to read claim log {}: {}", self.path.display(), e);
                return Vec::new();
            }
        };

        // Lossy decode so a torn multi-byte sequence only spoils its own line
        let content = String::from_utf8_lossy(&bytes);
        let mut skipped = 0usize;
        let records: Vec<ClaimRecord> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| {
                let parsed = parse_line(line);
                if parsed.is_none() {
                    skipped += 1;
                }
                parsed
            })
            .collect();

        if skipped > 0 {
            debug!(
                "Skipped {} unparseable line(s) in {}",
                skipped,
                self.path.display()
            );
        }
        records
    }
}

fn ends_mid_line(file: &mut File) -> Result<bool> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

impl std::fmt::Debug for HistoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryLedger")
            .field("path", &self.path)
            .finish()
    }
}
