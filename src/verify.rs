//! Local image verification
//!
//! Hashes a downloaded image and compares it with the SHA-256 listed for
//! the file by the backend.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::config;
use crate::error::VerifyError;
use crate::utils::ProgressTracker;
use crate::{log_debug, log_error, log_info};

const MODULE: &str = "verify";

const BUFFER_SIZE: usize = 1024 * 1024;

/// Result of a completed verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOutcome {
    pub path: PathBuf,
    pub expected: String,
    pub actual: String,
    pub bytes: u64,
}

impl VerifyOutcome {
    pub fn is_match(&self) -> bool {
        self.expected == self.actual
    }
}

/// Normalize an expected hash to lowercase hex, rejecting anything that is
/// not 64 hex characters
pub fn parse_sha256(raw: &str) -> Result<String, VerifyError> {
    let trimmed = raw.trim();
    let bytes = hex::decode(trimmed).map_err(|_| VerifyError::InvalidHash(trimmed.to_string()))?;
    if bytes.len() != 32 {
        return Err(VerifyError::InvalidHash(trimmed.to_string()));
    }
    Ok(hex::encode(bytes))
}

/// Verify `path` against `expected`
pub async fn verify_sha256(path: &Path, expected: &str) -> Result<VerifyOutcome, VerifyError> {
    verify_sha256_cancellable(path, expected, Arc::new(AtomicBool::new(false))).await
}

/// Verify `path` against `expected`; setting `cancel` stops hashing early
pub async fn verify_sha256_cancellable(
    path: &Path,
    expected: &str,
    cancel: Arc<AtomicBool>,
) -> Result<VerifyOutcome, VerifyError> {
    let expected = parse_sha256(expected)?;
    let owned = path.to_path_buf();

    let (actual, bytes) = tokio::task::spawn_blocking(move || calculate_file_sha256(&owned, &cancel))
        .await
        .map_err(|e| VerifyError::Task(e.to_string()))??;

    let outcome = VerifyOutcome {
        path: path.to_path_buf(),
        expected,
        actual,
        bytes,
    };

    if outcome.is_match() {
        log_info!(MODULE, "SHA256 verification PASSED for {}", path.display());
    } else {
        log_error!(
            MODULE,
            "SHA256 verification FAILED! Expected: {}, Got: {}",
            outcome.expected,
            outcome.actual
        );
    }

    Ok(outcome)
}

/// Stream a file through SHA-256, returning the hex digest and byte count
fn calculate_file_sha256(path: &Path, cancel: &AtomicBool) -> Result<(String, u64), VerifyError> {
    let io_error = |source: std::io::Error| VerifyError::Io {
        path: path.display().to_string(),
        source,
    };

    let total = path.metadata().map_err(io_error)?.len();
    log_debug!(MODULE, "Calculating SHA256 of {} ({} bytes)", path.display(), total);

    let mut file = File::open(path).map_err(io_error)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut tracker = ProgressTracker::new(
        "SHA256",
        MODULE,
        total,
        config::logging::VERIFY_LOG_INTERVAL_MB,
    );

    loop {
        if cancel.load(Ordering::SeqCst) {
            log_info!(MODULE, "SHA256 calculation cancelled by user");
            return Err(VerifyError::Cancelled);
        }

        let bytes_read = file.read(&mut buffer).map_err(io_error)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
        tracker.update(bytes_read as u64);
    }

    tracker.finish();
    let hash = hex::encode(hasher.finalize());
    log_debug!(MODULE, "Calculated SHA256: {}", hash);
    Ok((hash, tracker.processed_bytes()))
}
