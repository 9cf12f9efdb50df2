//! Integrity verification of a finished download.
//!
//! Two independent signals are produced:
//!
//! - the size on disk compared to the size reported by the server, which
//!   decides whether the download is complete;
//! - the MD5 digest of the file compared to the server's `Content-MD5`,
//!   which is informational and is [`Verdict::Unknown`] when the server sent
//!   no checksum.
//!
//! The checksum may be written as 32 hex digits or as the base64 encoding of
//! the 16 byte digest (RFC 1864).
//!
//! ```rust,no_run
//! use pdl::download::verify::{verify, Verdict};
//! use std::path::Path;
//!
//! let report = verify(Path::new("file.bin"), 1024, None)?;
//! assert_eq!(report.verdict, Verdict::Unknown);
//! # Ok::<(), pdl::Error>(())
//! ```

use crate::error::Result;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Outcome of the checksum comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The local digest equals the server's checksum.
    Match,
    /// The local digest differs from the server's checksum.
    Mismatch,
    /// No usable checksum was provided, integrity cannot be judged.
    Unknown,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Match => "match",
            Verdict::Mismatch => "mismatch",
            Verdict::Unknown => "unknown",
        })
    }
}

/// Supported encodings of an MD5 checksum.
#[derive(Debug, Clone, PartialEq)]
pub enum ChecksumFormat {
    /// 32 hexadecimal characters.
    Hex,
    /// Base64 of the raw 16 byte digest.
    Base64,
}

/// Result of [`verify`].
#[derive(Debug, Clone, PartialEq)]
pub struct Verification {
    /// Size of the file on disk.
    pub local_size: u64,
    /// Whether the local size equals the expected size.
    pub size_matches: bool,
    /// Checksum comparison.
    pub verdict: Verdict,
}

/// Detect how an MD5 checksum is encoded.
///
/// ```
/// use pdl::download::verify::{detect_checksum_format, ChecksumFormat};
///
/// assert_eq!(detect_checksum_format("d41d8cd98f00b204e9800998ecf8427e"), Some(ChecksumFormat::Hex));
/// assert_eq!(detect_checksum_format("1B2M2Y8AsgTpgAmY7PhCfg=="), Some(ChecksumFormat::Base64));
/// assert_eq!(detect_checksum_format("invalid"), None);
/// ```
pub fn detect_checksum_format(checksum: &str) -> Option<ChecksumFormat> {
    if checksum.len() == 32 && checksum.chars().all(|c| c.is_ascii_hexdigit()) {
        Some(ChecksumFormat::Hex)
    } else if matches!(STANDARD.decode(checksum), Ok(bytes) if bytes.len() == 16) {
        Some(ChecksumFormat::Base64)
    } else {
        None
    }
}

/// Compute the MD5 digest of a file.
pub fn file_md5(path: &Path) -> Result<md5::Digest> {
    let mut file = File::open(path)?;
    let mut context = md5::Context::new();
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        context.consume(&buffer[..read]);
    }
    Ok(context.compute())
}

/// Compare a digest to a checksum in either supported encoding.
pub fn checksum_verdict(digest: &md5::Digest, checksum: &str) -> Verdict {
    let matches = match detect_checksum_format(checksum) {
        Some(ChecksumFormat::Hex) => format!("{:x}", digest).eq_ignore_ascii_case(checksum),
        Some(ChecksumFormat::Base64) => {
            matches!(STANDARD.decode(checksum), Ok(bytes) if bytes[..] == digest.0[..])
        }
        None => {
            warn!("Unrecognised checksum format \"{}\"", checksum);
            return Verdict::Unknown;
        }
    };

    if matches {
        Verdict::Match
    } else {
        Verdict::Mismatch
    }
}

/// Verify a downloaded file against the size and checksum reported by the server.
///
/// The digest is only computed when a checksum is available. A missing file
/// counts as size zero.
pub fn verify(path: &Path, expected_size: u64, checksum: Option<&str>) -> Result<Verification> {
    let local_size = match std::fs::metadata(path) {
        Ok(m) => m.len(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
        Err(e) => return Err(e.into()),
    };

    let verdict = match checksum {
        None => Verdict::Unknown,
        Some(_) if !path.exists() => Verdict::Mismatch,
        Some(checksum) => checksum_verdict(&file_md5(path)?, checksum),
    };

    Ok(Verification {
        local_size,
        size_matches: local_size == expected_size,
        verdict,
    })
}
