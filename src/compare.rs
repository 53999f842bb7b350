//! Byte-for-byte file comparison.

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::GoldenError;

const CHUNK: usize = 8 * 1024;

/// Returns true when both files have identical contents.
///
/// Sizes are compared first; equal sizes fall through to a chunked scan.
pub fn files_identical(reference: &Path, scratch: &Path) -> Result<bool, GoldenError> {
    let ref_len = file_len(reference)?;
    let new_len = file_len(scratch)?;
    if ref_len != new_len {
        return Ok(false);
    }
    let mut left = open(reference)?;
    let mut right = open(scratch)?;
    let mut lbuf = [0u8; CHUNK];
    let mut rbuf = [0u8; CHUNK];
    loop {
        let n = read_full(&mut left, &mut lbuf).map_err(|e| compare_err(reference, e))?;
        let m = read_full(&mut right, &mut rbuf).map_err(|e| compare_err(scratch, e))?;
        if n != m || lbuf[..n] != rbuf[..m] {
            return Ok(false);
        }
        if n == 0 {
            return Ok(true);
        }
    }
}

fn file_len(path: &Path) -> Result<u64, GoldenError> {
    fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| compare_err(path, e))
}

fn open(path: &Path) -> Result<BufReader<File>, GoldenError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|e| compare_err(path, e))
}

/// Fills `buf` unless the reader hits end of file first.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn compare_err(path: &Path, source: io::Error) -> GoldenError {
    GoldenError::Compare {
        path: path.to_path_buf(),
        source,
    }
}
