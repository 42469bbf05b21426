//! Reading dumps and resolving text encodings.
//!
//! Legacy dumps are frequently exported in a single-byte code page; the
//! `--input-encoding` label is resolved through `encoding_rs` and the whole
//! file is decoded up front. UTF-8 is the default.

use std::{fs, path::Path};

use anyhow::{Result, anyhow};
use encoding_rs::{Encoding, UTF_8};

use crate::error::MigrationError;

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

/// Reads a whole dump file and decodes it.
pub fn read_dump(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| MigrationError::UnreadableFile {
        path: path.to_path_buf(),
        source,
    })?;
    decode_bytes(&bytes, encoding)
}
