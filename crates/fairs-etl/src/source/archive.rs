//! Zip extraction and text decoding

use std::io::{Cursor, Read};
use tracing::debug;

use crate::error::{EtlError, Result};

/// Return the bytes of the entry whose base name is `file_name`, at any
/// directory depth. The first match in archive order wins.
pub fn extract_file(data: &[u8], file_name: &str) -> Result<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data))
        .map_err(|e| EtlError::archive(format!("Failed to read zip archive: {}", e)))?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if entry.is_dir() {
            continue;
        }

        let name = entry.name().to_string();
        let base_name = name.rsplit(['/', '\\']).next().unwrap_or(&name);
        if base_name != file_name {
            continue;
        }

        let mut contents = Vec::new();
        entry
            .read_to_end(&mut contents)
            .map_err(|e| EtlError::archive(format!("Failed to read zip entry {}: {}", name, e)))?;
        debug!("Extracted {} ({} bytes)", name, contents.len());
        return Ok(contents);
    }

    Err(EtlError::archive(format!("File not found in archive: {}", file_name)))
}

/// UTF-8 when valid, otherwise ISO-8859-1 (decoded as its windows-1252
/// superset, as browsers do)
pub fn decode_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            debug!("Content is not UTF-8, decoding as ISO-8859-1");
            let (text, _, _) = encoding_rs::WINDOWS_1252.decode(e.as_bytes());
            text.into_owned()
        },
    }
}
