//! Loading SMF data from disk

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Gzip stream magic
const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// Read an SMF, decompressing it if it is gzipped
///
/// Compression is detected by a `.gz` extension or, failing that, by the gzip
/// magic at the start of the file.
pub fn read_smf_file(path: &Path) -> io::Result<Vec<u8>> {
    let mut file = File::open(path)?;

    let is_gzip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false);

    if is_gzip {
        return gunzip(file);
    }

    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    if data.starts_with(&GZIP_MAGIC) {
        gunzip(io::Cursor::new(data))
    } else {
        Ok(data)
    }
}

fn gunzip<R: Read>(reader: R) -> io::Result<Vec<u8>> {
    let mut decoder = GzDecoder::new(reader);
    let mut data = Vec::new();
    decoder.read_to_end(&mut data)?;
    Ok(data)
}
