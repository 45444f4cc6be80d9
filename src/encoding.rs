use std::io::{self, Write};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::request::Request;

pub const GZIP: &str = "gzip";

/// Whether the client listed gzip in `Accept-Encoding`. A substring match is
/// enough; quality values are not interpreted.
pub fn accepts_gzip(req: &Request) -> bool {
    req.headers()
        .get("Accept-Encoding")
        .map(|v| v.contains(GZIP))
        .unwrap_or(false)
}

pub fn gzip(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
