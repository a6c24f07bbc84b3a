/*
    TQS-TNT
    Copyright (C) 2026 Moroya Sakamoto
*/

//! Serial-number (SNS) blocks.
//!
//! A block lists ten serial numbers `01`..`10` for one aggregation level:
//!
//! ```text
//! <lvl><id>2</id><sn><no>01</no></sn>...<sn><no>10</no></sn></lvl>
//! ```
//!
//! The UTF-8 bytes are zlib-compressed and base64-encoded. The server needs
//! the uncompressed length to size its buffer, so it travels alongside.

use crate::error::TntError;
use crate::tag;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

/// A compressed, encoded serial-number block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialBlock {
    pub level: u32,
    /// base64 of the zlib stream.
    pub payload: String,
    /// Byte length of the uncompressed document.
    pub uncompressed_len: usize,
}

impl SerialBlock {
    /// Generate the block for `level`.
    pub fn for_level(level: u32) -> Result<Self, TntError> {
        let raw = serial_document(level);
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(raw.as_bytes())
            .map_err(TntError::Compression)?;
        let compressed = encoder.finish().map_err(TntError::Compression)?;
        log::debug!(
            "[SerialBlock::for_level] level={} raw={}B compressed={}B",
            level,
            raw.len(),
            compressed.len()
        );
        Ok(Self {
            level,
            payload: STANDARD.encode(compressed),
            uncompressed_len: raw.len(),
        })
    }

    /// The `<sns>` element embedded in order requests.
    pub fn to_xml(&self) -> String {
        format!(
            "<sns compression=\"DEFLATE\" uncompressed-length=\"{}\">{}</sns>",
            self.uncompressed_len, self.payload
        )
    }
}

/// The uncompressed serial document for `level`.
pub fn serial_document(level: u32) -> String {
    let mut doc = format!("<lvl><id>{level}</id>");
    for n in 1..=tag::SERIAL_COUNT {
        doc.push_str(&format!("<sn><no>{n:02}</no></sn>"));
    }
    doc.push_str("</lvl>");
    doc
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::ZlibDecoder;
    use std::io::Read;

    fn decode(block: &SerialBlock) -> String {
        let compressed = STANDARD.decode(&block.payload).unwrap();
        let mut out = String::new();
        ZlibDecoder::new(compressed.as_slice())
            .read_to_string(&mut out)
            .unwrap();
        out
    }

    #[test]
    fn test_document_lists_ten_serials() {
        let doc = serial_document(2);
        assert!(doc.starts_with("<lvl><id>2</id><sn><no>01</no></sn>"));
        assert!(doc.ends_with("<sn><no>10</no></sn></lvl>"));
        assert_eq!(doc.matches("<sn>").count(), 10);
    }

    #[test]
    fn test_block_round_trips_to_document() {
        let block = SerialBlock::for_level(3).unwrap();
        let decoded = decode(&block);
        assert_eq!(decoded, serial_document(3));
        assert_eq!(block.uncompressed_len, decoded.len());
    }

    #[test]
    fn test_serials_numbered_01_to_10() {
        let decoded = decode(&SerialBlock::for_level(1).unwrap());
        let doc = roxmltree::Document::parse(&decoded).unwrap();
        let numbers: Vec<&str> = doc
            .descendants()
            .filter(|n| n.has_tag_name("no"))
            .filter_map(|n| n.text())
            .collect();
        let expected: Vec<String> = (1..=10).map(|n| format!("{n:02}")).collect();
        assert_eq!(numbers, expected);
    }

    #[test]
    fn test_xml_carries_length() {
        let block = SerialBlock::for_level(0).unwrap();
        let xml = block.to_xml();
        assert!(xml.contains(&format!("uncompressed-length=\"{}\"", block.uncompressed_len)));
        assert!(xml.contains(&block.payload));
    }
}
