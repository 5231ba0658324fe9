//! Recorded inbound sessions, for offline replay and regression tests.
//!
//! On disk a capture is bincode (standard config) compressed with zlib.

use std::{
    fs,
    io::{Read, Write},
    path::Path,
};

use anyhow::Context;
use bincode::{Decode, Encode};
use flate2::{read::ZlibDecoder, write::ZlibEncoder, Compression};

use crate::{network::InboundFrame, protocol::Dialect};

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct SessionCapture {
    pub dialect: Dialect,
    pub frames: Vec<InboundFrame>,
}

impl SessionCapture {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            frames: Vec::new(),
        }
    }

    pub fn push(&mut self, frame: InboundFrame) {
        self.frames.push(frame);
    }

    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        let encoded = bincode::encode_to_vec(self, bincode::config::standard())
            .context("encoding capture")?;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&encoded).context("compressing capture")?;
        encoder.finish().context("compressing capture")
    }

    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let mut decoded = Vec::new();
        ZlibDecoder::new(bytes)
            .read_to_end(&mut decoded)
            .context("decompressing capture")?;
        let (capture, _consumed) =
            bincode::decode_from_slice(&decoded, bincode::config::standard())
                .context("decoding capture")?;
        Ok(capture)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).with_context(|| format!("writing capture {:?}", path))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("reading capture {:?}", path))?;
        Self::from_bytes(&bytes).with_context(|| format!("loading capture {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SessionCapture {
        let mut capture = SessionCapture::new(Dialect::Classic);
        capture.push(InboundFrame::new(0x00f8, vec![]));
        capture.push(InboundFrame::new(0x00aa, vec![26, 0, 0x00, 0x02, 1]));
        capture
    }

    #[test]
    fn bytes_survive_compression() {
        let capture = sample();
        let bytes = capture.to_bytes().unwrap();
        assert_eq!(SessionCapture::from_bytes(&bytes).unwrap(), capture);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(SessionCapture::from_bytes(b"definitely not zlib").is_err());
    }

    #[test]
    fn save_and_load() {
        let path = std::env::temp_dir().join(format!("kitbag-capture-{}.bin", std::process::id()));
        let capture = sample();
        capture.save(&path).unwrap();
        assert_eq!(SessionCapture::load(&path).unwrap(), capture);
        let _ = fs::remove_file(&path);
    }
}
