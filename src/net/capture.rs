/// Capture files: a recorded game-channel session.
///
/// Format: a sequence of frames, each `u32 BE length` followed by that
/// many message bytes. Messages are stored exactly as received.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;

use super::wire::{DecodeError, WireReader, WireWriter};

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture i/o: {0}")]
    Io(#[from] io::Error),

    #[error("capture frame: {0}")]
    Frame(#[from] DecodeError),

    #[error("message of {0} bytes is too large for a capture frame")]
    TooLarge(usize),
}

pub fn parse_capture(data: &[u8]) -> Result<Vec<Vec<u8>>, DecodeError> {
    let mut r = WireReader::new(data);
    let mut frames = Vec::new();
    while r.available() {
        let len = r.read_u32()? as usize;
        frames.push(r.read_bytes(len)?.to_vec());
    }
    Ok(frames)
}

pub fn serialize_capture(messages: &[Vec<u8>]) -> Result<Vec<u8>, CaptureError> {
    let mut w = WireWriter::new();
    for msg in messages {
        let len = u32::try_from(msg.len()).map_err(|_| CaptureError::TooLarge(msg.len()))?;
        w.write_u32(len);
        w.write_bytes(msg);
    }
    Ok(w.into_bytes())
}

pub fn read_capture(path: &Path) -> Result<Vec<Vec<u8>>, CaptureError> {
    let data = fs::read(path)?;
    Ok(parse_capture(&data)?)
}

pub fn write_capture(path: &Path, messages: &[Vec<u8>]) -> Result<(), CaptureError> {
    fs::write(path, serialize_capture(messages)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_survive_serialization() {
        let messages = vec![vec![0, 1, 2], vec![], vec![6; 300]];
        let bytes = serialize_capture(&messages).unwrap();
        assert_eq!(bytes.len(), 3 * 4 + 303);
        assert_eq!(parse_capture(&bytes).unwrap(), messages);
    }

    #[test]
    fn truncated_trailing_frame() {
        let mut bytes = serialize_capture(&[vec![1, 2, 3, 4]]).unwrap();
        bytes.pop();
        assert_eq!(
            parse_capture(&bytes),
            Err(DecodeError::BufferUnderrun { needed: 4, remaining: 3 })
        );
        assert_eq!(
            parse_capture(&[0, 0]),
            Err(DecodeError::BufferUnderrun { needed: 4, remaining: 2 })
        );
    }

    #[test]
    fn frame_length_is_a_big_endian_u32() {
        let bytes = serialize_capture(&[vec![9; 258]]).unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 1, 2]);
        assert_eq!(parse_capture(&[0, 0, 0, 0]).unwrap(), vec![Vec::<u8>::new()]);
    }

    #[test]
    fn file_roundtrip() {
        let path = std::env::temp_dir().join(format!("snakegrid-capture-{}.bin", std::process::id()));
        let messages = vec![vec![4, 0, 9]];
        write_capture(&path, &messages).unwrap();
        let read = read_capture(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(read, messages);
    }
}
