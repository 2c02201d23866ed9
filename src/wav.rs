//! # WAV Reader
//!
//! Minimal RIFF/WAVE parsing: locates the `fmt ` and `data` chunks, validates
//! that samples are 16-bit, and decodes the interleaved PCM payload. Other
//! chunk types are skipped without inspection.

use crate::error::{BenchError, BenchResult};
use byteorder::{LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

const RIFF_CHUNK_ID: &[u8; 4] = b"RIFF";
const WAVE_FORMAT_ID: &[u8; 4] = b"WAVE";
const FMT_CHUNK_ID: &[u8; 4] = b"fmt ";
const DATA_CHUNK_ID: &[u8; 4] = b"data";
const HEADER_SIZE: usize = 12;

/// The only bit depth the harness interprets numerically.
pub const SUPPORTED_BITS_PER_SAMPLE: u16 = 16;

/// Format metadata from the `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate_hz: u32,
    pub bits_per_sample: u16,
    pub channel_count: u16,
}

/// A parsed 16-bit PCM WAV file.
#[derive(Debug, Clone, PartialEq)]
pub struct WavFile {
    pub format: AudioFormat,
    /// Samples interleaved by channel.
    pub samples: Vec<i16>,
}

impl WavFile {
    /// Number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.format.channel_count as usize
    }
}

/// Read and fully decode a WAV file.
pub fn read<P: AsRef<Path>>(path: P) -> BenchResult<WavFile> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    parse(path, &bytes)
}

/// Decode a WAV image held in memory. `path` is only used for error reporting.
pub fn parse(path: &Path, data: &[u8]) -> BenchResult<WavFile> {
    if data.len() < HEADER_SIZE {
        return Err(BenchError::format(path, "file too small to be a WAV"));
    }
    if &data[0..4] != RIFF_CHUNK_ID || &data[8..12] != WAVE_FORMAT_ID {
        return Err(BenchError::format(path, "missing RIFF/WAVE signature"));
    }

    let mut cursor = Cursor::new(data);
    cursor.seek(SeekFrom::Start(HEADER_SIZE as u64))?;

    let mut format = None;
    let mut payload: Option<&[u8]> = None;

    while (cursor.position() as usize) + 8 <= data.len() {
        let mut chunk_id = [0u8; 4];
        cursor.read_exact(&mut chunk_id)?;
        let chunk_size = cursor.read_u32::<LittleEndian>()? as usize;
        let start = cursor.position() as usize;
        // Streaming writers leave the size field at its maximum; clamp to what is there.
        let end = start.saturating_add(chunk_size).min(data.len());

        match &chunk_id {
            FMT_CHUNK_ID => {
                if end - start < 16 {
                    return Err(BenchError::format(path, "fmt chunk shorter than 16 bytes"));
                }
                let _format_tag = cursor.read_u16::<LittleEndian>()?;
                let channel_count = cursor.read_u16::<LittleEndian>()?;
                let sample_rate_hz = cursor.read_u32::<LittleEndian>()?;
                cursor.read_u32::<LittleEndian>()?; // byte rate
                cursor.read_u16::<LittleEndian>()?; // block align
                let bits_per_sample = cursor.read_u16::<LittleEndian>()?;
                format = Some(AudioFormat {
                    sample_rate_hz,
                    bits_per_sample,
                    channel_count,
                });
            }
            DATA_CHUNK_ID => payload = Some(&data[start..end]),
            _ => {}
        }

        // Chunks are word aligned.
        let padded = end + (chunk_size % 2);
        cursor.seek(SeekFrom::Start(padded as u64))?;
    }

    let format = format.ok_or_else(|| BenchError::format(path, "missing fmt chunk"))?;
    let payload = payload.ok_or_else(|| BenchError::format(path, "missing data chunk"))?;

    if format.bits_per_sample != SUPPORTED_BITS_PER_SAMPLE {
        return Err(BenchError::UnsupportedFormat {
            path: path.to_path_buf(),
            bits_per_sample: format.bits_per_sample,
        });
    }
    if format.channel_count == 0 || format.sample_rate_hz == 0 {
        return Err(BenchError::format(
            path,
            format!(
                "invalid format: {} channels at {} Hz",
                format.channel_count, format.sample_rate_hz
            ),
        ));
    }

    // A trailing partial frame is dropped.
    let frame_bytes = 2 * format.channel_count as usize;
    let usable = payload.len() - payload.len() % frame_bytes;
    let mut samples = vec![0i16; usable / 2];
    Cursor::new(&payload[..usable]).read_i16_into::<LittleEndian>(&mut samples)?;

    Ok(WavFile { format, samples })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;

    /// Build a RIFF image with the given fmt fields and raw data bytes.
    pub(crate) fn wav_bytes(
        channels: u16,
        sample_rate: u32,
        bits: u16,
        data: Option<&[u8]>,
        extra_chunk: Option<(&[u8; 4], &[u8])>,
    ) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(WAVE_FORMAT_ID);
        if let Some((id, payload)) = extra_chunk {
            body.extend_from_slice(id);
            body.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            body.extend_from_slice(payload);
            if payload.len() % 2 == 1 {
                body.push(0);
            }
        }
        let block_align = channels * (bits / 8).max(1);
        body.extend_from_slice(FMT_CHUNK_ID);
        body.extend_from_slice(&16u32.to_le_bytes());
        body.extend_from_slice(&1u16.to_le_bytes());
        body.extend_from_slice(&channels.to_le_bytes());
        body.extend_from_slice(&sample_rate.to_le_bytes());
        body.extend_from_slice(&(sample_rate * block_align as u32).to_le_bytes());
        body.extend_from_slice(&block_align.to_le_bytes());
        body.extend_from_slice(&bits.to_le_bytes());
        if let Some(data) = data {
            body.extend_from_slice(DATA_CHUNK_ID);
            body.extend_from_slice(&(data.len() as u32).to_le_bytes());
            body.extend_from_slice(data);
        }
        let mut out = Vec::new();
        out.extend_from_slice(RIFF_CHUNK_ID);
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }

    fn pcm(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    #[test]
    fn test_parse_stereo_pcm() {
        let data = pcm(&[1, -1, 32767, -32768]);
        let bytes = wav_bytes(2, 44100, 16, Some(&data), None);
        let wav = parse(&PathBuf::from("stereo.wav"), &bytes).unwrap();

        assert_eq!(
            wav.format,
            AudioFormat {
                sample_rate_hz: 44100,
                bits_per_sample: 16,
                channel_count: 2,
            }
        );
        assert_eq!(wav.samples, vec![1, -1, 32767, -32768]);
        assert_eq!(wav.frame_count(), 2);
    }

    #[test]
    fn test_unknown_chunks_are_skipped() {
        let data = pcm(&[5, 6, 7]);
        let bytes = wav_bytes(1, 8000, 16, Some(&data), Some((b"LIST", b"odd")));
        let wav = parse(&PathBuf::from("list.wav"), &bytes).unwrap();
        assert_eq!(wav.samples, vec![5, 6, 7]);
    }

    #[test]
    fn test_missing_data_chunk_is_format_error() {
        let bytes = wav_bytes(1, 8000, 16, None, None);
        let err = parse(&PathBuf::from("nodata.wav"), &bytes).unwrap_err();
        assert!(matches!(err, BenchError::Format { .. }));
        assert!(err.to_string().contains("data chunk"));
    }

    #[test]
    fn test_eight_bit_is_unsupported() {
        let bytes = wav_bytes(1, 8000, 8, Some(&[128, 129, 130, 131]), None);
        let err = parse(&PathBuf::from("8bit.wav"), &bytes).unwrap_err();
        assert!(matches!(
            err,
            BenchError::UnsupportedFormat {
                bits_per_sample: 8,
                ..
            }
        ));
    }

    #[test]
    fn test_bad_signature() {
        let err = parse(&PathBuf::from("x.wav"), b"RIFX\0\0\0\0WAVEjunk").unwrap_err();
        assert!(matches!(err, BenchError::Format { .. }));
        let err = parse(&PathBuf::from("x.wav"), b"RIFF").unwrap_err();
        assert!(matches!(err, BenchError::Format { .. }));
    }

    #[test]
    fn test_oversized_data_length_is_clamped() {
        let mut bytes = wav_bytes(1, 8000, 16, Some(&pcm(&[1, 2])), None);
        let len = bytes.len();
        // data size field sits right before the 4 payload bytes
        bytes[len - 8..len - 4].copy_from_slice(&u32::MAX.to_le_bytes());
        let wav = parse(&PathBuf::from("stream.wav"), &bytes).unwrap();
        assert_eq!(wav.samples, vec![1, 2]);
    }

    #[test]
    fn test_partial_trailing_frame_is_dropped() {
        let mut data = pcm(&[10, 20, 30]);
        data.push(0x7f);
        let bytes = wav_bytes(2, 8000, 16, Some(&data), None);
        let wav = parse(&PathBuf::from("partial.wav"), &bytes).unwrap();
        assert_eq!(wav.samples, vec![10, 20]);
    }
}
