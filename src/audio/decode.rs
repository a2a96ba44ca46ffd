use std::path::Path;

use crate::foundation::error::{TypewaveError, TypewaveResult};

/// Decoded PCM audio.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioPcm {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Interleaved `f32` PCM samples.
    pub interleaved_f32: Vec<f32>,
}

impl AudioPcm {
    /// Number of sample frames (one sample per channel).
    pub fn frames(&self) -> usize {
        match self.channels {
            0 => 0,
            c => self.interleaved_f32.len() / usize::from(c),
        }
    }
}

/// Decode any ffmpeg-readable sound file to stereo interleaved `f32` PCM at `sample_rate`.
pub fn decode_audio_f32_stereo(path: &Path, sample_rate: u32) -> TypewaveResult<AudioPcm> {
    if !path.is_file() {
        return Err(TypewaveError::missing_asset(format!(
            "typing sound '{}' not found",
            path.display()
        )));
    }

    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-f",
            "f32le",
            "-acodec",
            "pcm_f32le",
            "-ac",
            "2",
            "-ar",
            &sample_rate.to_string(),
            "pipe:1",
        ])
        .output()
        .map_err(|e| {
            TypewaveError::encoder_unavailable(format!("failed to run ffmpeg for audio decode: {e}"))
        })?;

    if !out.status.success() {
        let msg = String::from_utf8_lossy(&out.stderr);
        return Err(TypewaveError::missing_asset(format!(
            "ffmpeg audio decode failed for '{}': {}",
            path.display(),
            msg.trim()
        )));
    }

    pcm_from_f32le(&out.stdout, sample_rate)
}

fn pcm_from_f32le(bytes: &[u8], sample_rate: u32) -> TypewaveResult<AudioPcm> {
    if !bytes.len().is_multiple_of(4) {
        return Err(TypewaveError::missing_asset(
            "decoded audio byte length is not aligned to f32 samples",
        ));
    }
    let interleaved_f32 = bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();

    Ok(AudioPcm {
        sample_rate,
        channels: 2,
        interleaved_f32,
    })
}
