use std::path::{Path, PathBuf};

use crate::audio::decode::{AudioPcm, decode_audio_f32_stereo};
use crate::encode::sink::AudioInputConfig;
use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{TypewaveError, TypewaveResult};

/// Sample rate of the mixed typing track.
pub const TRACK_SAMPLE_RATE: u32 = 48_000;

/// Convert a frame delta to the nearest sample index at `sample_rate`.
pub(crate) fn frame_to_sample(frame_delta: u64, fps: Fps, sample_rate: u32) -> u64 {
    let num = u128::from(frame_delta) * u128::from(sample_rate) * u128::from(fps.den);
    let den = u128::from(fps.num);
    ((num + (den / 2)) / den) as u64
}

/// Lay one copy of `clip` at every cue frame into a stereo track `total_frames` long.
///
/// Overlapping copies add up; the result is clamped to `[-1, 1]`. Copies running past the end
/// of the clip are cut.
pub fn mix_cues(clip: &AudioPcm, cues: &[FrameIndex], fps: Fps, total_frames: u64) -> Vec<f32> {
    let sample_rate = clip.sample_rate;
    let total_samples = frame_to_sample(total_frames, fps, sample_rate) as usize;
    let mut out = vec![0.0f32; total_samples * 2];

    let src_channels = usize::from(clip.channels);
    let src_frames = clip.frames();
    if src_frames == 0 {
        return out;
    }

    for cue in cues {
        let start = frame_to_sample(cue.0, fps, sample_rate) as usize;
        for i in 0..src_frames {
            let dst = start + i;
            if dst >= total_samples {
                break;
            }
            let si = i * src_channels;
            let l = clip.interleaved_f32[si];
            let r = if src_channels > 1 {
                clip.interleaved_f32[si + 1]
            } else {
                l
            };
            out[dst * 2] += l;
            out[dst * 2 + 1] += r;
        }
    }

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    out
}

/// Write interleaved `f32` PCM samples to a raw little-endian `.f32le` file.
pub(crate) fn write_mix_to_f32le_file(
    samples_interleaved: &[f32],
    out_path: &Path,
) -> TypewaveResult<()> {
    let mut bytes = Vec::<u8>::with_capacity(samples_interleaved.len() * 4);
    for &sample in samples_interleaved {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        TypewaveError::encode(format!(
            "failed to write typing track '{}': {e}",
            out_path.display()
        ))
    })
}

/// Mixed typing-sound track on disk; the file is removed when this value drops.
#[derive(Debug)]
pub struct TypingTrack {
    path: PathBuf,
    sample_rate: u32,
}

impl TypingTrack {
    /// Decode `sound`, mix it at every cue and write the result to a temporary file.
    pub fn prepare(
        sound: &Path,
        cues: &[FrameIndex],
        fps: Fps,
        total_frames: u64,
    ) -> TypewaveResult<Self> {
        let clip = decode_audio_f32_stereo(sound, TRACK_SAMPLE_RATE)?;
        let mixed = mix_cues(&clip, cues, fps, total_frames);

        let path = std::env::temp_dir().join(format!(
            "typewave_typing_{}_{}.f32le",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0)
        ));
        // Owned before writing so a failed write still cleans up.
        let track = Self {
            path,
            sample_rate: TRACK_SAMPLE_RATE,
        };
        write_mix_to_f32le_file(&mixed, &track.path)?;
        tracing::debug!(
            cues = cues.len(),
            samples = mixed.len() / 2,
            path = %track.path.display(),
            "typing track mixed"
        );
        Ok(track)
    }

    /// Sink-side description of the track.
    pub fn audio_input(&self) -> AudioInputConfig {
        AudioInputConfig {
            path: self.path.clone(),
            sample_rate: self.sample_rate,
            channels: 2,
        }
    }
}

impl Drop for TypingTrack {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/cues.rs"]
mod tests;
