//! Audio format conversion.
//!
//! The whole source is decoded into memory with symphonia and written
//! back out with hound. Sample rate and channel layout are preserved.

use crate::error::{MediaError, Result};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, info};

/// Decoded audio, interleaved f32 samples in [-1, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioData {
    /// Number of sample frames (samples per channel)
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }
}

/// Sample encoding of the written WAV file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WavSampleFormat {
    /// 16-bit signed PCM
    #[default]
    Pcm16,
    /// 32-bit IEEE float
    Float32,
}

/// Options for WAV output
#[derive(Debug, Clone, Copy, Default)]
pub struct WavOptions {
    pub sample_format: WavSampleFormat,
}

/// Decode an audio file. The file extension is used as a probe hint.
pub fn decode_audio_file<P: AsRef<Path>>(path: P) -> Result<AudioData> {
    let path = path.as_ref();
    let file = File::open(path)?;

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    decode_source(Box::new(file), hint)
}

/// Decode an in-memory audio stream, e.g. a synthesized MP3
pub fn decode_audio_bytes(bytes: Vec<u8>, extension: Option<&str>) -> Result<AudioData> {
    let mut hint = Hint::new();
    if let Some(ext) = extension {
        hint.with_extension(ext);
    }
    decode_source(Box::new(Cursor::new(bytes)), hint)
}

fn decode_source(source: Box<dyn MediaSource>, hint: Hint) -> Result<AudioData> {
    let mss = MediaSourceStream::new(source, Default::default());
    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or(MediaError::NoAudioTrack)?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut channels = track.codec_params.channels.map(|c| c.count());

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // Corrupt frames are skipped, the rest of the stream still decodes.
            Err(SymphoniaError::DecodeError(msg)) => {
                debug!("skipping undecodable packet: {}", msg);
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let spec = *decoded.spec();
        sample_rate.get_or_insert(spec.rate);
        channels.get_or_insert(spec.channels.count());

        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(buf.samples());
    }

    let sample_rate = sample_rate.ok_or(MediaError::UnknownSampleRate)?;
    let channels = channels.unwrap_or(1);
    let channels = u16::try_from(channels)
        .ok()
        .filter(|&c| c > 0)
        .ok_or(MediaError::UnsupportedChannels(channels))?;

    debug!(
        "decoded {} samples at {} Hz, {} channel(s)",
        samples.len(),
        sample_rate,
        channels
    );
    Ok(AudioData {
        samples,
        sample_rate,
        channels,
    })
}

/// Write decoded audio as a WAV file
pub fn write_wav<P: AsRef<Path>>(audio: &AudioData, path: P, options: WavOptions) -> Result<()> {
    let (bits_per_sample, sample_format) = match options.sample_format {
        WavSampleFormat::Pcm16 => (16, hound::SampleFormat::Int),
        WavSampleFormat::Float32 => (32, hound::SampleFormat::Float),
    };
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample,
        sample_format,
    };

    let mut writer = hound::WavWriter::create(path.as_ref(), spec)?;
    match options.sample_format {
        WavSampleFormat::Pcm16 => {
            for &sample in &audio.samples {
                writer.write_sample((sample * 32767.0).clamp(-32768.0, 32767.0) as i16)?;
            }
        }
        WavSampleFormat::Float32 => {
            for &sample in &audio.samples {
                writer.write_sample(sample)?;
            }
        }
    }
    writer.finalize()?;
    Ok(())
}

/// Decode `src` and write it to `dst` as WAV.
///
/// Returns the decoded audio so callers can report duration and layout.
pub fn convert_to_wav<P, Q>(src: P, dst: Q, options: WavOptions) -> Result<AudioData>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let audio = decode_audio_file(src.as_ref())?;
    write_wav(&audio, dst.as_ref(), options)?;
    info!(
        "Converted {} -> {} ({:.2}s)",
        src.as_ref().display(),
        dst.as_ref().display(),
        audio.duration_secs()
    );
    Ok(audio)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_tone(path: &Path, sample_rate: u32, channels: u16, frames: usize) {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            let t = i as f32 / sample_rate as f32;
            let s = ((t * 440.0 * std::f32::consts::TAU).sin() * 0.5 * 32767.0) as i16;
            for _ in 0..channels {
                writer.write_sample(s).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn conversion_preserves_layout() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("tone.wav");
        let dst = dir.path().join("out.wav");
        write_tone(&src, 22050, 2, 2205);

        let audio = convert_to_wav(&src, &dst, WavOptions::default()).unwrap();
        assert_eq!(audio.sample_rate, 22050);
        assert_eq!(audio.channels, 2);
        assert_eq!(audio.frames(), 2205);

        let reader = hound::WavReader::open(&dst).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 22050);
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(reader.len(), 2205 * 2);
    }

    #[test]
    fn float_output() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("float.wav");
        let audio = AudioData {
            samples: vec![0.0, 0.5, -0.5, 1.0],
            sample_rate: 8000,
            channels: 1,
        };
        write_wav(
            &audio,
            &dst,
            WavOptions {
                sample_format: WavSampleFormat::Float32,
            },
        )
        .unwrap();

        let mut reader = hound::WavReader::open(&dst).unwrap();
        let back: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(back, audio.samples);
    }

    #[test]
    fn garbage_does_not_decode() {
        let result = decode_audio_bytes(vec![0u8; 64], Some("mp3"));
        assert!(result.is_err());
    }

    #[test]
    fn missing_source_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = convert_to_wav(
            dir.path().join("nope.mp3"),
            dir.path().join("out.wav"),
            WavOptions::default(),
        );
        assert!(matches!(result, Err(MediaError::Io(_))));
    }

    #[test]
    fn duration_from_frames() {
        let audio = AudioData {
            samples: vec![0.0; 16000],
            sample_rate: 8000,
            channels: 2,
        };
        assert_eq!(audio.frames(), 8000);
        assert_eq!(audio.duration_secs(), 1.0);
    }
}
