/*!
 * Audio handling for assembled scenes.
 *
 * - `decoder`: compressed provider audio to mono PCM samples
 * - `resample`: rate conversion for clips not produced at the track rate
 * - `track`: the in-progress scene track and its MP3 export
 *
 * Tracks are mono, 16-bit, at `TRACK_SAMPLE_RATE`.
 */

use mp3lame_encoder::{max_required_buffer_size, Bitrate, Builder, FlushNoGap, MonoPcm, Quality};
use std::fmt::Debug;
use std::io::Cursor;
use std::time::Duration;

use crate::errors::FinalizeError;

pub mod decoder;
pub mod resample;
pub mod track;

pub use decoder::decode_clip;
pub use track::AudioTrack;

/// Sample rate of every assembled track
pub const TRACK_SAMPLE_RATE: u32 = 44_100;

/// Silence fed to the MP3 encoder after the last sample
const ENCODER_TAIL_SAMPLES: usize = 3 * 1152;

/// Bitrate assumed when estimating the duration of compressed audio
pub const ASSUMED_BITRATE_KBPS: u32 = 128;

/// Rough duration of compressed audio from its size.
///
/// `bytes * 8 / (kbps * 1000)`, rounded to two decimals. This is an
/// approximation for constant-bitrate audio, not a measured duration.
pub fn estimate_duration_secs(byte_len: usize, bitrate_kbps: u32) -> f64 {
    if bitrate_kbps == 0 {
        return 0.0;
    }
    let secs = (byte_len as f64 * 8.0) / (bitrate_kbps as f64 * 1000.0);
    (secs * 100.0).round() / 100.0
}

/// Number of samples covering `duration` at `sample_rate`
pub fn samples_for(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_nanos() * sample_rate as u128 / 1_000_000_000) as usize
}

/// Playback length of `samples` at `sample_rate`
pub fn duration_of(samples: usize, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    Duration::from_nanos((samples as u128 * 1_000_000_000 / sample_rate as u128) as u64)
}

/// Encode mono 16-bit samples as a 128 kbps MP3 in memory
pub fn encode_mp3(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, FinalizeError> {
    let mut builder = Builder::new()
        .ok_or_else(|| FinalizeError::Encode("failed to allocate the MP3 encoder".to_string()))?;
    builder.set_num_channels(1).map_err(encoder_error)?;
    builder.set_sample_rate(sample_rate).map_err(encoder_error)?;
    builder.set_brate(Bitrate::Kbps128).map_err(encoder_error)?;
    builder.set_quality(Quality::Good).map_err(encoder_error)?;
    let mut encoder = builder.build().map_err(encoder_error)?;

    let tail = [0i16; ENCODER_TAIL_SAMPLES];
    let mut output = Vec::with_capacity(max_required_buffer_size(samples.len() + tail.len()));
    encoder.encode_to_vec(MonoPcm(samples), &mut output).map_err(encoder_error)?;
    // The zero tail pushes the encoder's look-ahead out before the flush
    encoder.encode_to_vec(MonoPcm(&tail[..]), &mut output).map_err(encoder_error)?;
    encoder.flush_to_vec::<FlushNoGap>(&mut output).map_err(encoder_error)?;

    Ok(output)
}

fn encoder_error<E: Debug>(error: E) -> FinalizeError {
    FinalizeError::Encode(format!("{:?}", error))
}

/// Encode mono 16-bit samples as a WAV file in memory
pub fn encode_wav(samples: &[i16], sample_rate: u32) -> Result<Vec<u8>, FinalizeError> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }

    Ok(cursor.into_inner())
}
