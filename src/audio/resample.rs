use rubato::{FftFixedIn, Resampler};

use crate::errors::DecodeError;

const CHUNK_FRAMES: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Convert mono samples from `from_rate` to `to_rate`.
///
/// The output holds exactly `len * to_rate / from_rate` samples, aligned with
/// the input (the FFT resampler's delay is trimmed).
pub fn resample_mono(samples: &[i16], from_rate: u32, to_rate: u32) -> Result<Vec<i16>, DecodeError> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(DecodeError::Resample(format!("invalid rate conversion {} -> {} Hz", from_rate, to_rate)));
    }

    let mut resampler = FftFixedIn::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_FRAMES, SUB_CHUNKS, 1)
        .map_err(|e| DecodeError::Resample(e.to_string()))?;

    let input: Vec<f32> = samples.iter().map(|&s| f32::from(s) / 32_768.0).collect();
    let expected = (samples.len() as u64 * u64::from(to_rate) / u64::from(from_rate)) as usize;
    let delay = resampler.output_delay();
    let wanted = delay + expected;
    let mut output: Vec<f32> = Vec::with_capacity(wanted + 2 * CHUNK_FRAMES);

    for chunk in input.chunks(CHUNK_FRAMES) {
        let block = [chunk];
        let frames = if chunk.len() == CHUNK_FRAMES {
            resampler.process(&block[..], None)
        } else {
            resampler.process_partial(Some(&block[..]), None)
        }
        .map_err(|e| DecodeError::Resample(e.to_string()))?;
        append_channel(&mut output, &frames);
    }

    // Drain the delay line with silence
    while output.len() < wanted {
        let frames = resampler
            .process_partial(None::<&[Vec<f32>]>, None)
            .map_err(|e| DecodeError::Resample(e.to_string()))?;
        if !append_channel(&mut output, &frames) {
            break;
        }
    }

    Ok(output
        .into_iter()
        .skip(delay)
        .take(expected)
        .map(|s| (s * 32_768.0).round().clamp(-32_768.0, 32_767.0) as i16)
        .collect())
}

// Returns false when the resampler produced nothing
fn append_channel(output: &mut Vec<f32>, frames: &[Vec<f32>]) -> bool {
    match frames.first() {
        Some(channel) if !channel.is_empty() => {
            output.extend_from_slice(channel);
            true
        }
        _ => false,
    }
}
