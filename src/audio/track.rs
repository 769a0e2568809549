use std::time::Duration;

use crate::audio::{duration_of, encode_mp3, samples_for};
use crate::errors::FinalizeError;

/// One piece of an assembled track
#[derive(Debug, Clone, PartialEq)]
enum Segment {
    /// Digital silence, stored as a sample count
    Silence(usize),
    /// A decoded clip
    Clip(Vec<i16>),
}

impl Segment {
    fn len(&self) -> usize {
        match self {
            Segment::Silence(samples) => *samples,
            Segment::Clip(samples) => samples.len(),
        }
    }
}

/// An in-progress scene track.
///
/// Segments are kept in append order and only flattened when the track is
/// consumed, so it can be exported once.
#[derive(Debug)]
pub struct AudioTrack {
    sample_rate: u32,
    segments: Vec<Segment>,
    total_samples: usize,
}

impl AudioTrack {
    /// Create an empty mono track
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            segments: Vec::new(),
            total_samples: 0,
        }
    }

    /// Append silence of the given length
    pub fn append_silence(&mut self, duration: Duration) {
        let samples = samples_for(duration, self.sample_rate);
        self.push(Segment::Silence(samples));
    }

    /// Append a decoded clip, returning its offset from the start of the track
    pub fn append_clip(&mut self, samples: Vec<i16>) -> Duration {
        let offset = self.duration();
        self.push(Segment::Clip(samples));
        offset
    }

    /// Total number of samples appended so far
    pub fn total_samples(&self) -> usize {
        self.total_samples
    }

    /// Total playback length appended so far
    pub fn duration(&self) -> Duration {
        duration_of(self.total_samples, self.sample_rate)
    }

    /// Flatten every segment in order into one sample buffer
    pub fn into_samples(self) -> Vec<i16> {
        let mut flat = Vec::with_capacity(self.total_samples);
        for segment in self.segments {
            match segment {
                Segment::Silence(samples) => flat.resize(flat.len() + samples, 0),
                Segment::Clip(samples) => flat.extend(samples),
            }
        }
        flat
    }

    /// Flatten the track and encode it as MP3
    pub fn finalize(self) -> Result<Vec<u8>, FinalizeError> {
        let sample_rate = self.sample_rate;
        encode_mp3(&self.into_samples(), sample_rate)
    }

    fn push(&mut self, segment: Segment) {
        self.total_samples += segment.len();
        self.segments.push(segment);
    }
}
