/*!
 * Scene assembly: script lines in, one MP3 track out.
 *
 * Each line goes through resolve, synthesize, decode and append, in script
 * order. Any per-line failure is logged, recorded in the report and skipped;
 * only the final encode can fail the run.
 */

use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

use crate::audio::{decode_clip, duration_of, AudioTrack, TRACK_SAMPLE_RATE};
use crate::errors::{FinalizeError, SkipReason};
use crate::providers::SpeechSynthesizer;
use crate::scene::parser::ScriptLine;
use crate::scene::report::{AssemblyReport, LineOutcome};
use crate::voices::VoiceRegistry;

/// Silence before the first line
pub const LEAD_IN: Duration = Duration::from_millis(500);

/// Silence after every synthesized line
pub const LINE_GAP: Duration = Duration::from_millis(300);

/// Result of a completed assembly run
#[derive(Debug)]
pub struct AssembledScene {
    /// Encoded track (MP3)
    pub audio: Vec<u8>,
    /// Per-line outcomes
    pub report: AssemblyReport,
    /// Total track length
    pub duration: Duration,
}

/// Builds scene tracks from parsed script lines
pub struct SceneAssembler {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    concurrent_requests: usize,
    sample_rate: u32,
    progress: Option<ProgressBar>,
}

impl SceneAssembler {
    /// Create an assembler that issues one synthesis call at a time
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            synthesizer,
            concurrent_requests: 1,
            sample_rate: TRACK_SAMPLE_RATE,
            progress: None,
        }
    }

    /// Allow up to `n` synthesis calls in flight; clips are still appended in order
    pub fn concurrent_requests(mut self, n: usize) -> Self {
        self.concurrent_requests = n.max(1);
        self
    }

    /// Set the track sample rate; clips at other rates are resampled
    pub fn sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Advance this bar once per processed line
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Assemble `lines` into one encoded track.
    ///
    /// The track starts with `LEAD_IN`; each line that resolves, synthesizes and
    /// decodes adds its clip followed by `LINE_GAP`. Lines that fail add nothing.
    pub async fn assemble(
        &self,
        lines: Vec<ScriptLine>,
        registry: &VoiceRegistry,
    ) -> Result<AssembledScene, FinalizeError> {
        let (track, report) = self.assemble_track(lines, registry).await;
        let duration = track.duration();
        let audio = track.finalize()?;

        Ok(AssembledScene { audio, report, duration })
    }

    /// Build the unencoded track and its report.
    ///
    /// Lines with no spoken text are skipped without a provider call.
    pub async fn assemble_track(&self, lines: Vec<ScriptLine>, registry: &VoiceRegistry) -> (AudioTrack, AssemblyReport) {
        let mut track = AudioTrack::new(self.sample_rate);
        track.append_silence(LEAD_IN);
        let mut report = AssemblyReport::new();

        debug!("Assembling {} lines with {} request(s) in flight", lines.len(), self.concurrent_requests);

        let fetches = lines.into_iter().map(|line| {
            let voice_id = registry.resolve(&line.character).map(str::to_string);
            let synthesizer = Arc::clone(&self.synthesizer);
            async move {
                let fetched = match voice_id {
                    _ if line.text.is_empty() => Err(SkipReason::EmptyText),
                    None => Err(SkipReason::UnresolvedVoice(line.character.clone())),
                    Some(voice_id) => synthesizer
                        .synthesize(&line.text, &voice_id)
                        .await
                        .map_err(SkipReason::from),
                };
                (line, fetched)
            }
        });

        // `buffered` yields in input order, so appends stay sequential
        let mut fetched_lines = stream::iter(fetches).buffered(self.concurrent_requests);

        while let Some((line, fetched)) = fetched_lines.next().await {
            let decoded = fetched.and_then(|bytes| {
                decode_clip(&bytes, self.sample_rate).map_err(SkipReason::from)
            });

            let outcome = match decoded {
                Ok(samples) => {
                    let duration = duration_of(samples.len(), self.sample_rate);
                    let offset = track.append_clip(samples);
                    track.append_silence(LINE_GAP);
                    info!("{}: {}", line.character, line.text);
                    LineOutcome::Synthesized { offset, duration }
                }
                Err(reason) => {
                    warn!("Skipping line by {}: {}", line.character, reason);
                    LineOutcome::Skipped(reason)
                }
            };

            report.record(line, outcome);
            if let Some(progress) = &self.progress {
                progress.inc(1);
            }
        }

        (track, report)
    }
}
