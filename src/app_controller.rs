use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::providers::elevenlabs::ElevenLabs;
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::stability::{ImageRequest, Stability};
use crate::providers::SpeechSynthesizer;
use crate::scene::{parse_script, split_visual_and_dialogue, AssemblyReport, SceneAssembler, ScriptLine};
use crate::voices::VoiceRegistry;

// @module: Application controller for scene workflows

/// Default file name for an assembled scene
pub const DEFAULT_SCENE_OUTPUT: &str = "scene_output.mp3";

/// Default file name for a generated image
pub const DEFAULT_IMAGE_OUTPUT: &str = "scene_image.png";

/// File names written by the movie workflow
pub const MOVIE_SCRIPT_FILE: &str = "script.md";
pub const MOVIE_INSTRUCTIONS_FILE: &str = "video_assembly_instructions.txt";

/// Speaker used when a drafted script has no parseable dialogue
pub const NARRATOR: &str = "NARRATOR";

/// Instruction used to pull an image prompt out of a script
const EXTRACTION_PROMPT: &str = "Extract from the script: 1) A detailed visual description for image generation (max 100 words), 2) The main dialogue text (max 200 words). Return in format: VISUAL: [description] DIALOGUE: [dialogue]";

/// Outcome of a clip export run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ClipSummary {
    /// Files written, in script order
    pub written: Vec<PathBuf>,
    /// Lines that produced no file
    pub skipped: usize,
}

/// Outcome of a folder run
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Files produced by a movie run
#[derive(Debug)]
pub struct MovieArtifacts {
    pub script: PathBuf,
    pub image: PathBuf,
    pub audio: PathBuf,
    pub instructions: PathBuf,
    pub report: AssemblyReport,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Speech provider override, built from config when absent
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            config,
            synthesizer: None,
        })
    }

    /// Use this speech provider instead of the configured one
    pub fn with_synthesizer(mut self, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    fn synthesizer(&self) -> Result<Arc<dyn SpeechSynthesizer>> {
        if let Some(synthesizer) = &self.synthesizer {
            return Ok(Arc::clone(synthesizer));
        }
        let client = ElevenLabs::from_config(&self.config.speech)
            .context("Failed to create speech provider")?;
        Ok(Arc::new(client))
    }

    /// Parse a script file
    pub fn run_parse(&self, script: &Path) -> Result<Vec<ScriptLine>> {
        let content = FileManager::read_to_string(script)?;
        let lines = parse_script(&content);
        debug!("Parsed {} dialogue lines from {:?}", lines.len(), script);
        Ok(lines)
    }

    /// Assemble one script into one track.
    ///
    /// Returns `None` when the output exists and `force_overwrite` is off.
    /// Only encoding and writing the output are fatal.
    pub async fn run_scene(&self, script: &Path, output: &Path, force_overwrite: bool) -> Result<Option<AssemblyReport>> {
        let start_time = Instant::now();

        if !script.is_file() {
            return Err(anyhow!("Script file does not exist: {:?}", script));
        }
        if output.exists() && !force_overwrite {
            warn!("Skipping {:?}, output already exists (use -f to force overwrite)", script);
            return Ok(None);
        }

        let lines = self.run_parse(script)?;
        if lines.is_empty() {
            warn!("No dialogue lines found in {:?}", script);
        }
        info!("Assembling {} lines from {:?}", lines.len(), script);

        let report = self.assemble_to(lines, &self.registry(), output).await?;
        debug!("Scene built in {}", Self::format_duration(start_time.elapsed()));
        Ok(Some(report))
    }

    // Assemble `lines` and write the encoded track to `output`
    async fn assemble_to(&self, lines: Vec<ScriptLine>, registry: &VoiceRegistry, output: &Path) -> Result<AssemblyReport> {
        let progress = Self::progress_bar(lines.len(), "lines");
        let assembler = SceneAssembler::new(self.synthesizer()?)
            .concurrent_requests(self.config.speech.concurrent_requests)
            .with_progress(progress.clone());

        let scene = assembler
            .assemble(lines, registry)
            .await
            .context("Failed to encode the scene track")?;
        progress.finish_and_clear();

        FileManager::write_bytes(output, &scene.audio)?;
        info!("Success: {} ({} of audio)", output.display(), Self::format_duration(scene.duration));

        Ok(scene.report)
    }

    fn registry(&self) -> VoiceRegistry {
        let registry = self.config.voice_registry();
        if registry.is_empty() {
            warn!("No character voices configured; every line will be skipped");
        }
        registry
    }

    /// Assemble every script below `input_dir`, writing `<stem>.mp3` next to each
    pub async fn run_scene_folder(&self, input_dir: &Path, force_overwrite: bool) -> Result<FolderSummary> {
        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }

        let scripts = FileManager::find_script_files(input_dir)?;
        if scripts.is_empty() {
            return Err(anyhow!("No script files found in directory: {:?}", input_dir));
        }

        let mut summary = FolderSummary::default();
        for script in &scripts {
            let output_dir = script.parent().unwrap_or(input_dir);
            let output = FileManager::generate_output_path(script, output_dir, "mp3");

            match self.run_scene(script, &output, force_overwrite).await {
                Ok(Some(report)) => {
                    println!("{}: {}", script.display(), report);
                    summary.processed += 1;
                }
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing {:?}: {:#}", script, e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Folder processing completed: {} processed, {} skipped, {} errors",
            summary.processed, summary.skipped, summary.failed
        );
        Ok(summary)
    }

    /// Synthesize each line to its own file in `output_dir`
    pub async fn run_clips(&self, script: &Path, output_dir: &Path) -> Result<ClipSummary> {
        let lines = self.run_parse(script)?;
        FileManager::ensure_dir(output_dir)?;

        let synthesizer = self.synthesizer()?;
        let registry = self.registry();
        let extension = Self::clip_extension(synthesizer.output_format());
        let progress = Self::progress_bar(lines.len(), "clips");

        let mut summary = ClipSummary::default();
        for (index, line) in lines.iter().enumerate() {
            progress.inc(1);

            if line.text.is_empty() {
                warn!("Skipping line {} by {}: line has no spoken text", index + 1, line.character);
                summary.skipped += 1;
                continue;
            }

            let Some(voice_id) = registry.resolve(&line.character) else {
                warn!("Skipping line {} by {}: no voice assigned", index + 1, line.character);
                summary.skipped += 1;
                continue;
            };

            match synthesizer.synthesize(&line.text, voice_id).await {
                Ok(audio) => {
                    let path = output_dir.join(FileManager::clip_file_name(&line.character, index + 1, extension));
                    FileManager::write_bytes(&path, &audio)?;
                    debug!("Wrote {:?}", path);
                    summary.written.push(path);
                }
                Err(e) => {
                    warn!("Skipping line {} by {}: {}", index + 1, line.character, e);
                    summary.skipped += 1;
                }
            }
        }
        progress.finish_and_clear();

        info!("Wrote {} clips to {:?}, {} skipped", summary.written.len(), output_dir, summary.skipped);
        Ok(summary)
    }

    /// Draft a screenplay for `storyline` and write it to `output`
    pub async fn run_write(&self, storyline: &str, output: &Path) -> Result<String> {
        let screenwriter = &self.config.screenwriter;
        let client = OpenAI::new(
            &screenwriter.api_key,
            &screenwriter.endpoint,
            Duration::from_secs(screenwriter.timeout_secs),
        )?;

        info!("Drafting script with {}", screenwriter.model);
        let request = OpenAIRequest::new(&screenwriter.model)
            .add_message("system", &screenwriter.system_prompt)
            .add_message("user", format!("Storyline: {}", storyline));
        let response = client.complete(request).await?;
        if let Some(usage) = &response.usage {
            debug!("Token usage: {} prompt, {} completion", usage.prompt_tokens, usage.completion_tokens);
        }

        let script = OpenAI::extract_text(&response);
        if script.trim().is_empty() {
            return Err(anyhow!("Language model returned an empty script"));
        }

        let line_count = parse_script(&script).len();
        if line_count == 0 {
            warn!("Drafted script has no lines in the **CHARACTER** \"line\" format");
        }

        FileManager::write_bytes(output, script.as_bytes())?;
        info!("Success: {} ({} dialogue lines)", output.display(), line_count);
        Ok(script)
    }

    /// Ask the language model for an image prompt and main dialogue of a script
    pub async fn run_describe(&self, script: &Path) -> Result<(String, String)> {
        let content = FileManager::read_to_string(script)?;
        let screenwriter = &self.config.screenwriter;
        let client = OpenAI::new(
            &screenwriter.api_key,
            &screenwriter.endpoint,
            Duration::from_secs(screenwriter.timeout_secs),
        )?;

        let request = OpenAIRequest::new(&screenwriter.model)
            .add_message("system", EXTRACTION_PROMPT)
            .add_message("user", format!("Script: {}", content));
        let response = client.complete(request).await?;

        let (visual, dialogue) = split_visual_and_dialogue(&OpenAI::extract_text(&response));
        debug!("Visual description: {}", visual);
        debug!("Dialogue: {}", dialogue);
        Ok((visual, dialogue))
    }

    /// Generate a scene image for `prompt` and write it to `output`
    pub async fn run_image(&self, prompt: &str, output: &Path) -> Result<()> {
        let image = &self.config.image;
        let client = Stability::new(&image.api_key, &image.endpoint, Duration::from_secs(image.timeout_secs))?;

        info!("Generating {}x{} image", image.width, image.height);
        let png = client
            .generate(ImageRequest::new(prompt, image.width, image.height))
            .await?;

        FileManager::write_bytes(output, &png)?;
        info!("Success: {}", output.display());
        Ok(())
    }

    /// Draft a script, describe it, render its image and voice its dialogue.
    ///
    /// Everything lands in `output_dir` together with a text file describing
    /// how to combine the image and track into a video. When the draft has no
    /// parseable dialogue, the extracted dialogue is read by the default voice.
    pub async fn run_movie(&self, storyline: &str, output_dir: &Path) -> Result<MovieArtifacts> {
        FileManager::ensure_dir(output_dir)?;

        let script = output_dir.join(MOVIE_SCRIPT_FILE);
        let image = output_dir.join(DEFAULT_IMAGE_OUTPUT);
        let audio = output_dir.join(DEFAULT_SCENE_OUTPUT);
        let instructions = output_dir.join(MOVIE_INSTRUCTIONS_FILE);

        info!("Step 1/4: drafting script");
        let draft = self.run_write(storyline, &script).await?;

        info!("Step 2/4: extracting scene description");
        let (visual, dialogue) = self.run_describe(&script).await?;

        info!("Step 3/4: generating scene image");
        self.run_image(&visual, &image).await?;

        info!("Step 4/4: voicing dialogue");
        let mut lines = parse_script(&draft);
        let registry = if lines.is_empty() {
            if dialogue.is_empty() {
                return Err(anyhow!("Drafted script has no dialogue to voice"));
            }
            warn!("No screenplay lines in draft, narrating extracted dialogue");
            lines.push(ScriptLine::new(NARRATOR, dialogue));
            VoiceRegistry::new([(NARRATOR, self.config.voice_catalog().resolve_or_raw(None))])
        } else {
            self.registry()
        };
        let report = self.assemble_to(lines, &registry, &audio).await?;

        let text = Self::assembly_instructions(&image, &audio, &script, &visual);
        FileManager::write_bytes(&instructions, text.as_bytes())?;
        info!("Success: {}", instructions.display());

        Ok(MovieArtifacts {
            script,
            image,
            audio,
            instructions,
            report,
        })
    }

    fn assembly_instructions(image: &Path, audio: &Path, script: &Path, visual: &str) -> String {
        format!(
            "VIDEO ASSEMBLY INSTRUCTIONS\n\
             {rule}\n\n\
             Image: {image}\n\
             Dialogue audio: {audio}\n\
             Script: {script}\n\n\
             Scene description:\n{visual}\n\n\
             Steps:\n\
             1. Import the image and the dialogue audio into a video editor\n\
             2. Stretch the image to the length of the audio track\n\
             3. Add a slow zoom or pan to the image if desired\n\
             4. Export as MP4\n",
            rule = "=".repeat(30),
            image = image.display(),
            audio = audio.display(),
            script = script.display(),
        )
    }

    fn progress_bar(len: usize, unit: &str) -> ProgressBar {
        let progress_bar = ProgressBar::new(len as u64);
        let template = format!("{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{eta}}", unit);
        let style = ProgressStyle::default_bar()
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("=>-"));
        progress_bar
    }

    // File extension for raw provider output, e.g. `mp3_44100_128` -> `mp3`
    fn clip_extension(output_format: &str) -> &str {
        output_format.split('_').next().filter(|s| !s.is_empty()).unwrap_or("mp3")
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
