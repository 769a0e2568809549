/*!
 * # scenevox - dialogue scenes from screenplay scripts
 *
 * A Rust library that turns a screenplay-style script into one spoken
 * dialogue track using a text-to-speech provider.
 *
 * ## Features
 *
 * - Parse `**CHARACTER**` / `"quoted line"` scripts, stripping stage directions
 * - Resolve characters to provider voices through a configured registry
 * - Synthesize every line and stitch the clips into one track with fixed gaps
 * - Skip and report lines that cannot be voiced instead of failing the run
 * - Export individual clips per line
 * - Draft scripts from a storyline with a chat-completion model
 * - Generate a scene image from a prompt
 * - Chain script, image and dialogue track into one movie bundle
 * - Serve single-line synthesis over a small HTTP API
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `scene`: Script parsing and dialogue track assembly:
 *   - `scene::parser`: Script text to ordered lines
 *   - `scene::assembler`: Lines to one audio track
 *   - `scene::report`: Per-line outcomes and the run summary
 * - `audio`: Clip decoding and resampling, track building and MP3 encoding
 * - `voices`: Character and named voice lookup
 * - `providers`: Client implementations for external services:
 *   - `providers::elevenlabs`: ElevenLabs text-to-speech client
 *   - `providers::openai`: OpenAI chat-completions client
 *   - `providers::stability`: Stability image generation client
 *   - `providers::mock`: Scriptable synthesizer for tests
 * - `server`: HTTP API
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod audio;
pub mod errors;
pub mod file_utils;
pub mod providers;
pub mod scene;
pub mod server;
pub mod voices;

// Re-export main types for easier usage
pub use app_config::Config;
pub use audio::AudioTrack;
pub use errors::{DecodeError, FinalizeError, ProviderError, SkipReason};
pub use providers::SpeechSynthesizer;
pub use scene::{parse_script, AssembledScene, AssemblyReport, SceneAssembler, ScriptLine};
pub use voices::{VoiceCatalog, VoiceRegistry};
