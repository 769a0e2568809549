/*!
 * CLI workflows end to end, with mocked providers
 */

use anyhow::Result;
use serde_json::json;
use std::fs;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use scenevox::app_config::Config;
use scenevox::app_controller::{Controller, DEFAULT_SCENE_OUTPUT, MOVIE_INSTRUCTIONS_FILE, NARRATOR};
use scenevox::scene::{LineOutcome, ScriptLine};
use scenevox::providers::mock::MockSynthesizer;

use crate::common::{create_temp_dir, create_test_file, init_logging, decode_track, samples_ms, SAMPLE_SCRIPT};

fn test_config() -> Config {
    let mut config = Config::default();
    config.voices = [("RILEY", "voice-riley"), ("JAMIE", "voice-jamie")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    config
}

fn controller(mock: &MockSynthesizer) -> Controller {
    Controller::with_config(test_config())
        .unwrap()
        .with_synthesizer(Arc::new(mock.clone()))
}

#[tokio::test]
async fn test_runScene_sampleScript_shouldWriteTrackAndReport() -> Result<()> {
    init_logging();
    let temp_dir = create_temp_dir()?;
    let script = create_test_file(temp_dir.path(), "act1.md", SAMPLE_SCRIPT)?;
    let output = temp_dir.path().join("act1.mp3");

    let report = controller(&MockSynthesizer::working())
        .run_scene(&script, &output, false)
        .await?
        .expect("scene should run");

    assert_eq!(report.synthesized_count(), 4);
    let samples = decode_track(&fs::read(&output)?);
    assert!(samples.len() >= samples_ms(500 + 4 * 500));
    Ok(())
}

#[tokio::test]
async fn test_runScene_existingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let script = create_test_file(temp_dir.path(), "act1.md", SAMPLE_SCRIPT)?;
    let output = create_test_file(temp_dir.path(), "act1.mp3", "old")?;
    let mock = MockSynthesizer::working();

    assert!(controller(&mock).run_scene(&script, &output, false).await?.is_none());
    assert_eq!(fs::read_to_string(&output)?, "old");
    assert!(mock.calls().is_empty());

    assert!(controller(&mock).run_scene(&script, &output, true).await?.is_some());
    assert!(!decode_track(&fs::read(&output)?).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_runScene_missingScript_shouldFail() {
    let temp_dir = create_temp_dir().unwrap();
    let result = controller(&MockSynthesizer::working())
        .run_scene(&temp_dir.path().join("nope.md"), &temp_dir.path().join("out.mp3"), false)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_runSceneFolder_shouldWriteMp3PerScript() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    create_test_file(temp_dir.path(), "one.md", SAMPLE_SCRIPT)?;
    create_test_file(temp_dir.path(), "two.txt", "**RILEY** \"Just me.\"")?;
    create_test_file(temp_dir.path(), "two.mp3", "existing")?;

    let summary = controller(&MockSynthesizer::working())
        .run_scene_folder(temp_dir.path(), false)
        .await?;

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
    assert!(temp_dir.path().join("one.mp3").exists());
    assert_eq!(fs::read_to_string(temp_dir.path().join("two.mp3"))?, "existing");
    Ok(())
}

#[tokio::test]
async fn test_runClips_shouldWriteOneFilePerResolvedLine() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let script_text = format!("{}\n**MORGAN** \"Who's there?\"", SAMPLE_SCRIPT);
    let script = create_test_file(temp_dir.path(), "act1.md", &script_text)?;
    let clips_dir = temp_dir.path().join("clips");
    let mock = MockSynthesizer::working().failing_on("...Riley?");

    let summary = controller(&mock).run_clips(&script, &clips_dir).await?;

    let names: Vec<String> = summary
        .written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["riley_line1.wav", "riley_line3.wav", "jamie_line4.wav"]);
    assert_eq!(summary.skipped, 2);
    assert!(clips_dir.join("riley_line1.wav").exists());
    Ok(())
}

#[test]
fn test_runParse_shouldReturnLines() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let script = create_test_file(temp_dir.path(), "act1.md", SAMPLE_SCRIPT)?;

    let lines = controller(&MockSynthesizer::working()).run_parse(&script)?;

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1].character, "JAMIE");
    Ok(())
}

#[tokio::test]
async fn test_runWrite_shouldSaveDraftedScript() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "**RILEY** \"Hey.\"\n**JAMIE** \"...Riley?\"" } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.screenwriter.api_key = "oa-key".to_string();
    config.screenwriter.endpoint = server.uri();
    let temp_dir = create_temp_dir()?;
    let output = temp_dir.path().join("drafts/script.md");

    let script = Controller::with_config(config)?.run_write("two old friends meet", &output).await?;

    assert_eq!(fs::read_to_string(&output)?, script);
    assert!(script.contains("**JAMIE**"));
    Ok(())
}

#[tokio::test]
async fn test_runDescribe_shouldSplitVisualFromDialogue() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": "VISUAL: A rainy kitchen. DIALOGUE: Hey." } }]
        })))
        .mount(&server)
        .await;

    let mut config = test_config();
    config.screenwriter.endpoint = server.uri();
    let temp_dir = create_temp_dir()?;
    let script = create_test_file(temp_dir.path(), "act1.md", SAMPLE_SCRIPT)?;

    let (visual, dialogue) = Controller::with_config(config)?.run_describe(&script).await?;

    assert_eq!(visual, "A rainy kitchen.");
    assert_eq!(dialogue, "Hey.");
    Ok(())
}

#[tokio::test]
async fn test_runImage_shouldSavePng() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2beta/stable-image/generate/core"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG-data".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config();
    config.image.endpoint = server.uri();
    let temp_dir = create_temp_dir()?;
    let output = temp_dir.path().join("scene_image.png");

    Controller::with_config(config)?.run_image("A rainy kitchen", &output).await?;

    assert_eq!(fs::read(&output)?, b"\x89PNG-data");
    Ok(())
}

#[tokio::test]
async fn test_runClips_emptyLine_shouldSkipWithoutProviderCall() -> Result<()> {
    let temp_dir = create_temp_dir()?;
    let script = create_test_file(temp_dir.path(), "act1.md", "**RILEY** \"(sighs)\"\n**JAMIE** \"Hi.\"")?;
    let mock = MockSynthesizer::working();

    let summary = controller(&mock).run_clips(&script, &temp_dir.path().join("clips")).await?;

    assert_eq!(summary.written.len(), 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(mock.calls().len(), 1);
    Ok(())
}

/// Mounts chat completions for drafting and describing, plus image generation
async fn movie_server(draft: &str, description: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Storyline: "))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": draft } }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(body_string_contains("Extract from the script"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": description } }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2beta/stable-image/generate/core"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\x89PNG-data".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn movie_controller(server: &MockServer, mock: &MockSynthesizer) -> Result<Controller> {
    let mut config = test_config();
    config.screenwriter.endpoint = server.uri();
    config.image.endpoint = server.uri();
    Ok(Controller::with_config(config)?.with_synthesizer(Arc::new(mock.clone())))
}

#[tokio::test]
async fn test_runMovie_shouldWriteScriptImageTrackAndInstructions() -> Result<()> {
    init_logging();
    let server = movie_server(
        "**RILEY** \"Hey.\"\n**JAMIE** \"...Riley?\"",
        "VISUAL: A rainy kitchen at night. DIALOGUE: Hey. Riley?",
    )
    .await;
    let mock = MockSynthesizer::working();
    let temp_dir = create_temp_dir()?;
    let output_dir = temp_dir.path().join("movie");

    let artifacts = movie_controller(&server, &mock)?.run_movie("two old friends meet", &output_dir).await?;

    assert!(fs::read_to_string(&artifacts.script)?.contains("**JAMIE**"));
    assert_eq!(fs::read(&artifacts.image)?, b"\x89PNG-data");
    assert_eq!(artifacts.audio, output_dir.join(DEFAULT_SCENE_OUTPUT));
    assert!(decode_track(&fs::read(&artifacts.audio)?).len() >= samples_ms(500 + 2 * 500));
    assert_eq!(artifacts.report.synthesized_count(), 2);

    assert_eq!(artifacts.instructions, output_dir.join(MOVIE_INSTRUCTIONS_FILE));
    let instructions = fs::read_to_string(&artifacts.instructions)?;
    assert!(instructions.starts_with("VIDEO ASSEMBLY INSTRUCTIONS"));
    assert!(instructions.contains("A rainy kitchen at night."));
    assert!(instructions.contains("Export as MP4"));

    let voices: Vec<String> = mock.calls().into_iter().map(|c| c.voice_id).collect();
    assert_eq!(voices, vec!["voice-riley", "voice-jamie"]);
    Ok(())
}

#[tokio::test]
async fn test_runMovie_draftWithoutScreenplayLines_shouldNarrateDialogue() -> Result<()> {
    let server = movie_server(
        "Riley walks in. They talk about old times.",
        "VISUAL: An old diner. DIALOGUE: It's been years.",
    )
    .await;
    let mock = MockSynthesizer::working();
    let temp_dir = create_temp_dir()?;

    let artifacts = movie_controller(&server, &mock)?.run_movie("a reunion", temp_dir.path()).await?;

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text, "It's been years.");
    assert_eq!(artifacts.report.entries()[0].line, ScriptLine::new(NARRATOR, "It's been years."));
    assert!(matches!(artifacts.report.entries()[0].outcome, LineOutcome::Synthesized { .. }));
    Ok(())
}
