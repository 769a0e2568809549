/*!
 * Tests for script parsing properties
 */

use scenevox::scene::{clean_line, parse_script, ScriptLine};

use crate::common::SAMPLE_SCRIPT;

#[test]
fn test_parseScript_sampleScript_shouldExtractLinesInOrder() {
    let lines = parse_script(SAMPLE_SCRIPT);
    assert_eq!(
        lines,
        vec![
            ScriptLine::new("RILEY", "Hey."),
            ScriptLine::new("JAMIE", "...Riley?"),
            ScriptLine::new("RILEY", "You really didn't hear me come in?"),
            ScriptLine::new("JAMIE", "Not a  sound."),
        ]
    );
}

#[test]
fn test_parseScript_nWellFormedMatches_shouldYieldNLines() {
    let script: String = (1..=25)
        .map(|i| format!("**SPEAKER{}**: \"Line number {}.\"\n\n", i % 3, i))
        .collect();

    let lines = parse_script(&script);

    assert_eq!(lines.len(), 25);
    for (i, line) in lines.iter().enumerate() {
        assert_eq!(line.text, format!("Line number {}.", i + 1));
        assert_eq!(line.character, format!("SPEAKER{}", (i + 1) % 3));
    }
}

#[test]
fn test_parseScript_sameInputTwice_shouldBeIdentical() {
    assert_eq!(parse_script(SAMPLE_SCRIPT), parse_script(SAMPLE_SCRIPT));
}

#[test]
fn test_parseScript_cleanedText_shouldHaveNoMarkersOrAsides() {
    let script = r#"
**A** "*Loud* words (whispered) here   "
**B** *(beat)* "  (aside) trailing*"
**C** "Plain."
"#;
    for line in parse_script(script) {
        assert!(!line.text.contains('*'), "emphasis left in {:?}", line.text);
        assert!(!line.text.contains('('), "aside left in {:?}", line.text);
        assert_eq!(line.text, line.text.trim());
    }
}

#[test]
fn test_parseScript_emphasisDirection_shouldNotSwallowNextMarker() {
    let script = "**RILEY** *turns*\n**JAMIE** \"What?\"";
    let lines = parse_script(script);
    assert_eq!(lines, vec![ScriptLine::new("JAMIE", "What?")]);
}

#[test]
fn test_parseScript_multilineQuote_shouldKeepInnerNewline() {
    let lines = parse_script("**RILEY** \"First half,\nsecond half.\"");
    assert_eq!(lines[0].text, "First half,\nsecond half.");
}

#[test]
fn test_cleanLine_asideAcrossNewline_shouldBeKept() {
    assert_eq!(clean_line("(not\nclosed) here"), "(not\nclosed) here");
}

#[test]
fn test_scriptLine_display_shouldShowSpeakerAndText() {
    assert_eq!(ScriptLine::new("RILEY", "Hey.").to_string(), "RILEY: Hey.");
}
