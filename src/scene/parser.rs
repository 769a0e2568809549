use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

// @module: Screenplay dialogue extraction

// @const: Character marker, optional stage directions, then the quoted line
static DIALOGUE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\*\*([^*\n]+?)\*\*:?\s*(?:\*[^*]+\*\s*|\([^)]*\)\s*)*["“](.*?)["”]"#).unwrap()
});

// @const: Emphasis markers inside a spoken line
static EMPHASIS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*+").unwrap());

// @const: Parenthetical aside, single non-nested pass
static PARENTHETICAL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").unwrap());

const VISUAL_LABEL: &str = "VISUAL:";
const DIALOGUE_LABEL: &str = "DIALOGUE:";
const DEFAULT_VISUAL: &str = "A dramatic scene with characters";
const DEFAULT_DIALOGUE: &str = "Hello, this is a test.";

// @struct: One spoken line of a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptLine {
    // @field: Speaking character as written in the script
    pub character: String,

    // @field: Spoken text without emphasis or asides
    pub text: String,
}

impl ScriptLine {
    pub fn new(character: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            character: character.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for ScriptLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.character, self.text)
    }
}

/// Extract `(character, line)` pairs from a screenplay-style markdown script.
///
/// A speaker is a bold marker (`**RILEY**`, optionally followed by `:`). Any
/// number of `*emphasis*` or `(parenthetical)` stage directions may sit
/// between the marker and the quoted line, on the same or following lines.
/// Straight and curly double quotes are both accepted.
///
/// Markers without a quoted line are skipped. Every marker/quote match
/// yields a line, even when its text is empty after cleanup, so the
/// assembler can report it. Parsing never fails; an empty script gives an
/// empty vector.
pub fn parse_script(script: &str) -> Vec<ScriptLine> {
    DIALOGUE_REGEX
        .captures_iter(script)
        .map(|caps| {
            let character = caps[1].trim().trim_end_matches(':').trim();
            let text = clean_line(&caps[2]);
            if text.is_empty() {
                debug!("Dialogue match has no spoken text: {:?}", &caps[0]);
            }
            ScriptLine::new(character, text)
        })
        .collect()
}

/// Strip emphasis markers and parenthetical asides, then trim.
///
/// Parentheses are not balanced: `(a (b) c)` loses only `(a (b)`.
pub fn clean_line(raw: &str) -> String {
    let without_emphasis = EMPHASIS_REGEX.replace_all(raw, "");
    let without_asides = PARENTHETICAL_REGEX.replace_all(&without_emphasis, "");
    without_asides.trim().to_string()
}

/// Split language model output of the form `VISUAL: ... DIALOGUE: ...`.
///
/// Returns `(visual_description, dialogue)`, substituting fixed defaults for
/// a missing section.
pub fn split_visual_and_dialogue(text: &str) -> (String, String) {
    let visual = section_after(text, VISUAL_LABEL, DIALOGUE_LABEL)
        .unwrap_or(DEFAULT_VISUAL)
        .to_string();
    let dialogue = section_after(text, DIALOGUE_LABEL, VISUAL_LABEL)
        .unwrap_or(DEFAULT_DIALOGUE)
        .to_string();
    (visual, dialogue)
}

fn section_after<'a>(text: &'a str, label: &str, terminator: &str) -> Option<&'a str> {
    let start = text.find(label)? + label.len();
    let rest = &text[start..];
    let end = rest.find(terminator).unwrap_or(rest.len());
    Some(rest[..end].trim())
}
