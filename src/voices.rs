/*!
 * Voice lookup tables.
 *
 * `VoiceRegistry` maps screenplay characters to provider voice ids for scene
 * assembly. `VoiceCatalog` holds the named voices the HTTP API advertises.
 * Both are built once from configuration and never mutated afterwards.
 */

use std::collections::BTreeMap;

/// Voice name used by the API when a request does not pick one
pub const DEFAULT_VOICE_NAME: &str = "default";

/// Case-insensitive character to voice id mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceRegistry {
    voices: BTreeMap<String, String>,
}

impl VoiceRegistry {
    /// Create a registry; character keys are stored upper-cased
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let voices = entries
            .into_iter()
            .map(|(character, voice)| (Self::key(character.as_ref()), voice.into()))
            .collect();
        Self { voices }
    }

    /// Resolve the voice for a character, `None` means no voice is assigned
    pub fn resolve(&self, character: &str) -> Option<&str> {
        self.voices.get(&Self::key(character)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    fn key(character: &str) -> String {
        character.trim().to_uppercase()
    }
}

/// Named voices offered to API callers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceCatalog {
    voices: BTreeMap<String, String>,
}

impl VoiceCatalog {
    /// Create a catalog; names are stored lower-cased
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let voices = entries
            .into_iter()
            .map(|(name, voice)| (name.as_ref().to_lowercase(), voice.into()))
            .collect();
        Self { voices }
    }

    /// Turn a caller-supplied voice name or raw id into a voice id.
    ///
    /// A missing input selects the `default` entry. Names found in the catalog
    /// map to their id; anything else is passed through as a raw provider id.
    pub fn resolve_or_raw(&self, input: Option<&str>) -> String {
        let input = input
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_VOICE_NAME);
        self.voices
            .get(&input.to_lowercase())
            .cloned()
            .unwrap_or_else(|| input.to_string())
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.voices
    }
}
