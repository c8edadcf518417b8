//! Language policy: which languages the on-device models handle and which
//! direction a given detection result translates toward.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Languages the bundled detection/translation models are known to handle.
static SUPPORTED_LANGUAGES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["en", "ja", "zh", "zh-CN", "zh-TW", "es", "ru"].into_iter().collect());

/// Detection results outside the supported set normalize to English instead of
/// failing. Detection uncertainty must not block translation; a genuinely
/// unsupported language may mistranslate under this policy, which is accepted.
pub const FALLBACK_LANGUAGE: &str = "en";

pub fn is_supported(language: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(language)
}

/// Maps a raw detected language onto the supported set.
pub fn normalize_detected(language: &str) -> &str {
    if is_supported(language) {
        language
    } else {
        log::debug!("detected language {language:?} unsupported, falling back to {FALLBACK_LANGUAGE}");
        FALLBACK_LANGUAGE
    }
}

/// The two-language pair translation moves between. Text detected as the
/// primary language translates to the secondary; everything else translates
/// toward the primary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub primary: String,
    pub secondary: String,
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self { primary: "ja".to_string(), secondary: "en".to_string() }
    }
}

impl LanguagePair {
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self { primary: primary.into(), secondary: secondary.into() }
    }

    pub fn target_for(&self, detected: &str) -> &str {
        if detected == self.primary {
            &self.secondary
        } else {
            &self.primary
        }
    }
}
