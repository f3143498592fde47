//! Language codes understood by the translation backend.

pub const ENGLISH: &str = "en";
pub const VIETNAMESE: &str = "vi";

/// The language the backend pairs with `code`, if it is one of the two supported ones.
pub fn paired_language(code: &str) -> Option<&'static str> {
    match normalize(code).as_str() {
        ENGLISH => Some(VIETNAMESE),
        VIETNAMESE => Some(ENGLISH),
        _ => None,
    }
}

/// Lower-cased, trimmed language code.
pub fn normalize(code: &str) -> String {
    code.trim().to_ascii_lowercase()
}

/// Selected source/target pair of the translate box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub source: String,
    pub target: String,
}

impl LanguagePair {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self { source: normalize(&source.into()), target: normalize(&target.into()) }
    }

    /// Change the source language; `en`/`vi` drag the target to the other one.
    pub fn set_source(&mut self, code: &str) {
        self.source = normalize(code);
        if let Some(paired) = paired_language(&self.source) {
            self.target = paired.to_string();
        }
    }

    /// Change the target language; `en`/`vi` drag the source to the other one.
    pub fn set_target(&mut self, code: &str) {
        self.target = normalize(code);
        if let Some(paired) = paired_language(&self.target) {
            self.source = paired.to_string();
        }
    }
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self::new(ENGLISH, VIETNAMESE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_source_selects_vietnamese_target() {
        let mut pair = LanguagePair::new("vi", "en");
        pair.set_source("en");
        assert_eq!(pair, LanguagePair::new("en", "vi"));
    }

    #[test]
    fn vietnamese_source_selects_english_target() {
        let mut pair = LanguagePair::default();
        pair.set_source("VI");
        assert_eq!(pair.source, "vi");
        assert_eq!(pair.target, "en");
    }

    #[test]
    fn target_change_mirrors_source() {
        let mut pair = LanguagePair::default();
        pair.set_target("en");
        assert_eq!(pair, LanguagePair::new("vi", "en"));
    }

    #[test]
    fn unknown_code_keeps_other_side() {
        let mut pair = LanguagePair::default();
        pair.set_source("fr");
        assert_eq!(pair.source, "fr");
        assert_eq!(pair.target, "vi");
    }
}
