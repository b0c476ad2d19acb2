//! Voice and language metadata for the synthesis collaborator.
//!
//! Pure data: the synthesis call itself lives outside this crate, but
//! hosts need the catalog to label a session and build a request.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    English,
    Hindi,
    Marathi,
}

impl Language {
    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English (Default)",
            Language::Hindi => "Hindi (हिन्दी)",
            Language::Marathi => "Marathi (मराठी)",
        }
    }
}

/// One prebuilt voice the collaborator can synthesize with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
    pub gender: Gender,
    pub description: String,
}

impl VoiceInfo {
    fn new(id: &str, gender: Gender, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            gender,
            description: description.to_string(),
        }
    }
}

/// The built-in voice catalog.
pub fn builtin_voices() -> Vec<VoiceInfo> {
    vec![
        VoiceInfo::new("Puck", Gender::Male, "Deep, resonant, and clear."),
        VoiceInfo::new("Charon", Gender::Male, "Authoritative and news-like."),
        VoiceInfo::new("Fenrir", Gender::Male, "Intense and energetic."),
        VoiceInfo::new("Kore", Gender::Female, "Soothing and calm."),
        VoiceInfo::new("Zephyr", Gender::Female, "Friendly and conversational."),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_unique_ids() {
        let voices = builtin_voices();
        let mut ids: Vec<&str> = voices.iter().map(|v| v.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), voices.len());
    }

    #[test]
    fn voice_info_serializes() {
        let json = serde_json::to_string(&builtin_voices()[0]).unwrap();
        assert!(json.contains("Puck"));
        assert!(json.contains("Male"));
    }
}
