use std::{collections::HashMap, time::Duration};

use crate::config::{read, read_secs};

/// Settings for the hosted model behind the assistant.
#[derive(Clone, Debug)]
pub struct ChatConfig {
    /// Without a key every assistant request fails with the generic error
    pub api_key: Option<String>,
    pub model: String,
    pub request_timeout: Duration,
}

impl ChatConfig {
    pub fn from_map(values: &HashMap<String, String>) -> Self {
        let api_key = values
            .get("GOOGLE_API_KEY")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());

        Self {
            api_key,
            model: read(values, "GEMINI_MODEL", "gemini-2.0-flash"),
            request_timeout: Duration::from_secs(read_secs(values, "GEMINI_TIMEOUT_SECS", 60)),
        }
    }

    pub(crate) fn tracked_keys() -> Vec<(&'static str, &'static str)> {
        vec![
            ("GOOGLE_API_KEY", ""),
            ("GEMINI_MODEL", "gemini-2.0-flash"),
            ("GEMINI_TIMEOUT_SECS", "60"),
        ]
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::from_map(&HashMap::new())
    }
}
