use crate::rewrite::gemini::DEFAULT_BASE_URL;
use std::path::PathBuf;

const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];
const BASE_URL_VAR: &str = "PROMPTSMITH_API_BASE";
const HISTORY_PATH_VAR: &str = "PROMPTSMITH_HISTORY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_key: String,
    pub api_base: String,
    pub history_path: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|name| non_empty(*name))
            .unwrap_or_default();
        if api_key.is_empty() {
            log::warn!("no API key found in GEMINI_API_KEY or API_KEY; rewrites will fail");
        }

        Self {
            api_key,
            api_base: non_empty(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            history_path: non_empty(HISTORY_PATH_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_history_path),
        }
    }
}

fn default_history_path() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join("promptsmith")
        .join("history.json")
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use crate::rewrite::gemini::DEFAULT_BASE_URL;
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn settings(vars: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn gemini_key_wins_over_generic_key() {
        let s = settings(&[("GEMINI_API_KEY", "g"), ("API_KEY", "a")]);
        assert_eq!(s.api_key, "g");
    }

    #[test]
    fn blank_values_fall_through_to_defaults() {
        let s = settings(&[("GEMINI_API_KEY", "  "), ("API_KEY", "a"), ("PROMPTSMITH_API_BASE", "")]);
        assert_eq!(s.api_key, "a");
        assert_eq!(s.api_base, DEFAULT_BASE_URL);
        assert!(s.history_path.ends_with("promptsmith/history.json"));
    }

    #[test]
    fn history_path_can_be_overridden() {
        let s = settings(&[("PROMPTSMITH_HISTORY", "/tmp/h.json")]);
        assert_eq!(s.history_path, PathBuf::from("/tmp/h.json"));
        assert!(s.api_key.is_empty());
    }
}
