// src/config.rs
use serde::Deserialize;
use web_sys::window;

const CONFIG_ELEMENT_ID: &str = "app-config";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub(crate) struct AppConfig {
    /// Prefixed to every endpoint path. Empty means same origin.
    pub api_base: String,
    pub token_key: String,
    pub username_key: String,
    pub message_ttl_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: "".into(),
            token_key: "adminToken".into(),
            username_key: "adminUsername".into(),
            message_ttl_ms: 5000,
        }
    }
}

impl AppConfig {
    pub(crate) fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut cfg: AppConfig = serde_json::from_str(json)?;
        cfg.api_base = cfg.api_base.trim_end_matches('/').to_string();
        Ok(cfg)
    }

    /// Reads `<script id="app-config" type="application/json">` if the page has one.
    pub(crate) fn load() -> Self {
        let Some(json) = config_json_from_dom() else {
            return Self::default();
        };
        match Self::from_json(&json) {
            Ok(cfg) => cfg,
            Err(e) => {
                gloo::console::error!(format!("Invalid #{CONFIG_ELEMENT_ID} JSON: {e}"));
                Self::default()
            }
        }
    }
}

fn config_json_from_dom() -> Option<String> {
    let doc = window()?.document()?;
    let el = doc.get_element_by_id(CONFIG_ELEMENT_ID)?;
    let text = el.text_content().unwrap_or_default();
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_dismiss_after_five_seconds_by_default() {
        assert_eq!(AppConfig::default().message_ttl_ms, 5000);
        assert_eq!(AppConfig::from_json("{}").unwrap().message_ttl_ms, 5000);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = AppConfig::from_json(r#"{ "message_ttl_ms": 1500 }"#).unwrap();
        assert_eq!(cfg.message_ttl_ms, 1500);
        assert_eq!(cfg.token_key, "adminToken");
        assert_eq!(cfg.username_key, "adminUsername");
        assert_eq!(cfg.api_base, "");
    }

    #[test]
    fn trailing_slash_on_api_base_is_dropped() {
        let cfg = AppConfig::from_json(r#"{ "api_base": "https://school.example/api/" }"#).unwrap();
        assert_eq!(cfg.api_base, "https://school.example/api");
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(AppConfig::from_json("{ not json").is_err());
    }
}
