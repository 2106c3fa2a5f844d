use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_SPEECH_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// 生成モデル接続設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// API キー（未設定ならクライアント構築に失敗する）
    pub api_key: Option<String>,
    /// ベースエンドポイント
    pub endpoint: String,
    /// 解説・翻訳・窓口検索に使うモデル
    pub text_model: String,
    /// 音声合成に使うモデル
    pub speech_model: String,
    /// サンプリング温度（None ならモデル既定値）
    pub temperature: Option<f32>,
    /// リクエストタイムアウト秒数
    pub timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            temperature: None,
            timeout_secs: 60,
        }
    }
}

impl ModelSettings {
    /// 環境変数から設定を読み込む。
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を組み立てる。空文字列は未設定扱い。
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let timeout_secs = match get("SAHAJ_MODEL_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                log::warn!("Ignoring invalid SAHAJ_MODEL_TIMEOUT_SECS={raw:?}");
                defaults.timeout_secs
            }),
            None => defaults.timeout_secs,
        };

        Self {
            api_key: get("GEMINI_API_KEY").or_else(|| get("GOOGLE_API_KEY")),
            endpoint: get("SAHAJ_MODEL_ENDPOINT").unwrap_or(defaults.endpoint),
            text_model: get("SAHAJ_TEXT_MODEL").unwrap_or(defaults.text_model),
            speech_model: get("SAHAJ_SPEECH_MODEL").unwrap_or(defaults.speech_model),
            temperature: defaults.temperature,
            timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let s = ModelSettings::from_lookup(lookup(&[]));
        assert_eq!(s, ModelSettings::default());
        assert!(s.api_key.is_none());
    }

    #[test]
    fn reads_overrides() {
        let s = ModelSettings::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k1"),
            ("SAHAJ_TEXT_MODEL", "gemini-x"),
            ("SAHAJ_MODEL_TIMEOUT_SECS", "15"),
        ]));
        assert_eq!(s.api_key.as_deref(), Some("k1"));
        assert_eq!(s.text_model, "gemini-x");
        assert_eq!(s.speech_model, DEFAULT_SPEECH_MODEL);
        assert_eq!(s.timeout_secs, 15);
    }

    #[test]
    fn google_key_is_fallback() {
        let s = ModelSettings::from_lookup(lookup(&[("GEMINI_API_KEY", " "), ("GOOGLE_API_KEY", "g")]));
        assert_eq!(s.api_key.as_deref(), Some("g"));
    }

    #[test]
    fn invalid_timeout_falls_back() {
        let s = ModelSettings::from_lookup(lookup(&[("SAHAJ_MODEL_TIMEOUT_SECS", "soon")]));
        assert_eq!(s.timeout_secs, 60);
    }

    #[test]
    fn partial_json_uses_defaults() {
        let s: ModelSettings = serde_json::from_str(r#"{"text_model":"m"}"#).unwrap();
        assert_eq!(s.text_model, "m");
        assert_eq!(s.endpoint, DEFAULT_ENDPOINT);
    }
}
