use serde::{Deserialize, Serialize};

/// 全フロー共通の対応言語（閉じた集合）。
///
/// ワイヤ上の表記は英語名そのまま ("English", "Hindi", ...)。
/// 大文字小文字の揺れや別表記は正規化せず拒否する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    English,
    Hindi,
    Bengali,
    Marathi,
    Gujarati,
    Tamil,
}

/// 対応外の言語名
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unsupported language: {0:?}")]
pub struct UnsupportedLanguage(pub String);

impl Language {
    pub const ALL: [Language; 6] = [
        Language::English,
        Language::Hindi,
        Language::Bengali,
        Language::Marathi,
        Language::Gujarati,
        Language::Tamil,
    ];

    /// スキーマの enum 制約に使う名前一覧（`ALL` と同じ順序）。
    pub const NAMES: &'static [&'static str] =
        &["English", "Hindi", "Bengali", "Marathi", "Gujarati", "Tamil"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Hindi => "Hindi",
            Language::Bengali => "Bengali",
            Language::Marathi => "Marathi",
            Language::Gujarati => "Gujarati",
            Language::Tamil => "Tamil",
        }
    }

    /// 音声合成で使うロケールコード。
    pub fn locale_code(&self) -> &'static str {
        match self {
            Language::English => "en-US",
            Language::Hindi => "hi-IN",
            Language::Bengali => "bn-IN",
            Language::Marathi => "mr-IN",
            Language::Gujarati => "gu-IN",
            Language::Tamil => "ta-IN",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = UnsupportedLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|lang| lang.as_str() == s)
            .ok_or_else(|| UnsupportedLanguage(s.to_string()))
    }
}
