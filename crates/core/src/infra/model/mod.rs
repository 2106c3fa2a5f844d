pub mod gemini;
mod scripted;

pub use scripted::ScriptedModel;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::data_uri::DataUri;
use crate::domain::error::FlowError;

// ─── プロンプト ──────────────────────────────────────────────────

/// プロンプトの構成要素。テキストとメディアを順序どおりに並べる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptPart {
    Text(String),
    Media(DataUri),
}

/// 1 回のモデル呼び出しで送る、テキスト+メディア混在のプロンプト。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptPayload {
    pub parts: Vec<PromptPart>,
}

impl PromptPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![PromptPart::Text(text.into())],
        }
    }

    /// テキスト部分だけを連結したもの（ログ・テスト用）。
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                PromptPart::Text(t) => Some(t.as_str()),
                PromptPart::Media(_) => None,
            })
            .collect()
    }

    pub fn media(&self) -> impl Iterator<Item = &DataUri> {
        self.parts.iter().filter_map(|part| match part {
            PromptPart::Media(m) => Some(m),
            PromptPart::Text(_) => None,
        })
    }
}

// ─── 生成設定 ────────────────────────────────────────────────────

/// 要求する応答の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseModality {
    #[default]
    Text,
    Audio,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationConfig {
    pub modality: ResponseModality,
    /// 構造化出力の JSON スキーマ（テキスト応答のみ）
    pub response_schema: Option<Value>,
    /// 音声合成のロケールコード (例: "hi-IN")
    pub speech_language_code: Option<String>,
}

impl GenerationConfig {
    pub fn structured(schema: Value) -> Self {
        Self {
            modality: ResponseModality::Text,
            response_schema: Some(schema),
            speech_language_code: None,
        }
    }

    pub fn speech(language_code: impl Into<String>) -> Self {
        Self {
            modality: ResponseModality::Audio,
            response_schema: None,
            speech_language_code: Some(language_code.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub payload: PromptPayload,
    pub config: GenerationConfig,
}

/// モデル応答。テキストまたはメディア（あるいは両方）を含む。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub media: Option<DataUri>,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            media: None,
        }
    }

    pub fn media(media: DataUri) -> Self {
        Self {
            text: None,
            media: Some(media),
        }
    }

    /// 空白のみのテキストも空扱い。長さ 0 のメディアは空ではない。
    pub fn is_empty(&self) -> bool {
        let no_text = self.text.as_deref().map_or(true, |t| t.trim().is_empty());
        no_text && self.media.is_none()
    }
}

// ─── ModelError ──────────────────────────────────────────────────

#[derive(Debug, Clone, thiserror::Error)]
pub enum ModelError {
    #[error("Model not configured: {0}")]
    NotConfigured(String),
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("Model request timed out")]
    Timeout,
    #[error("Model API error: {status} - {body}")]
    Api { status: u16, body: String },
    #[error("Response decode error: {0}")]
    Decode(String),
}

impl From<ModelError> for FlowError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Timeout => FlowError::timeout(e.to_string()),
            other => FlowError::external(other.to_string()),
        }
    }
}

// ─── GenerativeModel trait ───────────────────────────────────────

/// 生成モデルの境界。フロー実行器に明示的に注入する。
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;

    fn name(&self) -> &str;
}
