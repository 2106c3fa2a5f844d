use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    GenerationConfig, GenerativeModel, ModelError, ModelRequest, ModelResponse, PromptPart,
    ResponseModality,
};
use crate::domain::data_uri::DataUri;
use crate::domain::settings::ModelSettings;

/// Gemini API (generateContent) を使用した生成モデル
pub struct GeminiModel {
    client: reqwest::Client,
    settings: ModelSettings,
    api_key: String,
}

// ─── リクエスト ──────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfigBody,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_modalities: Option<Vec<&'static str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    speech_config: Option<SpeechConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeechConfig {
    language_code: String,
}

// ─── レスポンス ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    code: u16,
}

impl GeminiModel {
    pub fn new(settings: ModelSettings) -> Result<Self, ModelError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ModelError::NotConfigured("GEMINI_API_KEY is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ModelError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            settings,
            api_key,
        })
    }

    /// 応答モダリティに応じたモデル名
    fn model_for(&self, config: &GenerationConfig) -> &str {
        match config.modality {
            ResponseModality::Text => &self.settings.text_model,
            ResponseModality::Audio => &self.settings.speech_model,
        }
    }

    fn build_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.settings.endpoint.trim_end_matches('/'),
            model
        )
    }
}

fn build_body(request: &ModelRequest, temperature: Option<f32>) -> GenerateContentRequest {
    let parts = request
        .payload
        .parts
        .iter()
        .map(|part| match part {
            PromptPart::Text(text) => Part {
                text: Some(text.clone()),
                inline_data: None,
            },
            PromptPart::Media(media) => Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: media.mime_type.clone(),
                    data: BASE64.encode(&media.data),
                }),
            },
        })
        .collect();

    let config = &request.config;
    let generation_config = match config.modality {
        ResponseModality::Text => GenerationConfigBody {
            temperature,
            response_mime_type: config.response_schema.as_ref().map(|_| "application/json"),
            response_schema: config.response_schema.clone(),
            ..Default::default()
        },
        ResponseModality::Audio => GenerationConfigBody {
            temperature,
            response_modalities: Some(vec!["AUDIO"]),
            speech_config: config
                .speech_language_code
                .as_ref()
                .map(|code| SpeechConfig {
                    language_code: code.clone(),
                }),
            ..Default::default()
        },
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts,
        }],
        generation_config,
    }
}

/// generateContent の応答本文を解釈する。
///
/// 候補なし・パートなしは空応答として返す（空判定は呼び出し側）。
fn parse_response(body: &str) -> Result<ModelResponse, ModelError> {
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| ModelError::Decode(format!("Response parse error: {e}")))?;

    if let Some(error) = parsed.error {
        return Err(ModelError::Api {
            status: error.code,
            body: error.message,
        });
    }

    let parts = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default();

    let mut text = String::new();
    let mut media = None;
    for part in parts {
        if let Some(t) = part.text {
            text.push_str(&t);
        }
        if media.is_none() {
            if let Some(inline) = part.inline_data {
                let data = BASE64
                    .decode(inline.data.trim())
                    .map_err(|e| ModelError::Decode(format!("Invalid inline data: {e}")))?;
                media = Some(DataUri::new(inline.mime_type, data));
            }
        }
    }

    Ok(ModelResponse {
        text: if text.is_empty() { None } else { Some(text) },
        media,
    })
}

#[async_trait]
impl GenerativeModel for GeminiModel {
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let model = self.model_for(&request.config).to_string();
        let body = build_body(&request, self.settings.temperature);

        log::debug!(
            "Gemini request: model={model}, parts={}, modality={:?}",
            body.contents.first().map_or(0, |c| c.parts.len()),
            request.config.modality
        );

        let response = self
            .client
            .post(self.build_url(&model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout
                } else {
                    ModelError::Http(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ModelError::Timeout
            } else {
                ModelError::Http(e.to_string())
            }
        })?;

        parse_response(&text)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::model::PromptPayload;
    use serde_json::json;

    fn settings() -> ModelSettings {
        ModelSettings {
            api_key: Some("test-key".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_api_key() {
        let err = GeminiModel::new(ModelSettings::default()).err().unwrap();
        assert!(matches!(err, ModelError::NotConfigured(_)));
    }

    #[test]
    fn test_model_selection_and_url() {
        let model = GeminiModel::new(settings()).unwrap();
        assert_eq!(model.name(), "gemini");
        assert_eq!(
            model.model_for(&GenerationConfig::speech("hi-IN")),
            settings().speech_model
        );
        assert_eq!(
            model.model_for(&GenerationConfig::default()),
            settings().text_model
        );
        assert_eq!(
            model.build_url("m"),
            "https://generativelanguage.googleapis.com/v1beta/models/m:generateContent"
        );
    }

    #[test]
    fn test_structured_body() {
        let request = ModelRequest {
            payload: PromptPayload {
                parts: vec![
                    PromptPart::Text("Language: Hindi".into()),
                    PromptPart::Media(DataUri::new("image/png", vec![0, 0, 0])),
                ],
            },
            config: GenerationConfig::structured(json!({ "type": "OBJECT" })),
        };
        let body = serde_json::to_value(build_body(&request, Some(0.2))).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Language: Hindi");
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"],
            json!({ "mimeType": "image/png", "data": "AAAA" })
        );
        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert_eq!(config["responseSchema"]["type"], "OBJECT");
        assert!((config["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert!(config.get("responseModalities").is_none());
    }

    #[test]
    fn test_speech_body() {
        let request = ModelRequest {
            payload: PromptPayload::text("नमस्ते"),
            config: GenerationConfig::speech("hi-IN"),
        };
        let body = serde_json::to_value(build_body(&request, None)).unwrap();
        let config = &body["generationConfig"];
        assert_eq!(config["responseModalities"], json!(["AUDIO"]));
        assert_eq!(config["speechConfig"]["languageCode"], "hi-IN");
        assert!(config.get("responseMimeType").is_none());
        assert!(config.get("temperature").is_none());
    }

    #[test]
    fn test_parse_text_parts_are_joined() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"{\"explanation\":"},{"text":"\"x\"}"}]}}]}"#;
        let res = parse_response(body).unwrap();
        assert_eq!(res.text.as_deref(), Some(r#"{"explanation":"x"}"#));
        assert!(res.media.is_none());
    }

    #[test]
    fn test_parse_inline_audio() {
        let body = r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"audio/L16;codec=pcm;rate=24000","data":"AQIDBA=="}}]}}]}"#;
        let res = parse_response(body).unwrap();
        let media = res.media.unwrap();
        assert_eq!(media.mime_type, "audio/L16;codec=pcm;rate=24000");
        assert_eq!(media.data, vec![1, 2, 3, 4]);
        assert!(res.text.is_none());
    }

    #[test]
    fn test_parse_no_candidates_is_empty() {
        let res = parse_response(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).unwrap();
        assert!(res.is_empty());
    }

    #[test]
    fn test_parse_api_error() {
        let err = parse_response(r#"{"error":{"code":400,"message":"API key not valid"}}"#)
            .unwrap_err();
        assert!(matches!(err, ModelError::Api { status: 400, ref body } if body == "API key not valid"));
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_response("<html>"), Err(ModelError::Decode(_))));
    }
}
