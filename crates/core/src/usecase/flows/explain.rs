use crate::domain::data_uri::DataUri;
use crate::domain::error::FlowError;
use crate::domain::schema::{FlowContract, ValidationError};
use crate::domain::types::{ExplainRequest, ExplainResult, EXPLAIN_CONTRACT};
use crate::infra::model::PromptPayload;
use crate::infra::prompts::templates::EXPLAIN_FORM;
use crate::infra::prompts::Bindings;
use crate::usecase::flow::Flow;

/// アップロードされた書類を指定言語でやさしく解説する
pub struct ExplainFormFlow;

impl Flow for ExplainFormFlow {
    type Input = ExplainRequest;
    type Output = ExplainResult;

    fn name(&self) -> &'static str {
        "explain_form"
    }

    fn contract(&self) -> &'static FlowContract {
        &EXPLAIN_CONTRACT
    }

    fn render(&self, input: &ExplainRequest) -> Result<PromptPayload, FlowError> {
        let document = DataUri::parse(&input.document_data_uri).map_err(|source| {
            ValidationError::DataUri {
                schema: EXPLAIN_CONTRACT.input.name,
                field: "documentDataUri",
                source,
            }
        })?;

        let bindings = Bindings::new()
            .text("language", input.language.as_str())
            .media("documentDataUri", document);
        Ok(EXPLAIN_FORM.render(&bindings)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::language::Language;
    use crate::infra::model::{PromptPart, ResponseModality};

    #[test]
    fn test_render_mixes_text_and_media() {
        let input = ExplainRequest {
            document_data_uri: "data:application/pdf;base64,JVBERi0=".to_string(),
            language: Language::Bengali,
        };
        let payload = ExplainFormFlow.render(&input).unwrap();
        assert!(payload.text_content().contains("Language: Bengali"));
        let media: Vec<_> = payload.media().collect();
        assert_eq!(media.len(), 1);
        assert_eq!(media[0].mime_type, "application/pdf");
        assert_eq!(media[0].data, b"%PDF-");
        assert!(matches!(payload.parts[0], PromptPart::Text(_)));
    }

    #[test]
    fn test_generation_config_is_structured() {
        let input = ExplainRequest {
            document_data_uri: "data:image/png;base64,AAAA".to_string(),
            language: Language::English,
        };
        let config = ExplainFormFlow.generation_config(&input);
        assert_eq!(config.modality, ResponseModality::Text);
        let schema = config.response_schema.unwrap();
        assert_eq!(schema["required"], serde_json::json!(["explanation"]));
    }
}
