use crate::domain::error::FlowError;
use crate::domain::schema::FlowContract;
use crate::domain::types::{TranslateRequest, TranslateResult, TRANSLATE_CONTRACT};
use crate::infra::model::{ModelResponse, PromptPayload};
use crate::infra::prompts::templates::{TRANSLATE_EXPLANATION, TRANSLATE_WITH_CHECKLIST};
use crate::infra::prompts::Bindings;
use crate::usecase::flow::{decode_structured, Flow};

/// 解説（と提出チェックリスト）を別の言語に翻訳する
pub struct TranslateExplanationFlow;

impl Flow for TranslateExplanationFlow {
    type Input = TranslateRequest;
    type Output = TranslateResult;

    fn name(&self) -> &'static str {
        "translate_explanation"
    }

    fn contract(&self) -> &'static FlowContract {
        &TRANSLATE_CONTRACT
    }

    fn render(&self, input: &TranslateRequest) -> Result<PromptPayload, FlowError> {
        let bindings = Bindings::new()
            .text("language", input.language.as_str())
            .text("explanation", &input.explanation);

        let payload = match &input.checklist {
            Some(items) => {
                let lines = items.iter().map(|item| single_line(item)).collect();
                TRANSLATE_WITH_CHECKLIST.render(&bindings.list("checklist", lines))?
            }
            None => TRANSLATE_EXPLANATION.render(&bindings)?,
        };
        Ok(payload)
    }

    /// チェックリストは入力にあった場合のみ、同じ件数で返す。
    fn finish(
        &self,
        input: &TranslateRequest,
        response: ModelResponse,
    ) -> Result<TranslateResult, FlowError> {
        let mut result: TranslateResult = decode_structured(&TRANSLATE_CONTRACT.output, response)?;

        match (&input.checklist, result.translated_checklist.take()) {
            (None, None) => {}
            (None, Some(_)) => {
                log::warn!("Dropping translatedChecklist for a request without checklist");
            }
            (Some(items), None) if items.is_empty() => {
                result.translated_checklist = Some(Vec::new());
            }
            (Some(_), None) => {
                return Err(FlowError::invalid_output(
                    "TranslateResult.translatedChecklist: required field is missing",
                ));
            }
            (Some(items), Some(translated)) => {
                if translated.len() != items.len() {
                    return Err(FlowError::invalid_output(format!(
                        "TranslateResult.translatedChecklist: expected {} entries, got {}",
                        items.len(),
                        translated.len()
                    )));
                }
                result.translated_checklist = Some(translated);
            }
        }

        Ok(result)
    }
}

/// チェックリスト 1 要素 = プロンプト 1 行。要素内の改行は空白にする。
fn single_line(item: &str) -> String {
    item.split(['\r', '\n'])
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::language::Language;
    use serde_json::json;

    fn request(checklist: Option<Vec<&str>>) -> TranslateRequest {
        TranslateRequest {
            explanation: "Fill in your name.".to_string(),
            checklist: checklist.map(|c| c.into_iter().map(String::from).collect()),
            language: Language::Hindi,
        }
    }

    fn reply(value: serde_json::Value) -> ModelResponse {
        ModelResponse::text(value.to_string())
    }

    #[test]
    fn test_render_picks_template() {
        let with = TranslateExplanationFlow
            .render(&request(Some(vec!["Sign", "Attach ID"])))
            .unwrap()
            .text_content();
        assert!(with.contains("Checklist:\n- Sign\n- Attach ID\n"));

        let without = TranslateExplanationFlow
            .render(&request(None))
            .unwrap()
            .text_content();
        assert!(!without.contains("Checklist"));
        assert!(without.contains("into Hindi"));
    }

    #[test]
    fn test_checklist_dropped_when_not_requested() {
        let res = TranslateExplanationFlow
            .finish(
                &request(None),
                reply(json!({ "translatedExplanation": "t", "translatedChecklist": ["x"] })),
            )
            .unwrap();
        assert_eq!(res.translated_checklist, None);
    }

    #[test]
    fn test_checklist_required_when_requested() {
        let err = TranslateExplanationFlow
            .finish(&request(Some(vec!["a"])), reply(json!({ "translatedExplanation": "t" })))
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidOutput(_)));
    }

    #[test]
    fn test_checklist_length_mismatch() {
        let err = TranslateExplanationFlow
            .finish(
                &request(Some(vec!["a", "b"])),
                reply(json!({ "translatedExplanation": "t", "translatedChecklist": ["x"] })),
            )
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidOutput(ref m) if m.contains("expected 2")));
    }

    #[test]
    fn test_empty_checklist_tolerates_missing_output() {
        let res = TranslateExplanationFlow
            .finish(&request(Some(vec![])), reply(json!({ "translatedExplanation": "t" })))
            .unwrap();
        assert_eq!(res.translated_checklist, Some(vec![]));
    }

    #[test]
    fn test_line_breaks_inside_items_are_flattened() {
        let text = TranslateExplanationFlow
            .render(&request(Some(vec!["Sign\nhere", "Attach\r\nphoto", "Done"])))
            .unwrap()
            .text_content();
        assert!(text.ends_with("Checklist:\n- Sign here\n- Attach photo\n- Done\n"));
        let lines = text.split("Checklist:\n").nth(1).unwrap().lines().count();
        assert_eq!(lines, 3);
    }

    #[test]
    fn test_single_line() {
        assert_eq!(single_line("a\n\nb"), "a b");
        assert_eq!(single_line("\r\nx\r"), "x");
        assert_eq!(single_line("plain"), "plain");
    }
}
