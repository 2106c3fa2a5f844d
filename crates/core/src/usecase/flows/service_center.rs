use crate::domain::error::FlowError;
use crate::domain::schema::FlowContract;
use crate::domain::types::{ServiceCenterRequest, ServiceCenterResult, SERVICE_CENTER_CONTRACT};
use crate::infra::model::{ModelResponse, PromptPayload};
use crate::infra::prompts::templates::SERVICE_CENTER;
use crate::infra::prompts::Bindings;
use crate::usecase::flow::{decode_structured, Flow};

/// 解説から最寄り窓口を探すための地図検索クエリを作る
pub struct ServiceCenterFlow;

impl Flow for ServiceCenterFlow {
    type Input = ServiceCenterRequest;
    type Output = ServiceCenterResult;

    fn name(&self) -> &'static str {
        "service_center"
    }

    fn contract(&self) -> &'static FlowContract {
        &SERVICE_CENTER_CONTRACT
    }

    fn render(&self, input: &ServiceCenterRequest) -> Result<PromptPayload, FlowError> {
        Ok(SERVICE_CENTER.render(&Bindings::new().text("explanation", &input.explanation))?)
    }

    fn finish(
        &self,
        _input: &ServiceCenterRequest,
        response: ModelResponse,
    ) -> Result<ServiceCenterResult, FlowError> {
        let mut result: ServiceCenterResult =
            decode_structured(&SERVICE_CENTER_CONTRACT.output, response)?;
        result.search_query = result.search_query.trim().trim_matches('"').trim().to_string();
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_trimmed() {
        let input = ServiceCenterRequest {
            explanation: "Passport renewal".to_string(),
        };
        let res = ServiceCenterFlow
            .finish(
                &input,
                ModelResponse::text(r#"{"searchQuery":"  \"Passport Seva Kendra\" "}"#),
            )
            .unwrap();
        assert_eq!(res.search_query, "Passport Seva Kendra");
    }

    #[test]
    fn test_render_contains_explanation() {
        let input = ServiceCenterRequest {
            explanation: "Driving licence renewal".to_string(),
        };
        let payload = ServiceCenterFlow.render(&input).unwrap();
        assert!(payload.text_content().ends_with("Driving licence renewal"));
    }
}
