use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::domain::settings::ModelSettings;
use crate::domain::types::{ExplainResult, ServiceCenterResult, SpeechResult, TranslateResult};
use crate::infra::metrics::{Metrics, MetricsSummary};
use crate::infra::model::gemini::GeminiModel;
use crate::infra::model::{GenerativeModel, ModelError};
use crate::usecase::flow::{to_raw, Flow, FlowExecutor};
use crate::usecase::flows::{
    ExplainFormFlow, ServiceCenterFlow, SpeechFlow, TranslateExplanationFlow,
};

/// UI に公開する操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Explain,
    Translate,
    ServiceCenter,
    Speech,
}

impl Operation {
    /// エンドユーザーに見せる固定メッセージ
    pub fn user_message(&self) -> &'static str {
        match self {
            Operation::Explain => "Failed to get explanation from AI service.",
            Operation::Translate => "Failed to translate explanation from AI service.",
            Operation::ServiceCenter => "Failed to find a service center from AI service.",
            Operation::Speech => "Failed to generate audio from AI service.",
        }
    }

    fn action_name(&self) -> &'static str {
        match self {
            Operation::Explain => "get_explanation",
            Operation::Translate => "translate_explanation",
            Operation::ServiceCenter => "find_service_center",
            Operation::Speech => "synthesize_speech",
        }
    }
}

/// アクションエラー。内部の詳細はログにのみ残し、ここには含めない。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}", .operation.user_message())]
pub struct ActionError {
    pub operation: Operation,
}

impl ActionError {
    pub fn message(&self) -> &'static str {
        self.operation.user_message()
    }
}

impl Serialize for ActionError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.message())
    }
}

type ActionResult<T> = Result<T, ActionError>;

/// アクション境界（UI 層から呼ばれる非同期操作の集合）
pub struct FormActions {
    executor: FlowExecutor,
    metrics: Metrics,
}

impl FormActions {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self {
            executor: FlowExecutor::new(model),
            metrics: Metrics::new(),
        }
    }

    /// 設定から Gemini クライアントを構築する
    pub fn from_settings(settings: ModelSettings) -> Result<Self, ModelError> {
        let model = GeminiModel::new(settings)?;
        log::info!("Using {} generative model", model.name());
        Ok(Self::new(Arc::new(model)))
    }

    /// 書類を解説する。`request` は `ExplainRequest` 相当の JSON オブジェクト。
    pub async fn get_explanation<R>(&self, request: &R) -> ActionResult<ExplainResult>
    where
        R: Serialize + Sync + ?Sized,
    {
        self.invoke(Operation::Explain, &ExplainFormFlow, request).await
    }

    pub async fn translate_explanation<R>(&self, request: &R) -> ActionResult<TranslateResult>
    where
        R: Serialize + Sync + ?Sized,
    {
        self.invoke(Operation::Translate, &TranslateExplanationFlow, request)
            .await
    }

    pub async fn find_service_center<R>(&self, request: &R) -> ActionResult<ServiceCenterResult>
    where
        R: Serialize + Sync + ?Sized,
    {
        self.invoke(Operation::ServiceCenter, &ServiceCenterFlow, request)
            .await
    }

    pub async fn synthesize_speech<R>(&self, request: &R) -> ActionResult<SpeechResult>
    where
        R: Serialize + Sync + ?Sized,
    {
        self.invoke(Operation::Speech, &SpeechFlow, request).await
    }

    pub fn metrics(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    async fn invoke<F, R>(&self, operation: Operation, flow: &F, request: &R) -> ActionResult<F::Output>
    where
        F: Flow,
        R: Serialize + Sync + ?Sized,
    {
        let started = Instant::now();
        self.metrics.inc_invocation(flow.name());

        let result = match to_raw(flow, request) {
            Ok(raw) => self.executor.execute(flow, raw).await,
            Err(e) => Err(e),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        self.metrics.record_latency(flow.name(), elapsed_ms);

        match result {
            Ok(output) => {
                self.metrics.inc_success(flow.name());
                log::info!("{} completed in {}ms", operation.action_name(), elapsed_ms);
                Ok(output)
            }
            Err(e) => {
                let code = e.code();
                self.metrics.inc_error(code);
                log::error!(
                    "Error in {} [{}]: {}",
                    operation.action_name(),
                    code.as_str(),
                    e
                );
                Err(ActionError { operation })
            }
        }
    }
}
