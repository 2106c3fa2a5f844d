use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::domain::error::FlowError;
use crate::domain::schema::{FlowContract, Schema, ValidationError};
use crate::infra::model::{
    GenerationConfig, GenerativeModel, ModelRequest, ModelResponse, PromptPayload,
};

/// 1 つのユースケース（解説・翻訳・窓口検索・音声合成）の定義。
///
/// 実行の流れは `FlowExecutor` が共通で持ち、フローはスキーマ・プロンプト・
/// 生成設定・後処理だけを差し替える。
pub trait Flow: Send + Sync {
    type Input: DeserializeOwned + Send + Sync;
    type Output: DeserializeOwned + Serialize + Send;

    fn name(&self) -> &'static str;

    fn contract(&self) -> &'static FlowContract;

    /// 検証済み入力からプロンプトを組み立てる。
    fn render(&self, input: &Self::Input) -> Result<PromptPayload, FlowError>;

    /// 既定: 出力スキーマを渡した構造化テキスト応答。
    fn generation_config(&self, _input: &Self::Input) -> GenerationConfig {
        GenerationConfig::structured(self.contract().output.to_json_schema())
    }

    /// モデル応答を出力型に変換する。既定: JSON テキストを出力スキーマで検証。
    fn finish(&self, _input: &Self::Input, response: ModelResponse) -> Result<Self::Output, FlowError> {
        decode_structured(&self.contract().output, response)
    }
}

/// フロー実行器。モデルは外から注入する。
///
/// 状態を持たないので、同じ実行器で任意の数のフローを並行に実行できる。
#[derive(Clone)]
pub struct FlowExecutor {
    model: Arc<dyn GenerativeModel>,
}

impl FlowExecutor {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// 入力検証 → プロンプト描画 → モデル呼び出し → 出力検証 → (後処理)。
    ///
    /// 入力が不正な場合はモデルを呼ばずに失敗する。リトライはしない。
    pub async fn execute<F: Flow>(&self, flow: &F, raw: Value) -> Result<F::Output, FlowError> {
        let contract = flow.contract();
        let input: F::Input = contract.input.parse(raw)?;

        let payload = flow.render(&input)?;
        let config = flow.generation_config(&input);
        log::debug!(
            "[{}] invoking model {} ({} parts, modality {:?})",
            flow.name(),
            self.model.name(),
            payload.parts.len(),
            config.modality
        );

        let response = self.model.generate(ModelRequest { payload, config }).await?;
        if response.is_empty() {
            return Err(FlowError::empty_generation(format!(
                "{} received an empty model response",
                flow.name()
            )));
        }

        let output = flow.finish(&input, response)?;

        // 後処理後の最終出力もスキーマで確認する
        let value = serde_json::to_value(&output)
            .map_err(|e| FlowError::invalid_output(e.to_string()))?;
        contract
            .output
            .validate(value)
            .map_err(|e| FlowError::invalid_output(e.to_string()))?;

        Ok(output)
    }

    /// 型付きリクエストで実行する（同じ検証を通る）。
    pub async fn run<F, R>(&self, flow: &F, request: &R) -> Result<F::Output, FlowError>
    where
        F: Flow,
        R: Serialize + Sync + ?Sized,
    {
        let raw = to_raw(flow, request)?;
        self.execute(flow, raw).await
    }
}

/// リクエストを JSON 値に変換する。失敗は入力エラー扱い。
pub(crate) fn to_raw<F, R>(flow: &F, request: &R) -> Result<Value, FlowError>
where
    F: Flow,
    R: Serialize + ?Sized,
{
    serde_json::to_value(request).map_err(|e| {
        FlowError::InvalidInput(ValidationError::Shape {
            schema: flow.contract().input.name,
            detail: e.to_string(),
        })
    })
}

/// 構造化テキスト応答を JSON として読み、スキーマ検証して型に変換する。
pub fn decode_structured<T: DeserializeOwned>(
    schema: &Schema,
    response: ModelResponse,
) -> Result<T, FlowError> {
    let text = response
        .text
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| FlowError::empty_generation(format!("{} has no text", schema.name)))?;

    let value: Value = serde_json::from_str(strip_code_fence(&text)).map_err(|e| {
        FlowError::invalid_output(format!("{}: response is not JSON: {e}", schema.name))
    })?;

    schema
        .parse(value)
        .map_err(|e| FlowError::invalid_output(e.to_string()))
}

/// ```json ... ``` で囲まれた応答から中身を取り出す。
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest,
    };
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}
