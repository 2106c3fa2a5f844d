use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{GenerativeModel, ModelError, ModelRequest, ModelResponse};
use crate::domain::data_uri::DataUri;

type Script = dyn Fn(&ModelRequest) -> Result<ModelResponse, ModelError> + Send + Sync;

/// ScriptedModel: クロージャで応答を決めるテスト用モデル。
/// 受け取ったリクエストはすべて記録する。
pub struct ScriptedModel {
    script: Box<Script>,
    requests: Mutex<Vec<ModelRequest>>,
}

impl ScriptedModel {
    pub fn new<F>(script: F) -> Self
    where
        F: Fn(&ModelRequest) -> Result<ModelResponse, ModelError> + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 常に同じテキストを返す
    pub fn replying_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self::new(move |_| Ok(ModelResponse::text(text.clone())))
    }

    /// 常に同じ JSON を（テキストとして）返す
    pub fn replying_json(value: Value) -> Self {
        Self::replying_text(value.to_string())
    }

    /// 常に同じメディアを返す
    pub fn replying_media(media: DataUri) -> Self {
        Self::new(move |_| Ok(ModelResponse::media(media.clone())))
    }

    /// 常に失敗する
    pub fn failing(error: ModelError) -> Self {
        Self::new(move |_| Err(error.clone()))
    }

    pub fn requests(&self) -> Vec<ModelRequest> {
        self.requests.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let response = (self.script)(&request);
        self.requests.lock().push(request);
        response
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
