use serde::Serialize;

use super::schema::ValidationError;

/// ログ・メトリクス用のエラーコード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorCode {
    #[serde(rename = "E_INVALID_INPUT")]
    InvalidInput,
    #[serde(rename = "E_INVALID_OUTPUT")]
    InvalidOutput,
    #[serde(rename = "E_EMPTY_GENERATION")]
    EmptyGeneration,
    #[serde(rename = "E_EXTERNAL_SERVICE")]
    ExternalService,
    #[serde(rename = "E_TIMEOUT")]
    Timeout,
    #[serde(rename = "E_INTERNAL")]
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "E_INVALID_INPUT",
            ErrorCode::InvalidOutput => "E_INVALID_OUTPUT",
            ErrorCode::EmptyGeneration => "E_EMPTY_GENERATION",
            ErrorCode::ExternalService => "E_EXTERNAL_SERVICE",
            ErrorCode::Timeout => "E_TIMEOUT",
            ErrorCode::Internal => "E_INTERNAL",
        }
    }
}

/// フロー実行エラー。
///
/// どのフローでも部分的な結果は返さない。自動リトライもしない。
#[derive(Debug, Clone, thiserror::Error)]
pub enum FlowError {
    /// リクエストがスキーマに適合しない（外部呼び出し前に中断）
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),
    /// モデル応答がスキーマに適合しない
    #[error("Invalid model output: {0}")]
    InvalidOutput(String),
    /// モデルが使える出力を返さなかった
    #[error("Model returned no usable output: {0}")]
    EmptyGeneration(String),
    /// 通信・モデル呼び出しの失敗
    #[error("External service error: {detail}")]
    ExternalService { detail: String, timeout: bool },
    /// テンプレートが未束縛のスロットを参照した
    #[error("Prompt rendering failed: {0}")]
    Prompt(String),
}

impl FlowError {
    pub fn invalid_output(detail: impl Into<String>) -> Self {
        Self::InvalidOutput(detail.into())
    }

    pub fn empty_generation(detail: impl Into<String>) -> Self {
        Self::EmptyGeneration(detail.into())
    }

    pub fn external(detail: impl Into<String>) -> Self {
        Self::ExternalService {
            detail: detail.into(),
            timeout: false,
        }
    }

    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::ExternalService {
            detail: detail.into(),
            timeout: true,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            FlowError::InvalidInput(_) => ErrorCode::InvalidInput,
            FlowError::InvalidOutput(_) => ErrorCode::InvalidOutput,
            FlowError::EmptyGeneration(_) => ErrorCode::EmptyGeneration,
            FlowError::ExternalService { timeout: true, .. } => ErrorCode::Timeout,
            FlowError::ExternalService { .. } => ErrorCode::ExternalService,
            FlowError::Prompt(_) => ErrorCode::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes() {
        let e: FlowError = ValidationError::NotAnObject { schema: "X" }.into();
        assert_eq!(e.code(), ErrorCode::InvalidInput);
        assert_eq!(FlowError::invalid_output("x").code(), ErrorCode::InvalidOutput);
        assert_eq!(FlowError::empty_generation("x").code(), ErrorCode::EmptyGeneration);
        assert_eq!(FlowError::external("x").code(), ErrorCode::ExternalService);
        assert_eq!(FlowError::timeout("x").code(), ErrorCode::Timeout);
        assert_eq!(FlowError::Prompt("x".into()).code(), ErrorCode::Internal);
    }

    #[test]
    fn display_carries_detail() {
        let msg = FlowError::external("HTTP 503").to_string();
        assert!(msg.contains("External service"));
        assert!(msg.contains("HTTP 503"));
    }

    #[test]
    fn as_str_matches_serde_name() {
        for code in [
            ErrorCode::InvalidInput,
            ErrorCode::InvalidOutput,
            ErrorCode::EmptyGeneration,
            ErrorCode::ExternalService,
            ErrorCode::Timeout,
            ErrorCode::Internal,
        ] {
            let json = serde_json::to_string(&code).unwrap();
            assert_eq!(json, format!("\"{}\"", code.as_str()));
        }
    }
}
