//! 行政書類のやさしい解説・翻訳・読み上げを生成するコアライブラリ。
//!
//! - `domain`: 言語・リクエスト/レスポンス型・スキーマ検証などの純粋な型
//! - `infra`: 生成モデル、プロンプトテンプレート、WAV エンコーダ、メトリクス
//! - `usecase`: フロー実行器と UI 向けアクション境界

pub mod domain;
pub mod infra;
pub mod usecase;
