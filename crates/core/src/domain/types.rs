use serde::{Deserialize, Serialize};

use super::language::Language;
use super::schema::{Field, FlowContract, Schema};

// ─── フロー契約 ──────────────────────────────────────────────────

const LANGUAGE_DESCRIPTION: &str = "One of the supported languages.";

/// 書類解説フロー
pub static EXPLAIN_CONTRACT: FlowContract = FlowContract {
    input: Schema {
        name: "ExplainRequest",
        fields: &[
            Field::data_uri(
                "documentDataUri",
                "The government form as a data URI: 'data:<mimetype>;base64,<encoded_data>'. PDF, JPEG or PNG.",
            ),
            Field::choice("language", Language::NAMES, "The language to explain the form in.")
                .with_default("English"),
        ],
    },
    output: Schema {
        name: "ExplainResult",
        fields: &[Field::non_empty_text(
            "explanation",
            "A simplified explanation of the government form.",
        )],
    },
};

/// 解説（とチェックリスト）の翻訳フロー
pub static TRANSLATE_CONTRACT: FlowContract = FlowContract {
    input: Schema {
        name: "TranslateRequest",
        fields: &[
            Field::text("explanation", "The explanation to be translated."),
            Field::text_list("checklist", "The checklist of steps to be translated.").optional(),
            Field::choice("language", Language::NAMES, "The target language for the translation."),
        ],
    },
    output: Schema {
        name: "TranslateResult",
        fields: &[
            Field::non_empty_text("translatedExplanation", "The translated explanation."),
            Field::text_list(
                "translatedChecklist",
                "The translated checklist, one entry per input step, in the same order.",
            )
            .optional(),
        ],
    },
};

/// 窓口検索クエリ生成フロー
pub static SERVICE_CENTER_CONTRACT: FlowContract = FlowContract {
    input: Schema {
        name: "ServiceCenterRequest",
        fields: &[Field::text("explanation", "The explanation of the government form.")],
    },
    output: Schema {
        name: "ServiceCenterResult",
        fields: &[Field::non_empty_text(
            "searchQuery",
            "A concise map search query for nearby service centers, e.g. \"Passport Seva Kendra\".",
        )],
    },
};

/// 音声合成フロー
pub static SPEECH_CONTRACT: FlowContract = FlowContract {
    input: Schema {
        name: "SpeechRequest",
        fields: &[
            Field::text("text", "The text to be converted to speech."),
            Field::choice("language", Language::NAMES, LANGUAGE_DESCRIPTION),
        ],
    },
    output: Schema {
        name: "SpeechResult",
        fields: &[Field::non_empty_text("audioDataUri", "The synthesized audio as a WAV data URI.")],
    },
};

// ─── リクエスト / レスポンス ─────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainRequest {
    pub document_data_uri: String,
    #[serde(default)]
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainResult {
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<Vec<String>>,
    pub language: Language,
}

/// `translated_checklist` は入力にチェックリストがあった場合のみ存在する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResult {
    pub translated_explanation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_checklist: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceCenterRequest {
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCenterResult {
    pub search_query: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    pub language: Language,
}

/// `audio_data_uri` は `data:audio/wav;base64,...`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechResult {
    pub audio_data_uri: String,
}
