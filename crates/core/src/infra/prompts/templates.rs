//! フロー別プロンプトテンプレート

use super::PromptTemplate;

/// 書類解説: 言語指定 + 書類本体（メディア）
pub const EXPLAIN_FORM: PromptTemplate = PromptTemplate::new(
    "explain_form",
    "\
You are an expert at turning complicated government forms into plain language.
Read the form below, pull out the key information, and explain what the form is for \
and what the applicant has to provide, using short sentences a first-time applicant can follow.
Write the whole explanation in the requested language.

Language: {{language}}

Form: {{media documentDataUri}}",
);

/// 解説のみの翻訳
pub const TRANSLATE_EXPLANATION: PromptTemplate = PromptTemplate::new(
    "translate_explanation",
    "\
Translate the following explanation of a government form into {{language}}.
Keep the meaning and structure; do not add or drop information.

Explanation:
{{explanation}}
",
);

/// 解説 + チェックリストの翻訳。チェックリストは 1 要素 1 行、入力順のまま。
pub const TRANSLATE_WITH_CHECKLIST: PromptTemplate = PromptTemplate::new(
    "translate_with_checklist",
    "\
Translate the following explanation and checklist for a government form into {{language}}.
Keep the meaning and structure; do not add or drop information.
Return exactly one translated checklist entry per input line, in the same order.

Explanation:
{{explanation}}

Checklist:
{{#each checklist}}- {{this}}
{{/each}}",
);

/// 窓口検索クエリ
pub const SERVICE_CENTER: PromptTemplate = PromptTemplate::new(
    "service_center",
    "\
Based on the following explanation of a government form, decide which kind of public \
service center handles it and write a short map search query for finding one nearby.

For example:
- An Aadhaar card form: \"Aadhar Kendra\"
- A passport form: \"Passport Seva Kendra\"
- A driving licence form: \"RTO Office\"

Return only the search query.

Explanation:
{{explanation}}",
);

/// 音声合成: 読み上げるテキストそのもの
pub const SPEECH: PromptTemplate = PromptTemplate::new("speech", "{{text}}");
