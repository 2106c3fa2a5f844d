//! プロンプトテンプレートの描画。
//!
//! 構文:
//! - `{{name}}` テキストスロット
//! - `{{media name}}` メディア参照（テキストとは別パートとして出力）
//! - `{{#each name}}...{{/each}}` リストの各要素について本体を繰り返す。本体内では `{{this}}` が要素。
//!
//! 束縛値はそのまま挿入され、再解釈されない。

pub mod templates;

use std::collections::HashMap;

use crate::domain::data_uri::DataUri;
use crate::domain::error::FlowError;
use crate::infra::model::{PromptPart, PromptPayload};

/// スロットに束縛する値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Text(String),
    List(Vec<String>),
    Media(DataUri),
}

#[derive(Debug, Clone, Default)]
pub struct Bindings {
    values: HashMap<String, Binding>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_string(), Binding::Text(value.into()));
        self
    }

    pub fn list(mut self, name: &str, items: Vec<String>) -> Self {
        self.values.insert(name.to_string(), Binding::List(items));
        self
    }

    pub fn media(mut self, name: &str, media: DataUri) -> Self {
        self.values.insert(name.to_string(), Binding::Media(media));
        self
    }

    fn get(&self, name: &str) -> Result<&Binding, TemplateError> {
        self.values
            .get(name)
            .ok_or_else(|| TemplateError::Unbound(name.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("Unbound slot: {0}")]
    Unbound(String),
    #[error("Slot {slot} expects {expected}")]
    WrongKind {
        slot: String,
        expected: &'static str,
    },
    #[error("Unterminated tag at byte {0}")]
    Unterminated(usize),
    #[error("Block for {0} is never closed")]
    UnclosedBlock(String),
    #[error("Unexpected block end at byte {0}")]
    UnexpectedBlockEnd(usize),
}

impl From<TemplateError> for FlowError {
    fn from(e: TemplateError) -> Self {
        FlowError::Prompt(e.to_string())
    }
}

/// 名前付きのプロンプトテンプレート
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub source: &'static str,
}

const OPEN: &str = "{{";
const CLOSE: &str = "}}";
const EACH_END: &str = "{{/each}}";

impl PromptTemplate {
    pub const fn new(name: &'static str, source: &'static str) -> Self {
        Self { name, source }
    }

    /// テンプレートを描画し、テキスト/メディアのパート列を返す。副作用なし。
    pub fn render(&self, bindings: &Bindings) -> Result<PromptPayload, TemplateError> {
        let mut out = PartWriter::default();
        render_into(self.source, 0, bindings, None, &mut out)?;
        Ok(out.finish())
    }
}

/// 連続するテキストを 1 パートにまとめる
#[derive(Default)]
struct PartWriter {
    parts: Vec<PromptPart>,
    text: String,
}

impl PartWriter {
    fn push_text(&mut self, s: &str) {
        self.text.push_str(s);
    }

    fn push_media(&mut self, media: &DataUri) {
        self.flush();
        self.parts.push(PromptPart::Media(media.clone()));
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            self.parts.push(PromptPart::Text(std::mem::take(&mut self.text)));
        }
    }

    fn finish(mut self) -> PromptPayload {
        self.flush();
        PromptPayload { parts: self.parts }
    }
}

/// `src` を描画する。`offset` はエラー位置表示用の元テンプレート上の開始位置。
fn render_into(
    src: &str,
    offset: usize,
    bindings: &Bindings,
    this: Option<&str>,
    out: &mut PartWriter,
) -> Result<(), TemplateError> {
    let mut pos = 0;

    while let Some(found) = src[pos..].find(OPEN) {
        let tag_start = pos + found;
        out.push_text(&src[pos..tag_start]);

        let inner_start = tag_start + OPEN.len();
        let inner_len = src[inner_start..]
            .find(CLOSE)
            .ok_or(TemplateError::Unterminated(offset + tag_start))?;
        let tag = src[inner_start..inner_start + inner_len].trim();
        pos = inner_start + inner_len + CLOSE.len();

        if let Some(name) = tag.strip_prefix("#each ") {
            let name = name.trim();
            let body_len = src[pos..]
                .find(EACH_END)
                .ok_or_else(|| TemplateError::UnclosedBlock(name.to_string()))?;
            let body = &src[pos..pos + body_len];
            let items = match bindings.get(name)? {
                Binding::List(items) => items,
                _ => {
                    return Err(TemplateError::WrongKind {
                        slot: name.to_string(),
                        expected: "a list",
                    })
                }
            };
            for item in items {
                render_into(body, offset + pos, bindings, Some(item), out)?;
            }
            pos += body_len + EACH_END.len();
        } else if tag == "/each" {
            return Err(TemplateError::UnexpectedBlockEnd(offset + tag_start));
        } else if let Some(name) = tag.strip_prefix("media ") {
            let name = name.trim();
            match bindings.get(name)? {
                Binding::Media(media) => out.push_media(media),
                _ => {
                    return Err(TemplateError::WrongKind {
                        slot: name.to_string(),
                        expected: "media",
                    })
                }
            }
        } else if tag == "this" {
            let value = this.ok_or_else(|| TemplateError::Unbound("this".to_string()))?;
            out.push_text(value);
        } else {
            match bindings.get(tag)? {
                Binding::Text(value) => out.push_text(value),
                _ => {
                    return Err(TemplateError::WrongKind {
                        slot: tag.to_string(),
                        expected: "text",
                    })
                }
            }
        }
    }

    out.push_text(&src[pos..]);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(src: &'static str, bindings: &Bindings) -> Result<PromptPayload, TemplateError> {
        PromptTemplate::new("test", src).render(bindings)
    }

    #[test]
    fn test_text_slots() {
        let payload = render(
            "Hello {{ name }}, in {{lang}}.",
            &Bindings::new().text("name", "Asha").text("lang", "Tamil"),
        )
        .unwrap();
        assert_eq!(payload.parts, vec![PromptPart::Text("Hello Asha, in Tamil.".into())]);
    }

    #[test]
    fn test_each_preserves_order_and_duplicates() {
        let items = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        let payload = render(
            "List:\n{{#each items}}- {{this}}\n{{/each}}end",
            &Bindings::new().list("items", items),
        )
        .unwrap();
        assert_eq!(payload.text_content(), "List:\n- b\n- a\n- b\nend");
    }

    #[test]
    fn test_each_with_empty_list() {
        let payload = render(
            "A{{#each items}}- {{this}}\n{{/each}}B",
            &Bindings::new().list("items", vec![]),
        )
        .unwrap();
        assert_eq!(payload.text_content(), "AB");
    }

    #[test]
    fn test_media_becomes_separate_part() {
        let doc = DataUri::new("application/pdf", vec![1, 2]);
        let payload = render(
            "Form: {{media doc}} please",
            &Bindings::new().media("doc", doc.clone()),
        )
        .unwrap();
        assert_eq!(
            payload.parts,
            vec![
                PromptPart::Text("Form: ".into()),
                PromptPart::Media(doc),
                PromptPart::Text(" please".into()),
            ]
        );
    }

    #[test]
    fn test_values_are_not_reinterpreted() {
        let payload = render("{{a}}", &Bindings::new().text("a", "{{b}}")).unwrap();
        assert_eq!(payload.text_content(), "{{b}}");
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            render("{{missing}}", &Bindings::new()).unwrap_err(),
            TemplateError::Unbound("missing".into())
        );
        assert_eq!(
            render("ab{{oops", &Bindings::new()).unwrap_err(),
            TemplateError::Unterminated(2)
        );
        assert_eq!(
            render("{{#each xs}}{{this}}", &Bindings::new().list("xs", vec![])).unwrap_err(),
            TemplateError::UnclosedBlock("xs".into())
        );
        assert_eq!(
            render("x{{/each}}", &Bindings::new()).unwrap_err(),
            TemplateError::UnexpectedBlockEnd(1)
        );
        assert!(matches!(
            render("{{xs}}", &Bindings::new().list("xs", vec![])).unwrap_err(),
            TemplateError::WrongKind { .. }
        ));
        assert!(matches!(
            render("{{media t}}", &Bindings::new().text("t", "x")).unwrap_err(),
            TemplateError::WrongKind { .. }
        ));
        assert_eq!(
            render("{{this}}", &Bindings::new()).unwrap_err(),
            TemplateError::Unbound("this".into())
        );
    }
}
