use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use super::data_uri::{DataUri, DataUriError};

// ─── Field / Schema ──────────────────────────────────────────────

/// フィールドの型制約。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// 文字列。`non_empty` の場合は空白のみの文字列も拒否する。
    Text { non_empty: bool },
    /// 文字列の配列（順序保持）
    TextList,
    /// 閉じた集合からの選択。集合外の値は変換せず拒否する。
    Choice(&'static [&'static str]),
    /// `data:<mime>;base64,<bytes>` 形式の文字列
    DataUri,
}

/// スキーマの 1 フィールド。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
    /// 欠落時に補う値（`Text` / `Choice` のみ）
    pub default: Option<&'static str>,
    pub description: &'static str,
}

impl Field {
    pub const fn text(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            ty: FieldType::Text { non_empty: false },
            required: true,
            default: None,
            description,
        }
    }

    pub const fn non_empty_text(name: &'static str, description: &'static str) -> Self {
        Self {
            ty: FieldType::Text { non_empty: true },
            ..Self::text(name, description)
        }
    }

    pub const fn text_list(name: &'static str, description: &'static str) -> Self {
        Self {
            ty: FieldType::TextList,
            ..Self::text(name, description)
        }
    }

    pub const fn choice(
        name: &'static str,
        allowed: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self {
            ty: FieldType::Choice(allowed),
            ..Self::text(name, description)
        }
    }

    pub const fn data_uri(name: &'static str, description: &'static str) -> Self {
        Self {
            ty: FieldType::DataUri,
            ..Self::text(name, description)
        }
    }

    pub const fn optional(self) -> Self {
        Self {
            required: false,
            ..self
        }
    }

    pub const fn with_default(self, default: &'static str) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    fn check(&self, schema: &'static str, value: &Value) -> Result<(), ValidationError> {
        let field = self.name;
        match self.ty {
            FieldType::Text { non_empty } => {
                let s = value.as_str().ok_or(ValidationError::WrongType {
                    schema,
                    field,
                    expected: "string",
                })?;
                if non_empty && s.trim().is_empty() {
                    return Err(ValidationError::Empty { schema, field });
                }
            }
            FieldType::TextList => {
                let items = value.as_array().ok_or(ValidationError::WrongType {
                    schema,
                    field,
                    expected: "array of strings",
                })?;
                if let Some(index) = items.iter().position(|item| !item.is_string()) {
                    return Err(ValidationError::ElementType {
                        schema,
                        field,
                        index,
                    });
                }
            }
            FieldType::Choice(allowed) => {
                let s = value.as_str().ok_or(ValidationError::WrongType {
                    schema,
                    field,
                    expected: "string",
                })?;
                if !allowed.contains(&s) {
                    return Err(ValidationError::NotAllowed {
                        schema,
                        field,
                        value: s.to_string(),
                        allowed,
                    });
                }
            }
            FieldType::DataUri => {
                let s = value.as_str().ok_or(ValidationError::WrongType {
                    schema,
                    field,
                    expected: "data URI string",
                })?;
                DataUri::parse(s).map_err(|source| ValidationError::DataUri {
                    schema,
                    field,
                    source,
                })?;
            }
        }
        Ok(())
    }

    fn json_schema(&self) -> Value {
        let mut schema = match self.ty {
            FieldType::Text { .. } | FieldType::DataUri => json!({ "type": "STRING" }),
            FieldType::TextList => json!({ "type": "ARRAY", "items": { "type": "STRING" } }),
            FieldType::Choice(allowed) => json!({ "type": "STRING", "enum": allowed }),
        };
        if !self.description.is_empty() {
            schema["description"] = Value::String(self.description.to_string());
        }
        schema
    }
}

/// オブジェクト型のスキーマ。プロセス起動時に静的に定義し、変更しない。
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [Field],
}

/// フローごとの入力/出力スキーマの組。
#[derive(Debug, Clone, Copy)]
pub struct FlowContract {
    pub input: Schema,
    pub output: Schema,
}

// ─── ValidationError ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{schema}: expected a JSON object")]
    NotAnObject { schema: &'static str },
    #[error("{schema}.{field}: required field is missing")]
    MissingField {
        schema: &'static str,
        field: &'static str,
    },
    #[error("{schema}.{field}: expected {expected}")]
    WrongType {
        schema: &'static str,
        field: &'static str,
        expected: &'static str,
    },
    #[error("{schema}.{field}: {value:?} is not one of {allowed:?}")]
    NotAllowed {
        schema: &'static str,
        field: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },
    #[error("{schema}.{field}: must not be empty")]
    Empty {
        schema: &'static str,
        field: &'static str,
    },
    #[error("{schema}.{field}[{index}]: expected a string")]
    ElementType {
        schema: &'static str,
        field: &'static str,
        index: usize,
    },
    #[error("{schema}.{field}: {source}")]
    DataUri {
        schema: &'static str,
        field: &'static str,
        source: DataUriError,
    },
    #[error("{schema}: {detail}")]
    Shape { schema: &'static str, detail: String },
}

// ─── 検証 ────────────────────────────────────────────────────────

impl Schema {
    /// 値を検証し、デフォルト補完済み・未知キー除去済みのオブジェクトを返す。
    ///
    /// `null` は欠落として扱う。
    pub fn validate(&self, value: Value) -> Result<Value, ValidationError> {
        let Value::Object(mut object) = value else {
            return Err(ValidationError::NotAnObject { schema: self.name });
        };

        let mut validated = Map::new();
        for field in self.fields {
            let raw = match object.remove(field.name) {
                Some(Value::Null) | None => None,
                Some(v) => Some(v),
            };
            let value = match (raw, field.default) {
                (Some(v), _) => v,
                (None, Some(default)) => Value::String(default.to_string()),
                (None, None) if field.required => {
                    return Err(ValidationError::MissingField {
                        schema: self.name,
                        field: field.name,
                    });
                }
                (None, None) => continue,
            };
            field.check(self.name, &value)?;
            validated.insert(field.name.to_string(), value);
        }

        Ok(Value::Object(validated))
    }

    /// 検証した上で型付きの値にデシリアライズする。
    pub fn parse<T: DeserializeOwned>(&self, value: Value) -> Result<T, ValidationError> {
        let validated = self.validate(value)?;
        serde_json::from_value(validated).map_err(|e| ValidationError::Shape {
            schema: self.name,
            detail: e.to_string(),
        })
    }

    /// 生成モデルの構造化出力に渡す JSON スキーマ (OpenAPI サブセット)。
    pub fn to_json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name)
            .collect();
        let ordering: Vec<&str> = self.fields.iter().map(|f| f.name).collect();

        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": required,
            "propertyOrdering": ordering,
        })
    }
}
