use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// `data:<mime>;base64,<bytes>` 形式のインラインデータ。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DataUriError {
    #[error("Data URI must start with \"data:\"")]
    MissingScheme,
    #[error("Data URI has no ',' separator")]
    MissingSeparator,
    #[error("Data URI has no MIME type")]
    MissingMimeType,
    #[error("Data URI is not base64 encoded")]
    NotBase64,
    #[error("Invalid base64 payload: {0}")]
    InvalidPayload(String),
}

impl DataUri {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// データ URI 文字列をパースし、ペイロードをデコードする。
    pub fn parse(uri: &str) -> Result<Self, DataUriError> {
        let rest = uri.strip_prefix("data:").ok_or(DataUriError::MissingScheme)?;
        let (meta, payload) = rest.split_once(',').ok_or(DataUriError::MissingSeparator)?;
        let mime_type = meta
            .strip_suffix(";base64")
            .ok_or(DataUriError::NotBase64)?;
        if mime_type.trim().is_empty() {
            return Err(DataUriError::MissingMimeType);
        }
        let data = BASE64
            .decode(payload.trim())
            .map_err(|e| DataUriError::InvalidPayload(e.to_string()))?;
        Ok(Self {
            mime_type: mime_type.to_string(),
            data,
        })
    }

    /// MIME のパラメータ部分 (`;codec=...` など) を除いた本体。
    pub fn essence(&self) -> &str {
        self.mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
    }
}

impl std::fmt::Display for DataUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, BASE64.encode(&self.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_png() {
        let uri = DataUri::parse("data:image/png;base64,AAAA").unwrap();
        assert_eq!(uri.mime_type, "image/png");
        assert_eq!(uri.data, vec![0, 0, 0]);
    }

    #[test]
    fn parse_keeps_mime_parameters() {
        let uri = DataUri::parse("data:audio/L16;codec=pcm;rate=24000;base64,AQID").unwrap();
        assert_eq!(uri.mime_type, "audio/L16;codec=pcm;rate=24000");
        assert_eq!(uri.essence(), "audio/L16");
        assert_eq!(uri.data, vec![1, 2, 3]);
    }

    #[test]
    fn display_formats_uri() {
        let uri = DataUri::new("audio/wav", vec![1, 2, 3]);
        assert_eq!(uri.to_string(), "data:audio/wav;base64,AQID");
    }

    #[test]
    fn parse_errors() {
        assert_eq!(DataUri::parse("image/png;base64,AAAA"), Err(DataUriError::MissingScheme));
        assert_eq!(DataUri::parse("data:image/png;base64"), Err(DataUriError::MissingSeparator));
        assert_eq!(DataUri::parse("data:;base64,AAAA"), Err(DataUriError::MissingMimeType));
        assert_eq!(DataUri::parse("data:text/plain,hello"), Err(DataUriError::NotBase64));
        assert!(matches!(
            DataUri::parse("data:image/png;base64,@@@"),
            Err(DataUriError::InvalidPayload(_))
        ));
    }

    #[test]
    fn empty_payload_is_allowed() {
        let uri = DataUri::parse("data:application/pdf;base64,").unwrap();
        assert!(uri.data.is_empty());
    }
}
