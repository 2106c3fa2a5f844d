use crate::domain::data_uri::DataUri;
use crate::domain::error::FlowError;
use crate::domain::schema::FlowContract;
use crate::domain::types::{SpeechRequest, SpeechResult, SPEECH_CONTRACT};
use crate::infra::audio::{wav_data_uri, PcmFormat};
use crate::infra::model::{GenerationConfig, ModelResponse, PromptPayload};
use crate::infra::prompts::templates::SPEECH;
use crate::infra::prompts::Bindings;
use crate::usecase::flow::Flow;

/// テキストを音声合成し、WAV のデータ URI として返す
pub struct SpeechFlow;

impl Flow for SpeechFlow {
    type Input = SpeechRequest;
    type Output = SpeechResult;

    fn name(&self) -> &'static str {
        "speech"
    }

    fn contract(&self) -> &'static FlowContract {
        &SPEECH_CONTRACT
    }

    fn render(&self, input: &SpeechRequest) -> Result<PromptPayload, FlowError> {
        Ok(SPEECH.render(&Bindings::new().text("text", &input.text))?)
    }

    fn generation_config(&self, input: &SpeechRequest) -> GenerationConfig {
        GenerationConfig::speech(input.language.locale_code())
    }

    /// モデルが返す生 PCM を WAV コンテナに包む。
    fn finish(&self, _input: &SpeechRequest, response: ModelResponse) -> Result<SpeechResult, FlowError> {
        let media = response
            .media
            .ok_or_else(|| FlowError::empty_generation("No audio was generated."))?;

        let essence = media.essence().to_ascii_lowercase();
        if !essence.starts_with("audio/") {
            return Err(FlowError::invalid_output(format!(
                "SpeechResult: expected audio media, got {:?}",
                media.mime_type
            )));
        }

        // すでに WAV ならそのまま
        if matches!(essence.as_str(), "audio/wav" | "audio/x-wav" | "audio/wave") {
            return Ok(SpeechResult {
                audio_data_uri: DataUri::new("audio/wav", media.data).to_string(),
            });
        }

        let format = PcmFormat::from_mime(&media.mime_type);
        log::debug!(
            "Wrapping {} bytes of PCM ({:?}) from {:?}",
            media.data.len(),
            format,
            media.mime_type
        );

        Ok(SpeechResult {
            audio_data_uri: wav_data_uri(&media.data, format),
        })
    }
}
