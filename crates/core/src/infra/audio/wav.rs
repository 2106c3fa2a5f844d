//! ヘッダなし PCM を WAV (RIFF) コンテナに包む。
//!
//! サンプルデータは一切加工せずにそのままコピーする。バッファ長が
//! フォーマット（チャンネル数・ビット深度）と整合するかは検証しない。

use crate::domain::data_uri::DataUri;

/// 標準 PCM WAV ヘッダ長 (RIFF 12 + fmt 24 + data ヘッダ 8)
pub const WAV_HEADER_LEN: usize = 44;

const FMT_CHUNK_LEN: u32 = 16;
const FORMAT_PCM: u16 = 1;

/// PCM フォーマットパラメータ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
}

impl Default for PcmFormat {
    /// 音声合成モデルの既定出力: mono / 24kHz / 16-bit
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 24_000,
            bits_per_sample: 16,
        }
    }
}

impl PcmFormat {
    /// u32 に収まらない場合は u32::MAX で頭打ち
    pub fn byte_rate(&self) -> u32 {
        let rate =
            u64::from(self.sample_rate) * u64::from(self.channels) * u64::from(self.bits_per_sample)
                / 8;
        u32::try_from(rate).unwrap_or(u32::MAX)
    }

    /// u16 に収まらない場合は u16::MAX で頭打ち
    pub fn block_align(&self) -> u16 {
        let align = u32::from(self.channels) * u32::from(self.bits_per_sample) / 8;
        u16::try_from(align).unwrap_or(u16::MAX)
    }

    /// `audio/L16;codec=pcm;rate=24000` のような MIME からフォーマットを推定する。
    /// 読めないパラメータや 0 は既定値のまま。
    pub fn from_mime(mime: &str) -> Self {
        let mut format = Self::default();
        let mut segments = mime.split(';').map(str::trim);

        let essence = segments.next().unwrap_or_default().to_ascii_lowercase();
        if essence == "audio/l8" {
            format.bits_per_sample = 8;
        }

        for param in segments {
            let Some((key, value)) = param.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"');
            match key.trim().to_ascii_lowercase().as_str() {
                "rate" => {
                    if let Some(rate) = value.parse().ok().filter(|&r: &u32| r > 0) {
                        format.sample_rate = rate;
                    }
                }
                "channels" => {
                    if let Some(channels) = value.parse().ok().filter(|&c: &u16| c > 0) {
                        format.channels = channels;
                    }
                }
                _ => {}
            }
        }

        format
    }
}

/// PCM バイト列から WAV ファイルのバイト列を生成する。
///
/// 出力長は常に `WAV_HEADER_LEN + pcm.len()`。空バッファは無音の WAV になる。
/// 4 GiB 以上のバッファはサイズ欄が u32::MAX で頭打ちになる（RIFF の上限）。
pub fn encode_wav(pcm: &[u8], format: PcmFormat) -> Vec<u8> {
    let data_size = u32::try_from(pcm.len()).unwrap_or_else(|_| {
        log::warn!(
            "PCM buffer of {} bytes exceeds the RIFF size limit; data size saturated",
            pcm.len()
        );
        u32::MAX
    });
    let riff_size = data_size.saturating_add(36);

    let mut wav = Vec::with_capacity(WAV_HEADER_LEN + pcm.len());

    // RIFF header
    wav.extend_from_slice(b"RIFF");
    wav.extend_from_slice(&riff_size.to_le_bytes());
    wav.extend_from_slice(b"WAVE");

    // fmt chunk
    wav.extend_from_slice(b"fmt ");
    wav.extend_from_slice(&FMT_CHUNK_LEN.to_le_bytes());
    wav.extend_from_slice(&FORMAT_PCM.to_le_bytes());
    wav.extend_from_slice(&format.channels.to_le_bytes());
    wav.extend_from_slice(&format.sample_rate.to_le_bytes());
    wav.extend_from_slice(&format.byte_rate().to_le_bytes());
    wav.extend_from_slice(&format.block_align().to_le_bytes());
    wav.extend_from_slice(&format.bits_per_sample.to_le_bytes());

    // data chunk
    wav.extend_from_slice(b"data");
    wav.extend_from_slice(&data_size.to_le_bytes());
    wav.extend_from_slice(pcm);

    wav
}

/// WAV に包んで `data:audio/wav;base64,...` 形式にする。
pub fn wav_data_uri(pcm: &[u8], format: PcmFormat) -> String {
    DataUri::new("audio/wav", encode_wav(pcm, format)).to_string()
}
