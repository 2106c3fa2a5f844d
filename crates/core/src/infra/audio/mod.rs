pub mod wav;

pub use wav::{encode_wav, wav_data_uri, PcmFormat, WAV_HEADER_LEN};
