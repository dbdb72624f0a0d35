mod http_asr_client;

pub use http_asr_client::{HttpAsrClient, transcription_fields};
