mod error;
mod health;
mod rename;
mod transcriptions;
mod translate;
mod upload;
mod ws;

pub use error::{ErrorResponse, error_response, lifecycle_error_response, status_for};
pub use health::{health_handler, service_status_handler};
pub use rename::rename_handler;
pub use transcriptions::{
    create_transcription_handler, delete_transcription_handler, get_transcription_handler,
    list_transcriptions_handler, patch_transcription_handler,
};
pub use translate::translate_handler;
pub use upload::upload_result_handler;
pub use ws::transcriptions_ws_handler;
