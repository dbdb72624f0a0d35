mod device;
mod job;
mod job_id;
mod job_status;
mod media_file_name;
mod transcription_result;

pub use device::Device;
pub use job::{
    DEFAULT_TASK, Job, JobParams, JobPatch, JobSource, SourceKind, parse_hotwords,
    split_and_trim,
};
pub use job_id::JobId;
pub use job_status::JobStatus;
pub use media_file_name::{FILE_NAME_SEPARATOR, MediaFileName, sanitize_title};
pub use transcription_result::{MissingField, Segment, TranscriptionResult, Translation, Word};
