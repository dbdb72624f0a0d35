use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Downloading,
    #[serde(alias = "processing")]
    Transcribing,
    Translating,
    Done,
    Failed,
}

impl JobStatus {
    /// Statuses in which an external service may be busy on the job's behalf.
    pub const RUNNING: [JobStatus; 3] = [
        JobStatus::Downloading,
        JobStatus::Transcribing,
        JobStatus::Translating,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Downloading => "downloading",
            JobStatus::Transcribing => "transcribing",
            JobStatus::Translating => "translating",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_running(&self) -> bool {
        Self::RUNNING.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    /// Edges of the lifecycle graph. A completed job may re-enter
    /// `Translating`; nothing leaves `Failed`.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        use JobStatus::*;

        if *self == next {
            return true;
        }

        match (self, next) {
            (Pending, Downloading) | (Pending, Transcribing) => true,
            (Downloading, Transcribing) => true,
            (Transcribing, Done) => true,
            (Done, Translating) => true,
            (Translating, Done) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "downloading" => Ok(JobStatus::Downloading),
            "transcribing" | "processing" => Ok(JobStatus::Transcribing),
            "translating" => Ok(JobStatus::Translating),
            "done" => Ok(JobStatus::Done),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
