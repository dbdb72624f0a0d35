use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use super::JobId;

/// Joins the identity prefix and the human readable part of every stored
/// media file name.
pub const FILE_NAME_SEPARATOR: &str = "_WHSHPR_";

static NON_ALPHANUMERIC_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-zA-Z0-9]+").unwrap());

/// A media file name of the form `<prefix><separator><human part>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFileName {
    prefix: String,
    human: String,
}

impl MediaFileName {
    /// Name for an uploaded file, prefixed with the creation time.
    pub fn for_upload(uploaded_name: &str, now: DateTime<Utc>) -> Self {
        let prefix = now.format("%Y_%m_%d-%H%M%S%3f").to_string();
        let human = if uploaded_name.is_empty() {
            now.format("%Y_%m_%d-%H%M%S").to_string()
        } else {
            uploaded_name.to_string()
        };
        Self { prefix, human }
    }

    /// Name for a downloaded file, prefixed with the job id so repeated
    /// downloads land on the same name.
    pub fn for_download(job_id: JobId, title: &str) -> Self {
        Self {
            prefix: job_id.to_string(),
            human: sanitize_title(title),
        }
    }

    /// Splits a stored name at the first separator. Returns `None` when the
    /// separator is absent.
    pub fn parse(stored: &str) -> Option<Self> {
        let (prefix, human) = stored.split_once(FILE_NAME_SEPARATOR)?;
        Some(Self {
            prefix: prefix.to_string(),
            human: human.to_string(),
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn human(&self) -> &str {
        &self.human
    }

    pub fn with_human(&self, human: &str) -> Self {
        Self {
            prefix: self.prefix.clone(),
            human: human.to_string(),
        }
    }
}

impl fmt::Display for MediaFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.prefix, FILE_NAME_SEPARATOR, self.human)
    }
}

pub fn sanitize_title(title: &str) -> String {
    let trimmed = title
        .trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '.');
    NON_ALPHANUMERIC_RUN.replace_all(trimmed, "_").into_owned()
}
