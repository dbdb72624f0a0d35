pub mod asr;
pub mod downloader;
pub mod observability;
pub mod persistence;
pub mod storage;
pub mod translation;
