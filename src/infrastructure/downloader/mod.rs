mod yt_dlp_downloader;

pub use yt_dlp_downloader::YtDlpDownloader;
