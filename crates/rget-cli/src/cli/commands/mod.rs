mod download;
mod resolve;

pub use download::{run_download, DownloadArgs};
pub use resolve::run_resolve;
