pub mod cli;
pub mod config;
pub mod fetch;
pub mod patcher;
pub mod pipeline;
pub mod skills;
pub mod store;
pub mod types;

pub use config::{Credentials, DioConfig};
pub use fetch::{BrowserSource, CertificateSource, HttpSource};
pub use patcher::{patch_resume, PatchOutcome};
pub use pipeline::{run_fetch, run_update};
pub use skills::detect_skills;
pub use store::{FileStore, Store};
pub use types::{Certificate, RunResult};
