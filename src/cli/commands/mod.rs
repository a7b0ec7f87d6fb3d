//! CLI command implementations.

mod ask;
mod config;
mod doctor;
mod faq;
mod recommend;
mod serve;

pub use ask::run_ask;
pub use config::run_config;
pub use doctor::run_doctor;
pub use faq::run_faq;
pub use recommend::run_recommend;
pub use serve::{router, run_serve, AppState};
