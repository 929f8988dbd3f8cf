mod app;
pub mod dashboard;
pub mod fetchers;
pub mod splash;

pub use app::{App, run};
