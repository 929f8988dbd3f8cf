//! Board browser dashboard
//!
//! State, key handling and rendering for the list, detail and drill-down views

pub mod components;
pub mod renderer;
pub mod state;
pub mod utils;

pub use renderer::render_dashboard;
pub use state::DashboardState;
