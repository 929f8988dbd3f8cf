//! Dashboard component modules
//!
//! Contains all individual rendering components

pub mod board_list;
pub mod detail;
pub mod drilldown;
pub mod footer;
pub mod header;
pub mod logs;
