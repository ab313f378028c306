pub mod analyze;
pub mod check;
pub mod config_cmd;
pub mod probe;
