pub mod log_utils;

pub use log_utils::log_init;
