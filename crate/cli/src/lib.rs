pub mod actions;
pub mod commands;
pub mod config;
pub mod error;

pub use commands::envelope_main;

pub mod reexport {
    pub use envelope_crypto;
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::panic_in_result_fn,
    clippy::indexing_slicing
)]
mod tests;
