pub mod error;
pub mod relay;
pub mod satellites;
