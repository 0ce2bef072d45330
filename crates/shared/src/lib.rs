pub mod domain;
pub mod error;
pub mod money;
pub mod protocol;
