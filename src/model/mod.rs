pub mod client;
pub mod common;
pub mod vehicle;

pub use client::*;
pub use common::*;
pub use vehicle::*;
