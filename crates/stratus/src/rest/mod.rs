//! The generic request/response pipeline every resource operation funnels
//! through.

mod client;

pub use client::{ResourceClient, ResponseMeta};
