//! Core value types: the validated base URL and the tri-state field codec.

mod api_url;
mod field;

pub use api_url::ApiUrl;
pub use field::Field;
