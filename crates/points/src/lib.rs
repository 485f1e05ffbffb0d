//! Share point records and the store contract they travel through.
//!
//! Records carry canonical (WGS-84) coordinates only. Every payload crossing
//! the REST boundary is decoded into a typed record and validated by a total
//! function before it reaches business logic.

pub mod http;
pub mod memory;
pub mod record;
pub mod store;
pub mod upload;
pub mod validate;

pub use http::*;
pub use memory::*;
pub use record::*;
pub use store::*;
pub use validate::*;

/// Milliseconds since the Unix epoch, `0` if the clock is before it.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
