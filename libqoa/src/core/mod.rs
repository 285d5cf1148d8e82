pub mod bitio;
pub mod error;
pub mod types;

pub use bitio::{check_fourcc, peek_u64, read_u64, u64_at, write_u64};
pub use error::{QoaError, QoaResult};
pub use types::*;
