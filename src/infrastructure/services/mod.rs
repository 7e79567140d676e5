//! Infrastructure services

mod read_through;

pub use read_through::{ConfigPayload, PayloadOrigin, ReadThroughHandler};
