//! Buffer primitives shared by the bytewire crates.

pub mod io;

pub use io::{BufferError, ByteBuffer};
