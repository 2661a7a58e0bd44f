//! Self-describing binary records over a [`ByteBuffer`](bytewire_utils_rs::ByteBuffer).
//!
//! A record is a type identifier followed by a payload whose shape belongs to
//! the handler registered for that identifier:
//!
//! ```text
//! [i32 BE: type-id length in UTF-16 code units]
//! [length x u16 BE: type-id code units]
//! [payload]
//! ```

pub mod config;
pub mod config_option;
pub mod serialization;

pub use bytewire_utils_rs::{BufferError, ByteBuffer};
pub use config::Config;
pub use config_option::ConfigOption;
pub use serialization::*;
