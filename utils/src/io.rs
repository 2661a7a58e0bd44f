mod buffer_error;
mod byte_buffer;

pub use self::{buffer_error::*, byte_buffer::*};
