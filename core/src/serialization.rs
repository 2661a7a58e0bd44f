mod builtin;
mod error;
mod json_serializer;
mod record;
mod registry;
mod serializer;
pub mod type_names;

pub use self::{builtin::*, error::*, json_serializer::*, record::*, registry::*, serializer::*};
