//! Wire identifiers of the built-in handlers.

pub const BOOLEAN: &str = "boolean";
pub const BYTE: &str = "byte";
pub const CHAR: &str = "char";
pub const SHORT: &str = "short";
pub const INT: &str = "int";
pub const LONG: &str = "long";
pub const FLOAT: &str = "float";
pub const DOUBLE: &str = "double";
pub const STRING: &str = "string";

pub const BUILTIN_TYPE_NAMES: [&str; 9] = [BOOLEAN, BYTE, CHAR, SHORT, INT, LONG, FLOAT, DOUBLE, STRING];
