use crate::config_option::ConfigOption;

pub const DEFAULT_MAX_TYPE_NAME_LENGTH: usize = 1024;
pub const DEFAULT_BUFFER_CAPACITY: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
  register_builtins: bool,
  auto_register_self_serializing: bool,
  max_type_name_length: usize,
  default_buffer_capacity: usize,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      register_builtins: true,
      auto_register_self_serializing: true,
      max_type_name_length: DEFAULT_MAX_TYPE_NAME_LENGTH,
      default_buffer_capacity: DEFAULT_BUFFER_CAPACITY,
    }
  }
}

impl Config {
  pub fn from(options: impl IntoIterator<Item = ConfigOption>) -> Config {
    let mut config = Config::default();
    for option in options {
      option.apply(&mut config);
    }
    config
  }

  /// Whether a fresh registry starts with the primitive handlers.
  pub fn is_register_builtins(&self) -> bool {
    self.register_builtins
  }

  pub fn set_register_builtins(&mut self, register_builtins: bool) {
    self.register_builtins = register_builtins;
  }

  /// Whether writing a self-serializing value installs its handler when the
  /// identifier is not registered yet.
  pub fn is_auto_register_self_serializing(&self) -> bool {
    self.auto_register_self_serializing
  }

  pub fn set_auto_register_self_serializing(&mut self, auto_register: bool) {
    self.auto_register_self_serializing = auto_register;
  }

  /// Upper bound, in UTF-16 code units, accepted for a record's type identifier.
  pub fn get_max_type_name_length(&self) -> usize {
    self.max_type_name_length
  }

  pub fn set_max_type_name_length(&mut self, max_type_name_length: usize) {
    self.max_type_name_length = max_type_name_length;
  }

  pub fn get_default_buffer_capacity(&self) -> usize {
    self.default_buffer_capacity
  }

  pub fn set_default_buffer_capacity(&mut self, capacity: usize) {
    self.default_buffer_capacity = capacity;
  }
}
