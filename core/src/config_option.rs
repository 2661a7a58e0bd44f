use crate::config::Config;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOption {
  SetRegisterBuiltins(bool),
  SetAutoRegisterSelfSerializing(bool),
  SetMaxTypeNameLength(usize),
  SetDefaultBufferCapacity(usize),
}

impl ConfigOption {
  pub fn apply(&self, config: &mut Config) {
    match self {
      ConfigOption::SetRegisterBuiltins(register_builtins) => {
        config.set_register_builtins(*register_builtins);
      }
      ConfigOption::SetAutoRegisterSelfSerializing(auto_register) => {
        config.set_auto_register_self_serializing(*auto_register);
      }
      ConfigOption::SetMaxTypeNameLength(max_type_name_length) => {
        config.set_max_type_name_length(*max_type_name_length);
      }
      ConfigOption::SetDefaultBufferCapacity(capacity) => {
        config.set_default_buffer_capacity(*capacity);
      }
    }
  }

  pub fn with_register_builtins(register_builtins: bool) -> ConfigOption {
    ConfigOption::SetRegisterBuiltins(register_builtins)
  }

  pub fn with_auto_register_self_serializing(auto_register: bool) -> ConfigOption {
    ConfigOption::SetAutoRegisterSelfSerializing(auto_register)
  }

  pub fn with_max_type_name_length(max_type_name_length: usize) -> ConfigOption {
    ConfigOption::SetMaxTypeNameLength(max_type_name_length)
  }

  pub fn with_default_buffer_capacity(capacity: usize) -> ConfigOption {
    ConfigOption::SetDefaultBufferCapacity(capacity)
  }
}
