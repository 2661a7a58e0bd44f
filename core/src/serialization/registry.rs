
use std::any::{Any, TypeId};
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{
  builtin_serializers, JsonSerializer, SelfSerializer, SelfSerializing, Serializer, SerializerAny, TypedSerializer,
};

#[derive(Default)]
struct RegistryInner {
  by_name: DashMap<String, Arc<dyn SerializerAny>>,
  // Write path index: which identifier a Rust type is currently encoded under.
  by_type: DashMap<TypeId, String>,
  // Held by every mutation so both indexes change together.
  write_lock: Mutex<()>,
}

/// Maps wire identifiers to handlers.
///
/// The registry is an owned value; clones share the same entries, so a
/// registry can be handed to several [`Serialization`](super::Serialization)
/// instances or threads. Lookups and registrations may run concurrently.
///
/// Registering an identifier that is already present replaces its handler.
/// This is intentional (last write wins): records already sitting in a buffer
/// are untouched, but every later encode and decode of that identifier goes
/// through the new handler.
///
/// Mutations are serialized against each other; lookups never block on them.
/// A lookup racing a re-registration may miss, but never returns a handler
/// for the wrong type.
#[derive(Clone, Default)]
pub struct SerializerRegistry {
  inner: Arc<RegistryInner>,
}

impl SerializerRegistry {
  /// Creates an empty registry.
  pub fn new() -> Self {
    Self::default()
  }

  /// Creates a registry holding the primitive handlers from [`builtin_serializers`].
  pub fn with_builtins() -> Self {
    let registry = Self::new();
    for serializer in builtin_serializers() {
      registry.register_any(serializer.clone());
    }
    registry
  }

  /// Registers `serializer` for values of type `T` under `type_name`, returning
  /// the handler it replaced.
  pub fn register<T, S>(&self, type_name: impl Into<String>, serializer: S) -> Option<Arc<dyn SerializerAny>>
  where
    T: Any + Send + Sync,
    S: Serializer<T> + 'static, {
    self.register_any(Arc::new(TypedSerializer::new(type_name, serializer)))
  }

  pub fn register_self_serializing<T>(&self) -> Option<Arc<dyn SerializerAny>>
  where
    T: SelfSerializing, {
    self.register::<T, _>(T::TYPE_NAME, SelfSerializer::<T>::default())
  }

  pub fn register_json<T>(&self, type_name: impl Into<String>) -> Option<Arc<dyn SerializerAny>>
  where
    T: Serialize + DeserializeOwned + Any + Send + Sync, {
    self.register::<T, _>(type_name, JsonSerializer::<T>::new())
  }

  pub fn register_any(&self, serializer: Arc<dyn SerializerAny>) -> Option<Arc<dyn SerializerAny>> {
    let _guard = self.inner.write_lock.lock();
    let type_name = serializer.type_name().to_string();
    let type_id = serializer.value_type_id();
    let previous = self.inner.by_name.insert(type_name.clone(), serializer);
    self.inner.by_type.insert(type_id, type_name.clone());
    match &previous {
      Some(previous) => {
        tracing::debug!("Replacing serializer: type_name = {}", type_name);
        let stale_type_id = previous.value_type_id();
        if stale_type_id != type_id {
          self
            .inner
            .by_type
            .remove_if(&stale_type_id, |_, name| *name == type_name);
          self.repoint(stale_type_id);
        }
      }
      None => tracing::debug!("Registering serializer: type_name = {}", type_name),
    }
    previous
  }

  /// Registers `serializer` unless its identifier is already taken. Returns
  /// whether it was installed.
  pub fn register_if_absent(&self, serializer: Arc<dyn SerializerAny>) -> bool {
    let _guard = self.inner.write_lock.lock();
    let type_name = serializer.type_name().to_string();
    let type_id = serializer.value_type_id();
    match self.inner.by_name.entry(type_name.clone()) {
      Entry::Occupied(_) => false,
      Entry::Vacant(entry) => {
        entry.insert(serializer);
        tracing::debug!("Registering serializer: type_name = {}", type_name);
        self.inner.by_type.entry(type_id).or_insert(type_name);
        true
      }
    }
  }

  pub fn unregister(&self, type_name: &str) -> Option<Arc<dyn SerializerAny>> {
    let _guard = self.inner.write_lock.lock();
    let (_, removed) = self.inner.by_name.remove(type_name)?;
    tracing::debug!("Unregistering serializer: type_name = {}", type_name);
    let type_id = removed.value_type_id();
    self.inner.by_type.remove_if(&type_id, |_, name| name == type_name);
    self.repoint(type_id);
    Some(removed)
  }

  // After the identifier a type was written under goes away, fall back to any
  // other identifier still handling that type.
  fn repoint(&self, type_id: TypeId) {
    if self.inner.by_type.contains_key(&type_id) {
      return;
    }
    let replacement = self
      .inner
      .by_name
      .iter()
      .find(|entry| entry.value().value_type_id() == type_id)
      .map(|entry| entry.key().clone());
    if let Some(type_name) = replacement {
      self.inner.by_type.insert(type_id, type_name);
    }
  }

  pub fn find(&self, type_name: &str) -> Option<Arc<dyn SerializerAny>> {
    self.inner.by_name.get(type_name).map(|entry| entry.value().clone())
  }

  pub fn find_by_type_id(&self, type_id: TypeId) -> Option<Arc<dyn SerializerAny>> {
    let type_name = self.inner.by_type.get(&type_id)?.value().clone();
    self
      .find(&type_name)
      .filter(|serializer| serializer.value_type_id() == type_id)
  }

  pub fn find_by_type<T: Any>(&self) -> Option<Arc<dyn SerializerAny>> {
    self.find_by_type_id(TypeId::of::<T>())
  }

  pub fn contains(&self, type_name: &str) -> bool {
    self.inner.by_name.contains_key(type_name)
  }

  /// Registered identifiers in lexical order.
  pub fn type_names(&self) -> Vec<String> {
    let mut names = self
      .inner
      .by_name
      .iter()
      .map(|entry| entry.key().clone())
      .collect::<Vec<_>>();
    names.sort();
    names
  }

  pub fn len(&self) -> usize {
    self.inner.by_name.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.by_name.is_empty()
  }
}

impl Debug for SerializerRegistry {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SerializerRegistry")
      .field("type_names", &self.type_names())
      .finish()
  }
}

static_assertions::assert_impl_all!(SerializerRegistry: Send, Sync);
