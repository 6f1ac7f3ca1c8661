mod native;

use crate::value::{error::RuntimeErrorKind, NativeFunction, Value};
use compact_str::{CompactString, ToCompactString};
use native::{NativeClock, NativeLen, NativePrint};
use parking_lot::Mutex;
use std::{collections::HashMap, sync::Arc};

#[derive(Debug, Clone)]
struct Binding {
    slot: Arc<Mutex<Value>>,
    is_const: bool,
    /// Frames share the slot instead of copying the value.
    is_ref: bool,
    /// How many more nested frames the binding is copied into. `None` is unbounded.
    limit: Option<u32>,
}

impl Binding {
    fn new(value: Value, is_const: bool, is_ref: bool, limit: Option<u32>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(value)),
            is_const,
            is_ref,
            limit,
        }
    }

    fn read(&self) -> Value {
        self.slot.lock().clone()
    }
}

#[derive(Default)]
struct EnvironmentImpl {
    values: HashMap<CompactString, Binding>,
    last_output: Option<Value>,
}

/// Shared handle to one binding scope.
#[derive(Clone)]
pub struct Environment {
    inner: Arc<Mutex<EnvironmentImpl>>,
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        let mut names: Vec<&CompactString> = inner.values.keys().collect();
        names.sort();
        f.debug_struct("Environment")
            .field("bindings", &names)
            .finish()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Global scope with the native functions installed.
    pub fn new() -> Self {
        let environment = Self::empty();
        let natives: [Arc<dyn NativeFunction>; 3] =
            [Arc::new(NativePrint), Arc::new(NativeLen), Arc::new(NativeClock)];
        for native in natives {
            environment.declare_var(native.get_name(), Value::NativeFunction(native));
        }
        environment
    }

    pub fn empty() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EnvironmentImpl::default())),
        }
    }

    /// Converts a script-level limit into a frame budget. Negative limits never expire.
    pub fn limit_from_number(limit: f64) -> Option<u32> {
        if limit < 0.0 || limit.is_nan() {
            None
        } else {
            Some(limit.min(u32::MAX as f64) as u32)
        }
    }

    pub fn get_var(&self, name: &str) -> Option<Value> {
        let slot = self.inner.lock().values.get(name).cloned()?;
        Some(slot.read())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.lock().values.contains_key(name)
    }

    /// Writes through an existing binding or creates one. Flags are only ever added.
    pub fn assign_var(
        &self,
        name: &str,
        value: Value,
        is_const: bool,
        is_ref: bool,
        limit: Option<u32>,
    ) -> Result<Value, RuntimeErrorKind> {
        let mut inner = self.inner.lock();
        match inner.values.get_mut(name) {
            Some(binding) => {
                if binding.is_const {
                    return Err(RuntimeErrorKind::ConstantReassignment(name.into()));
                }
                binding.is_const |= is_const;
                binding.is_ref |= is_ref;
                if limit.is_some() {
                    binding.limit = limit;
                }
                let slot = binding.slot.clone();
                drop(inner);
                *slot.lock() = value.clone();
            }
            None => {
                inner.values.insert(
                    name.to_compact_string(),
                    Binding::new(value.clone(), is_const, is_ref, limit),
                );
            }
        }
        Ok(value)
    }

    /// Always creates a fresh local binding, shadowing whatever the frame inherited.
    pub fn declare_var(&self, name: &str, value: Value) {
        self.inner.lock().values.insert(
            name.to_compact_string(),
            Binding::new(value, false, false, None),
        );
    }

    pub fn unsign_var(&self, name: &str) -> Option<Value> {
        let binding = self.inner.lock().values.remove(name)?;
        Some(binding.read())
    }

    /// A call frame seeded from this scope.
    pub fn new_frame(&self) -> Self {
        let inner = self.inner.lock();
        let values = inner
            .values
            .iter()
            .filter(|(_, binding)| binding.limit != Some(0))
            .map(|(name, binding)| {
                let limit = binding.limit.map(|n| n - 1);
                let binding = if binding.is_ref {
                    Binding {
                        slot: binding.slot.clone(),
                        limit,
                        ..*binding
                    }
                } else {
                    Binding::new(binding.read(), binding.is_const, false, limit)
                };
                (name.clone(), binding)
            })
            .collect();
        tracing::trace!(bindings = inner.values.len(), "created call frame");
        Self {
            inner: Arc::new(Mutex::new(EnvironmentImpl {
                values,
                last_output: None,
            })),
        }
    }

    pub fn push_stack(&self, value: &Value) {
        self.inner.lock().last_output = Some(value.clone());
    }

    pub fn last_output(&self) -> Option<Value> {
        self.inner.lock().last_output.clone()
    }

    pub fn get_out(&self, value: Value) -> Value {
        tracing::trace!(kind = %value.kind(), "block output");
        value
    }
}
