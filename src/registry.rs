//! The registry store: a type-and-label keyed map from [`Key`] to provider.
//!
//! A [`Registry`] is an explicit value with a defined owner. Construct one at
//! application startup, share it by reference (or `Arc<Registry>`) with the
//! code that needs it, and drop it when the owning scope ends. All operations
//! take `&self`; the backing map is guarded by a `Mutex`, so a shared registry
//! is safe to use from multiple threads.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use contract_registry::Registry;
//!
//! trait Logger: Send + Sync {
//!     fn log(&self, msg: &str) -> String;
//! }
//!
//! struct ConsoleLogger;
//!
//! impl Logger for ConsoleLogger {
//!     fn log(&self, msg: &str) -> String {
//!         format!("[console] {msg}")
//!     }
//! }
//!
//! let registry = Registry::new();
//! registry
//!     .register_arc_labeled::<dyn Logger>("console", Arc::new(ConsoleLogger))
//!     .unwrap();
//!
//! let logger = registry.get_labeled::<dyn Logger>("console").unwrap();
//! assert_eq!(logger.log("ready"), "[console] ready");
//! ```

use std::any::type_name;
use std::collections::{hash_map, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace, warn};

use crate::constructor::{Args, ConstructorTable};
use crate::key::{ContractId, Key};
use crate::provider::{factory_provider, fixed_provider, Instance, ProviderFn, ProviderKind, Upcast, Upcasts};
use crate::registry_error::RegistryError;

struct Entry {
    produce: ProviderFn,
    kind: ProviderKind,
    upcasts: Vec<Upcast>,
}

/// Type-and-label keyed service locator.
///
/// Holds at most one provider per [`Key`]. Three registration strategies are
/// supported: a fixed already-built instance, an eagerly-constructed singleton,
/// and a per-call factory. Lookups are soft: a missing key yields `None`,
/// never an error.
#[derive(Default)]
pub struct Registry {
    entries: Mutex<HashMap<Key, Entry>>,
}

impl Registry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // The store is usable after a panic in another thread; entries are either
    // fully inserted or absent, so a recovered map is always consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<Key, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ---------------------------------------------------------------------------------------------
    // Existence checks and lookup
    // ---------------------------------------------------------------------------------------------

    /// True when an unlabeled entry exists for the contract `T`. No side effects.
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.contains_labeled::<T>("")
    }

    /// True when an entry exists for `T` under `label`. No side effects.
    pub fn contains_labeled<T: ?Sized + 'static>(&self, label: &str) -> bool {
        let key = Key::new::<T>(label);
        let found = self.lock().contains_key(&key);
        trace!(key = %key, found, "contains");
        found
    }

    /// Resolves the unlabeled entry for `T`, invoking its provider.
    ///
    /// Never an error: `None` covers both an absent key and a factory whose
    /// constructor failed at call time (the latter is logged). Repeated calls
    /// against a factory entry return a NEW instance each time.
    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.get_labeled::<T>("")
    }

    /// Labeled form of [`Registry::get`].
    pub fn get_labeled<T: ?Sized + Send + Sync + 'static>(&self, label: &str) -> Option<Arc<T>> {
        self.produce(&Key::new::<T>(label))?.downcast::<T>()
    }

    /// Resolves by a runtime [`ContractId`] instead of a type parameter, for
    /// callers that do not know the contract statically. The returned
    /// [`Instance`] supports a checked downcast.
    pub fn get_by_id(&self, contract: ContractId) -> Option<Instance> {
        self.get_by_id_labeled(contract, "")
    }

    /// Labeled form of [`Registry::get_by_id`].
    pub fn get_by_id_labeled(&self, contract: ContractId, label: &str) -> Option<Instance> {
        self.produce(&Key::from_id(contract, label))
    }

    fn produce(&self, key: &Key) -> Option<Instance> {
        let produce = self.lock().get(key).map(|entry| entry.produce.clone());
        // Guard dropped: providers run unlocked so a constructor may call back
        // into this registry without deadlocking.
        let Some(produce) = produce else {
            trace!(key = %key, found = false, "get");
            return None;
        };
        match produce() {
            Ok(instance) => {
                trace!(key = %key, found = true, "get");
                Some(instance)
            }
            Err(error) => {
                warn!(key = %key, %error, "provider failed during lookup");
                None
            }
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Registration: fixed instances
    // ---------------------------------------------------------------------------------------------

    /// Registers an already-built instance under the concrete contract `T`,
    /// unlabeled. The provider returns this same instance on every lookup.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateRegistration`] when `Key(T, "")` is already
    /// present; the store is untouched on failure.
    pub fn register<T: Send + Sync + 'static>(&self, value: T) -> Result<(), RegistryError> {
        self.register_labeled("", value)
    }

    /// Labeled form of [`Registry::register`].
    pub fn register_labeled<T: Send + Sync + 'static>(
        &self,
        label: &str,
        value: T,
    ) -> Result<(), RegistryError> {
        self.register_arc_with(label, Arc::new(value), Upcasts::new())
    }

    /// Registers an `Arc`-wrapped instance, unlabeled. Use this form to
    /// register under a trait-object contract: pass an `Arc<dyn Contract>`.
    pub fn register_arc<T: ?Sized + Send + Sync + 'static>(
        &self,
        value: Arc<T>,
    ) -> Result<(), RegistryError> {
        self.register_arc_with("", value, Upcasts::new())
    }

    /// Labeled form of [`Registry::register_arc`].
    pub fn register_arc_labeled<T: ?Sized + Send + Sync + 'static>(
        &self,
        label: &str,
        value: Arc<T>,
    ) -> Result<(), RegistryError> {
        self.register_arc_with(label, value, Upcasts::new())
    }

    /// Full fixed-instance form: label plus explicit assignability
    /// declarations for [`Registry::get_all`].
    pub fn register_arc_with<T: ?Sized + Send + Sync + 'static>(
        &self,
        label: &str,
        value: Arc<T>,
        upcasts: Upcasts<T>,
    ) -> Result<(), RegistryError> {
        let entry = Entry {
            produce: fixed_provider(value, type_name::<T>()),
            kind: ProviderKind::Fixed,
            upcasts: upcasts.erased(),
        };
        self.insert(Key::new::<T>(label), entry)
    }

    // ---------------------------------------------------------------------------------------------
    // Registration: constructed singletons and factories
    // ---------------------------------------------------------------------------------------------

    /// Resolves a constructor on `table` matching `args.len()`, invokes it
    /// immediately, and stores a provider that always returns the one
    /// constructed instance. Unlabeled.
    ///
    /// The checks run in a fixed order: duplicate key first, then arity
    /// resolution, then construction. None of the failure paths mutates the
    /// store, and nothing is constructed for an occupied key.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateRegistration`],
    /// [`RegistryError::ConstructorNotFound`], or whatever the constructor
    /// itself returns ([`RegistryError::ConstructionFailed`] /
    /// [`RegistryError::ArgumentMismatch`]).
    pub fn register_constructed<T: ?Sized + Send + Sync + 'static>(
        &self,
        table: &ConstructorTable<T>,
        args: Args,
    ) -> Result<(), RegistryError> {
        self.register_constructed_labeled("", table, args)
    }

    /// Labeled form of [`Registry::register_constructed`].
    pub fn register_constructed_labeled<T: ?Sized + Send + Sync + 'static>(
        &self,
        label: &str,
        table: &ConstructorTable<T>,
        args: Args,
    ) -> Result<(), RegistryError> {
        let key = Key::new::<T>(label);
        self.ensure_vacant(&key)?;
        let build = table.resolve(args.len())?;
        let value = build(&args)?;
        let entry = Entry {
            produce: fixed_provider(value, table.impl_name()),
            kind: ProviderKind::Singleton,
            upcasts: table.erased_upcasts(),
        };
        self.insert(key, entry)
    }

    /// Resolves a constructor the same way as
    /// [`Registry::register_constructed`] but stores the constructor and the
    /// argument list instead of invoking it: every lookup re-runs the
    /// constructor with the same stored arguments and yields a fresh instance.
    /// Unlabeled.
    ///
    /// # Errors
    ///
    /// [`RegistryError::DuplicateRegistration`] (checked first) or
    /// [`RegistryError::ConstructorNotFound`]; no mutation on failure.
    /// Construction errors surface later, at lookup time, as a logged `None`.
    pub fn register_factory<T: ?Sized + Send + Sync + 'static>(
        &self,
        table: &ConstructorTable<T>,
        args: Args,
    ) -> Result<(), RegistryError> {
        self.register_factory_labeled("", table, args)
    }

    /// Labeled form of [`Registry::register_factory`].
    pub fn register_factory_labeled<T: ?Sized + Send + Sync + 'static>(
        &self,
        label: &str,
        table: &ConstructorTable<T>,
        args: Args,
    ) -> Result<(), RegistryError> {
        let key = Key::new::<T>(label);
        self.ensure_vacant(&key)?;
        let build = table.resolve(args.len())?;
        let entry = Entry {
            produce: factory_provider(build, args, table.impl_name()),
            kind: ProviderKind::Factory,
            upcasts: table.erased_upcasts(),
        };
        self.insert(key, entry)
    }

    fn ensure_vacant(&self, key: &Key) -> Result<(), RegistryError> {
        if self.lock().contains_key(key) {
            return Err(RegistryError::DuplicateRegistration {
                key: key.description(),
            });
        }
        Ok(())
    }

    // Construction happens between `ensure_vacant` and here, so the occupancy
    // check is repeated: a racing registration wins and this one fails cleanly.
    fn insert(&self, key: Key, entry: Entry) -> Result<(), RegistryError> {
        let mut map = self.lock();
        match map.entry(key) {
            hash_map::Entry::Occupied(slot) => Err(RegistryError::DuplicateRegistration {
                key: slot.key().description(),
            }),
            hash_map::Entry::Vacant(slot) => {
                debug!(key = %slot.key(), kind = %entry.kind, "registered");
                slot.insert(entry);
                Ok(())
            }
        }
    }

    // ---------------------------------------------------------------------------------------------
    // Removal and reset
    // ---------------------------------------------------------------------------------------------

    /// Removes exactly `Key(T, "")`. Returns whether an entry was removed;
    /// an absent key is a no-op, not an error.
    pub fn remove<T: ?Sized + 'static>(&self) -> bool {
        self.remove_labeled::<T>("")
    }

    /// Removes exactly `Key(T, label)` — an exact match on both fields, never
    /// a wildcard over all labels of `T`.
    pub fn remove_labeled<T: ?Sized + 'static>(&self, label: &str) -> bool {
        let key = Key::new::<T>(label);
        let removed = self.lock().remove(&key).is_some();
        if removed {
            debug!(key = %key, "removed");
        }
        removed
    }

    /// Discards every entry, returning the registry to its initial empty state.
    pub fn clear(&self) {
        self.lock().clear();
        debug!("cleared");
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // ---------------------------------------------------------------------------------------------
    // Enumeration
    // ---------------------------------------------------------------------------------------------

    /// Resolves every entry assignable to `T`: entries registered directly
    /// under `T` plus entries that declared `T` via
    /// [`Upcasts::extends`] / [`ConstructorTable::extends`]. Yields
    /// `(label, instance)` pairs in unspecified (backing-map) order.
    ///
    /// Every matching provider IS invoked, so factory entries construct a
    /// fresh instance as a side effect of enumeration. Results are never
    /// cached. A provider that fails is skipped and logged.
    pub fn get_all<T: ?Sized + Send + Sync + 'static>(&self) -> Vec<(String, Arc<T>)> {
        let target = ContractId::of::<T>();
        let matches: Vec<(Key, ProviderFn, Option<Upcast>)> = self
            .lock()
            .iter()
            .filter_map(|(key, entry)| {
                if key.contract() == target {
                    Some((key.clone(), entry.produce.clone(), None))
                } else {
                    entry
                        .upcasts
                        .iter()
                        .find(|upcast| upcast.target == target)
                        .map(|upcast| (key.clone(), entry.produce.clone(), Some(upcast.clone())))
                }
            })
            .collect();

        let mut resolved = Vec::with_capacity(matches.len());
        for (key, produce, upcast) in matches {
            let instance = match produce() {
                Ok(instance) => instance,
                Err(error) => {
                    warn!(key = %key, %error, "provider failed during enumeration");
                    continue;
                }
            };
            let instance = match &upcast {
                Some(upcast) => match (upcast.cast)(&instance) {
                    Some(instance) => instance,
                    None => continue,
                },
                None => instance,
            };
            if let Some(value) = instance.downcast::<T>() {
                resolved.push((key.label().to_string(), value));
            }
        }
        resolved
    }

    /// Resolves every entry and pairs the key's description (`[label]:Contract`)
    /// with the type name of the produced instance.
    ///
    /// Like [`Registry::get_all`] this forces every provider, factories
    /// included; each call constructs a fresh instance per factory entry.
    pub fn registered_types(&self) -> Vec<(String, &'static str)> {
        let snapshot: Vec<(String, ProviderFn)> = self
            .lock()
            .iter()
            .map(|(key, entry)| (key.description(), entry.produce.clone()))
            .collect();

        snapshot
            .into_iter()
            .filter_map(|(description, produce)| match produce() {
                Ok(instance) => Some((description, instance.type_name())),
                Err(error) => {
                    warn!(key = %description, %error, "provider failed during enumeration");
                    None
                }
            })
            .collect()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
