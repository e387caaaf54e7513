//! Providers: zero-argument callables producing instances, plus the erased
//! value and assignability machinery they rely on.
//!
//! Everything the registry hands back ultimately comes out of a provider
//! closure. Fixed and singleton entries capture an `Arc` and clone it on every
//! call; factory entries capture a constructor and its argument list and build
//! a fresh instance on every call.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::constructor::{Args, ConstructorFn};
use crate::key::ContractId;
use crate::registry_error::RegistryError;

/// A produced value with its static type erased.
///
/// Internally this is always an `Arc<T>` for the contract `T` the provider was
/// registered under, so [`Instance::downcast`] is a checked operation, never a
/// blind cast. The instance also carries the type name of the concrete
/// implementation for enumeration and diagnostics.
pub struct Instance {
    value: Box<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl Instance {
    pub(crate) fn new<T: ?Sized + Send + Sync + 'static>(
        value: Arc<T>,
        type_name: &'static str,
    ) -> Self {
        Self {
            value: Box::new(value),
            type_name,
        }
    }

    /// Type name of the concrete implementation behind this instance.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Recovers the typed `Arc<T>` when `T` is the contract this instance was
    /// produced for; `None` otherwise.
    pub fn downcast<T: ?Sized + Send + Sync + 'static>(self) -> Option<Arc<T>> {
        self.value.downcast::<Arc<T>>().ok().map(|boxed| *boxed)
    }

    pub(crate) fn downcast_clone<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.value.downcast_ref::<Arc<T>>().map(Arc::clone)
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Zero-argument provider closure stored per registry entry.
pub(crate) type ProviderFn = Arc<dyn Fn() -> Result<Instance, RegistryError> + Send + Sync>;

/// How an entry produces its instances. Carried for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ProviderKind {
    /// Always returns the instance handed in at registration.
    Fixed,
    /// Constructed once at registration, returned on every call.
    Singleton,
    /// Runs its constructor with the stored arguments on every call.
    Factory,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Fixed => f.write_str("fixed"),
            ProviderKind::Singleton => f.write_str("singleton"),
            ProviderKind::Factory => f.write_str("factory"),
        }
    }
}

/// Erased assignability record: a target contract plus the closure that
/// converts an instance of the source contract into one of the target.
#[derive(Clone)]
pub(crate) struct Upcast {
    pub(crate) target: ContractId,
    pub(crate) cast: Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>,
}

/// Assignability declarations for a contract `T`.
///
/// Rust has no runtime subtype check, so "is this entry assignable to `U`" is
/// declared at registration time together with the statically-typed upcast
/// that proves it:
///
/// ```
/// use std::sync::Arc;
/// use contract_registry::{Registry, Upcasts};
///
/// trait Logger: Send + Sync {}
/// struct ConsoleLogger;
/// impl Logger for ConsoleLogger {}
///
/// let registry = Registry::new();
/// let upcasts = Upcasts::<ConsoleLogger>::new().extends::<dyn Logger>(|c| c);
/// registry
///     .register_arc_with("console", Arc::new(ConsoleLogger), upcasts)
///     .unwrap();
///
/// // Registered under the concrete type, discoverable under the trait.
/// assert_eq!(registry.get_all::<dyn Logger>().len(), 1);
/// ```
pub struct Upcasts<T: ?Sized + 'static> {
    casts: Vec<Upcast>,
    _contract: PhantomData<fn(&T)>,
}

impl<T: ?Sized + Send + Sync + 'static> Upcasts<T> {
    /// No declarations: the entry is only assignable to its own contract.
    pub fn new() -> Self {
        Self {
            casts: Vec::new(),
            _contract: PhantomData,
        }
    }

    /// Declares assignability to `U` via the given upcast.
    ///
    /// The closure usually is just `|value| value`, letting unsized coercion
    /// turn `Arc<Concrete>` into `Arc<dyn Contract>`.
    #[must_use]
    pub fn extends<U: ?Sized + Send + Sync + 'static>(
        mut self,
        cast: impl Fn(Arc<T>) -> Arc<U> + Send + Sync + 'static,
    ) -> Self {
        self.casts.push(Upcast {
            target: ContractId::of::<U>(),
            cast: Arc::new(move |instance: &Instance| {
                let value = instance.downcast_clone::<T>()?;
                Some(Instance::new(cast(value), instance.type_name()))
            }),
        });
        self
    }

    pub(crate) fn erased(&self) -> Vec<Upcast> {
        self.casts.clone()
    }
}

impl<T: ?Sized + Send + Sync + 'static> Default for Upcasts<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Provider that returns a clone of `value` on every call.
pub(crate) fn fixed_provider<T: ?Sized + Send + Sync + 'static>(
    value: Arc<T>,
    type_name: &'static str,
) -> ProviderFn {
    Arc::new(move || Ok(Instance::new(value.clone(), type_name)))
}

/// Provider that re-runs `build` with the stored arguments on every call,
/// producing a fresh instance each time.
pub(crate) fn factory_provider<T: ?Sized + Send + Sync + 'static>(
    build: ConstructorFn<T>,
    args: Args,
    type_name: &'static str,
) -> ProviderFn {
    Arc::new(move || build(&args).map(|value| Instance::new(value, type_name)))
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    trait Shape: Send + Sync {
        fn sides(&self) -> u32;
    }

    struct Square;

    impl Shape for Square {
        fn sides(&self) -> u32 {
            4
        }
    }

    #[test]
    fn test_fixed_provider_returns_same_instance() {
        let value = Arc::new(Square);
        let produce = fixed_provider(value.clone(), "Square");

        let first = produce().unwrap().downcast::<Square>().unwrap();
        let second = produce().unwrap().downcast::<Square>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, &value));
    }

    #[test]
    fn test_factory_provider_builds_fresh_instances() {
        let build: ConstructorFn<Square> = Arc::new(|_| Ok(Arc::new(Square)));
        let produce = factory_provider(build, Args::new(), "Square");

        let first = produce().unwrap().downcast::<Square>().unwrap();
        let second = produce().unwrap().downcast::<Square>().unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_instance_downcast_wrong_type() {
        let instance = Instance::new(Arc::new(Square), "Square");
        assert!(instance.downcast::<String>().is_none());
    }

    #[test]
    fn test_instance_type_name() {
        let instance = Instance::new(Arc::new(Square), "geometry::Square");
        assert_eq!(instance.type_name(), "geometry::Square");
    }

    #[test]
    fn test_upcast_to_trait_contract() {
        let upcasts = Upcasts::<Square>::new().extends::<dyn Shape>(|square| square);
        let erased = upcasts.erased();
        assert_eq!(erased.len(), 1);
        assert_eq!(erased[0].target, ContractId::of::<dyn Shape>());

        let instance = Instance::new(Arc::new(Square), "Square");
        let shape = (erased[0].cast)(&instance)
            .unwrap()
            .downcast::<dyn Shape>()
            .unwrap();
        assert_eq!(shape.sides(), 4);
    }

    #[test]
    fn test_upcast_rejects_foreign_instance() {
        let upcasts = Upcasts::<Square>::new().extends::<dyn Shape>(|square| square);
        let erased = upcasts.erased();

        let foreign = Instance::new(Arc::new("not a square".to_string()), "String");
        assert!((erased[0].cast)(&foreign).is_none());
    }
}
