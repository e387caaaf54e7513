//! Constructor resolution over explicit, statically-typed constructor tables.
//!
//! There is no runtime reflection in Rust, so "find a constructor on the
//! implementation type" becomes: the caller hands the registry a
//! [`ConstructorTable`] of closures, each declared with the number of arguments
//! it consumes. Resolution then works exactly like the reflective original:
//! the FIRST constructor whose arity equals the supplied argument count wins.
//! If several constructors share an arity, whichever was added to the table
//! first is selected. That ambiguity is inherited deliberately; disambiguate by
//! not declaring two constructors with the same arity.
//!
//! Arguments are stored type-erased in an [`Args`] list and are only checked
//! against the types a constructor asks for when the constructor actually runs.

use std::any::{type_name, Any};
use std::sync::Arc;

use crate::provider::{Upcast, Upcasts};
use crate::registry_error::RegistryError;

/// One stored constructor argument: the value plus its type name for diagnostics.
#[derive(Clone)]
pub struct Arg {
    value: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

/// Immutable list of constructor arguments.
///
/// Built once at registration time and captured by factory providers, which
/// replay the same list on every invocation. The [`crate::args!`] macro is the
/// usual way to build one.
#[derive(Clone, Default)]
pub struct Args {
    slots: Vec<Arg>,
}

impl Args {
    /// Empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value, builder style.
    #[must_use]
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    /// Appends a value in place.
    pub fn push<T: Send + Sync + 'static>(&mut self, value: T) {
        self.slots.push(Arg {
            value: Arc::new(value),
            type_name: type_name::<T>(),
        });
    }

    /// Number of stored arguments. This is the only thing resolution looks at.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no arguments are stored.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Checked access from inside a constructor body.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ArgumentMismatch`] when the slot is missing or holds a
    /// different type than requested.
    pub fn get<T: 'static>(&self, index: usize) -> Result<&T, RegistryError> {
        self.slots
            .get(index)
            .and_then(|arg| arg.value.downcast_ref::<T>())
            .ok_or(RegistryError::ArgumentMismatch {
                index,
                expected: type_name::<T>(),
            })
    }

    /// Type name of the value stored at `index`, if any.
    pub fn type_name_at(&self, index: usize) -> Option<&'static str> {
        self.slots.get(index).map(|arg| arg.type_name)
    }
}

/// A constructor closure producing an instance of the contract `T`.
///
/// The closure receives the stored [`Args`] and performs its own checked
/// downcasts; building the concrete type and coercing it to the contract
/// (`Arc<ConsoleLogger>` to `Arc<dyn Logger>`) both happen inside.
pub type ConstructorFn<T> =
    Arc<dyn Fn(&Args) -> Result<Arc<T>, RegistryError> + Send + Sync>;

struct Constructor<T: ?Sized> {
    arity: usize,
    build: ConstructorFn<T>,
}

/// Ordered set of constructors for one concrete implementation of contract `T`.
///
/// ```
/// use std::sync::Arc;
/// use contract_registry::{args, ConstructorTable};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct Plain {
///     name: String,
/// }
///
/// impl Greeter for Plain {
///     fn greet(&self) -> String {
///         format!("hello {}", self.name)
///     }
/// }
///
/// let table = ConstructorTable::<dyn Greeter>::for_impl::<Plain>()
///     .constructor(0, |_| Ok(Arc::new(Plain { name: "world".into() })))
///     .constructor(1, |args| {
///         Ok(Arc::new(Plain { name: args.get::<String>(0)?.clone() }))
///     });
///
/// let build = table.resolve(1).unwrap();
/// let greeter = build(&args!["crate".to_string()]).unwrap();
/// assert_eq!(greeter.greet(), "hello crate");
/// ```
pub struct ConstructorTable<T: ?Sized + 'static> {
    impl_name: &'static str,
    ctors: Vec<Constructor<T>>,
    upcasts: Upcasts<T>,
}

impl<T: ?Sized + Send + Sync + 'static> ConstructorTable<T> {
    /// Table for the concrete implementation `C`.
    ///
    /// `C` is only used for its type name, which becomes the "runtime type" the
    /// registry reports for instances this table produces.
    pub fn for_impl<C: 'static>() -> Self {
        Self {
            impl_name: type_name::<C>(),
            ctors: Vec::new(),
            upcasts: Upcasts::new(),
        }
    }

    /// Adds a constructor taking exactly `arity` arguments.
    ///
    /// Declaration order matters: resolution picks the first matching arity.
    #[must_use]
    pub fn constructor(
        mut self,
        arity: usize,
        build: impl Fn(&Args) -> Result<Arc<T>, RegistryError> + Send + Sync + 'static,
    ) -> Self {
        self.ctors.push(Constructor {
            arity,
            build: Arc::new(build),
        });
        self
    }

    /// Declares that instances produced by this table are also assignable to
    /// the contract `U`, discoverable by `Registry::get_all::<U>()`.
    #[must_use]
    pub fn extends<U: ?Sized + Send + Sync + 'static>(
        mut self,
        cast: impl Fn(Arc<T>) -> Arc<U> + Send + Sync + 'static,
    ) -> Self {
        self.upcasts = self.upcasts.extends(cast);
        self
    }

    /// Type name of the concrete implementation this table builds.
    pub fn impl_name(&self) -> &'static str {
        self.impl_name
    }

    /// Selects the first constructor whose arity equals `arg_count`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::ConstructorNotFound`] naming the implementation type
    /// and the attempted argument count. Nothing is constructed on failure.
    pub fn resolve(&self, arg_count: usize) -> Result<ConstructorFn<T>, RegistryError> {
        self.ctors
            .iter()
            .find(|ctor| ctor.arity == arg_count)
            .map(|ctor| ctor.build.clone())
            .ok_or(RegistryError::ConstructorNotFound {
                type_name: self.impl_name,
                arg_count,
            })
    }

    pub(crate) fn erased_upcasts(&self) -> Vec<Upcast> {
        self.upcasts.erased()
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Widget {
        size: u32,
    }

    fn table() -> ConstructorTable<Widget> {
        ConstructorTable::<Widget>::for_impl::<Widget>()
            .constructor(0, |_| Ok(Arc::new(Widget { size: 1 })))
            .constructor(1, |args| {
                Ok(Arc::new(Widget {
                    size: *args.get::<u32>(0)?,
                }))
            })
    }

    #[test]
    fn test_resolve_by_arity() {
        let table = table();
        let build = table.resolve(1).unwrap();
        let widget = build(&Args::new().with(7u32)).unwrap();
        assert_eq!(widget.size, 7);
    }

    #[test]
    fn test_resolve_zero_args() {
        let table = table();
        let build = table.resolve(0).unwrap();
        let widget = build(&Args::new()).unwrap();
        assert_eq!(widget.size, 1);
    }

    #[test]
    fn test_resolve_missing_arity() {
        let table = table();
        let err = table.resolve(2).err().unwrap();
        assert_eq!(
            err,
            RegistryError::ConstructorNotFound {
                type_name: std::any::type_name::<Widget>(),
                arg_count: 2,
            }
        );
    }

    #[test]
    fn test_first_matching_arity_wins() {
        // Two constructors with the same arity: declaration order decides.
        let table = ConstructorTable::<Widget>::for_impl::<Widget>()
            .constructor(0, |_| Ok(Arc::new(Widget { size: 10 })))
            .constructor(0, |_| Ok(Arc::new(Widget { size: 20 })));

        let build = table.resolve(0).unwrap();
        assert_eq!(build(&Args::new()).unwrap().size, 10);
    }

    #[test]
    fn test_argument_type_checked_at_invocation_only() {
        let table = table();
        // Arity matches, so resolution succeeds even though the argument is a
        // String where the constructor wants a u32.
        let build = table.resolve(1).unwrap();
        let err = build(&Args::new().with("seven".to_string())).unwrap_err();
        assert_eq!(
            err,
            RegistryError::ArgumentMismatch {
                index: 0,
                expected: std::any::type_name::<u32>(),
            }
        );
    }

    #[test]
    fn test_args_accessors() {
        let args = Args::new().with(3u8).with("x".to_string());
        assert_eq!(args.len(), 2);
        assert!(!args.is_empty());
        assert_eq!(*args.get::<u8>(0).unwrap(), 3);
        assert_eq!(args.get::<String>(1).unwrap(), "x");
        assert_eq!(args.type_name_at(0), Some(std::any::type_name::<u8>()));
        assert_eq!(args.type_name_at(5), None);
    }

    #[test]
    fn test_args_missing_index() {
        let args = Args::new();
        let err = args.get::<u8>(0).unwrap_err();
        assert_eq!(
            err,
            RegistryError::ArgumentMismatch {
                index: 0,
                expected: std::any::type_name::<u8>(),
            }
        );
    }
}
