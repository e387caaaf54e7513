//! Macros: argument-list construction and process-wide registry modules.

/// Builds an [`crate::Args`] list from a comma-separated list of values.
///
/// # Examples
///
/// ```
/// use contract_registry::args;
///
/// let list = args![7u32, "name".to_string(), true];
/// assert_eq!(list.len(), 3);
/// assert_eq!(*list.get::<u32>(0).unwrap(), 7);
///
/// let empty = args![];
/// assert!(empty.is_empty());
/// ```
#[macro_export]
macro_rules! args {
    () => {
        $crate::Args::new()
    };
    ($($value:expr),+ $(,)?) => {{
        let mut list = $crate::Args::new();
        $(list.push($value);)+
        list
    }};
}

/// Creates a named module wrapping a process-wide [`crate::Registry`].
///
/// The explicit-value API is the primary one; this macro exists for embedders
/// that still want a shared process-wide instance. The generated module holds
/// the registry behind a `LazyLock`, so every access goes through the same
/// lock-guarded store, and exposes free functions for the common operations
/// plus [`registry()`](crate::Registry) for everything else.
///
/// # Examples
///
/// ```rust
/// use contract_registry::define_registry;
/// use std::sync::Arc;
///
/// define_registry!(app);
///
/// app::register(42i32).unwrap();
/// app::register("Hello".to_string()).unwrap();
///
/// let num: Arc<i32> = app::get().unwrap();
/// let msg: Arc<String> = app::get().unwrap();
///
/// assert_eq!(*num, 42);
/// assert_eq!(&**msg, "Hello");
/// ```
///
/// # Multiple Registries
///
/// Each generated module is completely isolated:
///
/// ```rust
/// use contract_registry::define_registry;
///
/// define_registry!(database);
/// define_registry!(cache);
///
/// database::register("db_connection".to_string()).unwrap();
/// cache::register("redis_connection".to_string()).unwrap();
///
/// assert!(database::contains::<String>());
/// assert!(cache::contains::<String>());
/// ```
///
/// # Full API Access
///
/// Constructor-based registration and enumeration go through `registry()`:
///
/// ```rust
/// use contract_registry::{args, define_registry, ConstructorTable};
/// use std::sync::Arc;
///
/// define_registry!(services);
///
/// struct Counter(u32);
///
/// let table = ConstructorTable::<Counter>::for_impl::<Counter>()
///     .constructor(1, |args| Ok(Arc::new(Counter(*args.get::<u32>(0)?))));
///
/// services::registry()
///     .register_factory(&table, args![5u32])
///     .unwrap();
///
/// assert_eq!(services::get::<Counter>().unwrap().0, 5);
/// ```
#[macro_export]
macro_rules! define_registry {
    ($name:ident) => {
        pub mod $name {
            use std::sync::{Arc, LazyLock};

            static REGISTRY: LazyLock<$crate::Registry> = LazyLock::new($crate::Registry::new);

            /// The shared registry instance backing this module. Use it for
            /// operations without a free-function wrapper here.
            pub fn registry() -> &'static $crate::Registry {
                &REGISTRY
            }

            /// Register a fixed instance under the concrete contract `T`.
            pub fn register<T: Send + Sync + 'static>(
                value: T,
            ) -> Result<(), $crate::RegistryError> {
                REGISTRY.register(value)
            }

            /// Register a fixed instance under `T` with a label.
            pub fn register_labeled<T: Send + Sync + 'static>(
                label: &str,
                value: T,
            ) -> Result<(), $crate::RegistryError> {
                REGISTRY.register_labeled(label, value)
            }

            /// Register an `Arc`-wrapped instance (use for trait-object contracts).
            pub fn register_arc<T: ?Sized + Send + Sync + 'static>(
                value: Arc<T>,
            ) -> Result<(), $crate::RegistryError> {
                REGISTRY.register_arc(value)
            }

            /// Register an `Arc`-wrapped instance with a label.
            pub fn register_arc_labeled<T: ?Sized + Send + Sync + 'static>(
                label: &str,
                value: Arc<T>,
            ) -> Result<(), $crate::RegistryError> {
                REGISTRY.register_arc_labeled(label, value)
            }

            /// Resolve the unlabeled entry for `T`.
            pub fn get<T: ?Sized + Send + Sync + 'static>() -> Option<Arc<T>> {
                REGISTRY.get::<T>()
            }

            /// Resolve the entry for `T` under `label`.
            pub fn get_labeled<T: ?Sized + Send + Sync + 'static>(label: &str) -> Option<Arc<T>> {
                REGISTRY.get_labeled::<T>(label)
            }

            /// Check whether an unlabeled entry exists for `T`.
            pub fn contains<T: ?Sized + 'static>() -> bool {
                REGISTRY.contains::<T>()
            }

            /// Check whether an entry exists for `T` under `label`.
            pub fn contains_labeled<T: ?Sized + 'static>(label: &str) -> bool {
                REGISTRY.contains_labeled::<T>(label)
            }

            /// Remove the unlabeled entry for `T`, if present.
            pub fn remove<T: ?Sized + 'static>() -> bool {
                REGISTRY.remove::<T>()
            }

            /// Remove the entry for `T` under `label`, if present.
            pub fn remove_labeled<T: ?Sized + 'static>(label: &str) -> bool {
                REGISTRY.remove_labeled::<T>(label)
            }

            /// Discard every entry in this module's registry.
            pub fn clear() {
                REGISTRY.clear()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    #[test]
    fn test_args_macro() {
        let list = args![1u8, 2u16, "three".to_string()];
        assert_eq!(list.len(), 3);
        assert_eq!(*list.get::<u8>(0).unwrap(), 1);
        assert_eq!(*list.get::<u16>(1).unwrap(), 2);
        assert_eq!(list.get::<String>(2).unwrap(), "three");
    }

    #[test]
    fn test_args_macro_empty() {
        let list = args![];
        assert!(list.is_empty());
    }

    #[test]
    fn test_args_macro_trailing_comma() {
        let list = args![1u8,];
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_define_registry_macro() {
        define_registry!(test_reg);

        test_reg::register(100i32).unwrap();
        let value: Arc<i32> = test_reg::get().unwrap();
        assert_eq!(*value, 100);

        assert!(test_reg::contains::<i32>());
        assert!(!test_reg::contains::<f64>());
    }

    #[test]
    fn test_multiple_registries_isolated() {
        define_registry!(reg_a);
        define_registry!(reg_b);

        reg_a::register(1i32).unwrap();
        reg_b::register(2i32).unwrap();

        assert_eq!(*reg_a::get::<i32>().unwrap(), 1);
        assert_eq!(*reg_b::get::<i32>().unwrap(), 2);
    }
}
