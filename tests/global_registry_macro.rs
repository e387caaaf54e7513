//! The `define_registry!` module form: a shared process-wide registry.
//!
//! These tests mutate module-level state, so they run serialized.

use std::sync::Arc;

use contract_registry::define_registry;
use serial_test::serial;

define_registry!(app);

trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

struct FixedClock(u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

#[test]
#[serial]
fn register_and_get_through_the_module() {
    app::clear();

    app::register(42i32).unwrap();
    let num: Arc<i32> = app::get().unwrap();
    assert_eq!(*num, 42);

    assert!(app::contains::<i32>());
    assert!(!app::contains::<f64>());
}

#[test]
#[serial]
fn trait_contracts_work_through_the_module() {
    app::clear();

    app::register_arc_labeled::<dyn Clock>("fixed", Arc::new(FixedClock(7))).unwrap();

    let clock = app::get_labeled::<dyn Clock>("fixed").unwrap();
    assert_eq!(clock.now(), 7);
    assert!(!app::contains_labeled::<dyn Clock>("system"));
}

#[test]
#[serial]
fn duplicates_are_rejected_like_the_value_api() {
    app::clear();

    app::register("first".to_string()).unwrap();
    assert!(app::register("second".to_string()).is_err());
    assert_eq!(&*app::get::<String>().unwrap(), "first");
}

#[test]
#[serial]
fn remove_and_clear_through_the_module() {
    app::clear();

    app::register_labeled("a", 1u32).unwrap();
    app::register_labeled("b", 2u32).unwrap();

    assert!(app::remove_labeled::<u32>("a"));
    assert!(app::contains_labeled::<u32>("b"));

    app::clear();
    assert!(!app::contains_labeled::<u32>("b"));
}

#[test]
#[serial]
fn full_api_is_reachable_via_registry() {
    app::clear();

    use contract_registry::{args, ConstructorTable};

    let table = ConstructorTable::<FixedClock>::for_impl::<FixedClock>()
        .constructor(1, |args| Ok(Arc::new(FixedClock(*args.get::<u64>(0)?))));
    app::registry().register_factory(&table, args![9u64]).unwrap();

    let first = app::get::<FixedClock>().unwrap();
    let second = app::get::<FixedClock>().unwrap();
    assert_eq!(first.now(), 9);
    assert!(!Arc::ptr_eq(&first, &second));
}

#[test]
#[serial]
fn shared_across_threads() {
    app::clear();

    let handle = std::thread::spawn(|| {
        app::register(100u64).unwrap();
    });
    handle.join().unwrap();

    assert_eq!(*app::get::<u64>().unwrap(), 100);
}
