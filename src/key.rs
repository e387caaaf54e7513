//! Key modeling for the registry: a runtime type token plus an optional label.
//!
//! Every entry in a [`crate::Registry`] is stored under a [`Key`], the combination
//! of a [`ContractId`] (the abstract type the entry was registered for) and a
//! string label. Two keys are equal iff both the contract and the label are equal,
//! so the same contract can be registered many times under different labels.

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime token identifying an abstract contract type.
///
/// Wraps the type's [`TypeId`] together with its `type_name` so diagnostics can
/// print something readable. Works for trait objects as well as concrete types:
///
/// ```
/// use contract_registry::ContractId;
///
/// trait Logger {}
///
/// let a = ContractId::of::<dyn Logger>();
/// let b = ContractId::of::<String>();
/// assert_ne!(a, b);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContractId {
    id: TypeId,
    name: &'static str,
}

impl ContractId {
    /// Token for the type `T`.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Fully qualified type name, e.g. `dyn my_app::Logger`.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Type name with the `dyn ` prefix and module path stripped, e.g. `Logger`.
    pub fn short_name(&self) -> &'static str {
        short_type_name(self.name)
    }
}

// Identity is the TypeId alone; the name is carried for diagnostics only.
impl PartialEq for ContractId {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ContractId {}

impl Hash for ContractId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for ContractId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Strips `dyn ` and the module path from a qualified type name.
///
/// Generic parameters are kept as-is: `alloc::vec::Vec<i32>` becomes `Vec<i32>`.
fn short_type_name(full: &'static str) -> &'static str {
    let name = full.strip_prefix("dyn ").unwrap_or(full);
    let head = name.find('<').unwrap_or(name.len());
    match name[..head].rfind("::") {
        Some(i) => &name[i + 2..],
        None => name,
    }
}

/// Identity under which a provider is stored: contract type plus label.
///
/// Immutable once constructed. An absent label normalizes to the empty string so
/// labeled and unlabeled registrations live in the same map without special cases.
#[derive(Debug, Clone)]
pub struct Key {
    contract: ContractId,
    label: String,
}

impl Key {
    /// Key for the contract `T` with the given label.
    pub fn new<T: ?Sized + 'static>(label: impl Into<String>) -> Self {
        Self::from_id(ContractId::of::<T>(), label)
    }

    /// Key for an already-obtained [`ContractId`].
    pub fn from_id(contract: ContractId, label: impl Into<String>) -> Self {
        Self {
            contract,
            label: label.into(),
        }
    }

    /// The contract token this key refers to.
    pub fn contract(&self) -> ContractId {
        self.contract
    }

    /// The label, possibly empty.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Human-readable form used by enumeration and error messages:
    /// `[label]:ContractName`.
    pub fn description(&self) -> String {
        format!("[{}]:{}", self.label, self.contract.short_name())
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.contract == other.contract && self.label == other.label
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Order-sensitive: contract first, then label, consistent with Eq.
        self.contract.hash(state);
        self.label.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

// -------------------------------------------------------------------------------------------------
// Tests
// -------------------------------------------------------------------------------------------------
