//! Caller identities and the sender adaptation registry.
//!
//! A command may ask for the caller in several typed shapes through
//! [`SenderSlot`]s. Resolution first checks whether the caller already
//! satisfies the requested type (same concrete type, the root [`Sender`]
//! type, or a declared supertype). Failing that, strict slots consult the
//! [`SenderRegistry`] for an adapter registered for the caller's exact
//! concrete type; lenient slots bind as absent. Adapter lookup is a single
//! hop: an adapter registered for one type is never reused for another.
//!
//! Misses are not errors. An unresolved slot binds as absent and the handler
//! decides what that means.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, trace};

/// Tracing target for sender resolution.
pub(crate) const SENDER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::sender");

/// Identifier for a caller identity type.
///
/// Equality and hashing use the underlying [`TypeId`]; the name is kept for
/// diagnostics only.
#[derive(Clone, Copy)]
pub struct SenderType {
    id: TypeId,
    name: &'static str,
}

impl SenderType {
    /// Returns the identifier for `T`, which may be a trait object such as
    /// `dyn Sender`.
    #[must_use]
    pub fn of<T: ?Sized + Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the root caller identity type, satisfied by every sender.
    #[must_use]
    pub fn root() -> Self {
        Self::of::<dyn Sender>()
    }

    /// Returns the type name used in diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for SenderType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for SenderType {}

impl Hash for SenderType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for SenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for SenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// An entity that can issue commands.
///
/// Implementors only need [`name`](Self::name). Types that should also
/// satisfy slots requesting another identity type (an interface they
/// implement, or a broader kind of caller) list those types in
/// [`supertypes`](Self::supertypes).
pub trait Sender: Any + Send + Sync + fmt::Debug {
    /// Display name of the caller.
    fn name(&self) -> &str;

    /// Additional identity types this sender satisfies without adaptation.
    fn supertypes(&self) -> Vec<SenderType> {
        Vec::new()
    }

    /// Concrete runtime type of this sender.
    fn sender_type(&self) -> SenderType {
        SenderType::of::<Self>()
    }

    /// Returns `true` when this sender can be bound directly to a slot
    /// requesting `requested`.
    fn satisfies(&self, requested: SenderType) -> bool {
        requested == self.sender_type()
            || requested == SenderType::root()
            || self.supertypes().contains(&requested)
    }

    /// Returns `true` when this sender holds `permission`.
    ///
    /// Checked before a command that declares a permission runs. Every
    /// permission is granted unless the implementation says otherwise.
    fn has_permission(&self, permission: &str) -> bool {
        let _ = permission;
        true
    }
}

/// A declared caller-identity input of a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderSlot {
    name: String,
    requested: SenderType,
    strict: bool,
}

impl SenderSlot {
    /// Creates a slot that falls back to a registered adapter when the
    /// caller does not satisfy `T` directly.
    #[must_use]
    pub fn strict<T: ?Sized + Any>(name: impl Into<String>) -> Self {
        Self::new(name, SenderType::of::<T>(), true)
    }

    /// Creates a slot that binds only when the caller satisfies `T`
    /// directly.
    #[must_use]
    pub fn lenient<T: ?Sized + Any>(name: impl Into<String>) -> Self {
        Self::new(name, SenderType::of::<T>(), false)
    }

    /// Creates the lenient slot receiving the caller as a plain [`Sender`].
    #[must_use]
    pub fn primary(name: impl Into<String>) -> Self {
        Self::new(name, SenderType::root(), false)
    }

    /// Creates a slot from explicit parts.
    #[must_use]
    pub fn new(name: impl Into<String>, requested: SenderType, strict: bool) -> Self {
        Self {
            name: name.into(),
            requested,
            strict,
        }
    }

    /// Returns the slot name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the requested identity type.
    #[must_use]
    pub const fn requested(&self) -> SenderType {
        self.requested
    }

    /// Returns whether the slot may use adapters.
    #[must_use]
    pub const fn is_strict(&self) -> bool {
        self.strict
    }
}

/// A resolved sender slot value.
#[derive(Clone)]
pub enum BoundSender {
    /// The caller itself, which satisfied the requested type.
    Caller(Arc<dyn Sender>),
    /// The output of an adapter.
    Adapted(Arc<dyn Any + Send + Sync>),
}

impl BoundSender {
    /// Downcasts the bound value to the concrete type `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Caller(sender) => {
                let any: &dyn Any = &**sender;
                any.downcast_ref::<T>()
            }
            Self::Adapted(value) => (**value).downcast_ref::<T>(),
        }
    }

    /// Returns the caller when it was bound without adaptation.
    #[must_use]
    pub fn as_sender(&self) -> Option<&dyn Sender> {
        match self {
            Self::Caller(sender) => Some(&**sender),
            Self::Adapted(_) => None,
        }
    }

    /// Returns `true` when the value came from an adapter.
    #[must_use]
    pub const fn is_adapted(&self) -> bool {
        matches!(self, Self::Adapted(_))
    }
}

impl fmt::Debug for BoundSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Caller(sender) => f.debug_tuple("Caller").field(sender).finish(),
            Self::Adapted(_) => f.debug_tuple("Adapted").field(&"..").finish(),
        }
    }
}

/// Sender slot bindings for one invocation, in slot declaration order.
#[derive(Debug, Clone, Default)]
pub struct SenderBindings {
    slots: Vec<(String, Option<BoundSender>)>,
}

impl SenderBindings {
    /// Returns the value bound to `slot`, or `None` when the slot resolved as
    /// absent or is not declared.
    #[must_use]
    pub fn get(&self, slot: &str) -> Option<&BoundSender> {
        self.slots
            .iter()
            .find(|(name, _)| name == slot)
            .and_then(|(_, bound)| bound.as_ref())
    }

    /// Returns the value bound to `slot` downcast to `T`.
    #[must_use]
    pub fn get_as<T: Any>(&self, slot: &str) -> Option<&T> {
        self.get(slot).and_then(BoundSender::downcast_ref::<T>)
    }

    /// Returns `true` when `slot` resolved to a value.
    #[must_use]
    pub fn is_bound(&self, slot: &str) -> bool {
        self.get(slot).is_some()
    }

    /// Returns the number of declared slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` when the command declares no slots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Iterates over slot names and their bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&BoundSender>)> {
        self.slots
            .iter()
            .map(|(name, bound)| (name.as_str(), bound.as_ref()))
    }
}

type AdapterFn = dyn Fn(&dyn Sender) -> Option<Arc<dyn Any + Send + Sync>> + Send + Sync;
type AdapterTable = HashMap<(SenderType, SenderType), Arc<AdapterFn>>;

/// Registry of directed sender adapters keyed by `(source, target)` type.
///
/// The table is copy-on-write: registration clones the current table, inserts
/// the adapter, and swaps the new table in under the write lock. Resolution
/// takes a snapshot under the read lock and runs adapters without holding
/// it, so a concurrent reader sees either the old or the new table in full.
#[derive(Default)]
pub struct SenderRegistry {
    adapters: RwLock<Arc<AdapterTable>>,
}

impl SenderRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter from the concrete sender type `S` to `T`.
    ///
    /// A later registration for the same pair replaces the earlier one. No
    /// inverse adapter is derived.
    pub fn register_adapter<S, T, F>(&self, adapt: F)
    where
        S: Sender,
        T: Any + Send + Sync,
        F: Fn(&S) -> Option<T> + Send + Sync + 'static,
    {
        let source = SenderType::of::<S>();
        let target = SenderType::of::<T>();
        let adapter: Arc<AdapterFn> = Arc::new(move |sender: &dyn Sender| {
            let any: &dyn Any = sender;
            any.downcast_ref::<S>()
                .and_then(&adapt)
                .map(|adapted| Arc::new(adapted) as Arc<dyn Any + Send + Sync>)
        });

        let mut guard = self
            .adapters
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut table = AdapterTable::clone(&guard);
        let replaced = table.insert((source, target), adapter).is_some();
        *guard = Arc::new(table);

        debug!(
            target: SENDER_TARGET,
            source = source.name(),
            target_type = target.name(),
            replaced,
            "registered sender adapter"
        );
    }

    /// Returns `true` when an adapter is registered for the exact pair.
    #[must_use]
    pub fn has_adapter(&self, source: SenderType, target: SenderType) -> bool {
        self.snapshot().contains_key(&(source, target))
    }

    /// Returns the number of registered adapters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns `true` when no adapters are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }

    /// Resolves `caller` for one slot.
    #[must_use]
    pub fn resolve(&self, caller: &Arc<dyn Sender>, slot: &SenderSlot) -> Option<BoundSender> {
        self.resolve_type(caller, slot.requested(), slot.is_strict())
    }

    /// Resolves `caller` against a requested type.
    ///
    /// Returns the caller itself when it satisfies `requested`; otherwise,
    /// for strict resolution only, the output of the adapter registered for
    /// the caller's concrete type and `requested`. Returns `None` on a miss.
    #[must_use]
    pub fn resolve_type(
        &self,
        caller: &Arc<dyn Sender>,
        requested: SenderType,
        strict: bool,
    ) -> Option<BoundSender> {
        if caller.satisfies(requested) {
            return Some(BoundSender::Caller(Arc::clone(caller)));
        }
        if !strict {
            trace!(
                target: SENDER_TARGET,
                sender = caller.name(),
                requested = requested.name(),
                "lenient slot unresolved"
            );
            return None;
        }

        let adapter = self
            .snapshot()
            .get(&(caller.sender_type(), requested))
            .cloned();
        let adapted = adapter.and_then(|adapt| adapt(&**caller));
        trace!(
            target: SENDER_TARGET,
            sender = caller.name(),
            requested = requested.name(),
            adapted = adapted.is_some(),
            "strict slot resolved through adapter table"
        );
        adapted.map(BoundSender::Adapted)
    }

    /// Resolves every slot in declaration order.
    #[must_use]
    pub fn resolve_all(&self, caller: &Arc<dyn Sender>, slots: &[SenderSlot]) -> SenderBindings {
        SenderBindings {
            slots: slots
                .iter()
                .map(|slot| (slot.name().to_owned(), self.resolve(caller, slot)))
                .collect(),
        }
    }

    fn snapshot(&self) -> Arc<AdapterTable> {
        let guard = self
            .adapters
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }
}

impl fmt::Debug for SenderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        let pairs: Vec<String> = snapshot
            .keys()
            .map(|(source, target)| format!("{source} -> {target}"))
            .collect();
        f.debug_struct("SenderRegistry")
            .field("adapters", &pairs)
            .finish()
    }
}
