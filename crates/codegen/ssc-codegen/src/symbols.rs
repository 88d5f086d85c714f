//! Flat symbol table mapping variable names to stack slots

use la_arena::{Arena, Idx};
use rustc_hash::FxHashMap;
use ssc_intern::Symbol;
use ssc_ir::Value;

/// Unique identifier for a variable slot
pub type SlotId = Idx<Slot>;

/// Stack storage backing one source variable
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    /// Variable name
    pub name: Symbol,
    /// Address produced by the slot's `alloca`
    pub ptr: Value,
    /// Whether a store into the slot has been emitted
    pub written: bool,
    /// Whether a read before assignment has already been reported
    pub warned: bool,
}

/// Symbol table for one compilation
///
/// No scopes and no shadowing: a name maps to at most one slot, and the
/// slot lives as long as the table.
#[derive(Debug, Default)]
pub struct SymbolTable {
    slots: Arena<Slot>,
    by_name: FxHashMap<Symbol, SlotId>,
}

impl SymbolTable {
    /// Create a new empty symbol table
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot already registered for `name`
    pub fn lookup(&self, name: Symbol) -> Option<SlotId> {
        self.by_name.get(&name).copied()
    }

    /// Register a freshly allocated slot for `name`
    ///
    /// Callers check [`Self::lookup`] first; registering a name twice keeps
    /// the original slot and returns it.
    pub fn register(&mut self, name: Symbol, ptr: Value) -> SlotId {
        if let Some(existing) = self.lookup(name) {
            return existing;
        }
        let id = self.slots.alloc(Slot {
            name,
            ptr,
            written: false,
            warned: false,
        });
        self.by_name.insert(name, id);
        id
    }

    /// Record that a store into `slot` was emitted
    pub fn mark_written(&mut self, slot: SlotId) {
        self.slots[slot].written = true;
    }

    /// Record that a read of `slot` before assignment was reported
    pub fn mark_warned(&mut self, slot: SlotId) {
        self.slots[slot].warned = true;
    }

    /// Get slot data
    pub fn get(&self, slot: SlotId) -> &Slot {
        &self.slots[slot]
    }

    /// Number of allocated slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot has been allocated
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
