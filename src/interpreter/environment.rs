use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::DataType;
use crate::value::Value;

/// A mutable cell: current value plus declared type and constness. Shared
/// handles to one slot are how by-reference parameters alias their argument.
#[derive(Debug, Clone)]
pub struct Slot {
    pub value: Value,
    pub is_constant: bool,
    pub data_type: DataType,
}

pub type SlotRef = Rc<RefCell<Slot>>;

#[derive(Debug, Clone)]
struct Entry {
    display: String,
    slot: SlotRef,
}

type Frame = IndexMap<String, Entry>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignError {
    Undeclared,
    Constant,
}

/// A stack of scope frames. Names are matched case-insensitively; each entry
/// remembers the casing it was declared with for snapshots. The outermost
/// frame holds the globals; subroutine calls build a fresh environment over
/// that frame only, so callees never see their caller's locals.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    frames: Vec<Frame>,
}

fn fold(name: &str) -> String {
    name.to_ascii_lowercase()
}

impl Environment {
    pub fn new() -> Self {
        Self {
            frames: vec![IndexMap::new()],
        }
    }

    /// Environment for a called subroutine: the shared globals frame plus one
    /// fresh scope for parameters and body locals. Slot handles are shared,
    /// so global mutations inside the callee stay visible to the caller.
    pub fn call_scope(&self) -> Environment {
        Environment {
            frames: vec![self.frames[0].clone(), IndexMap::new()],
        }
    }

    pub fn push_scope(&mut self) {
        self.frames.push(IndexMap::new());
    }

    pub fn pop_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Create an owned slot in the current scope. `Err` means the name is
    /// already declared in this scope.
    pub fn define(
        &mut self,
        name: &str,
        is_constant: bool,
        data_type: DataType,
        value: Value,
    ) -> Result<(), ()> {
        let key = fold(name);
        let frame = self.frames.last_mut().expect("scope stack is never empty");
        if frame.contains_key(&key) {
            return Err(());
        }
        frame.insert(
            key,
            Entry {
                display: name.to_string(),
                slot: Rc::new(RefCell::new(Slot {
                    value,
                    is_constant,
                    data_type,
                })),
            },
        );
        Ok(())
    }

    /// Install a foreign slot under a new name in the current scope; reads
    /// and writes through either name touch the same cell.
    pub fn define_alias(&mut self, name: &str, slot: SlotRef) -> Result<(), ()> {
        let key = fold(name);
        let frame = self.frames.last_mut().expect("scope stack is never empty");
        if frame.contains_key(&key) {
            return Err(());
        }
        frame.insert(
            key,
            Entry {
                display: name.to_string(),
                slot,
            },
        );
        Ok(())
    }

    pub fn resolve_slot(&self, name: &str) -> Option<SlotRef> {
        let key = fold(name);
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(&key))
            .map(|entry| Rc::clone(&entry.slot))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.resolve_slot(name).map(|slot| slot.borrow().value.clone())
    }

    pub fn data_type(&self, name: &str) -> Option<DataType> {
        self.resolve_slot(name).map(|slot| slot.borrow().data_type)
    }

    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), AssignError> {
        let slot = self.resolve_slot(name).ok_or(AssignError::Undeclared)?;
        let mut cell = slot.borrow_mut();
        if cell.is_constant {
            return Err(AssignError::Constant);
        }
        cell.value = value;
        Ok(())
    }

    /// Flatten all frames, outer first with inner scopes overriding, into an
    /// ordered `display name -> value` view for the debugger. Aliased slots
    /// contribute their current value like any other entry.
    pub fn serialize(&self) -> IndexMap<String, Value> {
        let mut merged: IndexMap<String, (String, Value)> = IndexMap::new();
        for frame in &self.frames {
            for (key, entry) in frame {
                merged.insert(
                    key.clone(),
                    (entry.display.clone(), entry.slot.borrow().value.clone()),
                );
            }
        }
        merged.into_values().collect()
    }
}
