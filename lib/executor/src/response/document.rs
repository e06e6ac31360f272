use std::sync::{Mutex, MutexGuard};

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{
    execution::error::ExecutionError,
    response::{
        graphql_error::{PathSegment, ResponsePath},
        value::ResponseValue,
    },
};

enum Slot {
    /// Declared by the parent before its children run, not written yet.
    Pending,
    Leaf(Value),
    List(Vec<Slot>),
    Object(IndexMap<String, Slot>),
    /// Forced to null by a non-null failure below it. Terminal for the rest of the request.
    Nulled,
}

impl From<ResponseValue> for Slot {
    fn from(value: ResponseValue) -> Self {
        match value {
            ResponseValue::Null => Slot::Leaf(Value::Null),
            ResponseValue::Leaf(value) => Slot::Leaf(value),
            ResponseValue::List(items) => Slot::List(items.into_iter().map(Slot::from).collect()),
            ResponseValue::Object(fields) => Slot::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, Slot::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Slot {
    fn into_json(self) -> Value {
        match self {
            Slot::Pending | Slot::Nulled => Value::Null,
            Slot::Leaf(value) => value,
            Slot::List(items) => Value::Array(items.into_iter().map(Slot::into_json).collect()),
            Slot::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, value.into_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    fn is_collapsed(&self) -> bool {
        matches!(self, Slot::Nulled | Slot::Leaf(Value::Null))
    }
}

/// The response document under construction, shared by every node of a request.
///
/// Nodes write disjoint slots. Bubbling replaces a slot with a terminal null: writes that target
/// the slot or anything below it afterwards are dropped, so the order of concurrent writers and
/// bubbles never matters.
pub struct ResponseDocument {
    root: Mutex<Slot>,
}

impl Default for ResponseDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseDocument {
    pub fn new() -> Self {
        ResponseDocument {
            root: Mutex::new(Slot::Object(IndexMap::new())),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Slot>, ExecutionError> {
        self.root
            .lock()
            .map_err(|_| ExecutionError::PoisonedLock("response document"))
    }

    /// Declares the keys of the object at `path`, in selection order, before its fields run.
    /// Does nothing when the object was collapsed in the meantime.
    pub fn prepare_object<'k>(
        &self,
        path: &ResponsePath,
        keys: impl IntoIterator<Item = &'k str>,
    ) -> Result<(), ExecutionError> {
        let mut root = self.lock()?;
        let Some(slot) = locate(&mut root, path)? else {
            return Ok(());
        };

        match slot {
            Slot::Object(fields) => {
                for key in keys {
                    fields.entry(key.to_string()).or_insert(Slot::Pending);
                }
                Ok(())
            }
            slot if slot.is_collapsed() => Ok(()),
            _ => Err(ExecutionError::SlotShapeMismatch(path.clone())),
        }
    }

    /// Writes a field's coerced value. Returns `false` when the write was dropped because the
    /// slot, or one of its ancestors, was nulled by bubbling.
    pub fn write(&self, path: &ResponsePath, value: ResponseValue) -> Result<bool, ExecutionError> {
        let mut root = self.lock()?;
        let Some(slot) = locate_field_slot(&mut root, path)? else {
            return Ok(false);
        };

        if matches!(slot, Slot::Nulled) {
            return Ok(false);
        }

        *slot = Slot::from(value);
        Ok(true)
    }

    /// Forces the field slot at `path` to null. Idempotent.
    pub fn null_slot(&self, path: &ResponsePath) -> Result<(), ExecutionError> {
        let mut root = self.lock()?;
        if let Some(slot) = locate_field_slot(&mut root, path)? {
            *slot = Slot::Nulled;
        }
        Ok(())
    }

    /// Forces the whole document to null: a non-null root field failed.
    pub fn null_document(&self) -> Result<(), ExecutionError> {
        let mut root = self.lock()?;
        *root = Slot::Nulled;
        Ok(())
    }

    pub fn into_data(self) -> Result<Option<Value>, ExecutionError> {
        let root = self
            .root
            .into_inner()
            .map_err(|_| ExecutionError::PoisonedLock("response document"))?;

        Ok(match root {
            Slot::Nulled => None,
            root => Some(root.into_json()),
        })
    }
}

/// Walks `path` from the root. `None` means a collapsed ancestor swallowed the location.
fn locate<'s>(
    root: &'s mut Slot,
    path: &ResponsePath,
) -> Result<Option<&'s mut Slot>, ExecutionError> {
    let mut current = root;

    for segment in path.segments() {
        if current.is_collapsed() {
            return Ok(None);
        }

        current = match (current, segment) {
            (Slot::Object(fields), PathSegment::Field(key)) => match fields.get_mut(key.as_str()) {
                Some(slot) => slot,
                None => return Err(ExecutionError::MissingSlot(path.clone())),
            },
            (Slot::List(items), PathSegment::Index(index)) => match items.get_mut(*index) {
                Some(slot) => slot,
                None => return Err(ExecutionError::MissingSlot(path.clone())),
            },
            _ => return Err(ExecutionError::SlotShapeMismatch(path.clone())),
        };
    }

    Ok(Some(current))
}

/// Resolves the slot of a field: the parent object must exist and must have declared the key.
fn locate_field_slot<'s>(
    root: &'s mut Slot,
    path: &ResponsePath,
) -> Result<Option<&'s mut Slot>, ExecutionError> {
    let Some((PathSegment::Field(key), parent_segments)) = path.segments().split_last() else {
        return Err(ExecutionError::SlotShapeMismatch(path.clone()));
    };

    let parent_path = ResponsePath::from(parent_segments.to_vec());
    let Some(parent) = locate(root, &parent_path)? else {
        return Ok(None);
    };

    match parent {
        Slot::Object(fields) => match fields.get_mut(key.as_str()) {
            Some(slot) => Ok(Some(slot)),
            None => Err(ExecutionError::MissingSlot(path.clone())),
        },
        Slot::Nulled | Slot::Leaf(Value::Null) => Ok(None),
        _ => Err(ExecutionError::SlotShapeMismatch(path.clone())),
    }
}
