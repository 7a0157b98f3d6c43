//! Binding of request params onto a method signature
//!
//! Binding runs three steps in order: the arity check against the raw number
//! of supplied arguments, reordering of named arguments into declaration
//! order, and decoding of object-typed arguments.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{DispatchError, ServiceError};
use crate::request::RequestParams;
use crate::signature::{DecodedValue, MethodSignature, ParamKind};

enum Slot {
    Raw(Value),
    Decoded(DecodedValue),
}

/// Ordered, fully bound arguments handed to a service method.
///
/// Missing trailing arguments and explicit `null` read the same way, so a
/// method sees identical input whether optional parameters were omitted
/// positionally or by name.
#[derive(Default)]
pub struct Arguments {
    slots: Vec<Slot>,
}

impl Arguments {
    /// Positional arguments with no decoding applied
    pub fn from_values(values: Vec<Value>) -> Self {
        Self {
            slots: values.into_iter().map(Slot::Raw).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Raw JSON at `index`, if that slot was not decoded
    pub fn raw(&self, index: usize) -> Option<&Value> {
        match self.slots.get(index)? {
            Slot::Raw(value) => Some(value),
            Slot::Decoded(_) => None,
        }
    }

    /// Borrow a decoded object argument
    pub fn decoded<T: 'static>(&self, index: usize) -> Option<&T> {
        match self.slots.get(index)? {
            Slot::Decoded(value) => value.downcast_ref::<T>(),
            Slot::Raw(_) => None,
        }
    }

    /// Take the argument at `index` as `T`.
    ///
    /// Returns `Ok(None)` when the slot is absent or null. Raw values are
    /// deserialized; decoded values are moved out when their type matches.
    /// On error the slot is left as it was.
    pub fn take<T>(&mut self, index: usize) -> Result<Option<T>, ServiceError>
    where
        T: DeserializeOwned + 'static,
    {
        let Some(slot) = self.slots.get_mut(index) else {
            return Ok(None);
        };

        match std::mem::replace(slot, Slot::Raw(Value::Null)) {
            Slot::Raw(Value::Null) => Ok(None),
            Slot::Raw(value) => match T::deserialize(&value) {
                Ok(v) => Ok(Some(v)),
                Err(e) => {
                    *slot = Slot::Raw(value);
                    Err(ServiceError::argument(index, e.to_string()))
                }
            },
            Slot::Decoded(value) => match value.downcast::<T>() {
                Ok(v) => Ok(Some(*v)),
                Err(value) => {
                    *slot = Slot::Decoded(value);
                    Err(ServiceError::argument(
                        index,
                        format!("expected {}", std::any::type_name::<T>()),
                    ))
                }
            },
        }
    }

    /// Like [`take`](Self::take) but fails on a missing or null argument
    pub fn require<T>(&mut self, index: usize) -> Result<T, ServiceError>
    where
        T: DeserializeOwned + 'static,
    {
        self.take(index)?
            .ok_or_else(|| ServiceError::argument(index, "missing required argument"))
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = f.debug_list();
        for slot in &self.slots {
            match slot {
                Slot::Raw(value) => list.entry(value),
                Slot::Decoded(_) => list.entry(&"<decoded>"),
            };
        }
        list.finish()
    }
}

/// Bind `params` onto `signature`, producing invocation-ready arguments
pub fn bind(
    params: Option<RequestParams>,
    signature: &MethodSignature,
) -> Result<Arguments, DispatchError> {
    let supplied = params.as_ref().map_or(0, RequestParams::len);
    let required = signature.required_count();
    let total = signature.total_count();

    if supplied < required || supplied > total {
        return Err(DispatchError::Arity {
            supplied,
            required,
            total,
        });
    }

    let values = match params.map(RequestParams::into_positional) {
        None => Vec::new(),
        Some(Ok(values)) => values,
        Some(Err(named)) => reorder(named, signature)?,
    };

    debug!(
        method = signature.name(),
        supplied, required, total, "bound params"
    );

    decode(values, signature)
}

/// Rebuild a positional list from named params in declaration order.
/// Keys not matching any parameter are dropped.
fn reorder(
    mut named: Map<String, Value>,
    signature: &MethodSignature,
) -> Result<Vec<Value>, DispatchError> {
    signature
        .params()
        .iter()
        .map(|param| match named.remove(&param.name) {
            Some(value) => Ok(value),
            None if param.optional => Ok(Value::Null),
            None => Err(DispatchError::MissingParam(param.name.clone())),
        })
        .collect()
}

fn decode(values: Vec<Value>, signature: &MethodSignature) -> Result<Arguments, DispatchError> {
    let slots = values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match signature.param_at(index) {
            Some(param) if !value.is_null() => match param.kind {
                ParamKind::Object(decoder) => decoder.decode(value).map(Slot::Decoded).map_err(
                    |e| DispatchError::ParamDecode {
                        name: param.name.clone(),
                        message: e.to_string(),
                    },
                ),
                ParamKind::Primitive | ParamKind::Array => Ok(Slot::Raw(value)),
            },
            _ => Ok(Slot::Raw(value)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Arguments { slots })
}
