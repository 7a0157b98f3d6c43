//! Statically declared method signatures
//!
//! Services describe each callable method up front: its name and the ordered
//! list of formal parameters with their type classification and optionality.
//! The binder uses these descriptors to validate arity, reorder named
//! arguments and decode object-typed arguments.

use std::any::Any;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Decoded argument payload produced by a [`TypeDecoder`]
pub type DecodedValue = Box<dyn Any + Send>;

type DecodeFn = fn(Value) -> Result<DecodedValue, serde_json::Error>;

/// Deserializes a raw JSON argument into a concrete Rust type.
#[derive(Clone, Copy)]
pub struct TypeDecoder {
    type_name: &'static str,
    decode: DecodeFn,
}

impl TypeDecoder {
    /// Decoder targeting `T`
    pub fn of<T>() -> Self
    where
        T: DeserializeOwned + Send + 'static,
    {
        fn decode<T: DeserializeOwned + Send + 'static>(
            raw: Value,
        ) -> Result<DecodedValue, serde_json::Error> {
            serde_json::from_value::<T>(raw).map(|v| Box::new(v) as DecodedValue)
        }

        Self {
            type_name: std::any::type_name::<T>(),
            decode: decode::<T>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn decode(&self, raw: Value) -> Result<DecodedValue, serde_json::Error> {
        (self.decode)(raw)
    }
}

impl fmt::Debug for TypeDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDecoder")
            .field("type_name", &self.type_name)
            .finish()
    }
}

/// Declared type classification of a parameter
#[derive(Debug, Clone, Copy)]
pub enum ParamKind {
    /// Scalars; passed through untouched
    Primitive,
    /// Sequences; passed through untouched
    Array,
    /// Structured types decoded before invocation
    Object(TypeDecoder),
}

impl ParamKind {
    pub fn is_object(&self) -> bool {
        matches!(self, ParamKind::Object(_))
    }
}

/// A single formal parameter
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    pub name: String,
    pub kind: ParamKind,
    /// Parameter has a default and may be omitted
    pub optional: bool,
}

impl ParamDescriptor {
    pub fn new(name: impl Into<String>, kind: ParamKind, optional: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            optional,
        }
    }

    /// Required primitive parameter
    pub fn required(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Primitive, false)
    }

    /// Optional primitive parameter
    pub fn optional(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Primitive, true)
    }

    /// Required array parameter
    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Array, false)
    }

    /// Required parameter decoded into `T`
    pub fn object<T>(name: impl Into<String>) -> Self
    where
        T: DeserializeOwned + Send + 'static,
    {
        Self::new(name, ParamKind::Object(TypeDecoder::of::<T>()), false)
    }

    /// Optional parameter decoded into `T`
    pub fn optional_object<T>(name: impl Into<String>) -> Self
    where
        T: DeserializeOwned + Send + 'static,
    {
        Self::new(name, ParamKind::Object(TypeDecoder::of::<T>()), true)
    }

    /// Mark this parameter optional
    pub fn with_default(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Ordered parameter list of one callable method
#[derive(Debug, Clone)]
pub struct MethodSignature {
    name: String,
    params: Vec<ParamDescriptor>,
}

impl MethodSignature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
        }
    }

    /// Append a parameter in declaration order
    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    pub fn param_at(&self, index: usize) -> Option<&ParamDescriptor> {
        self.params.get(index)
    }

    /// Number of parameters without a default
    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| !p.optional).count()
    }

    pub fn total_count(&self) -> usize {
        self.params.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[test]
    fn test_signature_counts() {
        let sig = MethodSignature::new("add")
            .param(ParamDescriptor::required("a"))
            .param(ParamDescriptor::optional("b"));

        assert_eq!(sig.name(), "add");
        assert_eq!(sig.required_count(), 1);
        assert_eq!(sig.total_count(), 2);
        assert_eq!(sig.param_at(1).map(|p| p.name.as_str()), Some("b"));
    }

    #[test]
    fn test_zero_param_signature() {
        let sig = MethodSignature::new("ping");
        assert_eq!(sig.required_count(), 0);
        assert_eq!(sig.total_count(), 0);
    }

    #[test]
    fn test_type_decoder() {
        let decoder = TypeDecoder::of::<Point>();
        assert!(decoder.type_name().ends_with("Point"));

        let decoded = decoder.decode(json!({"x": 1, "y": 2})).unwrap();
        assert_eq!(decoded.downcast_ref::<Point>(), Some(&Point { x: 1, y: 2 }));

        assert!(decoder.decode(json!({"x": "one"})).is_err());
    }

    #[test]
    fn test_descriptor_builders() {
        assert!(ParamDescriptor::object::<Point>("p").kind.is_object());
        assert!(ParamDescriptor::optional_object::<Point>("p").optional);
        assert!(!ParamDescriptor::array("xs").kind.is_object());
        assert!(ParamDescriptor::required("a").with_default().optional);
    }
}
