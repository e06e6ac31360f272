use std::sync::Arc;

use serde_json::{Number, Value};

/// Conversion rules of a scalar type. Output coercion runs on resolver results, input coercion on
/// argument values. Both receive non-null values only.
pub trait ScalarCoercer: Send + Sync {
    fn coerce_output(&self, value: &Value) -> Result<Value, String>;
    fn coerce_input(&self, value: &Value) -> Result<Value, String>;
}

pub struct ScalarType {
    pub name: String,
    pub description: Option<String>,
    coercer: Arc<dyn ScalarCoercer>,
}

impl ScalarType {
    pub fn new(name: impl Into<String>, coercer: impl ScalarCoercer + 'static) -> Self {
        ScalarType {
            name: name.into(),
            description: None,
            coercer: Arc::new(coercer),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn coercer(&self) -> &dyn ScalarCoercer {
        self.coercer.as_ref()
    }
}

impl std::fmt::Debug for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScalarType").field("name", &self.name).finish()
    }
}

pub fn builtin_scalars() -> Vec<ScalarType> {
    vec![
        ScalarType::new("String", StringScalar),
        ScalarType::new("Int", IntScalar),
        ScalarType::new("Float", FloatScalar),
        ScalarType::new("Boolean", BooleanScalar),
        ScalarType::new("ID", IdScalar),
    ]
}

pub struct StringScalar;

impl ScalarCoercer for StringScalar {
    fn coerce_output(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::String(_) => Ok(value.clone()),
            Value::Bool(b) => Ok(Value::String(b.to_string())),
            Value::Number(n) => Ok(Value::String(n.to_string())),
            _ => Err(format!("String cannot represent value: {}", value)),
        }
    }

    fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(format!("String cannot represent a non string value: {}", value)),
        }
    }
}

pub struct IntScalar;

fn as_int(value: &Value) -> Option<i64> {
    let number = value.as_number()?;
    let int = match number.as_i64() {
        Some(int) => int,
        None => {
            let float = number.as_f64()?;
            if float.fract() != 0.0 {
                return None;
            }
            float as i64
        }
    };

    (i64::from(i32::MIN)..=i64::from(i32::MAX))
        .contains(&int)
        .then_some(int)
}

impl ScalarCoercer for IntScalar {
    fn coerce_output(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Bool(b) => Ok(Value::from(i64::from(*b))),
            Value::Number(_) => as_int(value)
                .map(Value::from)
                .ok_or_else(|| {
                    format!("Int cannot represent non 32-bit signed integer value: {}", value)
                }),
            _ => Err(format!("Int cannot represent non-integer value: {}", value)),
        }
    }

    fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        match value.as_number().and_then(Number::as_i64) {
            Some(_) => as_int(value)
                .map(Value::from)
                .ok_or_else(|| {
                    format!("Int cannot represent non 32-bit signed integer value: {}", value)
                }),
            None => Err(format!("Int cannot represent non-integer value: {}", value)),
        }
    }
}

pub struct FloatScalar;

impl ScalarCoercer for FloatScalar {
    fn coerce_output(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Bool(b) => Ok(Value::from(if *b { 1.0 } else { 0.0 })),
            Value::Number(n) => n
                .as_f64()
                .map(Value::from)
                .ok_or_else(|| format!("Float cannot represent value: {}", value)),
            _ => Err(format!("Float cannot represent non numeric value: {}", value)),
        }
    }

    fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        match value.as_f64() {
            Some(float) => Ok(Value::from(float)),
            None => Err(format!("Float cannot represent non numeric value: {}", value)),
        }
    }
}

pub struct BooleanScalar;

impl ScalarCoercer for BooleanScalar {
    fn coerce_output(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::Number(n) => Ok(Value::Bool(n.as_f64().is_some_and(|f| f != 0.0))),
            _ => Err(format!("Boolean cannot represent a non boolean value: {}", value)),
        }
    }

    fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            _ => Err(format!("Boolean cannot represent a non boolean value: {}", value)),
        }
    }
}

pub struct IdScalar;

impl ScalarCoercer for IdScalar {
    fn coerce_output(&self, value: &Value) -> Result<Value, String> {
        match value {
            Value::String(_) => Ok(value.clone()),
            Value::Number(n) if n.is_i64() || n.is_u64() => Ok(Value::String(n.to_string())),
            _ => Err(format!("ID cannot represent value: {}", value)),
        }
    }

    fn coerce_input(&self, value: &Value) -> Result<Value, String> {
        self.coerce_output(value)
    }
}
