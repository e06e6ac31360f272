use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Output of `collect_value`: a resolved value shaped for the response document.
/// Composite values start as empty objects that child fields fill.
#[derive(Clone, Debug, PartialEq)]
pub enum ResponseValue {
    Null,
    Leaf(Value),
    List(Vec<ResponseValue>),
    Object(IndexMap<String, ResponseValue>),
}

impl ResponseValue {
    pub fn empty_object() -> Self {
        ResponseValue::Object(IndexMap::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ResponseValue::Null)
    }

    pub fn into_json(self) -> Value {
        match self {
            ResponseValue::Null => Value::Null,
            ResponseValue::Leaf(value) => value,
            ResponseValue::List(items) => {
                Value::Array(items.into_iter().map(ResponseValue::into_json).collect())
            }
            ResponseValue::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, value.into_json()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}
