use serde::Deserialize;
use serde_json::{Map, Value};

/// Helper that accepts either a single value or an array when deserializing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SingleOrVec<T> {
    Vec(Vec<T>),
    Single(T),
}

impl<T> SingleOrVec<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            SingleOrVec::Single(value) => vec![value],
            SingleOrVec::Vec(values) => values,
        }
    }
}

impl<T> Default for SingleOrVec<T> {
    fn default() -> Self {
        SingleOrVec::Vec(Vec::new())
    }
}

/// Reads a list attribute value: an array of objects or a single object.
pub(crate) fn object_list(value: &Value) -> Option<Vec<Map<String, Value>>> {
    SingleOrVec::<Map<String, Value>>::deserialize(value)
        .ok()
        .map(SingleOrVec::into_vec)
}

/// Short JSON type name for error messages.
pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_single_or_vec_accepts_both_shapes() {
        let single: SingleOrVec<u32> = serde_json::from_value(json!(1)).unwrap();
        assert_eq!(single.into_vec(), vec![1]);

        let many: SingleOrVec<u32> = serde_json::from_value(json!([1, 2])).unwrap();
        assert_eq!(many.into_vec(), vec![1, 2]);
    }

    #[test]
    fn test_object_list() {
        let items = object_list(&json!([{"value": "Beer"}, {"value": "Wine"}])).unwrap();
        assert_eq!(items.len(), 2);

        let single = object_list(&json!({"value": "Beer"})).unwrap();
        assert_eq!(single[0].get("value"), Some(&json!("Beer")));

        assert!(object_list(&json!("Beer")).is_none());
        assert!(object_list(&json!(["Beer"])).is_none());
    }

    #[test]
    fn test_json_type() {
        assert_eq!(json_type(&json!(null)), "null");
        assert_eq!(json_type(&json!({"a": 1})), "object");
        assert_eq!(json_type(&json!([1])), "array");
    }
}
