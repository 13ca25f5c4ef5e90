//! Records from serde-serializable values, going through [`serde_json::Value`].
//!
//! JSON numbers become `i64` scalars when integral and `f64` otherwise; the shredder coerces them
//! into the physical type of the target column.

use std::borrow::Cow;

use serde::Serialize;
use shale_error::{ShaleError, ShaleResult, shale_err};

use crate::{Record, ScalarValue, ToRecord, Value};

impl TryFrom<serde_json::Value> for Value {
    type Error = ShaleError;

    fn try_from(value: serde_json::Value) -> ShaleResult<Self> {
        Ok(match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::from(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::from(i),
                None => Value::from(n.as_f64().ok_or_else(|| {
                    shale_err!(TypeMismatch: "JSON number {n} is not representable as f64")
                })?),
            },
            serde_json::Value::String(s) => Value::Scalar(ScalarValue::Utf8(s)),
            serde_json::Value::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(Value::try_from)
                    .collect::<ShaleResult<_>>()?,
            ),
            serde_json::Value::Object(map) => Value::Group(
                map.into_iter()
                    .map(|(k, v)| Ok((k, Value::try_from(v)?)))
                    .collect::<ShaleResult<Vec<_>>>()?
                    .into_iter()
                    .collect(),
            ),
        })
    }
}

impl ToRecord for serde_json::Value {
    fn to_record(&self) -> ShaleResult<Cow<'_, Record>> {
        match Value::try_from(self.clone())? {
            Value::Group(record) => Ok(Cow::Owned(record)),
            other => Err(shale_err!(
                TypeMismatch: "Expected a JSON object at the top level, got {}",
                other.shape()
            )),
        }
    }
}

/// Adapts any [`Serialize`] type into a [`ToRecord`] producer.
///
/// ```
/// use serde::Serialize;
/// use shale_scalar::{JsonRecord, ToRecord, Value};
///
/// #[derive(Serialize)]
/// struct Doc {
///     id: i64,
///     tags: Vec<String>,
/// }
///
/// let doc = JsonRecord(Doc { id: 1, tags: vec!["a".into()] });
/// let record = doc.to_record().unwrap();
/// assert_eq!(record.get("id"), Some(&Value::from(1i64)));
/// ```
#[derive(Debug, Clone)]
pub struct JsonRecord<T>(pub T);

impl<T: Serialize> ToRecord for JsonRecord<T> {
    fn to_record(&self) -> ShaleResult<Cow<'_, Record>> {
        serde_json::to_value(&self.0)?
            .to_record()
            .map(|record| Cow::Owned(record.into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;
    use serde_json::json;

    use super::*;

    #[test]
    fn nested_json_object() {
        let record = json!({
            "DocId": 10,
            "Links": {"Forward": [20, 40, 60]},
            "Name": [{"Url": "http://A"}, {"Url": null}],
            "Score": 0.5,
        })
        .to_record()
        .unwrap()
        .into_owned();

        assert_eq!(record.get("DocId"), Some(&Value::from(10i64)));
        assert_eq!(record.get("Score"), Some(&Value::from(0.5f64)));
        let names = record.get("Name").unwrap().as_list().unwrap();
        assert_eq!(names.len(), 2);
        assert!(names[1].as_group().unwrap().get("Url").unwrap().is_null());
    }

    #[test]
    fn top_level_array_is_rejected() {
        let err = json!([1, 2]).to_record().unwrap_err();
        assert!(matches!(err, ShaleError::TypeMismatch(..)));
    }

    #[test]
    fn serializable_struct() {
        #[derive(Serialize)]
        struct Link {
            forward: Vec<i64>,
            backward: Option<Vec<i64>>,
        }

        let link = JsonRecord(Link {
            forward: vec![20],
            backward: None,
        });
        let record = link.to_record().unwrap();
        assert_eq!(record.get("forward"), Some(&Value::from(vec![20i64])));
        assert_eq!(record.get("backward"), Some(&Value::Null));
    }
}
