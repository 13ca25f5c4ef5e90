use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::hash::BuildHasher;

use bytes::Bytes;
use itertools::Itertools;
use shale_error::{ShaleResult, shale_bail};

use crate::ScalarValue;

/// The generic shape of nested record data.
///
/// An omitted key and [`Value::Null`] both mean "absent".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// An explicitly absent value
    Null,
    /// An atomic value for a leaf column
    Scalar(ScalarValue),
    /// The elements of a repeated node
    List(Vec<Value>),
    /// A nested group
    Group(Record),
}

impl Value {
    /// Returns true for [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The scalar, if this is a [`Value::Scalar`]
    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Value::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// The elements, if this is a [`Value::List`]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    /// The nested record, if this is a [`Value::Group`]
    pub fn as_group(&self) -> Option<&Record> {
        match self {
            Value::Group(g) => Some(g),
            _ => None,
        }
    }

    /// A short description of the shape of the value, for error messages
    pub fn shape(&self) -> Cow<'static, str> {
        match self {
            Value::Null => "null".into(),
            Value::Scalar(s) => format!("{} scalar", s.physical_type()).into(),
            Value::List(_) => "list".into(),
            Value::Group(_) => "group".into(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Scalar(s) => write!(f, "{s}"),
            Value::List(l) => write!(f, "[{}]", l.iter().join(", ")),
            Value::Group(g) => write!(f, "{g}"),
        }
    }
}

macro_rules! value_from_scalar {
    ($($T:ty),*) => {
        $(
            impl From<$T> for Value {
                fn from(value: $T) -> Self {
                    Value::Scalar(ScalarValue::from(value))
                }
            }
        )*
    };
}

value_from_scalar!(bool, i32, i64, f32, f64, Bytes, String, &str);

impl From<ScalarValue> for Value {
    fn from(value: ScalarValue) -> Self {
        Value::Scalar(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Value::Group(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Value::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A field-name-keyed group of values: the top-level shape of every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with<K: Into<String>, V: Into<Value>>(mut self, name: K, value: V) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, name: K, value: V) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.0.iter().map(|(k, v)| format!("{k}: {v}")).join(", ")
        )
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Anything that can present itself as a nested [`Record`] for shredding.
///
/// The structural [`Record`] shape implements this trivially; other producers (for example
/// serde-serializable structs behind the `json` feature) convert on demand.
pub trait ToRecord {
    /// Returns the record, borrowing where no conversion is needed.
    fn to_record(&self) -> ShaleResult<Cow<'_, Record>>;
}

impl ToRecord for Record {
    fn to_record(&self) -> ShaleResult<Cow<'_, Record>> {
        Ok(Cow::Borrowed(self))
    }
}

impl ToRecord for Value {
    fn to_record(&self) -> ShaleResult<Cow<'_, Record>> {
        match self {
            Value::Group(record) => Ok(Cow::Borrowed(record)),
            other => shale_bail!(TypeMismatch: "Expected a group at the top level, got {}", other.shape()),
        }
    }
}

impl ToRecord for BTreeMap<String, Value> {
    fn to_record(&self) -> ShaleResult<Cow<'_, Record>> {
        Ok(Cow::Owned(Record(self.clone())))
    }
}

impl<S: BuildHasher> ToRecord for HashMap<String, Value, S> {
    fn to_record(&self) -> ShaleResult<Cow<'_, Record>> {
        Ok(Cow::Owned(
            self.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        ))
    }
}

impl<T: ToRecord + ?Sized> ToRecord for &T {
    fn to_record(&self) -> ShaleResult<Cow<'_, Record>> {
        (**self).to_record()
    }
}

#[cfg(test)]
mod tests {
    use shale_error::ShaleError;

    use super::*;

    #[test]
    fn builder_and_conversions() {
        let record = Record::new()
            .with("DocId", 10i64)
            .with("Links", Record::new().with("Forward", vec![20i64, 40, 60]))
            .with("Missing", None::<i64>);

        assert_eq!(record.len(), 3);
        assert_eq!(
            record.get("DocId"),
            Some(&Value::Scalar(ScalarValue::I64(10)))
        );
        assert!(record.get("Missing").unwrap().is_null());
        let forward = record.get("Links").unwrap().as_group().unwrap().get("Forward");
        assert_eq!(forward.unwrap().as_list().unwrap().len(), 3);
    }

    #[test]
    fn display_nested() {
        let record = Record::new()
            .with("a", 1i32)
            .with("b", vec![Record::new().with("c", "x")]);
        assert_eq!(record.to_string(), "{a: 1i32, b: [{c: \"x\"}]}");
    }

    #[test]
    fn top_level_must_be_group() {
        let err = Value::from(3i32).to_record().unwrap_err();
        assert!(matches!(err, ShaleError::TypeMismatch(..)));

        let value = Value::Group(Record::new().with("a", 1i32));
        assert!(matches!(value.to_record().unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn maps_are_records() {
        let mut map = HashMap::new();
        map.insert("a".to_string(), Value::from(true));
        assert_eq!(
            map.to_record().unwrap().into_owned(),
            Record::new().with("a", true)
        );
    }
}
