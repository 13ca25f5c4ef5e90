use hashbrown::hash_map::{Entry, HashMap};
use rustc_hash::FxBuildHasher;
use shale_scalar::ScalarValue;

/// Dictionary encoding of a column's value sequence.
///
/// Distinct values are kept in first-seen order; every triple holds a code into them, or `None`
/// where the value is absent.
#[derive(Debug, Clone)]
pub struct Dictionary {
    lookup: HashMap<ScalarValue, u32, FxBuildHasher>,
    values: Vec<ScalarValue>,
    codes: Vec<Option<u32>>,
}

impl Default for Dictionary {
    fn default() -> Self {
        Self::new()
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Self {
            lookup: HashMap::with_hasher(FxBuildHasher),
            values: Vec::new(),
            codes: Vec::new(),
        }
    }

    #[inline]
    fn encode_value(&mut self, value: ScalarValue) -> u32 {
        match self.lookup.entry(value) {
            Entry::Occupied(o) => *o.get(),
            Entry::Vacant(vac) => {
                let next_code = u32::try_from(self.values.len())
                    .unwrap_or_else(|_| shale_error::shale_panic!("Dictionary exceeds u32 codes"));
                self.values.push(vac.key().clone());
                vac.insert(next_code);
                next_code
            }
        }
    }

    /// Appends one entry, returning its code.
    pub fn push(&mut self, value: Option<ScalarValue>) -> Option<u32> {
        let code = value.map(|v| self.encode_value(v));
        self.codes.push(code);
        code
    }

    /// The distinct values in first-seen order
    pub fn values(&self) -> &[ScalarValue] {
        &self.values
    }

    /// One code per entry, `None` for absent values
    pub fn codes(&self) -> &[Option<u32>] {
        &self.codes
    }

    /// The number of entries, absent ones included
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn value(&self, idx: usize) -> Option<&ScalarValue> {
        self.codes
            .get(idx)
            .copied()
            .flatten()
            .and_then(|code| self.values.get(code as usize))
    }

    /// Decodes the entries back into the logical value sequence.
    pub fn assemble(&self) -> Vec<Option<ScalarValue>> {
        self.codes
            .iter()
            .map(|code| code.and_then(|c| self.values.get(c as usize).cloned()))
            .collect()
    }

    pub fn reset(&mut self) {
        self.lookup.clear();
        self.values.clear();
        self.codes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_seen_order() {
        let mut dict = Dictionary::new();
        for v in ["en-us", "en", "en-us", "en-gb"] {
            dict.push(Some(ScalarValue::from(v)));
        }
        dict.push(None);

        assert_eq!(
            dict.values(),
            &[
                ScalarValue::from("en-us"),
                ScalarValue::from("en"),
                ScalarValue::from("en-gb")
            ]
        );
        assert_eq!(dict.codes(), &[Some(0), Some(1), Some(0), Some(2), None]);
        assert_eq!(dict.value(2), Some(&ScalarValue::from("en-us")));
        assert_eq!(dict.value(4), None);
    }

    #[test]
    fn assemble_preserves_absence() {
        let mut dict = Dictionary::new();
        dict.push(None);
        dict.push(Some(ScalarValue::I64(10)));
        dict.push(Some(ScalarValue::I64(10)));
        assert_eq!(
            dict.assemble(),
            vec![None, Some(ScalarValue::I64(10)), Some(ScalarValue::I64(10))]
        );
        assert_eq!(dict.values().len(), 1);

        dict.reset();
        assert!(dict.is_empty());
        assert!(dict.values().is_empty());
    }
}
