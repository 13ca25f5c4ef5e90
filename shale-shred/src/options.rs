/// What to do with record fields that have no node in the schema.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum UnknownFieldPolicy {
    /// Skip the field, so sparse producers can feed a narrower schema
    #[default]
    Ignore,
    /// Reject the record with `UnknownField`
    Error,
}

/// Options for shredding records into a [`RowStore`](crate::RowStore).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ShredOptions {
    pub unknown_fields: UnknownFieldPolicy,
}

impl ShredOptions {
    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }
}

/// The default byte budget of a row group.
pub const DEFAULT_ROW_GROUP_BYTES: usize = 128 << 20;

/// Options for a [`RecordWriter`](crate::RecordWriter).
///
/// A row group is flushed as soon as either limit is reached.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WriterOptions {
    pub shred: ShredOptions,
    pub max_row_group_rows: Option<usize>,
    pub max_row_group_bytes: Option<usize>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            shred: ShredOptions::default(),
            max_row_group_rows: None,
            max_row_group_bytes: Some(DEFAULT_ROW_GROUP_BYTES),
        }
    }
}

impl WriterOptions {
    pub fn with_shred_options(mut self, shred: ShredOptions) -> Self {
        self.shred = shred;
        self
    }

    pub fn with_max_row_group_rows(mut self, rows: usize) -> Self {
        self.max_row_group_rows = Some(rows);
        self
    }

    /// Sets the byte budget of a row group; `None` removes the limit.
    pub fn with_max_row_group_bytes(mut self, bytes: Option<usize>) -> Self {
        self.max_row_group_bytes = bytes;
        self
    }

    pub(crate) fn should_flush(&self, num_rows: usize, estimated_size: usize) -> bool {
        self.max_row_group_rows.is_some_and(|max| num_rows >= max)
            || self
                .max_row_group_bytes
                .is_some_and(|max| estimated_size >= max)
    }
}
