use pinecache_store::StorageError;

/// Outcome of reading one key, keeping apart the cases that
/// [`Cache::get`](crate::Cache::get) folds into an empty value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The key has an entry (the value may be empty).
    Found(Vec<u8>),
    /// The table is absent or holds no entry for the key.
    NotFound,
    /// The store failed while reading.
    Failed(StorageError),
}

impl Lookup {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// The stored bytes, or an empty vector for `NotFound` and `Failed`.
    pub fn into_value(self) -> Vec<u8> {
        match self {
            Lookup::Found(value) => value,
            Lookup::NotFound | Lookup::Failed(_) => Vec::new(),
        }
    }

    pub fn into_result(self) -> Result<Option<Vec<u8>>, StorageError> {
        match self {
            Lookup::Found(value) => Ok(Some(value)),
            Lookup::NotFound => Ok(None),
            Lookup::Failed(err) => Err(err),
        }
    }
}

impl From<Result<Option<Vec<u8>>, StorageError>> for Lookup {
    fn from(result: Result<Option<Vec<u8>>, StorageError>) -> Self {
        match result {
            Ok(Some(value)) => Lookup::Found(value),
            Ok(None) => Lookup::NotFound,
            Err(err) => Lookup::Failed(err),
        }
    }
}
