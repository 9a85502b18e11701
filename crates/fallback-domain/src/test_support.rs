use crate::source::QuerySource;
use fallback_types::Row;

/// `[ {id:1,active:false}, {id:2,active:true}, {id:3,active:false} ]`
pub fn sample_rows() -> Vec<Row> {
    rows(&[(1, false), (2, true), (3, false)])
}

pub fn rows(pairs: &[(i64, bool)]) -> Vec<Row> {
    pairs
        .iter()
        .map(|&(id, active)| Row::new().with("id", id).with("active", active))
        .collect()
}

#[derive(Debug, PartialEq, Eq)]
pub struct BackendDown(pub String);

impl std::fmt::Display for BackendDown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for BackendDown {}

/// A source whose every fetch fails.
pub struct FailingSource {
    message: String,
}

impl FailingSource {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl<F: ?Sized> QuerySource<F> for FailingSource {
    type Item = Row;
    type Error = BackendDown;

    fn fetch(&self, _filter: &F) -> Result<Vec<Row>, BackendDown> {
        Err(BackendDown(self.message.clone()))
    }
}
