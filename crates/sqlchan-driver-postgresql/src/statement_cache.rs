use std::collections::HashMap;

use postgres::{Client, Error, Statement};

/// Prepared statements keyed by their SQL text.
///
/// Statements are prepared without explicit parameter types, so the server
/// infers them from the target columns and the cached statement reports the
/// inferred types back to the parameter encoder.
#[derive(Debug, Clone, Default)]
pub struct StatementCache {
    map: HashMap<String, Statement>,
}

impl StatementCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, query: &str) -> Option<Statement> {
        self.map.get(query).map(ToOwned::to_owned)
    }

    pub fn insert(&mut self, query: &str, statement: Statement) {
        self.map.insert(query.to_string(), statement);
    }

    pub fn prepare(&mut self, client: &mut Client, query: &str) -> Result<Statement, Error> {
        if let Some(statement) = self.get(query) {
            Ok(statement)
        } else {
            let stmt = client.prepare(query)?;
            self.insert(query, stmt.clone());
            Ok(stmt)
        }
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
