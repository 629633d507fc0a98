use sqlchan_core::stmt::Value;
use std::sync::{Arc, Mutex};

/// A statement as the driver received it.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// A handle on the statements executed through a [`crate::MockDriver`]
#[derive(Debug, Clone, Default)]
pub struct ExecLog {
    statements: Arc<Mutex<Vec<Statement>>>,
}

impl ExecLog {
    pub(crate) fn push(&self, sql: &str, params: &[Value]) {
        self.statements.lock().unwrap().push(Statement {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
    }

    pub fn len(&self) -> usize {
        self.statements.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.lock().unwrap().is_empty()
    }

    /// All SQL text, in execution order.
    pub fn sql(&self) -> Vec<String> {
        self.statements
            .lock()
            .unwrap()
            .iter()
            .map(|stmt| stmt.sql.clone())
            .collect()
    }

    pub fn statements(&self) -> Vec<Statement> {
        self.statements.lock().unwrap().clone()
    }

    /// The most recent statement
    pub fn last(&self) -> Statement {
        self.statements
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no statement executed")
    }

    pub fn any<F>(&self, predicate: F) -> bool
    where
        F: Fn(&Statement) -> bool,
    {
        self.statements.lock().unwrap().iter().any(predicate)
    }

    pub fn clear(&self) {
        self.statements.lock().unwrap().clear();
    }
}
