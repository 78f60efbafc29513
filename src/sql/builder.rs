//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a table mapping.

use crate::sql::mapping::TableMapping;
use serde_json::{Map, Value};

/// Quote identifier for PostgreSQL (identifiers only come from the mapping).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(m: &TableMapping) -> String {
    format!("{}.{}", quoted(&m.schema), quoted(&m.table))
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Value>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    /// Push a parameter and return its placeholder, cast when the column has a type.
    fn push_param(&mut self, v: Value, pg_type: Option<&str>) -> String {
        self.params.push(v);
        let n = self.params.len();
        match pg_type {
            Some(t) => format!("${}::{}", n, t),
            None => format!("${}", n),
        }
    }
}

/// Select expression for one column. Custom enums (schema.type) come back as text and numeric as float8.
fn select_expr(name: &str, pg_type: Option<&str>) -> String {
    let q = quoted(name);
    match pg_type.unwrap_or("") {
        t if t.contains('.') => format!("{}::text AS {}", q, q),
        "numeric" | "decimal" => format!("{}::float8 AS {}", q, q),
        _ => q,
    }
}

fn select_column_list(m: &TableMapping) -> String {
    std::iter::once(select_expr(&m.id_column, m.id_type.as_deref()))
        .chain(m.columns.iter().map(|c| select_expr(&c.name, c.pg_type.as_deref())))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn select_list(m: &TableMapping) -> QueryBuf {
    let mut q = QueryBuf::new();
    q.sql = format!(
        "SELECT {} FROM {} ORDER BY {}",
        select_column_list(m),
        qualified_table(m),
        quoted(&m.id_column)
    );
    q
}

pub fn select_by_id(m: &TableMapping, id: Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let p = q.push_param(id, m.id_type.as_deref());
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {}",
        select_column_list(m),
        qualified_table(m),
        quoted(&m.id_column),
        p
    );
    q
}

/// INSERT of the mapped columns present in `body` (plus the id column when present), RETURNING the row.
pub fn insert(m: &TableMapping, body: &Map<String, Value>) -> QueryBuf {
    let mut q = QueryBuf::new();
    let mut cols = Vec::new();
    let mut placeholders = Vec::new();
    if let Some(id) = body.get(&m.id_column) {
        cols.push(quoted(&m.id_column));
        placeholders.push(q.push_param(id.clone(), m.id_type.as_deref()));
    }
    for c in &m.columns {
        if let Some(v) = body.get(&c.name) {
            cols.push(quoted(&c.name));
            placeholders.push(q.push_param(v.clone(), c.pg_type.as_deref()));
        }
    }
    let values = if cols.is_empty() {
        "DEFAULT VALUES".to_string()
    } else {
        format!("({}) VALUES ({})", cols.join(", "), placeholders.join(", "))
    };
    q.sql = format!(
        "INSERT INTO {} {} RETURNING {}",
        qualified_table(m),
        values,
        select_column_list(m)
    );
    q
}

/// UPDATE of the mapped columns present in `body`. Returns `None` when nothing would be set.
pub fn update(m: &TableMapping, id: Value, body: &Map<String, Value>) -> Option<QueryBuf> {
    let mut q = QueryBuf::new();
    let mut sets = Vec::new();
    for c in &m.columns {
        if let Some(v) = body.get(&c.name) {
            let p = q.push_param(v.clone(), c.pg_type.as_deref());
            sets.push(format!("{} = {}", quoted(&c.name), p));
        }
    }
    if sets.is_empty() {
        return None;
    }
    let id_param = q.push_param(id, m.id_type.as_deref());
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {} RETURNING {}",
        qualified_table(m),
        sets.join(", "),
        quoted(&m.id_column),
        id_param,
        select_column_list(m)
    );
    Some(q)
}

pub fn delete(m: &TableMapping, id: Value) -> QueryBuf {
    let mut q = QueryBuf::new();
    let p = q.push_param(id, m.id_type.as_deref());
    q.sql = format!(
        "DELETE FROM {} WHERE {} = {}",
        qualified_table(m),
        quoted(&m.id_column),
        p
    );
    q
}
