//! Table description used by the Postgres backend.

use crate::config::ModelSchema;

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnMapping {
    pub name: String,
    /// PostgreSQL type for parameter casts and select decoding (e.g. "uuid", "int8", "jsonb").
    pub pg_type: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TableMapping {
    pub schema: String,
    pub table: String,
    pub id_column: String,
    pub id_type: Option<String>,
    /// Non-id columns, in insert/select order.
    pub columns: Vec<ColumnMapping>,
}

impl TableMapping {
    pub fn new(table: impl Into<String>) -> Self {
        TableMapping {
            schema: "public".into(),
            table: table.into(),
            id_column: "id".into(),
            id_type: None,
            columns: Vec::new(),
        }
    }

    /// Columns from a model schema; the schema's id field becomes the id column.
    pub fn from_schema(model: &ModelSchema, table: impl Into<String>) -> Self {
        let mut mapping = TableMapping::new(table);
        mapping.id_column = model.id_field.clone();
        for f in &model.fields {
            let pg_type = f.kind.pg_type().map(String::from);
            if f.name == model.id_field {
                mapping.id_type = pg_type;
            } else {
                mapping.columns.push(ColumnMapping { name: f.name.clone(), pg_type });
            }
        }
        mapping
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn id_column(mut self, name: impl Into<String>, pg_type: Option<&str>) -> Self {
        self.id_column = name.into();
        self.id_type = pg_type.map(String::from);
        self
    }

    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(ColumnMapping { name: name.into(), pg_type: None });
        self
    }

    pub fn typed_column(mut self, name: impl Into<String>, pg_type: &str) -> Self {
        self.columns.push(ColumnMapping {
            name: name.into(),
            pg_type: Some(pg_type.to_string()),
        });
        self
    }

    pub fn find(&self, name: &str) -> Option<&ColumnMapping> {
        self.columns.iter().find(|c| c.name == name)
    }
}
