use thiserror::Error;

/// A record type with a fixed column schema.
pub trait TableRow {
    const COLUMNS: &'static [&'static str];

    /// Cell values in `COLUMNS` order.
    fn cells(&self) -> Vec<String>;
}

/// A record type that can be read back from a table row.
pub trait FromTable: TableRow + Sized {
    fn from_fields(fields: &Fields<'_>) -> Result<Self, TableError>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("missing column {0}")]
    MissingColumn(String),
    #[error("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// In-memory table with an explicit schema. An empty table still carries
/// its columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn empty<R: TableRow>() -> Self {
        Self {
            columns: R::COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn from_records<R: TableRow>(records: &[R]) -> Self {
        let mut table = Self::empty::<R>();
        table.rows = records.iter().map(TableRow::cells).collect();
        table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Decode every row into `R`, looking cells up by column name so the
    /// column order of the source does not matter.
    pub fn decode<R: FromTable>(&self) -> Result<Vec<R>, TableError> {
        for required in R::COLUMNS {
            if !self.columns.iter().any(|c| c == required) {
                return Err(TableError::MissingColumn(required.to_string()));
            }
        }
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                if row.len() != self.columns.len() {
                    return Err(TableError::RowWidth {
                        row: index,
                        expected: self.columns.len(),
                        actual: row.len(),
                    });
                }
                R::from_fields(&Fields {
                    columns: &self.columns,
                    cells: row,
                })
            })
            .collect()
    }
}

/// Column-name lookup over one table row.
pub struct Fields<'a> {
    columns: &'a [String],
    cells: &'a [String],
}

impl<'a> Fields<'a> {
    pub fn get(&self, column: &str) -> Result<&'a str, TableError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.cells.get(idx))
            .map(String::as_str)
            .ok_or_else(|| TableError::MissingColumn(column.to_string()))
    }
}
