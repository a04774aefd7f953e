use std::collections::HashMap;

use crate::model::SourceTable;
use crate::schema::{ColumnDescriptor, Record, Schema, SchemaBuilder};

/// A table that took part in schema unification, with its local schema.
#[derive(Debug)]
pub struct LocalSource<'a> {
    pub name: &'a str,
    pub local: Vec<ColumnDescriptor>,
    pub rows: &'a [Vec<String>],
}

/// Build the canonical schema from the tables' header rows, in caller order.
/// Tables without data rows contribute nothing and are skipped.
pub fn unify(tables: &[SourceTable]) -> (Schema, Vec<LocalSource<'_>>) {
    let mut builder = SchemaBuilder::new();
    let mut sources = Vec::with_capacity(tables.len());

    for table in tables {
        if table.data_rows().is_empty() {
            log::debug!("skipping '{}': no data rows", table.name);
            continue;
        }
        let local = builder.add_header(table.header());
        sources.push(LocalSource {
            name: &table.name,
            local,
            rows: table.data_rows(),
        });
    }

    log::debug!(
        "unified {} column(s) from {} table(s)",
        builder.len(),
        sources.len()
    );
    (builder.build(), sources)
}

#[derive(Debug)]
pub struct Reconciled {
    pub records: Vec<Record>,
    pub accepted_rows: usize,
}

fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Convert every source row into a schema-aligned record. Columns the source
/// lacks (or cells past the end of a short row) become empty strings; blank
/// rows are dropped and not counted.
pub fn reconcile_rows(schema: &Schema, sources: &[LocalSource<'_>]) -> Reconciled {
    let mut records = Vec::new();

    for source in sources {
        let local_index: HashMap<&str, usize> = source
            .local
            .iter()
            .enumerate()
            .map(|(i, c)| (c.internal_key.as_str(), i))
            .collect();

        // Canonical position -> source column, resolved once per file.
        let mapping: Vec<Option<usize>> = schema
            .columns()
            .iter()
            .map(|c| local_index.get(c.internal_key.as_str()).copied())
            .collect();

        let before = records.len();
        for row in source.rows {
            if is_blank_row(row) {
                continue;
            }
            let values = mapping
                .iter()
                .map(|&src| {
                    src.and_then(|i| row.get(i))
                        .cloned()
                        .unwrap_or_default()
                })
                .collect();
            records.push(Record::from_values(values));
        }
        log::debug!(
            "'{}': accepted {} of {} row(s)",
            source.name,
            records.len() - before,
            source.rows.len()
        );
    }

    let accepted_rows = records.len();
    Reconciled {
        records,
        accepted_rows,
    }
}
