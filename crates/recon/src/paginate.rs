use std::collections::HashMap;

use crate::model::ClassifiedRecord;

/// Number records by (area, identifier) group, 1-based, in the order groups
/// are first encountered. Blank sides fall back to `placeholder`. Numbers
/// are relative to `records`; call once per view. Returns the group count.
pub fn assign_pages(records: &mut [ClassifiedRecord], placeholder: &str) -> usize {
    let mut pages: HashMap<(String, String), u32> = HashMap::new();

    for record in records.iter_mut() {
        let key = (
            or_placeholder(&record.area, placeholder),
            or_placeholder(&record.identifier, placeholder),
        );
        let next = pages.len() as u32 + 1;
        let page = *pages.entry(key).or_insert(next);
        record.page_number = Some(page);
    }

    pages.len()
}

fn or_placeholder(value: &str, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}
