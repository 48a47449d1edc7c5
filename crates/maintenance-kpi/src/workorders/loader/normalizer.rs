use csv::StringRecord;
use std::collections::HashSet;

/// Header key used for column lookup: invisible characters and all whitespace
/// removed, lowercase. `Work Status` and `WorkStatus` both become `workstatus`.
pub(crate) fn normalize_header(value: &str) -> String {
    value
        .replace(['\u{feff}', '\u{200b}'], "")
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Lookup keys for a header row. When two columns normalize to the same key
/// (`Work Status` next to `WorkStatus`) the first one wins; later ones get a
/// positional key no row field uses.
pub(crate) fn normalize_headers(headers: &StringRecord) -> StringRecord {
    let mut seen = HashSet::new();
    headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            let key = normalize_header(header);
            if seen.insert(key.clone()) {
                key
            } else {
                format!("{key}#{index}")
            }
        })
        .collect()
}

/// Trims a cell and collapses internal whitespace runs; empty cells become `None`.
pub(crate) fn clean_label(value: &str) -> Option<String> {
    let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}
