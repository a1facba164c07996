//! Header row normalization and delimiter detection.

use std::collections::BTreeSet;

/// Delimiters tried on the header line, in preference order on ties.
const CANDIDATE_DELIMITERS: [u8; 3] = [b',', b';', b'\t'];

/// Picks the delimiter that occurs most often outside quotes in `line`.
///
/// Spreadsheet exports with a decimal comma locale use `;`, so counting beats
/// assuming `,`. Defaults to `,` when none occurs.
pub fn sniff_delimiter(line: &str) -> u8 {
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut in_quotes = false;
    for byte in line.bytes() {
        if byte == b'"' {
            in_quotes = !in_quotes;
            continue;
        }
        if in_quotes {
            continue;
        }
        if let Some(idx) = CANDIDATE_DELIMITERS.iter().position(|d| *d == byte) {
            counts[idx] += 1;
        }
    }

    let best = (1..counts.len()).fold(0, |best, idx| {
        if counts[idx] > counts[best] { idx } else { best }
    });
    CANDIDATE_DELIMITERS[best]
}

/// Trims header names, names blank headers by position and suffixes repeats.
///
/// `["Name", "", "Name"]` becomes `["Name", "Column 2", "Name (2)"]`.
pub fn dedupe_headers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    let mut used: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::with_capacity(raw.len());

    for (idx, header) in raw.iter().enumerate() {
        let trimmed = header.as_ref().trim();
        let base = if trimmed.is_empty() {
            format!("Column {}", idx + 1)
        } else {
            trimmed.to_string()
        };

        let mut name = base.clone();
        let mut n = 1;
        while used.contains(&name) {
            n += 1;
            name = format!("{base} ({n})");
        }
        used.insert(name.clone());
        out.push(name);
    }
    out
}
