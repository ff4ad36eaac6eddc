//! Best-effort string extraction from binary `AndroidManifest.xml`.
//!
//! The binary XML (AXML) string pool stores plain UTF-16LE (and sometimes
//! UTF-8) strings, so permission names and the package name are recoverable
//! by scanning for printable runs without implementing an AXML parser.
//! Truncated or non-AXML input yields empty results, never an error.

use std::collections::HashMap;

/// Minimum run length considered a string.
const MIN_STRING_LEN: usize = 4;

/// Pull printable ASCII and UTF-16LE runs out of a byte buffer.
pub fn extract_strings(data: &[u8]) -> Vec<String> {
    let mut strings = Vec::new();

    // ASCII runs.
    let mut run = String::new();
    for &byte in data {
        if byte.is_ascii_graphic() || byte == b' ' {
            run.push(byte as char);
        } else {
            if run.len() >= MIN_STRING_LEN {
                strings.push(std::mem::take(&mut run));
            }
            run.clear();
        }
    }
    if run.len() >= MIN_STRING_LEN {
        strings.push(run);
    }

    // UTF-16LE runs: printable ASCII code units with a zero high byte.
    let mut run = String::new();
    let mut chunks = data.chunks_exact(2);
    for pair in &mut chunks {
        let unit = u16::from_le_bytes([pair[0], pair[1]]);
        if (0x20..0x7f).contains(&unit) {
            run.push(unit as u8 as char);
        } else {
            if run.len() >= MIN_STRING_LEN {
                strings.push(std::mem::take(&mut run));
            }
            run.clear();
        }
    }
    if run.len() >= MIN_STRING_LEN {
        strings.push(run);
    }

    strings
}

/// Extract permission identifiers: `android.permission.*` and
/// reverse-domain `.permission.` forms, sorted and deduped.
pub fn extract_permissions(data: &[u8]) -> Vec<String> {
    let mut permissions: Vec<String> = extract_strings(data)
        .into_iter()
        .filter(|s| is_permission(s))
        .collect();

    permissions.sort();
    permissions.dedup();
    permissions
}

/// Guess the package name: the most frequent reverse-domain identifier that
/// is not a permission, feature, or platform string. Ties break toward the
/// lexicographically smaller candidate.
pub fn guess_package_name(data: &[u8]) -> Option<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for s in extract_strings(data) {
        if looks_like_package_name(&s) {
            *counts.entry(s).or_insert(0) += 1;
        }
    }

    counts
        .into_iter()
        .max_by(|(a_name, a_count), (b_name, b_count)| {
            a_count.cmp(b_count).then(b_name.cmp(a_name))
        })
        .map(|(name, _)| name)
}

fn is_permission(s: &str) -> bool {
    if !s.contains(".permission.") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

fn looks_like_package_name(s: &str) -> bool {
    // Platform namespaces and component identifiers are not app packages.
    if s.starts_with("android.")
        || s.starts_with("java.")
        || s.starts_with("kotlin.")
        || s.contains(".permission.")
        || s.contains(".intent.")
        || s.contains(".hardware.")
        || s.contains(".feature.")
    {
        return false;
    }

    let segments: Vec<&str> = s.split('.').collect();
    if segments.len() < 3 {
        return false;
    }

    segments.iter().all(|seg| {
        !seg.is_empty()
            && seg.chars().next().map_or(false, |c| c.is_ascii_lowercase())
            && seg
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    })
}
