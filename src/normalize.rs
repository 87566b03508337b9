// Header normalization: raw spreadsheet headers to canonical field names.

/// Canonical field name for the administrative unit identifier.
pub const UNIT: &str = "upppd";
/// Canonical field name for the entertainment classification category.
pub const CLASSIFICATION: &str = "klasifikasi";
/// Canonical field name for the registration (start of liability) date.
pub const REGISTRATION: &str = "tmt";
pub const STATUS: &str = "status";

/// Canonical key and the exact (trimmed, lowercased) header forms mapping to it.
pub const COLUMN_ALIASES: &[(&str, &[&str])] = &[
    (UNIT, &["upppd", "unit", "nm unit"]),
    (
        CLASSIFICATION,
        &["kategori", "jenis", "jenis hiburan", "klasifikasi hiburan"],
    ),
    (REGISTRATION, &["tmt"]),
    (STATUS, &["status"]),
];

/// Trim and lowercase a header, then map it through `COLUMN_ALIASES`.
///
/// Unrecognised headers pass through in their trimmed, lowercased form.
pub fn normalize_column(raw: &str) -> String {
    let col = raw.trim().to_lowercase();
    COLUMN_ALIASES
        .iter()
        .find(|(_, forms)| forms.contains(&col.as_str()))
        .map(|(key, _)| key.to_string())
        .unwrap_or(col)
}

pub fn normalize_columns(headers: &[String]) -> Vec<String> {
    headers.iter().map(|h| normalize_column(h)).collect()
}

/// Position of the first header equal to `key` after normalization.
pub fn find_column(normalized: &[String], key: &str) -> Option<usize> {
    normalized.iter().position(|c| c == key)
}
