//! Export filenames.

/// Replace every character outside `[A-Za-z0-9]` with one `_`.
///
/// Characters are mapped one by one: no collapsing, no trimming. Multi-byte
/// characters count as one character.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// `<sanitized name>_Marketing_Strategy.<extension>`
pub fn export_filename(business_name: &str, extension: &str) -> String {
    format!("{}_Marketing_Strategy.{}", sanitize(business_name), extension)
}
