/// Derive a URL/path-safe identifier from a human-readable name.
///
/// Lowercases, maps every non-alphanumeric run to a single `-`, and trims
/// leading/trailing dashes. The result is stable for a given input, which the
/// ingest stage relies on for deterministic file names.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lower in c.to_lowercase() {
                slug.push(lower);
            }
        } else {
            pending_dash = true;
        }
    }

    slug
}
