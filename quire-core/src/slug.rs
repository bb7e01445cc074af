//! Slug generation for identifiers derived from file names.

/// Convert a string to a URL-safe slug
///
/// Lowercases, keeps alphanumeric characters (including non-latin letters),
/// and turns every other run of characters into a single hyphen.
///
/// # Examples
///
/// ```
/// use quire_core::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("12-Rust & Safety"), "12-rust-safety");
/// assert_eq!(slugify("__draft__"), "draft");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}
