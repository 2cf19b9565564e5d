/// Compile a regex literal once and hand out a `&'static Regex`.
///
/// Only used with literals that are known to compile; dynamic patterns built
/// from configuration go through `Regex::new` and propagate their errors.
#[macro_export]
macro_rules! regex {
    ($pat:literal) => {{
        static RE: once_cell::sync::Lazy<regex::Regex> =
            once_cell::sync::Lazy::new(|| regex::Regex::new($pat).unwrap());
        &*RE
    }};
}
