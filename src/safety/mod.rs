use std::path::{Component, Path};

/// True when `filename` is a plain relative name that stays inside whatever
/// directory it is joined onto: no root, no drive prefix, no `..` segments.
/// Nested names such as `icons/star.png` are allowed. Braces are refused so
/// that no placeholder token can contain another.
pub fn filename_is_allowed(filename: &str) -> bool {
    let trimmed = filename.trim();
    if trimmed.is_empty() || trimmed != filename || filename.contains(['{', '}']) {
        return false;
    }
    let mut saw_normal = false;
    for c in Path::new(filename).components() {
        match c {
            Component::Normal(_) => saw_normal = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    saw_normal && !filename.contains('\\')
}
