use regex::Regex;
use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::wire::{placeholder, ImagePathMap, WebsiteSpec};

/// Swap every `{{filename}}` token that has a saved image for its local
/// path, in html, css and js alike. Tokens without an entry stay as they are;
/// the image list is carried over untouched.
pub fn integrate(spec: &WebsiteSpec, paths: &ImagePathMap) -> WebsiteSpec {
    let mut html = spec.html.clone();
    let mut css = spec.css.clone();
    let mut js = spec.js.clone();

    for (filename, local_path) in paths {
        let token = placeholder(filename);
        html = html.replace(&token, local_path);
        css = css.replace(&token, local_path);
        js = js.replace(&token, local_path);
    }

    WebsiteSpec { html, css, js, images: spec.images.clone() }
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{([^{}\s]+)\}\}").expect("static regex"))
}

/// Distinct `{{…}}` tokens still present in the code, sorted.
pub fn unresolved_placeholders(spec: &WebsiteSpec) -> Vec<String> {
    let mut found = BTreeSet::new();
    for text in [&spec.html, &spec.css, &spec.js] {
        for m in token_re().find_iter(text) {
            found.insert(m.as_str().to_string());
        }
    }
    found.into_iter().collect()
}
