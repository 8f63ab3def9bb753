//! Default prompt templates. These are data, not logic: `config::Prompts`
//! starts from them and a config file may replace any of them.
//!
//! Templates use `{name}` markers filled in by [`render`].

pub const GENERATE_SYSTEM: &str = r#"You are an expert web developer and creative director.
When given requirements, you decide the website's HTML, CSS, JS, and which images should be generated (with prompts and filenames; files will be kept in an images directory and referenced from the source).
Reference every image in the code with a placeholder of the form {{filename}}, for example <img src="{{hero.png}}">.
Output a JSON object that strictly follows the WebsiteSpec schema:

{
  "html": string,
  "css": string,
  "js": string,
  "images": [
    { "prompt": string, "filename": string }
  ]
}"#;

pub const GENERATE_USER: &str = r#"Design a landing page with the following requirements:
{requirements}

Include in your JSON the image specs: each with a prompt and filename."#;

pub const REFINE_SYSTEM: &str = r#"You are an expert web developer and creative director.
You refine existing website code (HTML, CSS, JS, images) based on improvement instructions.
Keep referencing images with {{filename}} placeholders."#;

pub const REFINE_USER: &str = r#"Here is the current website specification:
{current}

Please refine or improve it based on these additional instructions:
{instructions}

Output a JSON object that still strictly follows the WebsiteSpec schema."#;

pub const DEVELOPER_NOTE: &str =
    "Output exactly one JSON object; no markdown, no code fences, no prose.";

/// Replace each `{key}` marker in `template` with its value in a single
/// left-to-right pass; substituted text is never scanned again. Unknown
/// markers are left as they are.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let hit = after.find('}').and_then(|close| {
            let key = &after[..close];
            vars.iter().find(|(k, _)| *k == key).map(|(_, v)| (close, *v))
        });
        match hit {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
