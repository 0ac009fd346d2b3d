use handlebars::{handlebars_helper, Handlebars};
use serde_json::Value;

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Writes `content` to `path`, creating missing parent directories.
pub fn write_string_to_file(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

/// Quotes-safe string for a double-quoted DOT attribute.
pub fn dot_escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn get_handlebars() -> Handlebars<'static> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars_helper!(exists: |v: Value| !v.is_null());
    handlebars.register_helper("exists", Box::new(exists));

    handlebars_helper!(stringeq: |s1: String, s2: String| s1.eq(&s2));
    handlebars.register_helper("stringeq", Box::new(stringeq));

    handlebars_helper!(dotescape: |s: String| dot_escape(&s));
    handlebars.register_helper("dotescape", Box::new(dotescape));

    handlebars
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn handlebars_can_iterate_regions() {
        let handlebars = get_handlebars();
        let res = handlebars
            .render_template(
                r#"{{#each regions as |region|}}
region {{region.name}}
{{/each}}"#,
                &json!({"regions": [{"name": "eu-west-1"}, {"name": "us-east-1"}]}),
            )
            .expect("This to render");
        assert_eq!(res, "region eu-west-1\nregion us-east-1\n");
    }

    #[test]
    fn handlebars_helpers_distinguish_missing_labels() {
        let handlebars = get_handlebars();
        let template = r#"{{#each edges as |edge|}}{{#if (exists edge.label)}}[{{edge.label}}]{{else}}[-]{{/if}}{{/each}}"#;
        let res = handlebars
            .render_template(
                template,
                &json!({"edges": [{"label": "443"}, {"label": null}]}),
            )
            .expect("This to render");
        assert_eq!(res, "[443][-]");
    }

    #[test]
    fn handlebars_stringeq_selects_kind() {
        let handlebars = get_handlebars();
        let res = handlebars
            .render_template(
                r#"{{#if (stringeq kind "VPC")}}box{{else}}ellipse{{/if}}"#,
                &json!({"kind": "VPC"}),
            )
            .expect("This to render");
        assert_eq!(res, "box");
    }

    #[test]
    fn handlebars_does_not_html_escape() {
        let handlebars = get_handlebars();
        let res = handlebars
            .render_template(
                r#"label="{{dotescape name}}" ports="{{ports}}""#,
                &json!({"name": "core \"prod\"", "ports": "22, 443 & all"}),
            )
            .expect("This to render");
        assert_eq!(res, r#"label="core \"prod\"" ports="22, 443 & all""#);
    }

    #[test]
    fn write_string_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/nested/graph.dot");
        write_string_to_file(&path, "digraph {}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "digraph {}");
    }
}
