use axum::response::Html;
use chrono::NaiveDate;

const STYLE: &str = "\
body { font-family: Arial, sans-serif; color: #000; margin: 0; \
background: linear-gradient(to bottom, #E6E6FA, #F5F5F5); }\n\
main { max-width: 60rem; margin: 0 auto; padding: 1rem; }\n\
nav a { margin-right: 1rem; }\n\
.card { background: #E0FFF3; border: 1px solid #D3D3D3; border-radius: 8px; \
padding: 0.75rem; margin-bottom: 0.75rem; }\n\
.error { color: #B00020; font-weight: bold; }\n\
.ok { color: #1B5E20; font-weight: bold; }\n\
label { display: block; margin-top: 0.5rem; }\n\
input, select, textarea { background: #F5F5F5; border: 1px solid #D3D3D3; \
border-radius: 5px; padding: 0.3rem; }\n\
button { background: #ADD8E6; border: none; border-radius: 5px; \
padding: 8px 16px; margin-top: 0.75rem; }\n\
footer { margin: 2rem 0 1rem; font-size: 0.8rem; color: #555; }";

/// Minimal HTML text/attribute escaping; every interpolated value goes
/// through here.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn page(title: &str, body: &str, has_logo: bool) -> Html<String> {
    let logo = if has_logo {
        "<p><img src=\"/logo\" width=\"200\" alt=\"logo\"></p>"
    } else {
        ""
    };

    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title} – Caseboard</title>\n<style>{STYLE}</style>\n</head>\n<body>\n<main>\n\
         {logo}\
         <h1>Caseboard Client Monitor</h1>\n\
         <nav><a href=\"/clients\">View Clients</a><a href=\"/manage\">Manage Tasks</a></nav>\n\
         <hr>\n{body}\n\
         <footer>Caseboard – streamlined task tracking for career coaching.</footer>\n\
         </main>\n</body>\n</html>\n",
        title = escape(title),
    ))
}

pub fn select_field(label: &str, name: &str, options: &[&str], selected: &str) -> String {
    let mut out = format!(
        "<label>{}<select name=\"{}\">",
        escape(label),
        escape(name)
    );
    for option in options {
        let marker = if *option == selected { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{0}\"{1}>{0}</option>",
            escape(option),
            marker
        ));
    }
    out.push_str("</select></label>");
    out
}

pub fn text_field(label: &str, name: &str, value: &str, readonly: bool) -> String {
    format!(
        "<label>{}<input type=\"text\" name=\"{}\" value=\"{}\"{}></label>",
        escape(label),
        escape(name),
        escape(value),
        if readonly { " readonly" } else { "" }
    )
}

pub fn date_field(label: &str, name: &str, value: NaiveDate) -> String {
    format!(
        "<label>{}<input type=\"date\" name=\"{}\" value=\"{}\"></label>",
        escape(label),
        escape(name),
        value.format("%Y-%m-%d")
    )
}

pub fn textarea_field(label: &str, name: &str, value: &str) -> String {
    format!(
        "<label>{}<textarea name=\"{}\" rows=\"4\" cols=\"48\">{}</textarea></label>",
        escape(label),
        escape(name),
        escape(value)
    )
}

/// One card line; empty values render the placeholder instead of a
/// blank.
pub fn detail(label: &str, value: &str, placeholder: &str) -> String {
    let shown = if value.trim().is_empty() {
        placeholder
    } else {
        value
    };
    format!(
        "<p><strong>{}</strong>: {}</p>",
        escape(label),
        escape(shown)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_markup_characters() {
        assert_eq!(
            escape(r#"<b a="1">&'x'</b>"#),
            "&lt;b a=&quot;1&quot;&gt;&amp;&#39;x&#39;&lt;/b&gt;"
        );
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn select_marks_the_current_option() {
        let html = select_field("Status", "status", &["Not Started", "In Progress"], "In Progress");
        assert!(html.contains("<option value=\"In Progress\" selected>"));
        assert!(html.contains("<option value=\"Not Started\">"));
    }

    #[test]
    fn detail_substitutes_placeholder_for_blanks() {
        assert!(detail("Email", "", "N/A").contains(": N/A"));
        assert!(detail("Email", "   ", "N/A").contains(": N/A"));
        assert!(detail("Email", "a@b.c", "N/A").contains(": a@b.c"));
    }
}
