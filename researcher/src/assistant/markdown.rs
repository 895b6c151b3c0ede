//! Small markdown-to-HTML renderer for the report box.
//!
//! Covers what the report template asks the model for: `#`..`###`
//! headings, `**bold**`, `*italic*` and `*`/`-` bullet lists. Input is
//! escaped first, so model output can never inject markup.

use regex::Regex;
use std::sync::OnceLock;

fn bold() -> &'static Regex {
    static BOLD: OnceLock<Regex> = OnceLock::new();
    BOLD.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold regex"))
}

fn italic() -> &'static Regex {
    static ITALIC: OnceLock<Regex> = OnceLock::new();
    ITALIC.get_or_init(|| Regex::new(r"\*([^*\s][^*]*?)\*").expect("valid italic regex"))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_inline(text: &str) -> String {
    let escaped = escape_html(text);
    let bolded = bold().replace_all(&escaped, "<strong>$1</strong>");
    italic().replace_all(&bolded, "<em>$1</em>").into_owned()
}

pub fn markdown_to_html(markdown: &str) -> String {
    let mut html: Vec<String> = Vec::new();
    let mut in_list = false;

    for line in markdown.lines() {
        let trimmed = line.trim_end();
        let bullet = trimmed
            .strip_prefix("* ")
            .or_else(|| trimmed.strip_prefix("- "));

        if let Some(item) = bullet {
            if !in_list {
                html.push("<ul>".to_string());
                in_list = true;
            }
            html.push(format!("<li>{}</li>", render_inline(item.trim())));
            continue;
        }
        if in_list {
            html.push("</ul>".to_string());
            in_list = false;
        }

        if let Some(h) = trimmed.strip_prefix("### ") {
            html.push(format!("<h3>{}</h3>", render_inline(h.trim())));
        } else if let Some(h) = trimmed.strip_prefix("## ") {
            html.push(format!("<h2>{}</h2>", render_inline(h.trim())));
        } else if let Some(h) = trimmed.strip_prefix("# ") {
            html.push(format!("<h1>{}</h1>", render_inline(h.trim())));
        } else if !trimmed.trim().is_empty() {
            html.push(format!("<p>{}</p>", render_inline(trimmed.trim())));
        }
    }
    if in_list {
        html.push("</ul>".to_string());
    }

    html.join("\n")
}
