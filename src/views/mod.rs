//! HTML rendering
//!
//! Server-side pages built into a shared layout. Every interpolated value goes
//! through [`escape`].

pub mod pages;

pub use pages::*;

/// Escape text for HTML element content and quoted attribute values
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

/// Render an amount in cents as `units.cents`
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Wrap page content in the common document shell
pub fn layout(title: &str, current_page: &str, back_link: Option<&str>, content: &str) -> String {
    let nav_item = |href: &str, page: &str, label: &str| {
        let class = if page == current_page { " class=\"active\"" } else { "" };
        format!("<a href=\"{}\"{}>{}</a>", href, class, label)
    };

    let back = back_link
        .map(|href| format!("<a class=\"back\" href=\"{}\">&larr; Back</a>", escape(href)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body data-page="{page}">
<header>
<nav>{products}{log}</nav>
</header>
<main>
{back}
<h1>{title}</h1>
{content}
</main>
<script src="/static/app.js"></script>
</body>
</html>
"#,
        title = escape(title),
        page = escape(current_page),
        products = nav_item("/", "products", "Products"),
        log = nav_item("/api-log", "api-log", "API Log"),
        back = back,
        content = content,
    )
}
