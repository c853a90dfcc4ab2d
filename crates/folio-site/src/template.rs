//! Page shell for generated pages.
//!
//! Emits the DOM contract the client controller attaches to: disclosure
//! openers and nested lists in the main navigation, the hamburger control,
//! `#in-page-toc`, and the copy-button and modal templates.

use std::fmt::Write;

use folio_nav::{NavCollection, NavLink, Navigation, SectionGroup};

use crate::markdown::TocEntry;
use crate::site::Page;

/// Id of the main navigation panel toggled by the hamburger control.
const NAV_PANEL_ID: &str = "site-nav";

/// Everything needed to render one page.
pub struct PageContext<'a> {
    /// Site title.
    pub site_title: &'a str,
    /// Page title.
    pub title: &'a str,
    /// Page URL.
    pub url: &'a str,
    /// Rendered markdown body.
    pub content: &'a str,
    /// In-page table of contents.
    pub toc: &'a [TocEntry],
    /// Site navigation.
    pub navigation: &'a Navigation,
    /// Section of the page, if it has one.
    pub section: Option<&'a SectionGroup<'a, Page>>,
    /// Stylesheet URL.
    pub stylesheet: &'a str,
    /// Client script URL.
    pub script: &'a str,
    /// Build version appended to asset URLs.
    pub version: &'a str,
}

fn escape(s: &str) -> std::borrow::Cow<'_, str> {
    html_escape::encode_text(s)
}

fn attr(s: &str) -> std::borrow::Cow<'_, str> {
    html_escape::encode_double_quoted_attribute(s)
}

/// Render a complete page.
pub fn render_page(ctx: &PageContext<'_>) -> String {
    let mut html = String::with_capacity(8192 + ctx.content.len());

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    if ctx.title == ctx.site_title {
        let _ = writeln!(html, "<title>{}</title>", escape(ctx.title));
    } else {
        let _ = writeln!(html, "<title>{} | {}</title>", escape(ctx.title), escape(ctx.site_title));
    }
    let _ = writeln!(
        html,
        "<link rel=\"stylesheet\" href=\"{}\">",
        attr(&versioned(ctx.stylesheet, ctx.version))
    );
    html.push_str("</head>\n<body class=\"default-page-type\">\n");

    render_header(&mut html, ctx);

    html.push_str("<div class=\"page-layout\">\n");
    render_main_nav(&mut html, &ctx.navigation.main, ctx.url);

    html.push_str("<main class=\"page-content\">\n<article>\n");
    html.push_str(ctx.content);
    html.push_str("\n</article>\n");
    if let Some(section) = ctx.section {
        render_section_pages(&mut html, section, ctx.url);
    }
    html.push_str("</main>\n");

    render_toc(&mut html, ctx.toc);
    html.push_str("</div>\n");

    render_footer(&mut html, &ctx.navigation.footer);
    render_templates(&mut html);

    let _ = writeln!(
        html,
        "<script src=\"{}\" defer></script>",
        attr(&versioned(ctx.script, ctx.version))
    );
    html.push_str("</body>\n</html>\n");
    html
}

/// Append the build version as a cache-busting query parameter.
fn versioned(url: &str, version: &str) -> String {
    if version.is_empty() {
        return url.to_owned();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}v={version}")
}

fn render_header(html: &mut String, ctx: &PageContext<'_>) {
    html.push_str("<header class=\"site-header\">\n");
    let _ = writeln!(html, "<a class=\"site-title\" href=\"/\">{}</a>", escape(ctx.site_title));
    let _ = writeln!(
        html,
        "<button type=\"button\" class=\"hamburger-activate\" aria-controls=\"{NAV_PANEL_ID}\" \
         aria-expanded=\"false\" aria-label=\"Menu\"><span></span></button>"
    );

    let header = &ctx.navigation.header;
    if !header.is_empty() {
        let active = header.get_active_parent_link(ctx.url).map(NavLink::url);
        html.push_str("<nav class=\"header-nav\" aria-label=\"Header\">\n<ul>\n");
        for link in header.links() {
            let class = if active == Some(link.url()) { " class=\"active\"" } else { "" };
            let _ = writeln!(html, "<li{class}>{}</li>", link_html(link, ctx.url));
        }
        html.push_str("</ul>\n</nav>\n");
    }
    html.push_str("</header>\n");
}

/// `<a>` for a navigation link, marked current when it is the page.
fn link_html(link: &NavLink, current_url: &str) -> String {
    let current = if link.url() == current_url {
        " aria-current=\"page\""
    } else {
        ""
    };
    format!(
        "<a href=\"{}\"{current}>{}</a>",
        attr(link.url()),
        escape(link.label())
    )
}

fn render_main_nav(html: &mut String, main: &NavCollection, url: &str) {
    let _ = writeln!(
        html,
        "<nav class=\"side-bar\" id=\"{NAV_PANEL_ID}\" aria-label=\"Main\">"
    );
    html.push_str("<ul class=\"nav-top-level\">\n");

    let active = main.get_active_parent_link(url).map(NavLink::url);
    for link in main.links() {
        let is_active = active == Some(link.url());
        html.push_str(if is_active { "<li class=\"nav-item active\">" } else { "<li class=\"nav-item\">" });
        html.push_str(&link_html(link, url));

        if link.has_children() {
            opener(html, "data-children-opener", link.label(), is_active);
            let open = if is_active { " open" } else { "" };
            let _ = writeln!(html, "<ul class=\"nav-child-level{open}\">");
            for child in link.children() {
                render_child(html, child, url);
            }
            html.push_str("</ul>\n");
        }
        html.push_str("</li>\n");
    }

    html.push_str("</ul>\n</nav>\n");
}

fn render_child(html: &mut String, child: &NavLink, url: &str) {
    html.push_str("<li>");
    html.push_str(&link_html(child, url));
    if child.has_children() {
        let is_open = child.url() == url || child.children().iter().any(|g| g.url() == url);
        opener(html, "data-grandchildren-opener", child.label(), is_open);
        let open = if is_open { " open" } else { "" };
        let _ = write!(html, "<ul class=\"nav-grandchild-level{open}\">");
        for grandchild in child.children() {
            let _ = write!(html, "<li>{}</li>", link_html(grandchild, url));
        }
        html.push_str("</ul>");
    }
    html.push_str("</li>\n");
}

fn opener(html: &mut String, data_attr: &str, label: &str, open: bool) {
    let _ = write!(
        html,
        "<button type=\"button\" class=\"nav-opener\" {data_attr} aria-expanded=\"{open}\" \
         aria-label=\"Toggle {}\"></button>",
        attr(label)
    );
}

fn render_section_pages(html: &mut String, section: &SectionGroup<'_, Page>, url: &str) {
    if section.landing.is_none() && section.subsections.is_empty() {
        return;
    }
    html.push_str("<nav class=\"section-pages\" aria-label=\"Section\">\n");
    if let Some(landing) = section.landing {
        let _ = writeln!(html, "<p class=\"section-landing\">{}</p>", page_link(landing, url));
    }
    for subsection in &section.subsections {
        let _ = writeln!(html, "<h2 class=\"subsection-title\">{}</h2>", escape(&subsection.name));
        html.push_str("<ul>\n");
        for page in &subsection.entries {
            let _ = writeln!(html, "<li>{}</li>", page_link(page, url));
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</nav>\n");
}

fn page_link(page: &Page, current_url: &str) -> String {
    let current = if page.url() == current_url {
        " aria-current=\"page\""
    } else {
        ""
    };
    format!(
        "<a href=\"{}\"{current}>{}</a>",
        attr(page.url()),
        escape(page.link_title())
    )
}

fn render_toc(html: &mut String, toc: &[TocEntry]) {
    if toc.is_empty() {
        return;
    }
    html.push_str("<aside class=\"page-toc\">\n<h2 class=\"page-toc-title\">On this page</h2>\n");
    html.push_str("<ul id=\"in-page-toc\">\n");
    for entry in toc {
        let _ = writeln!(
            html,
            "<li class=\"toc-level-{}\"><a href=\"#{}\">{}</a></li>",
            entry.level,
            attr(&entry.id),
            escape(&entry.title)
        );
    }
    html.push_str("</ul>\n</aside>\n");
}

fn render_footer(html: &mut String, footer: &NavCollection) {
    html.push_str("<footer class=\"site-footer\">\n");
    if !footer.is_empty() {
        html.push_str("<ul class=\"footer-links\">\n");
        for link in footer.links() {
            let _ = writeln!(
                html,
                "<li><a href=\"{}\">{}</a></li>",
                attr(link.url()),
                escape(link.label())
            );
        }
        html.push_str("</ul>\n");
    }
    html.push_str("</footer>\n");
}

/// Templates cloned by the client script.
fn render_templates(html: &mut String) {
    html.push_str(
        "<template id=\"copy-button-template\"><div class=\"code-fence\">\
         <button type=\"button\" class=\"copy-button\" data-purpose=\"copy\">Copy</button>\
         </div></template>\n",
    );
    html.push_str(
        "<template id=\"modal-iframe-template\"><div class=\"modal-iframe\" role=\"dialog\" aria-modal=\"true\">\
         <button type=\"button\" class=\"modal-iframe-close\" aria-label=\"Close\">&times;</button>\
         <iframe title=\"Embedded content\" loading=\"lazy\"></iframe>\
         </div></template>\n",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_nav::SectionIndex;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn navigation() -> Navigation {
        let main = json!({"links": [
            {"url": "/docs/", "label": "Docs", "children": [
                {"url": "/docs/start/", "label": "Start", "children": [
                    {"url": "/docs/start/intro/", "label": "Intro"}
                ]},
                {"url": "/docs/faq/", "label": "FAQ"}
            ]},
            {"url": "/api/", "label": "API"}
        ]});
        Navigation {
            main: NavCollection::build("main", &main).unwrap(),
            header: NavCollection::build("header", &json!([{"url": "/docs/", "label": "Docs"}])).unwrap(),
            footer: NavCollection::build("footer", &json!([{"url": "/privacy/", "label": "Privacy & Terms"}])).unwrap(),
        }
    }

    fn context<'a>(navigation: &'a Navigation, url: &'a str, toc: &'a [TocEntry]) -> PageContext<'a> {
        PageContext {
            site_title: "Handbook",
            title: "Intro",
            url,
            content: "<h1>Intro</h1>",
            toc,
            navigation,
            section: None,
            stylesheet: "/style.css",
            script: "/assets/main.js",
            version: "1700000000000",
        }
    }

    #[test]
    fn test_render_page_shell() {
        let navigation = navigation();
        let html = render_page(&context(&navigation, "/docs/start/intro/", &[]));

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Intro | Handbook</title>"));
        assert!(html.contains(r#"href="/style.css?v=1700000000000""#));
        assert!(html.contains(r#"<script src="/assets/main.js?v=1700000000000" defer></script>"#));
        assert!(html.contains(r#"<button type="button" class="hamburger-activate" aria-controls="site-nav""#));
        assert!(html.contains(r#"id="site-nav""#));
        assert!(html.contains(r#"<template id="copy-button-template">"#));
        assert!(html.contains(r#"<template id="modal-iframe-template">"#));
        assert!(html.contains("Privacy &amp; Terms"));
    }

    #[test]
    fn test_active_parent_opens_its_lists() {
        let navigation = navigation();
        let html = render_page(&context(&navigation, "/docs/start/intro/", &[]));

        assert!(html.contains(r#"<li class="nav-item active"><a href="/docs/">Docs</a>"#));
        assert!(html.contains(r#"<ul class="nav-child-level open">"#));
        assert!(html.contains(r#"<ul class="nav-grandchild-level open">"#));
        assert!(html.contains(r#"<a href="/docs/start/intro/" aria-current="page">Intro</a>"#));
        assert!(html.contains(r#"<li class="nav-item"><a href="/api/">API</a></li>"#));
    }

    #[test]
    fn test_no_active_parent_on_unlisted_page() {
        let navigation = navigation();
        let html = render_page(&context(&navigation, "/", &[]));

        assert!(!html.contains("nav-item active"));
        assert!(html.contains(r#"<ul class="nav-child-level">"#));
        assert!(html.contains(r#"data-children-opener aria-expanded="false""#));
    }

    #[test]
    fn test_toc_links_match_heading_ids() {
        let navigation = navigation();
        let toc = vec![
            TocEntry { level: 2, title: "Install".to_owned(), id: "install".to_owned() },
            TocEntry { level: 3, title: "On <Linux>".to_owned(), id: "on-linux".to_owned() },
        ];
        let html = render_page(&context(&navigation, "/", &toc));

        assert!(html.contains(r#"<ul id="in-page-toc">"#));
        assert!(html.contains(r##"<li class="toc-level-2"><a href="#install">Install</a></li>"##));
        assert!(html.contains(r##"<a href="#on-linux">On &lt;Linux&gt;</a>"##));
    }

    #[test]
    fn test_empty_toc_omitted() {
        let navigation = navigation();
        let html = render_page(&context(&navigation, "/", &[]));

        assert!(!html.contains("in-page-toc"));
    }

    #[test]
    fn test_section_pages() {
        let pages = vec![
            Page::from_source("guides/index.md", "---\ntitle: Guides\nsection: guides\n---\n").unwrap(),
            Page::from_source("guides/install.md", "---\ntitle: Install\nsection: guides\nsubsection: Setup\n---\n").unwrap(),
        ];
        let index = SectionIndex::group(&pages);
        let navigation = navigation();
        let mut ctx = context(&navigation, "/guides/install/", &[]);
        ctx.section = index.section("guides");

        let html = render_page(&ctx);

        assert!(html.contains(r#"<p class="section-landing"><a href="/guides/">Guides</a></p>"#));
        assert!(html.contains(r#"<h2 class="subsection-title">Setup</h2>"#));
        assert!(html.contains(r#"<li><a href="/guides/install/" aria-current="page">Install</a></li>"#));
    }

    #[test]
    fn test_versioned() {
        assert_eq!(versioned("/style.css", "42"), "/style.css?v=42");
        assert_eq!(versioned("/style.css?theme=dark", "42"), "/style.css?theme=dark&v=42");
        assert_eq!(versioned("/style.css", ""), "/style.css");
    }
}
