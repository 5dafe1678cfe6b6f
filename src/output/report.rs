use crate::utils::escape_html;
use crate::view::{Action, Element, Node, Region, View};

const VOID_TAGS: [&str; 3] = ["img", "br", "hr"];

fn action_attrs(action: &Action) -> String {
    match action {
        Action::LoadPage(page) => format!(r#" data-action="load-page" data-target="{page}""#),
        Action::SelectSource(source) => format!(
            r#" data-action="select-source" data-target="{}""#,
            escape_html(source)
        ),
        Action::ToggleSources => r#" data-action="toggle-sources""#.to_string(),
    }
}

fn render_element(e: &Element, out: &mut String) {
    out.push('<');
    out.push_str(e.tag);
    if !e.classes.is_empty() {
        out.push_str(&format!(r#" class="{}""#, escape_html(&e.classes.join(" "))));
    }
    for (name, value) in &e.attrs {
        out.push_str(&format!(r#" {}="{}""#, name, escape_html(value)));
    }
    if e.tag == "img" {
        if let Some(fallback) = e.get_attr("data-fallback") {
            out.push_str(&format!(
                r#" onerror="this.onerror=null;this.src='{}'""#,
                escape_html(fallback)
            ));
        }
    }
    if let Some(action) = &e.on_click {
        out.push_str(&action_attrs(action));
    }
    out.push('>');
    if VOID_TAGS.contains(&e.tag) {
        return;
    }
    for child in &e.children {
        render_node(child, out);
    }
    out.push_str("</");
    out.push_str(e.tag);
    out.push('>');
}

pub fn render_node(node: &Node, out: &mut String) {
    match node {
        Node::Text(t) => out.push_str(&escape_html(t)),
        Node::Markup(m) => out.push_str(m),
        Node::Element(e) => render_element(e, out),
    }
}

fn render_region(view: &View, region: Region) -> String {
    let hidden = if view.is_visible(region) {
        ""
    } else {
        " hidden"
    };
    let mut inner = String::new();
    for node in view.nodes(region) {
        render_node(node, &mut inner);
    }
    format!(r#"<div id="{}" class="region{hidden}">{inner}</div>"#, region.dom_id())
}

pub fn render_html(view: &View) -> Vec<u8> {
    let filters = render_region(view, Region::SourceFilters);
    let list = render_region(view, Region::DealList);
    let pagination = render_region(view, Region::Pagination);
    let ai = format!(
        r#"<section id="{}" class="region bg-white rounded-lg shadow p-4 space-y-3{}">{}{}<div class="ai-sources-section">{}{}</div></section>"#,
        Region::AiResult.dom_id(),
        if view.is_visible(Region::AiResult) {
            ""
        } else {
            " hidden"
        },
        render_region(view, Region::AiLoading),
        render_region(view, Region::AiAnswer),
        render_region(view, Region::AiSources),
        render_region(view, Region::AiSourceList),
    );

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="ko">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>Hot Deals</title>
  <script src="https://cdn.tailwindcss.com"></script>
  <style>
    .hidden {{ display: none; }}
    .source-btn.active {{ background: #ef4444; color: #fff; }}
    .deal-card:hover {{ transform: translateY(-2px); }}
  </style>
</head>
<body class="bg-gray-100 min-h-screen">
  <main class="max-w-3xl mx-auto px-4 py-8 space-y-4">
    <header class="flex items-center justify-between">
      <h1 class="text-2xl font-bold text-gray-900">Hot Deals</h1>
    </header>
    {filters}
    {ai}
    <div class="space-y-3">{list}</div>
    {pagination}
  </main>
</body>
</html>
"####
    );
    html.into_bytes()
}
