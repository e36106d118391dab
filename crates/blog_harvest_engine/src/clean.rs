use ego_tree::NodeId;
use scraper::{ElementRef, Html, Selector};

/// Elements that never belong to post content.
pub const BLOCKLIST: &[&str] = &[
    "script",
    "style",
    "nav",
    "footer",
    "header",
    ".subscribe",
    ".social-share",
    ".newsletter",
    ".advertisement",
    ".ads",
    "[class*=\"ad-\"]",
    "[class*=\"subscribe\"]",
    "[class*=\"newsletter\"]",
];

/// Stripped from a content region before its text is measured.
pub const REGION_PRESTRIP: &[&str] = &["script", "style", "nav", "footer"];

/// Removes page chrome, ads and empty paragraphs from a content fragment.
#[derive(Debug, Clone)]
pub struct ContentCleaner {
    blocklist: Vec<Selector>,
    paragraph: Option<Selector>,
}

impl ContentCleaner {
    pub fn new() -> Self {
        Self::with_blocklist(BLOCKLIST)
    }

    pub fn with_blocklist(selectors: &[&str]) -> Self {
        Self {
            blocklist: parse_selectors(selectors),
            paragraph: Selector::parse("p").ok(),
        }
    }

    /// Cleans an HTML fragment; malformed input is parsed leniently.
    pub fn clean(&self, html: &str) -> String {
        let mut fragment = Html::parse_fragment(html);
        self.clean_document(&mut fragment);
        fragment.root_element().inner_html()
    }

    pub fn clean_document(&self, doc: &mut Html) {
        strip_elements(doc, &self.blocklist);
        if let Some(paragraph) = &self.paragraph {
            let empty: Vec<NodeId> = doc
                .select(paragraph)
                .filter(|p| is_empty_paragraph(*p))
                .map(|p| p.id())
                .collect();
            detach_all(doc, empty);
        }
    }
}

impl Default for ContentCleaner {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_selectors(selectors: &[&str]) -> Vec<Selector> {
    selectors
        .iter()
        .filter_map(|s| Selector::parse(s).ok())
        .collect()
}

/// Detaches every element matching any of `selectors`, subtree included.
pub fn strip_elements(doc: &mut Html, selectors: &[Selector]) {
    let ids: Vec<NodeId> = selectors
        .iter()
        .flat_map(|selector| doc.select(selector).map(|el| el.id()).collect::<Vec<_>>())
        .collect();
    detach_all(doc, ids);
}

/// No visible text; markup-only paragraphs (a lone `<img>`, say) count as empty.
fn is_empty_paragraph(p: ElementRef<'_>) -> bool {
    p.text().all(|t| t.trim().is_empty())
}

fn detach_all(doc: &mut Html, ids: Vec<NodeId>) {
    for id in ids {
        if let Some(mut node) = doc.tree.get_mut(id) {
            node.detach();
        }
    }
}
