//! sitemap.xml generation.

use std::fmt::Write;

use serde::Serialize;

use crate::tree::PageTree;
use crate::types::{DbId, Timestamp};
use crate::urls::{absolute_url, page_path};

pub const CHANGEFREQ: &str = "weekly";
const XMLNS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SitemapEntry {
    pub loc: String,
    pub lastmod: Option<Timestamp>,
    pub changefreq: &'static str,
    pub priority: f32,
}

/// Shallow pages rank highest.
pub fn priority_for_depth(depth: i32) -> f32 {
    if depth <= 3 {
        1.0
    } else if depth <= 4 {
        0.8
    } else {
        0.6
    }
}

/// One entry per live, public page below the tree root, in tree order.
pub fn entries(tree: &PageTree, site_root: Option<DbId>, base_url: &str) -> Vec<SitemapEntry> {
    tree.pages()
        .filter(|p| p.is_visible() && p.depth != 1 && p.slug != "root")
        .filter_map(|p| {
            let path = page_path(tree, p.id, site_root)?;
            Some(SitemapEntry {
                loc: absolute_url(base_url, &path),
                lastmod: p.last_published_at,
                changefreq: CHANGEFREQ,
                priority: priority_for_depth(p.depth),
            })
        })
        .collect()
}

/// Render entries as a sitemap-protocol `<urlset>` document.
pub fn render(entries: &[SitemapEntry]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(xml, "<urlset xmlns=\"{XMLNS}\">");
    for entry in entries {
        xml.push_str("  <url>\n");
        let _ = writeln!(xml, "    <loc>{}</loc>", escape_xml(&entry.loc));
        if let Some(lastmod) = entry.lastmod {
            let _ = writeln!(xml, "    <lastmod>{}</lastmod>", lastmod.format("%Y-%m-%d"));
        }
        let _ = writeln!(xml, "    <changefreq>{}</changefreq>", entry.changefreq);
        let _ = writeln!(xml, "    <priority>{:.1}</priority>", entry.priority);
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
