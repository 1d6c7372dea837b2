//! robots.txt generation.

use crate::urls::absolute_url;

/// Paths crawlers are asked to skip.
pub const DISALLOWED: &[&str] = &["/admin/", "/api/"];

pub fn render(base_url: &str) -> String {
    let mut out = String::from("User-agent: *\n");
    for path in DISALLOWED {
        out.push_str(&format!("Disallow: {path}\n"));
    }
    out.push_str(&format!(
        "\nSitemap: {}\n",
        absolute_url(base_url, "/sitemap.xml")
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_crawlers_at_the_sitemap() {
        let txt = render("https://crimea-yurist.ru");
        assert!(txt.starts_with("User-agent: *\n"));
        assert!(txt.contains("Disallow: /admin/\n"));
        assert!(txt.ends_with("Sitemap: https://crimea-yurist.ru/sitemap.xml\n"));
    }
}
