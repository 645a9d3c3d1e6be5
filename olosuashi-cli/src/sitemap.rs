use chrono::NaiveDate;
use olosuashi_core::{ApiError, SlugGateway};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::info;

pub const SITEMAP_NAMESPACE: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFreq {
    Daily,
    Weekly,
    Monthly,
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChangeFreq::Daily => "daily",
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRule {
    pub path: &'static str,
    pub priority: f32,
    pub changefreq: ChangeFreq,
}

pub const STATIC_ROUTES: [RouteRule; 5] = [
    RouteRule { path: "/", priority: 1.0, changefreq: ChangeFreq::Daily },
    RouteRule { path: "/tours", priority: 0.9, changefreq: ChangeFreq::Daily },
    RouteRule { path: "/experiences", priority: 0.9, changefreq: ChangeFreq::Weekly },
    RouteRule { path: "/about", priority: 0.5, changefreq: ChangeFreq::Monthly },
    RouteRule { path: "/contact", priority: 0.5, changefreq: ChangeFreq::Monthly },
];

/// Detail pages: `<path>/<slug>`.
pub const TOUR_DETAIL: RouteRule =
    RouteRule { path: "/tours", priority: 0.7, changefreq: ChangeFreq::Weekly };
pub const EXPERIENCE_DETAIL: RouteRule =
    RouteRule { path: "/experiences", priority: 0.7, changefreq: ChangeFreq::Weekly };

#[derive(Debug, thiserror::Error)]
pub enum SitemapError {
    #[error("Could not fetch slugs: {0}")]
    Api(#[from] ApiError),
    #[error("XML write failed: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sitemap is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapEntry {
    pub loc: String,
    pub priority: f32,
    pub changefreq: ChangeFreq,
}

/// Every public URL of the site, static pages first. Duplicate and blank
/// slugs are dropped.
pub fn entries(site_base: &str, tour_slugs: &[String], experience_slugs: &[String]) -> Vec<SitemapEntry> {
    let base = site_base.trim_end_matches('/');
    let mut entries: Vec<SitemapEntry> = STATIC_ROUTES
        .iter()
        .map(|rule| SitemapEntry {
            loc: if rule.path == "/" { format!("{}/", base) } else { format!("{}{}", base, rule.path) },
            priority: rule.priority,
            changefreq: rule.changefreq,
        })
        .collect();

    for (rule, slugs) in [(TOUR_DETAIL, tour_slugs), (EXPERIENCE_DETAIL, experience_slugs)] {
        let unique: BTreeSet<&str> = slugs.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
        entries.extend(unique.into_iter().map(|slug| SitemapEntry {
            loc: format!("{}{}/{}", base, rule.path, slug),
            priority: rule.priority,
            changefreq: rule.changefreq,
        }));
    }

    entries
}

pub fn render(entries: &[SitemapEntry], lastmod: NaiveDate) -> Result<String, SitemapError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let lastmod = lastmod.format("%Y-%m-%d").to_string();

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("urlset").with_attributes([("xmlns", SITEMAP_NAMESPACE)]),
    ))?;

    for entry in entries {
        writer.write_event(Event::Start(BytesStart::new("url")))?;
        write_text(&mut writer, "loc", &entry.loc)?;
        write_text(&mut writer, "lastmod", &lastmod)?;
        write_text(&mut writer, "changefreq", &entry.changefreq.to_string())?;
        write_text(&mut writer, "priority", &format!("{:.1}", entry.priority))?;
        writer.write_event(Event::End(BytesEnd::new("url")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("urlset")))?;

    let mut xml = String::from_utf8(writer.into_inner())?;
    xml.push('\n');
    Ok(xml)
}

fn write_text(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<(), SitemapError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

/// Fetch every slug, render and write `sitemap.xml`. Returns the URL count.
pub async fn generate(
    gateway: &dyn SlugGateway,
    site_base: &str,
    output: &Path,
    lastmod: NaiveDate,
) -> Result<usize, SitemapError> {
    let (tours, experiences) = tokio::join!(gateway.tour_slugs(), gateway.experience_slugs());
    let (tours, experiences) = (tours?, experiences?);

    let entries = entries(site_base, &tours, &experiences);
    let xml = render(&entries, lastmod)?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(output, xml)?;

    info!(
        "Wrote {} URLs ({} tours, {} experiences) to {}",
        entries.len(),
        tours.len(),
        experiences.len(),
        output.display()
    );
    Ok(entries.len())
}
