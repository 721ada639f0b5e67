//! Search configured registries for plugins by partial or complete name.
//!
//! For each registry × requested name the engine first probes
//! `registry/name` as an exact plugin reference. Failing that it falls back
//! to scraping the host's repository listing page and fuzzy-matching the
//! requested fragment against repository paths and page titles. Hosts that
//! cannot be scraped are reported once and skipped; network failures always
//! degrade to fewer results, never to an error.

use colored::*;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Url;
use std::collections::{BTreeMap, HashSet};

use crate::probe::ProbeClient;

/// A page qualifies as a plugin only if its title carries both keywords.
const PRODUCT_KEYWORD: &str = "terminus";
const PLUGIN_KEYWORD: &str = "plugin";

lazy_static! {
    static ref TITLE_RE: Regex = Regex::new(r"<title>(.*?)</title>").unwrap();
}

/// Check whether `registry/name` is a plugin page.
///
/// The registry must be an absolute URL with an organization path, otherwise
/// the answer is `None` without any network call. A qualifying page has a
/// `<title>` containing both "terminus" and "plugin", case-insensitively;
/// the title is returned as the plugin's display name.
pub fn is_valid_plugin(probe: &ProbeClient, registry: &str, name: &str) -> Option<String> {
    let parsed = Url::parse(registry).ok()?;
    parsed.host_str()?;
    if parsed.path().trim_matches('/').is_empty() {
        return None;
    }

    let body = probe.fetch(&format!("{}/{}", registry, name))?;
    let title = extract_title(&body)?;
    let lower = title.to_lowercase();
    if lower.contains(PRODUCT_KEYWORD) && lower.contains(PLUGIN_KEYWORD) {
        Some(title)
    } else {
        None
    }
}

/// First `<title>` text in a page body.
fn extract_title(body: &str) -> Option<String> {
    TITLE_RE
        .captures(body)
        .map(|captures| captures[1].to_string())
}

/// Repository listing scrape for one Git-hosting service.
pub trait HostLister {
    /// Repository names under the registry's organization, in page order.
    /// Unreachable or unparseable pages yield an empty list.
    fn list_repositories(&self, probe: &ProbeClient, registry: &Url) -> Vec<String>;
}

/// Scrapes the public repositories tab of a GitHub organization page,
/// extracting repository names from the `codeRepository` markup.
pub struct GithubLister;

impl HostLister for GithubLister {
    fn list_repositories(&self, probe: &ProbeClient, registry: &Url) -> Vec<String> {
        let Some(body) = probe.fetch(&format!("{}?tab=repositories", registry)) else {
            return Vec::new();
        };
        let pattern = format!(
            r#"{}/(.*?)".*?codeRepository"#,
            regex::escape(registry.path())
        );
        let Ok(re) = Regex::new(&pattern) else {
            return Vec::new();
        };
        re.captures_iter(&body)
            .map(|captures| captures[1].to_string())
            .collect()
    }
}

/// Listing scrapers keyed by host name. GitHub is the only implemented
/// host; Bitbucket is reserved but has no scrape logic yet.
// TODO: Bitbucket repository listing support
fn default_listers() -> BTreeMap<String, Box<dyn HostLister>> {
    let mut listers: BTreeMap<String, Box<dyn HostLister>> = BTreeMap::new();
    listers.insert("github.com".to_string(), Box::new(GithubLister));
    listers
}

pub struct SearchEngine<'a> {
    probe: &'a ProbeClient,
    registries: Vec<String>,
    listers: BTreeMap<String, Box<dyn HostLister>>,
}

impl<'a> SearchEngine<'a> {
    pub fn new(probe: &'a ProbeClient, registries: Vec<String>) -> Self {
        Self {
            probe,
            registries,
            listers: default_listers(),
        }
    }

    /// Register a listing scraper for an additional host.
    pub fn register_lister(&mut self, host: impl Into<String>, lister: Box<dyn HostLister>) {
        self.listers.insert(host.into(), lister);
    }

    /// Search every configured registry for every requested name fragment.
    ///
    /// Exact hits are keyed by the bare requested name with the registry URL
    /// as description; fuzzy hits are keyed by `registry/name` with the page
    /// title (truncated after a colon) as description. Later hits for the
    /// same key overwrite earlier ones.
    pub fn search(&self, names: &[String]) -> BTreeMap<String, String> {
        let mut plugins = BTreeMap::new();
        // Validated titles accumulate across registries and fragments so a
        // listing page is only walked once per repository.
        let mut titles: BTreeMap<String, String> = BTreeMap::new();
        let mut unsupported: HashSet<String> = HashSet::new();

        for registry in &self.registries {
            for name in names {
                let candidate = format!("{}/{}", registry, name);
                if self.probe.is_valid_url(&candidate)
                    && is_valid_plugin(self.probe, registry, name).is_some()
                {
                    plugins.insert(name.clone(), registry.clone());
                    continue;
                }
                self.fuzzy_search(registry, name, &mut titles, &mut plugins, &mut unsupported);
            }
        }

        plugins
    }

    fn fuzzy_search(
        &self,
        registry: &str,
        name: &str,
        titles: &mut BTreeMap<String, String>,
        plugins: &mut BTreeMap<String, String>,
        unsupported: &mut HashSet<String>,
    ) {
        let Ok(parsed) = Url::parse(registry) else {
            return;
        };
        let Some(host) = parsed.host_str() else {
            return;
        };
        let Some(lister) = self.listers.get(host) else {
            if unsupported.insert(host.to_string()) {
                println!(
                    "  {} Repository listing is not supported for {}.",
                    "⚠".yellow(),
                    host
                );
            }
            return;
        };

        for repository in lister.list_repositories(self.probe, &parsed) {
            let location = format!("{}/{}", registry, repository);
            if titles.contains_key(&location) {
                continue;
            }
            if let Some(title) = is_valid_plugin(self.probe, registry, &repository) {
                titles.insert(location, title);
            }
        }

        let fragment = name.to_lowercase();
        for (location, title) in titles.iter() {
            if location.to_lowercase().contains(&fragment)
                || title.to_lowercase().contains(&fragment)
            {
                plugins.insert(location.clone(), describe(title));
            }
        }
    }
}

/// Display description for a title: the portion after a colon, if any.
fn describe(title: &str) -> String {
    match title.split_once(':') {
        Some((_, rest)) => rest.trim().to_string(),
        None => title.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_title() {
        let body = "<html><head><title>Terminus Example Plugin</title></head></html>";
        assert_eq!(
            extract_title(body),
            Some("Terminus Example Plugin".to_string())
        );
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
    }

    #[test]
    fn test_extract_title_takes_first_match() {
        let body = "<title>First</title><title>Second</title>";
        assert_eq!(extract_title(body), Some("First".to_string()));
    }

    #[test]
    fn test_describe_truncates_after_colon() {
        assert_eq!(describe("Foo: Terminus Bar Plugin"), "Terminus Bar Plugin");
        assert_eq!(describe("Terminus Bar Plugin"), "Terminus Bar Plugin");
    }

    #[test]
    fn test_default_listers_cover_github_only() {
        let listers = default_listers();
        assert!(listers.contains_key("github.com"));
        assert!(!listers.contains_key("bitbucket.com"));
    }

    #[test]
    fn test_listing_pattern_extracts_repository_names() {
        // Abbreviated shape of a GitHub organization repositories tab.
        let body = r#"
            <a href="/example-org/terminus-site-scaffold" itemprop="name codeRepository">terminus-site-scaffold</a>
            <a href="/example-org/terminus-backup-all" itemprop="name codeRepository">terminus-backup-all</a>
            <a href="/example-org/unrelated">unrelated</a>
        "#;
        let pattern = format!(r#"{}/(.*?)".*?codeRepository"#, regex::escape("/example-org"));
        let re = Regex::new(&pattern).unwrap();
        let names: Vec<String> = re
            .captures_iter(body)
            .map(|captures| captures[1].to_string())
            .collect();
        assert_eq!(names, vec!["terminus-site-scaffold", "terminus-backup-all"]);
    }
}
