//! Module identification for call sites
//!
//! Every logging macro captures a [`CallSite`] with `module_path!()`,
//! `file!()` and `line!()` at the place it is written, so the site always
//! belongs to the original caller. [`ModuleIdentifier`] turns that site
//! into the [`ModuleKey`] used to join into the routing table:
//!
//! | `module_path!()`        | root crate | key            |
//! |-------------------------|------------|----------------|
//! | `my_app::net::server`   | `my_app`   | `net/server`   |
//! | `my_app`                | `my_app`   | `my_app`       |
//! | `hyper::client::conn`   | `my_app`   | `hyper/client/conn` |
//!
//! Keys depend only on the static identity of the site, never on runtime
//! values, so one site always resolves to the same key.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Static location of a logging call, captured by [`callsite!`](crate::callsite)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallSite {
    pub module_path: &'static str,
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    /// A site with no information; resolves to the default entry
    pub const UNKNOWN: CallSite = CallSite::new("", "", 0);

    pub const fn new(module_path: &'static str, file: &'static str, line: u32) -> Self {
        Self {
            module_path,
            file,
            line,
        }
    }

    /// First segment of the module path: the crate the call was compiled in
    pub fn crate_name(&self) -> &'static str {
        self.module_path
            .split("::")
            .next()
            .unwrap_or_default()
    }
}

/// Slash-delimited module path, the join key into the routing table
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleKey(Arc<str>);

impl ModuleKey {
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ModuleKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A call site after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSite {
    pub key: ModuleKey,
    pub file: Arc<str>,
    pub line: u32,
}

impl ResolvedSite {
    /// `'file:line'`, the value of the `file` tag
    pub fn location(&self) -> String {
        format!("'{}:{}'", self.file, self.line)
    }
}

/// Resolves call sites to module keys relative to the program's root crate.
///
/// Results are memoized per site so the hot path does one read-locked map
/// lookup after the first call from a site.
#[derive(Debug)]
pub struct ModuleIdentifier {
    root: String,
    cache: RwLock<HashMap<(&'static str, &'static str), (ModuleKey, Arc<str>)>>,
}

impl ModuleIdentifier {
    /// `root` is the crate name of the running program (`-` and `_` are equivalent)
    pub fn new(root: impl AsRef<str>) -> Self {
        Self {
            root: root.as_ref().trim().replace('-', "_"),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn resolve(&self, site: &CallSite) -> ResolvedSite {
        let cache_key = (site.module_path, site.file);
        if let Some((key, file)) = self.cache.read().get(&cache_key) {
            return ResolvedSite {
                key: key.clone(),
                file: Arc::clone(file),
                line: site.line,
            };
        }

        let key = ModuleKey::new(module_key_for(site.module_path, &self.root));
        let file: Arc<str> = Arc::from(clean_file_path(site.file, &self.root));
        self.cache
            .write()
            .insert(cache_key, (key.clone(), Arc::clone(&file)));

        ResolvedSite {
            key,
            file,
            line: site.line,
        }
    }

    /// Number of distinct sites resolved so far
    pub fn cached_sites(&self) -> usize {
        self.cache.read().len()
    }
}

/// Derive the module key for a `module_path!()` value.
pub fn module_key_for(module_path: &str, root: &str) -> String {
    if module_path.is_empty() {
        return String::new();
    }

    let path = module_path.replace("::", "/");
    if root.is_empty() || path == root {
        return path;
    }
    match path.strip_prefix(root).and_then(|rest| rest.strip_prefix('/')) {
        Some(relative) => relative.to_string(),
        None => path,
    }
}

/// Shorten a `file!()` path for the `file` tag.
///
/// Paths into the cargo registry or git checkouts lose everything up to the
/// crate directory, and build-tool version/hash suffixes (`name-1.2.3`,
/// `name@v1.2.3`, `repo-<16 hex>`) are stripped from every segment.
pub fn clean_file_path(file: &str, root: &str) -> String {
    let file = file.replace('\\', "/");

    let mut segments: Vec<&str> = if let Some((_, rest)) = file.split_once("/registry/src/") {
        // Skip the index directory (`index.crates.io-<hash>`)
        rest.split('/').skip(1).collect()
    } else if let Some((_, rest)) = file.split_once("/git/checkouts/") {
        let mut parts: Vec<&str> = rest.split('/').collect();
        // Drop the revision directory that follows the repository directory
        if parts.len() > 1 {
            parts.remove(1);
        }
        parts
    } else {
        file.split('/').collect()
    };

    if !root.is_empty() && segments.len() > 1 && segments[0].replace('-', "_") == root {
        segments.remove(0);
    }

    // Only directories carry version suffixes; the file name is kept as is
    let last = segments.len().saturating_sub(1);
    segments
        .into_iter()
        .enumerate()
        .map(|(idx, segment)| if idx < last { strip_version_suffix(segment) } else { segment })
        .collect::<Vec<_>>()
        .join("/")
}

pub(crate) fn strip_version_suffix(segment: &str) -> &str {
    if let Some(at) = segment.find('@') {
        return &segment[..at];
    }
    match segment.rfind('-') {
        Some(dash) if dash > 0 => {
            let suffix = &segment[dash + 1..];
            let semver = suffix.starts_with(|c: char| c.is_ascii_digit()) && suffix.contains('.');
            let hash = suffix.len() == 16 && suffix.chars().all(|c| c.is_ascii_hexdigit());
            if semver || hash {
                &segment[..dash]
            } else {
                segment
            }
        }
        _ => segment,
    }
}
