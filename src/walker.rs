use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default include patterns for directory roots.
pub const DEFAULT_INCLUDE_GLOBS: &[&str] = &["*.yaml", "*.yml"];

/// Resolve roots into the ordered list of files to fix.
///
/// Roots that are not directories are returned as-is without filtering.
/// Directories are scanned recursively: a file is kept when it matches any
/// include glob at any depth and no exclude glob relative to the root.
/// Results are deduplicated by canonical path, first occurrence wins.
pub fn discover<P: AsRef<Path>>(
    roots: &[P],
    include_globs: &[String],
    exclude_globs: &[String],
) -> Vec<PathBuf> {
    let includes: Vec<(String, GlobSet)> = include_globs
        .iter()
        .filter_map(|pattern| build_include(pattern).map(|set| (pattern.clone(), set)))
        .collect();
    let excludes = build_excludes(exclude_globs);

    let mut seen = HashSet::new();
    let mut files = vec![];

    for root in roots {
        let root = root.as_ref();
        let found = if root.is_dir() {
            let found = scan_dir(root, &includes, &excludes);
            if found.is_empty() {
                warn!(root = %root.display(), "no matching files found");
            } else {
                info!(root = %root.display(), count = found.len(), "found files");
            }
            found
        } else {
            vec![root.to_path_buf()]
        };

        for path in found {
            let key = fs::canonicalize(&path).unwrap_or_else(|_| path.clone());
            if seen.insert(key) {
                debug!(path = %path.display(), "candidate");
                files.push(path);
            } else {
                debug!(path = %path.display(), "skipping duplicate");
            }
        }
    }

    files
}

/// Files under `root` matching `includes` and not `excludes`, in include order.
fn scan_dir(root: &Path, includes: &[(String, GlobSet)], excludes: &GlobSet) -> Vec<PathBuf> {
    let walk_root = root.to_path_buf();
    let prune = excludes.clone();
    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|ft| ft.is_dir());
            !(is_dir && is_excluded(entry.path(), &walk_root, &prune))
        })
        .build();

    let mut candidates = vec![];
    for entry in walker {
        match entry {
            Ok(entry) => {
                if entry.depth() > 0 {
                    candidates.push(entry.into_path());
                }
            }
            Err(e) => {
                warn!(root = %root.display(), "skipping unreadable entry: {e}");
            }
        }
    }

    let mut files = vec![];
    for (pattern, include) in includes {
        let before = files.len();
        for path in &candidates {
            let Ok(relative) = path.strip_prefix(root) else {
                continue;
            };
            if include.is_match(relative) && !is_excluded(path, root, excludes) && path.is_file()
            {
                files.push(path.clone());
            }
        }
        debug!(
            root = %root.display(),
            pattern,
            count = files.len() - before,
            "include pattern matched"
        );
    }

    files
}

/// Whether `path` or one of its ancestors below `root` matches an exclude glob.
fn is_excluded(path: &Path, root: &Path, excludes: &GlobSet) -> bool {
    if excludes.is_empty() {
        return false;
    }
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };

    relative
        .ancestors()
        .filter(|p| !p.as_os_str().is_empty())
        .any(|p| excludes.is_match(p))
}

/// Include patterns apply at any depth, like a recursive glob.
fn build_include(pattern: &str) -> Option<GlobSet> {
    let pattern = pattern.trim_start_matches("./");
    if pattern.is_empty() {
        return None;
    }

    let mut builder = GlobSetBuilder::new();
    match literal_glob(pattern) {
        Ok(glob) => {
            builder.add(glob);
        }
        Err(e) => {
            warn!(pattern, "ignoring invalid include pattern: {e}");
            return None;
        }
    }
    if !pattern.starts_with("**/") {
        if let Ok(glob) = literal_glob(&format!("**/{pattern}")) {
            builder.add(glob);
        }
    }

    match builder.build() {
        Ok(set) => Some(set),
        Err(e) => {
            warn!(pattern, "ignoring invalid include pattern: {e}");
            None
        }
    }
}

/// Exclude patterns are anchored at the root being scanned.
fn build_excludes(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let pattern = pattern.trim_start_matches("./").trim_end_matches('/');
        if pattern.is_empty() {
            continue;
        }
        match literal_glob(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!(pattern, "ignoring invalid exclude pattern: {e}"),
        }
    }

    builder.build().unwrap_or_else(|e| {
        warn!("ignoring exclude patterns: {e}");
        GlobSet::empty()
    })
}

/// `*` and `?` never cross a path separator; `**` does.
fn literal_glob(pattern: &str) -> Result<Glob, globset::Error> {
    GlobBuilder::new(pattern).literal_separator(true).build()
}
