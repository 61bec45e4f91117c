use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use petgraph::algo::kosaraju_scc;
use petgraph::prelude::*;
use tracing::{debug, info, warn};

use crate::manifest::{read_manifest, scan_dependencies, ManifestDialect, ROOT_MARKER};
use crate::types::{OrbitError, OrbitResult};

/// One discovered unit of the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Absolute directory containing the manifest.
    pub path: PathBuf,
    /// Declared name, or the relative path when the manifest has no declaration.
    pub identifier: String,
    /// `/`-separated path from the workspace root; [`ROOT_MARKER`] for the root module.
    pub relative_path: String,
    /// Last segment of the identifier.
    pub short_name: String,
    /// Raw manifest text, kept so the dependency scan sees the same snapshot.
    pub manifest: String,
}

impl Module {
    pub fn is_root(&self) -> bool {
        self.relative_path == ROOT_MARKER
    }

    /// Human label used in headers and failure summaries.
    pub fn location(&self) -> &str {
        if self.is_root() {
            "main module"
        } else {
            &self.relative_path
        }
    }
}

/// Immutable snapshot of a discovered workspace
#[derive(Debug)]
pub struct Workspace {
    pub root: PathBuf,
    pub modules: Vec<Module>,
}

/// Module short names to skip for an operation
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    names: HashSet<String>,
}

impl ExclusionSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names
                .into_iter()
                .map(|name| {
                    let name: String = name.into();
                    name.trim().to_string()
                })
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, module: &Module) -> bool {
        self.names.contains(&module.short_name)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(Self::new(names).names);
    }
}

/// Traversal settings for [`discover_modules`]
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    pub dialect: ManifestDialect,
    /// Extra glob patterns, relative to the root, naming directories to skip.
    pub exclude_globs: Vec<String>,
}

/// Walk the tree below `root` and return every module, root first and then by relative path.
///
/// Only a failure to read `root` itself is fatal. Unreadable subdirectories are
/// skipped with a warning and a manifest without a declaration line gets its
/// relative path as a synthetic identifier.
pub fn discover_modules(root: &Path, options: &DiscoveryOptions) -> OrbitResult<Vec<Module>> {
    let dialect = &options.dialect;
    let exclude_set = build_glob_set(&options.exclude_globs)?;

    let root_entries = std::fs::read_dir(root).map_err(|source| OrbitError::RootTraversal {
        path: root.to_path_buf(),
        source,
    })?;

    let mut modules = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back((root.to_path_buf(), Some(root_entries)));

    while let Some((current_dir, entries)) = queue.pop_front() {
        let entries = match entries {
            Some(entries) => entries,
            None => match std::fs::read_dir(&current_dir) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Skipping unreadable directory {}: {}", current_dir.display(), e);
                    continue;
                }
            },
        };

        for entry in entries.flatten() {
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            let path = entry.path();
            let name = entry.file_name();
            let name = name.to_string_lossy();

            if file_type.is_dir() {
                let relative = path.strip_prefix(root).unwrap_or(&path);
                if is_excluded_dir(&name, dialect) || exclude_set.is_match(relative) {
                    debug!("Not descending into {}", path.display());
                    continue;
                }
                queue.push_back((path, None));
            } else if name == dialect.file_name.as_str()
                && (file_type.is_file() || (file_type.is_symlink() && path.is_file()))
            {
                modules.push(load_module(root, &path, dialect));
            }
        }
    }

    sort_modules(&mut modules);
    Ok(modules)
}

fn is_excluded_dir(name: &str, dialect: &ManifestDialect) -> bool {
    if name == dialect.vendor_dir {
        return true;
    }
    name.starts_with('.') && !dialect.allowed_hidden_dirs.iter().any(|d| d == name)
}

fn build_glob_set(patterns: &[String]) -> OrbitResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            OrbitError::Config(format!("Invalid exclude pattern '{}': {}", pattern, e))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| OrbitError::Config(format!("Invalid exclude patterns: {}", e)))
}

fn load_module(root: &Path, manifest_path: &Path, dialect: &ManifestDialect) -> Module {
    let dir = manifest_path.parent().unwrap_or(root).to_path_buf();
    let relative_path = relative_path(root, &dir);

    let (identifier, manifest) = match read_manifest(manifest_path, dialect) {
        Ok(manifest) => (manifest.identifier, manifest.text),
        Err(e) => {
            warn!(
                "Failed to read module name from {}: {}",
                manifest_path.display(),
                e
            );
            let text = std::fs::read_to_string(manifest_path).unwrap_or_default();
            (relative_path.clone(), text)
        }
    };

    let short_name = identifier
        .rsplit('/')
        .next()
        .unwrap_or(identifier.as_str())
        .to_string();

    Module {
        path: dir,
        identifier,
        relative_path,
        short_name,
        manifest,
    }
}

fn relative_path(root: &Path, dir: &Path) -> String {
    let Ok(relative) = dir.strip_prefix(root) else {
        return dir.to_string_lossy().into_owned();
    };

    let segments: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        ROOT_MARKER.to_string()
    } else {
        segments.join("/")
    }
}

/// Root module first, everything else lexicographically by relative path.
pub fn sort_modules(modules: &mut [Module]) {
    modules.sort_by(|a, b| {
        b.is_root()
            .cmp(&a.is_root())
            .then_with(|| a.relative_path.cmp(&b.relative_path))
    });
}

/// Drop modules whose short name is excluded, keeping the order of the rest.
pub fn filter_excluded(modules: &[Module], exclusions: &ExclusionSet, operation: &str) -> Vec<Module> {
    if exclusions.is_empty() {
        return modules.to_vec();
    }

    modules
        .iter()
        .filter(|module| {
            if exclusions.contains(module) {
                info!("Skipping module {} (excluded from {})", module.short_name, operation);
                false
            } else {
                true
            }
        })
        .cloned()
        .collect()
}

/// A directed "depends on" relation between two module identifiers
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependencyEdge {
    pub dependent: String,
    pub depends_on: String,
}

/// Intra-workspace dependency edges keyed by dependent identifier
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    dependencies: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn is_empty(&self) -> bool {
        self.dependencies.values().all(Vec::is_empty)
    }

    /// Identifiers `identifier` depends on, in manifest order.
    pub fn dependencies_of(&self, identifier: &str) -> &[String] {
        self.dependencies
            .get(identifier)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn edges(&self) -> impl Iterator<Item = DependencyEdge> + '_ {
        self.dependencies.iter().flat_map(|(dependent, deps)| {
            deps.iter().map(move |dep| DependencyEdge {
                dependent: dependent.clone(),
                depends_on: dep.clone(),
            })
        })
    }

    /// Graph with one node per module and an edge from each dependent to its dependency.
    pub fn to_petgraph(&self, modules: &[Module]) -> petgraph::Graph<String, ()> {
        let mut graph = DiGraph::<String, ()>::new();
        let mut node_indices = HashMap::new();

        for module in modules {
            if !node_indices.contains_key(&module.identifier) {
                let node_index = graph.add_node(module.identifier.clone());
                node_indices.insert(module.identifier.clone(), node_index);
            }
        }

        for edge in self.edges() {
            if let (Some(&from), Some(&to)) = (
                node_indices.get(&edge.dependent),
                node_indices.get(&edge.depends_on),
            ) {
                graph.add_edge(from, to, ());
            }
        }

        graph
    }
}

/// Scan each module's manifest for local redirections and plain declarations of other workspace modules.
pub fn build_dependency_graph(modules: &[Module], dialect: &ManifestDialect) -> DependencyGraph {
    let known: HashSet<&str> = modules.iter().map(|m| m.identifier.as_str()).collect();
    let mut dependencies: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for module in modules {
        let entry = dependencies.entry(module.identifier.clone()).or_default();
        for dep in scan_dependencies(&module.manifest, dialect, &known) {
            if dep != module.identifier && !entry.contains(&dep) {
                entry.push(dep);
            }
        }
    }

    DependencyGraph { dependencies }
}

/// Strongly connected components that form cycles, each sorted, for reporting
pub fn find_cycles(graph: &petgraph::Graph<String, ()>) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = kosaraju_scc(graph)
        .into_iter()
        .filter_map(|component| {
            if component.len() > 1 {
                let mut cycle = component
                    .iter()
                    .map(|node| graph[*node].clone())
                    .collect::<Vec<_>>();
                cycle.sort();
                Some(cycle)
            } else {
                let node = component[0];
                if graph.contains_edge(node, node) {
                    Some(vec![graph[node].clone()])
                } else {
                    None
                }
            }
        })
        .collect();

    cycles.sort();
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_manifest(root: &Path, dir: &str, contents: &str) {
        let path = if dir == "." { root.to_path_buf() } else { root.join(dir) };
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join("go.mod"), contents).unwrap();
    }

    fn discover(root: &Path) -> Vec<Module> {
        discover_modules(root, &DiscoveryOptions::default()).unwrap()
    }

    fn relative_paths(modules: &[Module]) -> Vec<&str> {
        modules.iter().map(|m| m.relative_path.as_str()).collect()
    }

    #[test]
    fn test_discovers_root_first_then_alphabetical() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_manifest(root, "zeta", "module example.com/zeta\n");
        write_manifest(root, ".", "module example.com/root\n");
        write_manifest(root, "alpha/nested", "module example.com/alpha/nested\n");
        write_manifest(root, "alpha", "module example.com/alpha\n");

        let modules = discover(root);

        assert_eq!(relative_paths(&modules), vec![".", "alpha", "alpha/nested", "zeta"]);
        assert!(modules[0].is_root());
        assert_eq!(modules[0].location(), "main module");
        assert_eq!(modules[2].short_name, "nested");
        assert_eq!(modules[2].path, root.join("alpha/nested"));
    }

    #[test]
    fn test_discovery_is_deterministic() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        for name in ["c", "a", "b/x", "b", "d/e/f"] {
            write_manifest(root, name, &format!("module example.com/{}\n", name));
        }

        let first = discover(root);
        let second = discover(root);

        assert_eq!(first, second);
        assert_eq!(relative_paths(&first), vec!["a", "b", "b/x", "c", "d/e/f"]);
    }

    #[test]
    fn test_skips_vendor_and_hidden_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_manifest(root, ".", "module example.com/root\n");
        write_manifest(root, "vendor/example.com/dep", "module example.com/dep\n");
        write_manifest(root, ".git/modules/x", "module example.com/x\n");
        write_manifest(root, ".cache", "module example.com/cache\n");
        write_manifest(root, ".github/actions/tool", "module example.com/tool\n");
        write_manifest(root, "libs/vendor", "module example.com/vendored\n");

        let modules = discover(root);

        assert_eq!(relative_paths(&modules), vec![".", ".github/actions/tool"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_manifest_is_discovered_but_symlinked_dir_is_not() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_manifest(root, "real", "module example.com/real\n");
        std::fs::create_dir_all(root.join("linked")).unwrap();
        std::os::unix::fs::symlink(root.join("real/go.mod"), root.join("linked/go.mod")).unwrap();
        std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();

        let modules = discover(root);

        assert_eq!(relative_paths(&modules), vec!["linked", "real"]);
        assert_eq!(modules[0].identifier, "example.com/real");
    }

    #[test]
    fn test_exclude_globs_prune_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_manifest(root, "app", "module example.com/app\n");
        write_manifest(root, "testdata/fixture", "module example.com/fixture\n");

        let options = DiscoveryOptions {
            exclude_globs: vec!["testdata".to_string()],
            ..DiscoveryOptions::default()
        };
        let modules = discover_modules(root, &options).unwrap();

        assert_eq!(relative_paths(&modules), vec!["app"]);
    }

    #[test]
    fn test_invalid_exclude_glob_is_a_config_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let options = DiscoveryOptions {
            exclude_globs: vec!["[".to_string()],
            ..DiscoveryOptions::default()
        };
        let err = discover_modules(temp_dir.path(), &options).unwrap_err();
        assert!(matches!(err, OrbitError::Config(_)));
    }

    #[test]
    fn test_malformed_manifest_gets_synthetic_identifier() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_manifest(root, "good", "module example.com/good\n");
        write_manifest(root, "broken/inner", "go 1.22\n");
        write_manifest(root, "other", "module example.com/other\n");

        let modules = discover(root);

        assert_eq!(modules.len(), 3);
        let broken = &modules[0];
        assert_eq!(broken.relative_path, "broken/inner");
        assert_eq!(broken.identifier, "broken/inner");
        assert_eq!(broken.short_name, "inner");
        assert_eq!(modules[1].identifier, "example.com/good");
        assert_eq!(modules[2].identifier, "example.com/other");
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("does-not-exist");

        let err = discover_modules(&missing, &DiscoveryOptions::default()).unwrap_err();
        assert!(matches!(err, OrbitError::RootTraversal { .. }));
    }

    #[test]
    fn test_empty_workspace_has_no_modules() {
        let temp_dir = tempfile::tempdir().unwrap();
        std::fs::write(temp_dir.path().join("readme.txt"), "test").unwrap();

        assert!(discover(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_exclusion_filters_processed_set_only() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_manifest(root, ".", "module example.com/root\n");
        write_manifest(root, "magefiles", "module example.com/root/magefiles\n");
        write_manifest(root, "tools", "module example.com/root/tools\n");

        let discovered = discover(root);
        let exclusions = ExclusionSet::new(["magefiles"]);
        let processed = filter_excluded(&discovered, &exclusions, "tests");

        assert_eq!(discovered.len(), 3);
        assert!(discovered.iter().any(|m| m.short_name == "magefiles"));
        assert_eq!(relative_paths(&processed), vec![".", "tools"]);
    }

    #[test]
    fn test_blank_exclusion_names_are_ignored() {
        let exclusions = ExclusionSet::new(["", "  "]);
        assert!(exclusions.is_empty());
    }

    #[test]
    fn test_dependency_graph_from_redirects_and_requires() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_manifest(
            root,
            ".",
            "module example.com/root\n\nrequire example.com/lib v0.0.0\nreplace example.com/lib => ./lib\n",
        );
        write_manifest(
            root,
            "lib",
            "module example.com/lib\n\nreplace (\n\texample.com/util => ../util\n\texample.com/remote => example.com/fork v1.0.0\n)\n",
        );
        write_manifest(root, "util", "module example.com/util\n\nrequire example.com/util v0.0.0\n");

        let modules = discover(root);
        let graph = build_dependency_graph(&modules, &ManifestDialect::default());

        let edges: Vec<DependencyEdge> = graph.edges().collect();
        assert_eq!(
            edges,
            vec![
                DependencyEdge {
                    dependent: "example.com/lib".into(),
                    depends_on: "example.com/util".into(),
                },
                DependencyEdge {
                    dependent: "example.com/root".into(),
                    depends_on: "example.com/lib".into(),
                },
            ]
        );
        assert!(graph.dependencies_of("example.com/util").is_empty());
        assert!(graph.dependencies_of("example.com/unknown").is_empty());
    }

    #[test]
    fn test_no_edges_graph_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_manifest(root, "a", "module example.com/a\n\nrequire github.com/x/y v1.0.0\n");
        write_manifest(root, "b", "module example.com/b\n");

        let modules = discover(root);
        assert!(build_dependency_graph(&modules, &ManifestDialect::default()).is_empty());
    }

    #[test]
    fn test_cycle_detection_in_dependency_graph() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        write_manifest(root, "a", "module a\nreplace b => ../b\n");
        write_manifest(root, "b", "module b\nreplace a => ../a\n");
        write_manifest(root, "c", "module c\nrequire a v0.0.0\n");

        let modules = discover(root);
        let graph = build_dependency_graph(&modules, &ManifestDialect::default());
        let petgraph = graph.to_petgraph(&modules);

        assert_eq!(petgraph.node_count(), 3);
        assert_eq!(petgraph.edge_count(), 3);
        assert_eq!(find_cycles(&petgraph), vec![vec!["a".to_string(), "b".to_string()]]);
    }
}
