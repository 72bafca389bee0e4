use std::path::{Path, PathBuf};

/// Filesystem layout of a graph repository checkout. All working paths are
/// derived from the repository root.
#[derive(Debug, Clone)]
pub struct RepoLayout {
    root: PathBuf,
}

impl RepoLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sources_dir(&self) -> PathBuf {
        self.root.join("src")
    }

    pub fn type_sources_dir(&self, graph_type: &str) -> PathBuf {
        self.sources_dir().join(graph_type)
    }

    pub fn templates_dir(&self) -> PathBuf {
        self.root.join("templates")
    }

    pub fn template_path(&self, template: &str) -> PathBuf {
        self.templates_dir().join(template)
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join("tmp")
    }

    pub fn generated_dir(&self) -> PathBuf {
        self.root.join("generated")
    }
}

/// Escape an algorithm name for use in file and directory names.
pub fn escape_algorithm(name: &str) -> String {
    name.replace(' ', "-")
}

/// Output locations for one (graph instance, algorithm) pair: the publish
/// destinations, the canonical temporary render paths, and the benchmark log.
///
/// Constructed fresh per render attempt. Destination directories persist
/// across runs; the temporary artifact is overwritten on every executed
/// render.
#[derive(Debug, Clone)]
pub struct BuildTarget {
    /// Publish destinations. The artifact must exist at every one of them for
    /// the pair to count as already built.
    pub destinations: Vec<PathBuf>,

    /// Per-type working directory the compiler runs in.
    pub tmp_dir: PathBuf,

    /// Expanded document, `<instance>_<algorithm>.tex` inside `tmp_dir`.
    pub tmp_source: PathBuf,

    /// Artifact the compiler leaves next to the source.
    pub tmp_artifact: PathBuf,

    pub benchmark_dir: PathBuf,
    pub benchmark_log: PathBuf,
}

impl BuildTarget {
    pub fn new(layout: &RepoLayout, graph_type: &str, graph_name: &str, algorithm: &str) -> Self {
        let escaped = escape_algorithm(algorithm);
        let stem = format!("{graph_name}_{escaped}");
        let artifact = format!("{stem}.pdf");

        let tmp_dir = layout.tmp_dir().join(graph_type);
        let generated = layout.generated_dir();

        let benchmark_dir = generated
            .join("benchmark-by-algorithm")
            .join(&escaped)
            .join(graph_type);

        Self {
            destinations: vec![
                generated
                    .join("by-algorithm")
                    .join(&escaped)
                    .join(graph_type)
                    .join(&artifact),
                generated
                    .join("by-type")
                    .join(graph_type)
                    .join(&escaped)
                    .join(&artifact),
            ],
            tmp_source: tmp_dir.join(format!("{stem}.tex")),
            tmp_artifact: tmp_dir.join(&artifact),
            benchmark_log: benchmark_dir.join(format!("{graph_name}-{escaped}.log")),
            benchmark_dir,
            tmp_dir,
        }
    }

    /// File name of the expanded document within `tmp_dir`.
    pub fn source_file_name(&self) -> String {
        self.tmp_source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Decide whether a render must occur for this target.
///
/// A render is required when regeneration was requested, or when any publish
/// destination is missing its artifact. Destinations are independent views of
/// the same artifact and the render step is all-or-nothing, so a partially
/// published pair triggers a full re-render.
pub fn needs_render(target: &BuildTarget, regenerate: bool) -> bool {
    regenerate || target.destinations.iter().any(|dest| !dest.exists())
}
