use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    compiler::{CompileJob, Compiler},
    error::{GraphgenError, GraphgenResult},
    manifest::Manifest,
    resolve::resolve,
    target::{BuildTarget, RepoLayout, needs_render},
    template::{RenderContext, TemplateExpander, load_template},
};

/// Run-wide options, resolved from the command line once and passed in
/// explicitly at construction.
#[derive(Debug, Clone, Default)]
pub struct RunConfig {
    /// Graph types to render; instances are discovered under `src/<type>/`.
    pub types: Vec<String>,
    /// Explicitly selected graph source files, rendered after the type sweep.
    pub graph_files: Vec<PathBuf>,
    /// Algorithm filter; empty selects every algorithm bound to a type.
    pub algorithms: Vec<String>,
    /// Re-render even when all destinations are already populated.
    pub regenerate: bool,
    /// Echo the compiler log stream.
    pub verbose: bool,
    /// Pass the non-interactive switch to the compiler.
    pub batch: bool,
}

/// Sequences the batch: for each selected (type, instance, algorithm) triple,
/// parameter resolution, the render-or-skip decision, and conditionally
/// template expansion, external compile, and multi-destination publish.
///
/// Execution is strictly sequential; every filesystem or template error is
/// fatal for the whole run. Only "no algorithms selected" and "already
/// generated" are reported skip conditions.
pub struct Orchestrator<'a> {
    manifest: &'a Manifest,
    layout: RepoLayout,
    config: RunConfig,
    expander: TemplateExpander,
}

impl<'a> Orchestrator<'a> {
    pub fn new(manifest: &'a Manifest, layout: RepoLayout, config: RunConfig) -> Self {
        Self {
            manifest,
            layout,
            config,
            expander: TemplateExpander::new(),
        }
    }

    /// Run the full batch: the selected graph types first, then explicitly
    /// named graph files.
    pub fn run(&self, compiler: &mut dyn Compiler) -> GraphgenResult<()> {
        for graph_type in &self.config.types {
            println!("Drawing {graph_type}");
            println!();

            for (path, name) in self.discover_instances(graph_type)? {
                self.generate(compiler, graph_type, &path, &name)?;
                println!();
            }
        }

        if !self.config.graph_files.is_empty() {
            println!("Drawing selected graphs");
            println!();

            for file in &self.config.graph_files {
                let (graph_type, name) = split_graph_path(file)?;
                self.generate(compiler, &graph_type, file, &name)?;
                println!();
            }
        }

        Ok(())
    }

    /// Sorted graph instances under the type's source directory. A type
    /// without a source directory has no instances.
    fn discover_instances(&self, graph_type: &str) -> GraphgenResult<Vec<(PathBuf, String)>> {
        let dir = self.layout.type_sources_dir(graph_type);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(anyhow::Error::new(e)
                    .context(format!("list graph sources '{}'", dir.display()))
                    .into());
            }
        };

        let mut instances = Vec::new();
        for entry in entries {
            let entry =
                entry.with_context(|| format!("list graph sources '{}'", dir.display()))?;
            let path = entry.path();
            if path.is_file() {
                let name = entry.file_name().to_string_lossy().into_owned();
                instances.push((path, name));
            }
        }
        instances.sort();
        Ok(instances)
    }

    fn generate(
        &self,
        compiler: &mut dyn Compiler,
        graph_type: &str,
        graph_path: &Path,
        graph_name: &str,
    ) -> GraphgenResult<()> {
        println!("  Graph {graph_type}/{graph_name}");

        let spec = self.manifest.graph_type(graph_type)?;

        let selected: Vec<&str> = spec
            .algorithms
            .keys()
            .map(String::as_str)
            .filter(|name| {
                self.config.algorithms.is_empty()
                    || self.config.algorithms.iter().any(|a| a == name)
            })
            .collect();

        if selected.is_empty() {
            println!("    No algorithms selected");
            return Ok(());
        }

        for algorithm in selected {
            println!("    Algorithm {algorithm}");
            self.render_one(compiler, graph_type, graph_path, graph_name, algorithm)?;
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, compiler, graph_path))]
    fn render_one(
        &self,
        compiler: &mut dyn Compiler,
        graph_type: &str,
        graph_path: &Path,
        graph_name: &str,
        algorithm: &str,
    ) -> GraphgenResult<()> {
        let params = resolve(self.manifest, graph_type, graph_name, algorithm)?;
        let target = BuildTarget::new(&self.layout, graph_type, graph_name, algorithm);

        if !needs_render(&target, self.config.regenerate) {
            println!("      Already generated");
            return Ok(());
        }

        let algorithm_spec = self.manifest.algorithm(algorithm)?;
        let template_source = load_template(&self.layout, algorithm, algorithm_spec)?;

        let graph_code = fs::read_to_string(graph_path)
            .with_context(|| format!("read graph source '{}'", graph_path.display()))?;

        let document = self.expander.expand(
            &template_source,
            &RenderContext {
                params: &params,
                graph_code: &graph_code,
                graph_name,
                benchmark_id: &graph_path.display().to_string(),
                benchmark_log: &target.benchmark_log.display().to_string(),
            },
        )?;

        fs::create_dir_all(&target.tmp_dir).with_context(|| {
            format!("create temporary directory '{}'", target.tmp_dir.display())
        })?;
        fs::write(&target.tmp_source, document).with_context(|| {
            format!("write temporary file '{}'", target.tmp_source.display())
        })?;

        fs::create_dir_all(&target.benchmark_dir).with_context(|| {
            format!(
                "create benchmark directory '{}'",
                target.benchmark_dir.display()
            )
        })?;
        // Truncate so the benchmark code in the rendered document appends into
        // a fresh log.
        fs::write(&target.benchmark_log, "").with_context(|| {
            format!("clear benchmark log '{}'", target.benchmark_log.display())
        })?;

        let job = CompileJob {
            workdir: target.tmp_dir.clone(),
            source_file: target.source_file_name(),
            batch: self.config.batch,
        };

        let verbose = self.config.verbose;
        let stats = compiler.compile(&job, &mut |line| {
            if verbose {
                println!("{line}");
            }
        })?;

        println!("      Runtime: {:.4} seconds", stats.elapsed.as_secs_f64());

        for dest in &target.destinations {
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create build directory '{}'", parent.display()))?;
            }
            fs::copy(&target.tmp_artifact, dest).with_context(|| {
                format!(
                    "copy '{}' to '{}'",
                    target.tmp_artifact.display(),
                    dest.display()
                )
            })?;
        }

        Ok(())
    }
}

/// Remove the temporary and generated output trees. Idempotent: directories
/// that do not exist are treated as already clean.
pub fn clean(layout: &RepoLayout) -> GraphgenResult<()> {
    println!("Cleaning up");
    println!();

    for dir in [layout.tmp_dir(), layout.generated_dir()] {
        println!("  Deleting {}", dir.display());
        if dir.is_dir() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("delete directory '{}'", dir.display()))?;
        }
    }

    println!();
    Ok(())
}

/// Derive (type, instance name) for an explicitly selected graph file: the
/// parent directory names the type, the basename names the instance.
fn split_graph_path(path: &Path) -> GraphgenResult<(String, String)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            GraphgenError::Other(anyhow::anyhow!(
                "graph file '{}' has no file name",
                path.display()
            ))
        })?;

    let graph_type = path
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            GraphgenError::Other(anyhow::anyhow!(
                "graph file '{}' has no parent directory naming its type",
                path.display()
            ))
        })?;

    Ok((graph_type, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_paths_split_into_type_and_instance() {
        let (graph_type, name) = split_graph_path(Path::new("src/flow/a")).unwrap();
        assert_eq!(graph_type, "flow");
        assert_eq!(name, "a");

        assert!(split_graph_path(Path::new("/")).is_err());
    }
}
