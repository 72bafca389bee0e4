use std::fs;

use handlebars::Handlebars;
use serde_json::json;

use crate::{
    error::{GraphgenError, GraphgenResult},
    manifest::AlgorithmSpec,
    resolve::ResolvedParameters,
    target::RepoLayout,
};

/// Everything a template can reference while being expanded into a
/// compilable document.
#[derive(Debug)]
pub struct RenderContext<'a> {
    pub params: &'a ResolvedParameters,
    /// Raw source text of the graph instance, inlined verbatim.
    pub graph_code: &'a str,
    /// Basename of the graph instance.
    pub graph_name: &'a str,
    /// Benchmark identifier, the instance path.
    pub benchmark_id: &'a str,
    /// Path of the benchmark log the rendered document appends to.
    pub benchmark_log: &'a str,
}

/// Read the template source bound to an algorithm.
pub fn load_template(
    layout: &RepoLayout,
    algorithm: &str,
    spec: &AlgorithmSpec,
) -> GraphgenResult<String> {
    let template = spec
        .template
        .as_deref()
        .ok_or_else(|| GraphgenError::NoTemplateDefined(algorithm.to_string()))?;

    let path = layout.template_path(template);
    fs::read_to_string(&path).map_err(|_| GraphgenError::TemplateNotFound(path.display().to_string()))
}

/// Handlebars-backed template expansion.
///
/// Escaping is disabled: templates produce TeX, not HTML, so parameter values
/// and the inlined graph source must pass through untouched.
pub struct TemplateExpander {
    registry: Handlebars<'static>,
}

impl TemplateExpander {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    pub fn expand(&self, template_source: &str, ctx: &RenderContext<'_>) -> GraphgenResult<String> {
        let data = json!({
            "graph": ctx.params.graph,
            "algorithm": ctx.params.algorithm,
            "graph_code": ctx.graph_code,
            "graph_name": ctx.graph_name,
            "benchmark_id": ctx.benchmark_id,
            "benchmark_log": ctx.benchmark_log,
        });

        self.registry
            .render_template(template_source, &data)
            .map_err(|e| GraphgenError::template(e.to_string()))
    }
}

impl Default for TemplateExpander {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params() -> ResolvedParameters {
        let mut p = ResolvedParameters::default();
        p.graph.insert("scale".into(), json!(2.0));
        p.graph.insert("node distance".into(), json!("2cm"));
        p.algorithm.insert("iterations".into(), json!(10));
        p
    }

    #[test]
    fn expansion_substitutes_parameters_and_source() {
        let params = params();
        let ctx = RenderContext {
            params: &params,
            graph_code: "\\graph { a -> b };",
            graph_name: "a",
            benchmark_id: "src/flow/a",
            benchmark_log: "generated/benchmark-by-algorithm/dijkstra/flow/a-dijkstra.log",
        };

        let out = TemplateExpander::new()
            .expand(
                "scale={{graph.scale}} iter={{algorithm.iterations}}\n\
                 % {{graph_name}} ({{benchmark_id}}) -> {{benchmark_log}}\n\
                 {{graph_code}}",
                &ctx,
            )
            .unwrap();

        assert!(out.contains("scale=2.0"));
        assert!(out.contains("iter=10"));
        assert!(out.contains("% a (src/flow/a)"));
        assert!(out.contains("a-dijkstra.log"));
        // TeX backslashes survive unescaped.
        assert!(out.contains("\\graph { a -> b };"));
    }

    #[test]
    fn spaced_parameter_keys_are_reachable() {
        let params = params();
        let ctx = RenderContext {
            params: &params,
            graph_code: "",
            graph_name: "a",
            benchmark_id: "src/flow/a",
            benchmark_log: "a.log",
        };

        let out = TemplateExpander::new()
            .expand("{{lookup graph \"node distance\"}}", &ctx)
            .unwrap();
        assert_eq!(out, "2cm");
    }

    #[test]
    fn missing_template_reference_is_reported() {
        let layout = RepoLayout::new("repo-that-does-not-exist");

        let spec = AlgorithmSpec { template: None };
        assert!(matches!(
            load_template(&layout, "dijkstra", &spec),
            Err(GraphgenError::NoTemplateDefined(name)) if name == "dijkstra"
        ));

        let spec = AlgorithmSpec {
            template: Some("nope.tex".into()),
        };
        assert!(matches!(
            load_template(&layout, "dijkstra", &spec),
            Err(GraphgenError::TemplateNotFound(_))
        ));
    }
}
