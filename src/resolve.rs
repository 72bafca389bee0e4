use crate::{
    error::{GraphgenError, GraphgenResult},
    manifest::{Manifest, ParamBag},
};

/// Final merged parameters for one (graph type, graph instance, algorithm)
/// triple. Produced fresh per render attempt and discarded afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParameters {
    pub graph: ParamBag,
    pub algorithm: ParamBag,
}

fn merge_into(dst: &mut ParamBag, src: &ParamBag) {
    for (key, value) in src {
        dst.insert(key.clone(), value.clone());
    }
}

/// Compute the effective parameters by applying the four cascade layers in
/// order of increasing specificity. Each layer merges shallowly into the
/// accumulator: new keys are added, existing keys overwritten, so the most
/// specific override always wins.
///
/// Pure function over the manifest; no side effects.
#[tracing::instrument(skip(manifest))]
pub fn resolve(
    manifest: &Manifest,
    graph_type: &str,
    graph_name: &str,
    algorithm: &str,
) -> GraphgenResult<ResolvedParameters> {
    let spec = manifest.graph_type(graph_type)?;
    let binding = spec
        .algorithms
        .get(algorithm)
        .ok_or_else(|| GraphgenError::unknown_algorithm(algorithm))?;

    let mut params = ResolvedParameters::default();

    // Layer 1: graph-type globals.
    merge_into(&mut params.graph, &spec.global_parameters);

    // Layer 2: type-level per-instance override, `graph` sub-bag only.
    if let Some(inst) = spec.graph_parameters.get(graph_name) {
        merge_into(&mut params.graph, &inst.graph);
    }

    // Layer 3: binding-level parameters, not instance-specific.
    merge_into(&mut params.graph, &binding.parameters.graph);
    merge_into(&mut params.algorithm, &binding.parameters.algorithm);

    // Layer 4: binding per-instance override, most specific. A binding without
    // the table at all is a manifest defect, not an empty override set.
    let per_instance = binding.graph_parameters.as_ref().ok_or_else(|| {
        GraphgenError::malformed_binding(format!(
            "algorithm '{algorithm}' under graph type '{graph_type}' has no 'graph parameters' table"
        ))
    })?;
    if let Some(inst) = per_instance.get(graph_name) {
        merge_into(&mut params.graph, &inst.graph);
        merge_into(&mut params.algorithm, &inst.algorithm);
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn manifest() -> Manifest {
        serde_json::from_value(json!({
            "graphs": {
                "flow": {
                    "global parameters": { "scale": 1.0, "node distance": "2cm" },
                    "graph parameters": {
                        "a": { "graph": { "scale": 2.0 } }
                    },
                    "algorithms": {
                        "dijkstra": {
                            "graph parameters": {}
                        },
                        "layered": {
                            "parameters": {
                                "graph": { "scale": 3.0 },
                                "algorithm": { "iterations": 10 }
                            },
                            "graph parameters": {
                                "a": {
                                    "graph": { "scale": 4.0 },
                                    "algorithm": { "iterations": 20 }
                                }
                            }
                        }
                    }
                }
            },
            "algorithms": {
                "dijkstra": { "template": "shortest-path.tex" },
                "layered": { "template": "layered.tex" }
            }
        }))
        .unwrap()
    }

    #[test]
    fn per_instance_override_beats_globals() {
        let m = manifest();

        let a = resolve(&m, "flow", "a", "dijkstra").unwrap();
        assert_eq!(a.graph["scale"], json!(2.0));
        assert_eq!(a.graph["node distance"], json!("2cm"));
        assert!(a.algorithm.is_empty());

        // Any other instance of the same type keeps the global value.
        let b = resolve(&m, "flow", "b", "dijkstra").unwrap();
        assert_eq!(b.graph["scale"], json!(1.0));
    }

    #[test]
    fn most_specific_layer_wins() {
        let m = manifest();

        // `scale` is set at all four layers for (flow, a, layered); layer 4
        // must win for both sub-bags.
        let a = resolve(&m, "flow", "a", "layered").unwrap();
        assert_eq!(a.graph["scale"], json!(4.0));
        assert_eq!(a.algorithm["iterations"], json!(20));

        // Without a per-instance entry, the binding-level layer wins.
        let b = resolve(&m, "flow", "b", "layered").unwrap();
        assert_eq!(b.graph["scale"], json!(3.0));
        assert_eq!(b.algorithm["iterations"], json!(10));
    }

    #[test]
    fn resolution_is_deterministic() {
        let m = manifest();
        let once = resolve(&m, "flow", "a", "layered").unwrap();
        let twice = resolve(&m, "flow", "a", "layered").unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn missing_per_instance_table_is_a_malformed_binding() {
        let m: Manifest = serde_json::from_value(json!({
            "graphs": {
                "flow": {
                    "algorithms": { "dijkstra": {} }
                }
            },
            "algorithms": {
                "dijkstra": { "template": "shortest-path.tex" }
            }
        }))
        .unwrap();

        assert!(matches!(
            resolve(&m, "flow", "a", "dijkstra"),
            Err(GraphgenError::MalformedBinding(_))
        ));
    }

    #[test]
    fn unknown_names_propagate() {
        let m = manifest();
        assert!(matches!(
            resolve(&m, "tree", "a", "dijkstra"),
            Err(GraphgenError::UnknownGraphType(_))
        ));
        assert!(matches!(
            resolve(&m, "flow", "a", "a*"),
            Err(GraphgenError::UnknownAlgorithm(_))
        ));
    }
}
