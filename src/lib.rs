//! Graphgen drives batch generation of rendered graph drawings.
//!
//! A graph repository holds source descriptions under `src/<type>/`, per-algorithm
//! ConTeXt templates under `templates/`, and a `repository.json` manifest binding
//! graph types to algorithms and layering parameter overrides. Graphgen resolves
//! the effective parameters for each (type, instance, algorithm) triple, skips
//! pairs whose outputs are already published, and drives the external `context`
//! compiler for the rest.
#![forbid(unsafe_code)]

pub mod compiler;
pub mod error;
pub mod manifest;
pub mod orchestrator;
pub mod resolve;
pub mod target;
pub mod template;

pub use compiler::{CompileJob, CompileStats, Compiler, ContextCompiler, is_context_on_path};
pub use error::{GraphgenError, GraphgenResult};
pub use manifest::{AlgorithmBinding, AlgorithmSpec, GraphTypeSpec, InstanceOverride, Manifest, ParamBag};
pub use orchestrator::{Orchestrator, RunConfig, clean};
pub use resolve::{ResolvedParameters, resolve};
pub use target::{BuildTarget, RepoLayout, escape_algorithm, needs_render};
pub use template::{RenderContext, TemplateExpander, load_template};
