pub mod context;
pub mod file;
pub mod plan;
pub mod strict;
pub mod walker;

pub use context::{build_context, build_render_context, context_from_document};
pub use file::{render_str, render_template};
pub use plan::{
    execute_plan, plan_templates, Destination, PlannedFile, RenderPlan, TemplateFailure,
    WriteOutcome,
};
pub use walker::{destination_path, discover_templates, Discovery, DEFAULT_TEMPLATE_SUFFIX};
