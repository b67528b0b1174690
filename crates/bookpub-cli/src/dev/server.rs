//! Dev server process (the bundler's live-reloading server).

use bookpub_config::OutputType;

use crate::context::ProjectContext;
use crate::process::ProcessSpec;

/// Handle name used in logs.
pub const SERVER_NAME: &str = "dev-server";

/// `<bundler> --env outputType=<type> [--config <root>/webpack.config.js]`,
/// run from the project root. `None` when no bundler command is configured.
pub fn server_spec(ctx: &ProjectContext, output_type: OutputType) -> Option<ProcessSpec> {
    let mut spec = ProcessSpec::from_command_line(&ctx.bundler)?
        .named(SERVER_NAME)
        .args(["--env".to_string(), format!("outputType={output_type}")])
        .cwd(&ctx.root);

    if let Some(config) = ctx.webpack_config() {
        spec = spec.arg("--config").arg(config.to_string_lossy());
    }
    Some(spec)
}
