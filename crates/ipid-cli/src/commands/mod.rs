pub mod anchors;
pub mod parse;
pub mod serve;

use crate::PipelineArgs;
use ipid_core::anchors::{builtin, load_anchor_table, AnchorTable};
use ipid_core::error::IpidError;
use ipid_core::geometry::ReconstructOptions;
use ipid_core::ParseOptions;

/// Load the anchor table selected on the command line.
pub fn load_table(args: &PipelineArgs) -> Result<AnchorTable, IpidError> {
    let table = match &args.anchors {
        Some(path) => load_anchor_table(path)?,
        None => builtin::load_builtin()?,
    };
    tracing::info!(
        table = table.name(),
        version = table.version(),
        anchors = table.anchors().len(),
        "anchor table loaded"
    );
    Ok(table)
}

pub fn parse_options(args: &PipelineArgs) -> ParseOptions {
    ParseOptions {
        use_geometry: args.geometry,
        reconstruct: ReconstructOptions {
            line_tolerance: args.line_tolerance,
        },
    }
}
