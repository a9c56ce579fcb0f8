use ipid_core::error::IpidError;
use ipid_core::extraction::pdftotext::PdftotextExtractor;
use std::path::PathBuf;

use crate::commands::{load_table, parse_options};
use crate::output;
use crate::PipelineArgs;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    pipeline: &PipelineArgs,
) -> Result<(), IpidError> {
    let table = load_table(pipeline)?;
    let options = parse_options(pipeline);

    let pdf_bytes = std::fs::read(&pdf_file)?;
    let extractor = PdftotextExtractor::new().with_geometry(options.use_geometry);
    let parsed = ipid_core::parse_pdf(&pdf_bytes, &extractor, &table, &options)?;

    match output_file {
        Some(path) => {
            // Always write JSON when saving to file
            let json = serde_json::to_string_pretty(&parsed)?;
            std::fs::write(&path, json)?;
            eprintln!("Parsed {}, written to {}", pdf_file.display(), path.display());
            if parsed.is_empty() {
                eprintln!("  warning: no field was found");
            }
        }
        None => match output_format {
            "json" => output::json::print(&parsed)?,
            _ => output::table::print(&parsed),
        },
    }

    Ok(())
}
