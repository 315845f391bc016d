use crate::analysis::Analysis;
use crate::error::Result;
use crate::instrumenter::{InstrumentOptions, Instrumenter};
use clap::ValueEnum;
use std::path::Path;

/// Report formats of the inspect subcommand
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum InspectFormat {
    #[default]
    Json,
    Text,
}

/// Run the inspect subcommand: analyze without writing any artifact
pub fn inspect(input_path: &Path, format: InspectFormat) -> Result<()> {
    let instrumenter = Instrumenter::new(InstrumentOptions::default())?;
    let analysis = instrumenter.analyze_file(input_path)?;

    match format {
        InspectFormat::Text => print!("{}", render_text(&analysis)),
        InspectFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
    }
    Ok(())
}

/// Plain-text report of an analysis
pub fn render_text(analysis: &Analysis) -> String {
    let mut out = String::new();

    out.push_str("Scopes:\n");
    for frame in &analysis.scopes {
        out.push_str(&format!("  {:<30} {}\n", frame.name, frame.summary()));
    }

    out.push_str("\nTracking table:\n");
    for key in analysis.state_table.keys() {
        out.push_str(&format!("  {key}\n"));
    }

    out.push_str("\nUpdate sites:\n");
    for site in &analysis.update_sites {
        out.push_str(&format!("  {:<8} {}\n", site.location.key(), site.patch));
    }

    if !analysis.diagnostics.is_empty() {
        out.push_str("\nDiagnostics:\n");
        for diagnostic in &analysis.diagnostics {
            out.push_str(&format!("  {diagnostic}\n"));
        }
    }
    out
}
