use crate::error::Result;
use crate::instrumenter::{ArtifactPaths, InstrumentOptions, Instrumenter};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

/// Arguments for the instrument command
#[derive(Debug, Clone)]
pub struct InstrumentArgs {
    pub inputs: Vec<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub table_identifier: String,
}

impl InstrumentArgs {
    /// Convert to InstrumentOptions
    pub fn to_options(&self) -> InstrumentOptions {
        InstrumentOptions {
            table_identifier: self.table_identifier.clone(),
            ..Default::default()
        }
    }
}

/// Run the instrument subcommand
///
/// Each input gets its own traversal, so files are processed in parallel.
/// Nothing is reported until every file is done; the first failure wins.
pub fn instrument(args: &InstrumentArgs) -> Result<()> {
    let instrumenter = Instrumenter::new(args.to_options())?;

    let results: Vec<Result<(&PathBuf, ArtifactPaths)>> = args
        .inputs
        .par_iter()
        .map(|input| {
            let out_dir = match &args.out_dir {
                Some(dir) => dir.as_path(),
                None => input.parent().unwrap_or(Path::new(".")),
            };
            instrumenter
                .instrument_file(input, out_dir)
                .map(|paths| (input, paths))
        })
        .collect();

    for (input, paths) in results.into_iter().collect::<Result<Vec<_>>>()? {
        println!(
            "Instrumented {} -> {}",
            input.display(),
            paths.instrumented.display()
        );
    }

    Ok(())
}
