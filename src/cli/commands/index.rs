//! Index command implementation.
//!
//! Builds the offset index for a record log and persists it as a single
//! JSON object.

use std::io::Write;

use crate::cli::{Cli, IndexArgs};
use crate::error::{LensError, Result};
use crate::index::OffsetIndex;
use crate::parser::RecordReader;

/// Run the index command.
pub fn run(cli: &Cli, args: &IndexArgs) -> Result<()> {
    let mut reader = RecordReader::open(&args.file)?;
    let index = OffsetIndex::build(&mut reader)?;

    match &args.output_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .map_err(|e| LensError::io(format!("Failed to create {}", path.display()), e))?;
            index.to_writer(std::io::BufWriter::new(file))?;
            if !cli.quiet {
                let stats = index.stats();
                println!(
                    "Wrote {} ({} keys, {} offsets)",
                    path.display(),
                    stats.keys,
                    stats.offsets
                );
            }
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            index.to_writer(&mut handle)?;
            writeln!(handle).map_err(|e| LensError::io("Failed to write index", e))?;
        }
    }

    Ok(())
}
