//! Graph command implementation.
//!
//! Renders a record log as a Graphviz digraph on standard output.

use crate::cli::{Cli, GraphArgs};
use crate::error::Result;
use crate::graph::DotExporter;
use crate::parser::RecordReader;

/// Run the graph command.
pub fn run(_cli: &Cli, args: &GraphArgs) -> Result<()> {
    let mut reader = RecordReader::open(&args.file)?;
    let exporter = DotExporter::new().with_graph_name(&args.name);

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    exporter.write_dot(&mut reader, &mut handle)
}
