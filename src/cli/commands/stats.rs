//! Stats command implementation.
//!
//! Displays aggregate statistics for a record log, or for a persisted
//! offset index when `--index` is given.

use crate::analytics::LogStats;
use crate::cli::{Cli, OutputFormat, StatsArgs};
use crate::error::Result;
use crate::index::{IndexStats, OffsetIndex};
use crate::parser::RecordReader;

/// Run the stats command.
pub fn run(cli: &Cli, args: &StatsArgs) -> Result<()> {
    if args.index {
        let index = OffsetIndex::load_file(&args.file)?;
        output_index_stats(cli, &index.stats())
    } else {
        let mut reader = RecordReader::open(&args.file)?;
        let stats = LogStats::collect(&mut reader)?;
        output_log_stats(cli, &stats)
    }
}

/// Output record-log aggregates.
fn output_log_stats(cli: &Cli, stats: &LogStats) -> Result<()> {
    match cli.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(stats)?);
        }
        OutputFormat::Text => {
            println!("Record Log Statistics");
            println!("=====================");
            println!();
            println!("Total Records: {}", stats.records);
            println!();
            println!("By Type:");
            println!(
                "  Messages:       {:>8} records, {:>8} items",
                stats.message_records, stats.messages
            );
            println!(
                "  Thread Replies: {:>8} records, {:>8} items",
                stats.thread_records, stats.thread_replies
            );
            println!(
                "  Files:          {:>8} records, {:>8} items",
                stats.file_records, stats.files
            );
            if stats.unknown_records > 0 {
                println!("  Unknown:        {:>8} records", stats.unknown_records);
            }
        }
    }

    Ok(())
}

/// Output index aggregates.
fn output_index_stats(cli: &Cli, stats: &IndexStats) -> Result<()> {
    match cli.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(stats)?);
        }
        OutputFormat::Text => {
            println!("Offset Index Statistics");
            println!("=======================");
            println!();
            println!("Keys:    {}", stats.keys);
            println!("Offsets: {}", stats.offsets);
            println!();
            println!("Key Classes:");
            println!("  Channels: {:>8}", stats.channels);
            println!("  Threads:  {:>8}", stats.threads);
            println!("  Files:    {:>8}", stats.files);
        }
    }

    Ok(())
}
