//! Rewrite command implementation.
//!
//! Points file URLs in exported JSON documents at a local attachment
//! server and reports what changed.

use crate::cli::{Cli, OutputFormat, RewriteArgs};
use crate::error::Result;
use crate::rewrite::UrlRewriter;

/// Run the rewrite command.
pub fn run(cli: &Cli, args: &RewriteArgs) -> Result<()> {
    let rewriter = UrlRewriter::new(&args.base_url).with_dry_run(args.dry_run);
    let stats = rewriter.run(&args.dir)?;

    match cli.output {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Text => {
            if cli.quiet {
                return Ok(());
            }
            println!("Rewrite Summary");
            println!("===============");
            println!();
            println!("Files found and processed: {}", stats.files_found);
            println!("Files not found:           {}", stats.files_not_found);
            println!("URLs replaced:             {}", stats.urls_replaced);
            println!("Documents updated:         {}", stats.documents_updated);

            if !stats.missing_names.is_empty() {
                println!();
                println!("Files not found ({}):", stats.missing_names.len());
                for name in &stats.missing_names {
                    println!("  - {name}");
                }
            }

            if args.dry_run {
                println!();
                println!("Dry run: no documents were written.");
            } else if stats.urls_replaced > 0 {
                println!();
                println!("All file URLs now point to {}", args.base_url);
            }
        }
    }

    Ok(())
}
