use std::path::{Path, PathBuf};

use clap::Parser;

/// Create an ARIBA database from a Panaroo pangenome
#[derive(Parser)]
#[command(name = "generate_ariba_db", author, version, about, long_about = None)]
pub struct Cli {
    /// Panaroo output directory (must contain gene_data.csv and final_graph.gml)
    #[arg(short, long, value_name = "DIR", help_heading = "Input/output")]
    directory: PathBuf,

    /// directory to write ariba_db.fa and ariba_meta.tsv to; created if missing
    #[arg(short = 'o', long = "out_dir", value_name = "DIR", help_heading = "Input/output")]
    out_dir: PathBuf,

    /// minimum number of genomes supporting a cluster for it to be included in the database
    #[arg(long = "min_support", value_name = "N", default_value_t = 1)]
    min_support: u32,

    /// suppress additional output
    #[arg(long, conflicts_with = "verbose")]
    quiet: bool,

    /// print more progress output (-vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    pub fn get_input(&self) -> (&Path, u32) {
        (&self.directory, self.min_support)
    }

    pub fn get_output(&self) -> &Path {
        &self.out_dir
    }

    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
