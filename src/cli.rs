use std::path::PathBuf;

use palc::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dragonc", after_long_help = "Translates a small structured language into three-address code.")]
pub struct Cli {
	#[command(subcommand)]
	pub mode: Mode,
}

#[derive(Subcommand, Debug)]
pub enum Mode {
	/// Translate a source file
	File { path: PathBuf },
	/// Translate programs typed at the prompt, one per line
	Repl,
}
