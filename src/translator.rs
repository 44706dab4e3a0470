use std::{
	fs::read_to_string,
	io::{BufRead, Write},
	path::Path,
};

use anyhow::Context;

use crate::{DragonError, parser::Parser, scanner::Scanner};

/// Translator is the entry point from source text to three-address code.
pub struct Translator;

impl Translator {
	/// Translate one program, each call numbers its labels and temporaries from 1.
	pub fn translate(&self, source: &str) -> Result<String, DragonError> {
		let tokens = Scanner::new(source).scan_tokens()?;
		log::debug!("translating {} tokens", tokens.len());
		Ok(Parser::new(tokens).program()?)
	}

	pub fn translate_file<P: AsRef<Path>>(&self, path: P) -> Result<String, DragonError> {
		let path = path.as_ref();
		let source = read_to_string(path).with_context(|| format!("Failed open source file {}", path.display()))?;
		self.translate(&source)
	}

	/// Run the REPL prompt on the terminal.
	pub fn run_prompt(&self) {
		let stdin = std::io::stdin().lock();
		if let Err(e) = self.run_session(stdin, std::io::stdout(), std::io::stderr()) {
			eprintln!("Failed run prompt: {e}");
		}
		println!("Exited dragonc repl");
	}

	/// Translate one program per input line until end of input. A rejected
	/// program is reported on `errors` with its input line number and the
	/// session carries on.
	pub fn run_session(
		&self,
		mut input: impl BufRead,
		mut output: impl Write,
		mut errors: impl Write,
	) -> Result<(), DragonError> {
		let mut line = String::new();
		for number in 1usize.. {
			write!(output, "> ").and_then(|_| output.flush()).context("Failed write prompt")?;
			line.clear();
			if input.read_line(&mut line).context("Failed read line")? == 0 {
				writeln!(output).context("Failed write output")?;
				break;
			}
			let source = line.trim();
			if source.is_empty() {
				continue;
			}
			match self.translate(source) {
				Ok(code) => writeln!(output, "{code}").context("Failed write output")?,
				Err(e) => writeln!(errors, "input line {number}: {e}").context("Failed write error")?,
			}
		}
		Ok(())
	}
}
