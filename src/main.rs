use dragonc::cli::*;
use palc::Parser;

fn main() {
	let translator = dragonc::Translator;

	match Cli::parse().mode {
		Mode::File { path } => match translator.translate_file(&path) {
			Ok(code) => println!("{code}"),
			Err(e) => {
				eprintln!("Failed translate file: {e}");
				std::process::exit(1);
			}
		},
		Mode::Repl => translator.run_prompt(),
	}
}
