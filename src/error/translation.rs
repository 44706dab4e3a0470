/// The single error a translation can fail with. It aborts the whole
/// translation, there is no recovery.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("{}{type}", display_line(.line))]
pub struct TranslationError {
	/// Source line the scanner had reached, when known.
	pub line:   Option<usize>,
	pub r#type: TranslationErrorType,
}

fn display_line(line: &Option<usize>) -> String { line.map(|line| format!("near line {line}: ")).unwrap_or_default() }

impl TranslationError {
	pub fn new(r#type: TranslationErrorType) -> Self { Self { line: None, r#type } }

	pub fn at(line: usize, r#type: TranslationErrorType) -> Self { Self { line: Some(line), r#type } }

	pub fn type_error(context: impl Into<String>) -> Self { Self::new(TranslationErrorType::TypeError(context.into())) }

	/// Attach a line unless one is already known.
	pub fn or_line(mut self, line: usize) -> Self {
		self.line.get_or_insert(line);
		self
	}
}

#[derive(Debug, Clone, PartialEq)]
pub enum TranslationErrorType {
	/// The token sequence does not match the grammar.
	SyntaxError { found: String },
	Undeclared(String),
	TypeError(String),
	/// Indexing applied to an identifier with too few dimensions.
	NotAnArray(String),
	UnenclosedBreak,
	InvalidLiteral(String),
	/// A declared type or storage layout whose size overflows.
	TypeTooLarge(String),
	/// A `break` was generated before its loop recorded an exit label.
	UnresolvedBreakTarget,
}

impl std::fmt::Display for TranslationErrorType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use TranslationErrorType::*;
		match self {
			SyntaxError { found } => {
				write!(f, "Syntax error at '{found}'")
			}
			Undeclared(name) => {
				write!(f, "{name} undeclared")
			}
			TypeError(context) => {
				write!(f, "Type error: {context}")
			}
			NotAnArray(name) => {
				write!(f, "{name} is not an array")
			}
			UnenclosedBreak => {
				write!(f, "Unenclosed break")
			}
			InvalidLiteral(text) => {
				write!(f, "Invalid numeric literal '{text}'")
			}
			TypeTooLarge(context) => {
				write!(f, "Type too large: {context}")
			}
			UnresolvedBreakTarget => {
				write!(f, "Break target has no exit label")
			}
		}
	}
}
