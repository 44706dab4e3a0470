use std::fmt;

use crate::types::Type;

/// A token produced by the scanner
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
	pub r#type: TokenType,
	/// Line the scanner had reached when the token ended.
	pub line:   usize,
}

impl Token {
	pub fn new(r#type: TokenType, line: usize) -> Self { Self { r#type, line } }

	pub fn tag(&self) -> Tag { self.r#type.tag() }
}

/// The dispatch key the parser matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
	/// Single character operator or punctuation.
	Char(char),
	And,
	Or,
	Eq,
	Ne,
	Le,
	Ge,
	/// Unary negation.
	Minus,
	Id,
	Num,
	Real,
	True,
	False,
	/// Base type keyword.
	Basic,
	If,
	Else,
	While,
	Do,
	Break,
	/// Internal marker for indexed access, never produced by the scanner.
	Index,
	/// Internal marker for compiler temporaries, never produced by the scanner.
	Temp,
	Eof,
}

/// A word: reserved word, operator word, or identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Word {
	pub lexeme: String,
	pub tag:    Tag,
}

impl Word {
	pub fn new(lexeme: impl Into<String>, tag: Tag) -> Self { Self { lexeme: lexeme.into(), tag } }

	pub fn and() -> Self { Self::new("&&", Tag::And) }

	pub fn or() -> Self { Self::new("||", Tag::Or) }

	pub fn eq() -> Self { Self::new("==", Tag::Eq) }

	pub fn ne() -> Self { Self::new("!=", Tag::Ne) }

	pub fn le() -> Self { Self::new("<=", Tag::Le) }

	pub fn ge() -> Self { Self::new(">=", Tag::Ge) }

	pub fn minus() -> Self { Self::new("minus", Tag::Minus) }

	pub fn r#true() -> Self { Self::new("true", Tag::True) }

	pub fn r#false() -> Self { Self::new("false", Tag::False) }

	pub fn temp() -> Self { Self::new("t", Tag::Temp) }

	pub fn index() -> Self { Self::new("[]", Tag::Index) }

	/// Reserved words are words whose lexeme the scanner never hands out as an
	/// identifier.
	pub fn reserved(lexeme: &str) -> Option<TokenType> {
		let tag = match lexeme {
			"if" => Tag::If,
			"else" => Tag::Else,
			"while" => Tag::While,
			"do" => Tag::Do,
			"break" => Tag::Break,
			"true" => Tag::True,
			"false" => Tag::False,
			_ => return Type::basic(lexeme).map(TokenType::Basic),
		};
		Some(TokenType::Word(Word::new(lexeme, tag)))
	}
}

/// The different kinds of tokens, the copying is lightweight except for words.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
	Char(char),
	/// Integer literal.
	Num(i64),
	/// Floating point literal.
	Real(f64),
	Word(Word),
	/// Base type keyword carrying the type it names.
	Basic(Type),
	/// End of input.
	Eof,
}

impl TokenType {
	pub fn tag(&self) -> Tag {
		match self {
			TokenType::Char(c) => Tag::Char(*c),
			TokenType::Num(_) => Tag::Num,
			TokenType::Real(_) => Tag::Real,
			TokenType::Word(word) => word.tag,
			TokenType::Basic(_) => Tag::Basic,
			TokenType::Eof => Tag::Eof,
		}
	}

	pub fn keyword_or_identifier(value: &str) -> Self {
		Word::reserved(value).unwrap_or_else(|| TokenType::Word(Word::new(value, Tag::Id)))
	}
}

impl From<Word> for TokenType {
	fn from(word: Word) -> Self { TokenType::Word(word) }
}

impl fmt::Display for TokenType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TokenType::Char(c) => write!(f, "{c}"),
			TokenType::Num(n) => write!(f, "{n}"),
			TokenType::Real(r) => write!(f, "{r}"),
			TokenType::Word(word) => write!(f, "{}", word.lexeme),
			TokenType::Basic(basic) => write!(f, "{basic}"),
			TokenType::Eof => write!(f, "end of input"),
		}
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.r#type) }
}
