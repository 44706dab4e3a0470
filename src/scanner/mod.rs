//! Turns source text into the token stream the parser pulls from.
//!
//! Scanning is longest match: `&&`, `||`, `==`, `!=`, `<=` and `>=` win over
//! their single character prefixes, a run of digits is an integer unless a
//! `.` follows, and a run of letters, digits and underscores is an identifier
//! unless it is a reserved word. Every other character comes out as a
//! [`TokenType::Char`] and it is up to the parser to reject it.
mod token;

use std::{iter::Peekable, str::CharIndices};

pub use token::*;

use crate::error::{TranslationError, TranslationErrorType};

/// A scanner for source code
pub struct Scanner<'a> {
	/// Program text being scanned
	source:      &'a str,
	/// Characters of `source` with their byte offsets
	source_iter: Peekable<CharIndices<'a>>,
	/// Byte offset where the current lexeme starts
	start:       usize,
	/// Byte offset just past the last consumed character
	cursor:      usize,
	/// Tracks what source line `cursor` is on so tokens and errors know their
	/// location.
	line:        usize,
}

impl<'a> Scanner<'a> {
	pub fn new(source: &'a str) -> Self {
		let source_iter = source.char_indices().peekable();

		Self { source, source_iter, start: 0, cursor: 0, line: 1 }
	}

	/// Scan all tokens from the source code, the last one is always `Eof`.
	pub fn scan_tokens(mut self) -> Result<Vec<Token>, TranslationError> {
		let mut tokens = Vec::new();
		while let Some(&(index, _)) = self.source_iter.peek() {
			self.start = index;
			self.cursor = self.start;
			if let Some(r#type) = self.scan_token()? {
				tokens.push(Token::new(r#type, self.line));
			}
		}
		tokens.push(Token::new(TokenType::Eof, self.line));
		log::trace!("scanned {} tokens over {} lines", tokens.len(), self.line);
		Ok(tokens)
	}

	/// Scan a single token, `None` for whitespace and comments.
	fn scan_token(&mut self) -> Result<Option<TokenType>, TranslationError> {
		let Some(next_char) = self.advance() else { return Ok(None) };
		#[rustfmt::skip]
		let r#type = match next_char {
			' ' | '\r' | '\t' => return Ok(None),
			'\n' => { self.line += 1; return Ok(None) }
			'/' if self.peek() == Some('/') => {
				while self.peek().is_some_and(|c| c != '\n') { self.advance(); }
				return Ok(None);
			}
			'&' => if self.match_next('&') { Word::and().into() } else { TokenType::Char('&') },
			'|' => if self.match_next('|') { Word::or().into() } else { TokenType::Char('|') },
			'=' => if self.match_next('=') { Word::eq().into() } else { TokenType::Char('=') },
			'!' => if self.match_next('=') { Word::ne().into() } else { TokenType::Char('!') },
			'<' => if self.match_next('=') { Word::le().into() } else { TokenType::Char('<') },
			'>' => if self.match_next('=') { Word::ge().into() } else { TokenType::Char('>') },
			c if c.is_ascii_digit() => self.number()?,
			c if c.is_alphabetic() => self.identifier(),
			c => TokenType::Char(c),
		};
		Ok(Some(r#type))
	}

	/// Consume the next character only when it is `expected`
	fn match_next(&mut self, expected: char) -> bool {
		matches!(self.peek(), Some(c) if c == expected && { self.advance(); true })
	}

	/// Consume one character
	fn advance(&mut self) -> Option<char> {
		let (i, c) = self.source_iter.next()?;
		self.cursor = i + c.len_utf8();
		Some(c)
	}

	fn peek(&mut self) -> Option<char> { self.source_iter.peek().map(|&(_, c)| c) }

	/// Scan a number literal, a trailing `.` makes it real even without
	/// fractional digits.
	fn number(&mut self) -> Result<TokenType, TranslationError> {
		while self.peek().is_some_and(|c| c.is_ascii_digit()) {
			self.advance();
		}

		let is_real = self.match_next('.');
		if is_real {
			while self.peek().is_some_and(|c| c.is_ascii_digit()) {
				self.advance();
			}
		}

		let text = &self.source[self.start..self.cursor];
		let invalid = || TranslationError::at(self.line, TranslationErrorType::InvalidLiteral(text.to_string()));
		if is_real {
			text.trim_end_matches('.').parse().map(TokenType::Real).map_err(|_| invalid())
		} else {
			text.parse().map(TokenType::Num).map_err(|_| invalid())
		}
	}

	/// Identifiers, reserved words and base type names
	fn identifier(&mut self) -> TokenType {
		while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
			self.advance();
		}
		let text = &self.source[self.start..self.cursor];
		TokenType::keyword_or_identifier(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::Type;

	fn scan(input: &str) -> Vec<TokenType> {
		let tokens = Scanner::new(input).scan_tokens().unwrap();
		tokens.into_iter().map(|token| token.r#type).collect()
	}

	fn tags(input: &str) -> Vec<Tag> { scan(input).iter().map(TokenType::tag).collect() }

	fn id(name: &str) -> TokenType { Word::new(name, Tag::Id).into() }

	#[test]
	fn scan_operators() {
		assert_eq!(tags("&"), [Tag::Char('&'), Tag::Eof]);
		assert_eq!(tags("&&"), [Tag::And, Tag::Eof]);
		assert_eq!(tags("|"), [Tag::Char('|'), Tag::Eof]);
		assert_eq!(tags("||"), [Tag::Or, Tag::Eof]);
		assert_eq!(tags("!"), [Tag::Char('!'), Tag::Eof]);
		assert_eq!(tags("!="), [Tag::Ne, Tag::Eof]);
		assert_eq!(tags("<"), [Tag::Char('<'), Tag::Eof]);
		assert_eq!(tags("<="), [Tag::Le, Tag::Eof]);
		assert_eq!(tags(">"), [Tag::Char('>'), Tag::Eof]);
		assert_eq!(tags(">="), [Tag::Ge, Tag::Eof]);
		assert_eq!(tags("= =="), [Tag::Char('='), Tag::Eq, Tag::Eof]);
		assert_eq!(tags("a<=b"), [Tag::Id, Tag::Le, Tag::Id, Tag::Eof]);
	}

	#[test]
	fn scan_numbers() {
		assert_eq!(scan("1982"), [TokenType::Num(1982), TokenType::Eof]);
		assert_eq!(scan("1981.2981"), [TokenType::Real(1981.2981), TokenType::Eof]);
		assert_eq!(scan("3."), [TokenType::Real(3.0), TokenType::Eof]);
		assert_eq!(scan("0.5"), [TokenType::Real(0.5), TokenType::Eof]);
	}

	#[test]
	fn scan_overflowing_number() {
		let error = Scanner::new("99999999999999999999").scan_tokens().unwrap_err();
		assert_eq!(error.r#type, TranslationErrorType::InvalidLiteral("99999999999999999999".into()));
	}

	#[test]
	fn scan_words() {
		assert_eq!(scan("Iden7ifer23"), [id("Iden7ifer23"), TokenType::Eof]);
		assert_eq!(scan("snake_case"), [id("snake_case"), TokenType::Eof]);
		assert_eq!(tags("if else while do break true false"), [
			Tag::If,
			Tag::Else,
			Tag::While,
			Tag::Do,
			Tag::Break,
			Tag::True,
			Tag::False,
			Tag::Eof
		]);
		assert_eq!(scan("int float char bool"), [
			TokenType::Basic(Type::Int),
			TokenType::Basic(Type::Float),
			TokenType::Basic(Type::Char),
			TokenType::Basic(Type::Bool),
			TokenType::Eof
		]);
	}

	#[test]
	fn scan_unknown_character_as_char() {
		assert_eq!(scan("@"), [TokenType::Char('@'), TokenType::Eof]);
	}

	#[test]
	fn scan_comments_and_lines() {
		let tokens = Scanner::new("// header\n{\n  int i; // trailing\n}\n").scan_tokens().unwrap();
		let lines: Vec<(Tag, usize)> = tokens.iter().map(|token| (token.tag(), token.line)).collect();
		assert_eq!(lines, [
			(Tag::Char('{'), 2),
			(Tag::Basic, 3),
			(Tag::Id, 3),
			(Tag::Char(';'), 3),
			(Tag::Char('}'), 4),
			(Tag::Eof, 5)
		]);
	}

	#[test]
	fn scan_program() {
		let source = "{ float[100] a; while (true) { do i = i + 1; while (a[i] < v); if (i >= j) break; } }";
		assert_eq!(tags(source), [
			Tag::Char('{'),
			Tag::Basic,
			Tag::Char('['),
			Tag::Num,
			Tag::Char(']'),
			Tag::Id,
			Tag::Char(';'),
			Tag::While,
			Tag::Char('('),
			Tag::True,
			Tag::Char(')'),
			Tag::Char('{'),
			Tag::Do,
			Tag::Id,
			Tag::Char('='),
			Tag::Id,
			Tag::Char('+'),
			Tag::Num,
			Tag::Char(';'),
			Tag::While,
			Tag::Char('('),
			Tag::Id,
			Tag::Char('['),
			Tag::Id,
			Tag::Char(']'),
			Tag::Char('<'),
			Tag::Id,
			Tag::Char(')'),
			Tag::Char(';'),
			Tag::If,
			Tag::Char('('),
			Tag::Id,
			Tag::Ge,
			Tag::Id,
			Tag::Char(')'),
			Tag::Break,
			Tag::Char(';'),
			Tag::Char('}'),
			Tag::Char('}'),
			Tag::Eof
		]);
	}
}
