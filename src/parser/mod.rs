//! The `Parser` pulls tokens from the scanner and builds checked statement and
//! expression trees, one function per grammar level. Type checking happens as
//! nodes are built, so the first mismatch aborts the translation.
//!
//! |Name|Operators|Associates
//! --|--|--
//! Or|\|\||Left
//! And|&&|Left
//! Equality|== !=|Left
//! Relation|< <= > >=|None
//! Term|+ -|Left
//! Factor|* /|Left
//! Unary|! -|Right
//!
//! Grammar:
//!
//! ``` BNF
//! program  → block EOF ;
//! block    → "{" decls stmts "}" ;
//! decls    → ( type ID ";" )* ;
//! type     → BASIC ( "[" NUM "]" )* ;
//! stmt     → ";" | block | "break" ";"
//!          | "if" "(" bool ")" stmt ( "else" stmt )?
//!          | "while" "(" bool ")" stmt
//!          | "do" stmt "while" "(" bool ")" ";"
//!          | ID ( "[" bool "]" )* "=" bool ";" ;
//! bool     → join ( "||" join )* ;
//! join     → equality ( "&&" equality )* ;
//! equality → rel ( ( "==" | "!=" ) rel )* ;
//! rel      → expr ( ( "<" | "<=" | ">" | ">=" ) expr )? ;
//! expr     → term ( ( "+" | "-" ) term )* ;
//! term     → unary ( ( "*" | "/" ) unary )* ;
//! unary    → ( "-" | "!" ) unary | factor ;
//! factor   → "(" bool ")" | NUM | REAL | "true" | "false" | ID ( "[" bool "]" )* ;
//! ```

use std::vec::IntoIter;

use crate::{
	codegen::Context,
	environment::Environment,
	error::{TranslationError, TranslationErrorType},
	expression::{Constant, Expression, Identifier},
	scanner::{Tag, Token, TokenType, Word},
	statement::{LoopBuilder, LoopExit, Statement},
	types::Type,
};

pub struct Parser {
	tokens:    IntoIter<Token>,
	/// The token being looked at, `Eof` once the input is exhausted.
	lookahead: Token,
	/// Innermost scope.
	top:       Environment,
	/// Bytes handed out to declarations so far, across every block.
	used:      usize,
	/// Exit slot of the innermost loop being parsed.
	enclosing: Option<LoopExit>,
}

impl Parser {
	pub fn new(tokens: Vec<Token>) -> Self {
		let mut tokens = tokens.into_iter();
		let lookahead = tokens.next().unwrap_or_else(|| Token::new(TokenType::Eof, 1));
		Self { tokens, lookahead, top: Environment::new(), used: 0, enclosing: None }
	}

	/// Translate a whole program. Its statement runs between `L1` and `L2`, and
	/// the text ends with the `L2:` label.
	pub fn program(mut self) -> Result<String, TranslationError> {
		let root = self.parse()?;
		let mut ctx = Context::new();
		let begin = ctx.new_label();
		let after = ctx.new_label();
		ctx.emit_label(begin);
		root.generate(&mut ctx, begin, after)?;
		ctx.emit_label(after);
		log::debug!("generated {} bytes of three-address code, {} bytes of storage", ctx.code().len(), self.used);
		Ok(ctx.into_code())
	}

	/// Parse a program into its checked statement tree.
	pub fn parse(&mut self) -> Result<Statement, TranslationError> {
		let root = self.block()?;
		self.match_tag(Tag::Eof)?;
		Ok(root)
	}

	fn block(&mut self) -> Result<Statement, TranslationError> {
		self.match_tag(Tag::Char('{'))?;
		let outer = std::mem::take(&mut self.top);
		self.top = Environment::new().set_outer(Box::new(outer));
		log::trace!("entered scope at depth {}", self.top.depth());

		self.decls()?;
		let statements = self.stmts()?;
		self.match_tag(Tag::Char('}'))?;

		let inner = std::mem::take(&mut self.top);
		self.top = inner.into_outer().map(|outer| *outer).unwrap_or_default();
		log::trace!("left scope, back at depth {}", self.top.depth());
		Ok(statements)
	}

	fn decls(&mut self) -> Result<(), TranslationError> {
		while self.lookahead.tag() == Tag::Basic {
			let r#type = self.r#type()?;
			let name = self.identifier()?;
			self.match_tag(Tag::Char(';'))?;
			let offset = self.used;
			let used = r#type.width().and_then(|width| offset.checked_add(width)).ok_or_else(|| {
				self.error(TranslationErrorType::TypeTooLarge(format!("{name} does not fit after {offset} bytes")))
			})?;
			self.used = used;
			log::trace!("declared {name}: {} at offset {offset}", r#type);
			self.top.put(name.clone(), Identifier::new(name, r#type, offset));
		}
		Ok(())
	}

	/// `int[2][3]` is an array of two arrays of three ints.
	fn r#type(&mut self) -> Result<Type, TranslationError> {
		let TokenType::Basic(basic) = &self.lookahead.r#type else { return Err(self.unexpected()) };
		let basic = basic.clone();
		self.advance();

		let mut sizes = Vec::new();
		while self.lookahead.tag() == Tag::Char('[') {
			self.advance();
			let TokenType::Num(size) = self.lookahead.r#type else { return Err(self.unexpected()) };
			let size = usize::try_from(size)
				.map_err(|_| self.error(TranslationErrorType::InvalidLiteral(size.to_string())))?;
			self.advance();
			self.match_tag(Tag::Char(']'))?;
			sizes.push(size);
		}
		let r#type = sizes.into_iter().rev().fold(basic, |of, size| Type::array(size, of));
		if r#type.width().is_none() {
			return Err(self.error(TranslationErrorType::TypeTooLarge(r#type.to_string())));
		}
		Ok(r#type)
	}

	/// The statements of a block, chained so that each one threads its own
	/// label into the rest of the list.
	fn stmts(&mut self) -> Result<Statement, TranslationError> {
		let mut statements = Vec::new();
		while !matches!(self.lookahead.tag(), Tag::Char('}') | Tag::Eof) {
			statements.push(self.stmt()?);
		}
		Ok(statements.into_iter().rev().fold(Statement::Empty, |tail, head| Statement::sequence(head, tail)))
	}

	fn stmt(&mut self) -> Result<Statement, TranslationError> {
		match self.lookahead.tag() {
			Tag::Char(';') => {
				self.advance();
				Ok(Statement::Empty)
			}
			Tag::Char('{') => self.block(),
			Tag::If => {
				self.advance();
				let condition = self.condition()?;
				let then_branch = self.stmt()?;
				if self.lookahead.tag() != Tag::Else {
					return self.located(Statement::if_then(condition, then_branch));
				}
				self.advance();
				let else_branch = self.stmt()?;
				self.located(Statement::if_else(condition, then_branch, else_branch))
			}
			Tag::While => {
				self.advance();
				let builder = LoopBuilder::new();
				let saved = self.enclosing.replace(builder.exit().clone());
				let condition = self.condition()?;
				let body = self.stmt()?;
				self.enclosing = saved;
				self.located(builder.while_loop(condition, body))
			}
			Tag::Do => {
				self.advance();
				let builder = LoopBuilder::new();
				let saved = self.enclosing.replace(builder.exit().clone());
				let body = self.stmt()?;
				self.match_tag(Tag::While)?;
				let condition = self.condition()?;
				self.match_tag(Tag::Char(';'))?;
				self.enclosing = saved;
				self.located(builder.do_while(body, condition))
			}
			Tag::Break => {
				let line = self.lookahead.line;
				self.advance();
				self.match_tag(Tag::Char(';'))?;
				Statement::break_from(self.enclosing.as_ref()).map_err(|e| e.or_line(line))
			}
			_ => self.assign(),
		}
	}

	/// `( bool )` after `if` and `while`.
	fn condition(&mut self) -> Result<Expression, TranslationError> {
		self.match_tag(Tag::Char('('))?;
		let condition = self.bool()?;
		self.match_tag(Tag::Char(')'))?;
		Ok(condition)
	}

	fn assign(&mut self) -> Result<Statement, TranslationError> {
		let id = self.lookup()?;
		let statement = if self.lookahead.tag() == Tag::Char('=') {
			self.advance();
			let value = self.bool()?;
			self.located(Statement::assign(id, value))?
		} else {
			let access = self.offset(id)?;
			self.match_tag(Tag::Char('='))?;
			let value = self.bool()?;
			self.located(Statement::assign_array(access, value))?
		};
		self.match_tag(Tag::Char(';'))?;
		Ok(statement)
	}

	fn bool(&mut self) -> Result<Expression, TranslationError> {
		let mut expr = self.join()?;
		while self.lookahead.tag() == Tag::Or {
			self.advance();
			let right = self.join()?;
			expr = self.located(Expression::or(expr, right))?;
		}
		Ok(expr)
	}

	fn join(&mut self) -> Result<Expression, TranslationError> {
		let mut expr = self.equality()?;
		while self.lookahead.tag() == Tag::And {
			self.advance();
			let right = self.equality()?;
			expr = self.located(Expression::and(expr, right))?;
		}
		Ok(expr)
	}

	fn equality(&mut self) -> Result<Expression, TranslationError> {
		let mut expr = self.rel()?;
		while matches!(self.lookahead.tag(), Tag::Eq | Tag::Ne) {
			let op = self.advance().r#type;
			let right = self.rel()?;
			expr = self.located(Expression::rel(op, expr, right))?;
		}
		Ok(expr)
	}

	/// Relations do not chain: `a < b < c` stops after `a < b`.
	fn rel(&mut self) -> Result<Expression, TranslationError> {
		let expr = self.expr()?;
		if !matches!(self.lookahead.tag(), Tag::Char('<' | '>') | Tag::Le | Tag::Ge) {
			return Ok(expr);
		}
		let op = self.advance().r#type;
		let right = self.expr()?;
		self.located(Expression::rel(op, expr, right))
	}

	fn expr(&mut self) -> Result<Expression, TranslationError> {
		let mut expr = self.term()?;
		while matches!(self.lookahead.tag(), Tag::Char('+' | '-')) {
			let op = self.advance().r#type;
			let right = self.term()?;
			expr = self.located(Expression::arith(op, expr, right))?;
		}
		Ok(expr)
	}

	fn term(&mut self) -> Result<Expression, TranslationError> {
		let mut expr = self.unary()?;
		while matches!(self.lookahead.tag(), Tag::Char('*' | '/')) {
			let op = self.advance().r#type;
			let right = self.unary()?;
			expr = self.located(Expression::arith(op, expr, right))?;
		}
		Ok(expr)
	}

	fn unary(&mut self) -> Result<Expression, TranslationError> {
		match self.lookahead.tag() {
			Tag::Char('-') => {
				self.advance();
				let operand = self.unary()?;
				self.located(Expression::unary(Word::minus().into(), operand))
			}
			Tag::Char('!') => {
				self.advance();
				let operand = self.unary()?;
				self.located(Expression::not(operand))
			}
			_ => self.factor(),
		}
	}

	fn factor(&mut self) -> Result<Expression, TranslationError> {
		let constant = match &self.lookahead.r#type {
			TokenType::Char('(') => {
				self.advance();
				let expr = self.bool()?;
				self.match_tag(Tag::Char(')'))?;
				return Ok(expr);
			}
			TokenType::Word(word) if word.tag == Tag::Id => {
				let id = self.lookup()?;
				if self.lookahead.tag() != Tag::Char('[') {
					return Ok(id.into());
				}
				return self.offset(id);
			}
			TokenType::Num(value) => Constant::int(*value),
			TokenType::Real(value) => Constant::real(*value),
			TokenType::Word(word) if word.tag == Tag::True => Constant::r#true(),
			TokenType::Word(word) if word.tag == Tag::False => Constant::r#false(),
			_ => return Err(self.unexpected()),
		};
		self.advance();
		Ok(constant.into())
	}

	/// Turn `a[i][j]...` into an element access whose index is the byte offset
	/// `i * w1 + j * w2 + ...`, where each width is that of the type left after
	/// peeling the dimensions indexed so far.
	fn offset(&mut self, array: Identifier) -> Result<Expression, TranslationError> {
		let mut r#type = array.r#type.clone();
		let mut location: Option<Expression> = None;
		loop {
			self.match_tag(Tag::Char('['))?;
			let index = self.bool()?;
			self.match_tag(Tag::Char(']'))?;

			let Some(element) = r#type.element().cloned() else {
				return Err(self.error(TranslationErrorType::NotAnArray(array.name.clone())));
			};
			let width = element.width().and_then(|width| i64::try_from(width).ok()).ok_or_else(|| {
				self.error(TranslationErrorType::TypeTooLarge(format!("elements of {} are {element}", array.name)))
			})?;
			let width = Constant::int(width);
			let step = self.located(Expression::arith(TokenType::Char('*'), index, width.into()))?;
			location = Some(match location {
				None => step,
				Some(location) => self.located(Expression::arith(TokenType::Char('+'), location, step))?,
			});
			r#type = element;

			if self.lookahead.tag() != Tag::Char('[') {
				break;
			}
		}
		let Some(location) = location else { return Err(self.unexpected()) };
		self.located(Expression::access(array, location, r#type))
	}

	/// Consume an identifier and resolve it through the scopes.
	fn lookup(&mut self) -> Result<Identifier, TranslationError> {
		let name = self.identifier()?;
		match self.top.get(&name) {
			Some(id) => Ok(id.clone()),
			None => Err(self.error(TranslationErrorType::Undeclared(name))),
		}
	}

	fn identifier(&mut self) -> Result<String, TranslationError> {
		match &self.lookahead.r#type {
			TokenType::Word(word) if word.tag == Tag::Id => {
				let name = word.lexeme.clone();
				self.advance();
				Ok(name)
			}
			_ => Err(self.unexpected()),
		}
	}

	/// Consume the lookahead if it has the expected tag.
	fn match_tag(&mut self, expected: Tag) -> Result<Token, TranslationError> {
		if self.lookahead.tag() == expected { Ok(self.advance()) } else { Err(self.unexpected()) }
	}

	/// Move to the next token, handing back the one just passed.
	fn advance(&mut self) -> Token {
		let line = self.lookahead.line;
		let next = self.tokens.next().unwrap_or_else(|| Token::new(TokenType::Eof, line));
		std::mem::replace(&mut self.lookahead, next)
	}

	fn error(&self, r#type: TranslationErrorType) -> TranslationError {
		TranslationError::at(self.lookahead.line, r#type)
	}

	fn unexpected(&self) -> TranslationError {
		self.error(TranslationErrorType::SyntaxError { found: self.lookahead.to_string() })
	}

	/// Attach the current line to errors from node construction.
	fn located<T>(&self, result: Result<T, TranslationError>) -> Result<T, TranslationError> {
		result.map_err(|e| e.or_line(self.lookahead.line))
	}
}
