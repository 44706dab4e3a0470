//! Typed expression nodes and the three operations that translate them.
//!
//! - [`Expression::generate`] yields a form usable as the right hand side of an
//!   instruction, emitting code for sub-expressions first.
//! - [`Expression::reduce`] goes one step further and yields a simple name
//!   (identifier, temporary or constant), materializing operators into a fresh
//!   temporary.
//! - [`Expression::jump`] evaluates a boolean purely for control flow. This is
//!   where `&&` and `||` short-circuit: their operands jump straight to the
//!   targets handed down by the caller and a value is never built.
//!
//! Every node's type is computed once, by its checked constructor.

use std::fmt;

use crate::{
	codegen::{Context, Label, Temp},
	error::TranslationError,
	scanner::{Tag, TokenType, Word},
	types::Type,
};

static BOOL: Type = Type::Bool;

/// A declared name, resolved through the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
	pub name:   String,
	pub r#type: Type,
	/// Byte offset of the storage assigned at declaration.
	pub offset: usize,
}

impl Identifier {
	pub fn new(name: impl Into<String>, r#type: Type, offset: usize) -> Self {
		Self { name: name.into(), r#type, offset }
	}
}

impl fmt::Display for Identifier {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.name) }
}

/// A literal: integer, real, `true` or `false`.
#[derive(Debug, Clone, PartialEq)]
pub struct Constant {
	pub value:  TokenType,
	pub r#type: Type,
}

impl Constant {
	pub fn int(value: i64) -> Self { Self { value: TokenType::Num(value), r#type: Type::Int } }

	pub fn real(value: f64) -> Self { Self { value: TokenType::Real(value), r#type: Type::Float } }

	pub fn r#true() -> Self { Self { value: Word::r#true().into(), r#type: Type::Bool } }

	pub fn r#false() -> Self { Self { value: Word::r#false().into(), r#type: Type::Bool } }
}

impl fmt::Display for Constant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.value) }
}

/// Expression AST nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
	Identifier(Identifier),
	Temp(Temp),
	Constant(Constant),
	/// Binary `+ - * /`.
	Arith { op: TokenType, r#type: Type, left: Box<Expression>, right: Box<Expression> },
	/// Unary negation.
	Unary { op: TokenType, r#type: Type, operand: Box<Expression> },
	/// Array element: `index` is the linearized byte offset into `array`.
	Access { array: Identifier, index: Box<Expression>, r#type: Type },
	Not(Box<Expression>),
	Or(Box<Expression>, Box<Expression>),
	And(Box<Expression>, Box<Expression>),
	/// Relational and equality operators.
	Rel { op: TokenType, left: Box<Expression>, right: Box<Expression> },
}

impl Expression {
	pub fn arith(op: TokenType, left: Expression, right: Expression) -> Result<Self, TranslationError> {
		let Some(r#type) = Type::max(left.r#type(), right.r#type()) else {
			return Err(TranslationError::type_error(format!(
				"operands of '{op}' must be numeric, found {} and {}",
				left.r#type(),
				right.r#type()
			)));
		};
		Ok(Expression::Arith { op, r#type, left: Box::new(left), right: Box::new(right) })
	}

	/// Negation promotes `char` to `int` like any other arithmetic.
	pub fn unary(op: TokenType, operand: Expression) -> Result<Self, TranslationError> {
		let Some(r#type) = Type::max(&Type::Int, operand.r#type()) else {
			return Err(TranslationError::type_error(format!(
				"operand of '{op}' must be numeric, found {}",
				operand.r#type()
			)));
		};
		Ok(Expression::Unary { op, r#type, operand: Box::new(operand) })
	}

	pub fn access(array: Identifier, index: Expression, r#type: Type) -> Result<Self, TranslationError> {
		if !array.r#type.is_array() {
			return Err(TranslationError::type_error(format!("{array} of type {} cannot be indexed", array.r#type)));
		}
		if r#type.is_array() {
			return Err(TranslationError::type_error(format!("{array} needs more indices, element type is {}", r#type)));
		}
		Ok(Expression::Access { array, index: Box::new(index), r#type })
	}

	pub fn not(operand: Expression) -> Result<Self, TranslationError> {
		if *operand.r#type() != Type::Bool {
			return Err(TranslationError::type_error(format!(
				"operand of '!' must be bool, found {}",
				operand.r#type()
			)));
		}
		Ok(Expression::Not(Box::new(operand)))
	}

	pub fn or(left: Expression, right: Expression) -> Result<Self, TranslationError> {
		check_booleans("||", &left, &right)?;
		Ok(Expression::Or(Box::new(left), Box::new(right)))
	}

	pub fn and(left: Expression, right: Expression) -> Result<Self, TranslationError> {
		check_booleans("&&", &left, &right)?;
		Ok(Expression::And(Box::new(left), Box::new(right)))
	}

	/// Both sides must have the same scalar type.
	pub fn rel(op: TokenType, left: Expression, right: Expression) -> Result<Self, TranslationError> {
		let (lt, rt) = (left.r#type(), right.r#type());
		if lt != rt || lt.is_array() {
			return Err(TranslationError::type_error(format!("cannot compare {lt} {op} {rt}")));
		}
		Ok(Expression::Rel { op, left: Box::new(left), right: Box::new(right) })
	}

	pub fn r#type(&self) -> &Type {
		match self {
			Expression::Identifier(id) => &id.r#type,
			Expression::Temp(temp) => &temp.r#type,
			Expression::Constant(constant) => &constant.r#type,
			Expression::Arith { r#type, .. } | Expression::Unary { r#type, .. } | Expression::Access { r#type, .. } => {
				r#type
			}
			Expression::Not(_) | Expression::Or(..) | Expression::And(..) | Expression::Rel { .. } => &BOOL,
		}
	}

	/// The operator or marker word this node was built from.
	pub fn op(&self) -> TokenType {
		match self {
			Expression::Identifier(id) => Word::new(id.name.clone(), Tag::Id).into(),
			Expression::Temp(_) => Word::temp().into(),
			Expression::Constant(constant) => constant.value.clone(),
			Expression::Arith { op, .. } | Expression::Unary { op, .. } | Expression::Rel { op, .. } => op.clone(),
			Expression::Access { .. } => Word::index().into(),
			Expression::Not(_) => TokenType::Char('!'),
			Expression::Or(..) => Word::or().into(),
			Expression::And(..) => Word::and().into(),
		}
	}

	pub fn generate(&self, ctx: &mut Context) -> Expression {
		match self {
			Expression::Identifier(_) | Expression::Temp(_) | Expression::Constant(_) => self.clone(),
			Expression::Arith { op, r#type, left, right } => Expression::Arith {
				op:     op.clone(),
				r#type: r#type.clone(),
				left:   Box::new(left.reduce(ctx)),
				right:  Box::new(right.reduce(ctx)),
			},
			Expression::Unary { op, r#type, operand } => {
				Expression::Unary { op: op.clone(), r#type: r#type.clone(), operand: Box::new(operand.reduce(ctx)) }
			}
			Expression::Access { array, index, r#type } => {
				Expression::Access { array: array.clone(), index: Box::new(index.reduce(ctx)), r#type: r#type.clone() }
			}
			Expression::Not(_) | Expression::Or(..) | Expression::And(..) | Expression::Rel { .. } => {
				let on_false = ctx.new_label();
				let after = ctx.new_label();
				let temp = ctx.new_temp(&Type::Bool);
				self.jump(ctx, None, Some(on_false));
				ctx.emit(format_args!("{temp} = true"));
				ctx.emit(format_args!("goto {after}"));
				ctx.emit_label(on_false);
				ctx.emit(format_args!("{temp} = false"));
				ctx.emit_label(after);
				Expression::Temp(temp)
			}
		}
	}

	pub fn reduce(&self, ctx: &mut Context) -> Expression {
		match self {
			Expression::Identifier(_) | Expression::Temp(_) | Expression::Constant(_) => self.clone(),
			Expression::Arith { .. } | Expression::Unary { .. } | Expression::Access { .. } => {
				let value = self.generate(ctx);
				let temp = ctx.new_temp(self.r#type());
				log::trace!("'{}' node materialized into {temp}", self.op());
				ctx.emit(format_args!("{temp} = {value}"));
				Expression::Temp(temp)
			}
			// Boolean operators already land in a temporary.
			Expression::Not(_) | Expression::Or(..) | Expression::And(..) | Expression::Rel { .. } => {
				self.generate(ctx)
			}
		}
	}

	/// Emit code that continues at `on_true` when the expression holds and at
	/// `on_false` when it does not. A missing target means fall through.
	pub fn jump(&self, ctx: &mut Context, on_true: Option<Label>, on_false: Option<Label>) {
		match self {
			Expression::Constant(constant) if constant.value.tag() == Tag::True => {
				if let Some(t) = on_true {
					ctx.emit(format_args!("goto {t}"));
				}
			}
			Expression::Constant(constant) if constant.value.tag() == Tag::False => {
				if let Some(f) = on_false {
					ctx.emit(format_args!("goto {f}"));
				}
			}
			Expression::Not(operand) => operand.jump(ctx, on_false, on_true),
			Expression::Or(left, right) => {
				let label = on_true.unwrap_or_else(|| ctx.new_label());
				left.jump(ctx, Some(label), None);
				right.jump(ctx, on_true, on_false);
				if on_true.is_none() {
					ctx.emit_label(label);
				}
			}
			Expression::And(left, right) => {
				let label = on_false.unwrap_or_else(|| ctx.new_label());
				left.jump(ctx, None, Some(label));
				right.jump(ctx, on_true, on_false);
				if on_false.is_none() {
					ctx.emit_label(label);
				}
			}
			Expression::Rel { op, left, right } => {
				let left = left.reduce(ctx);
				let right = right.reduce(ctx);
				ctx.emit_jumps(format_args!("{left} {op} {right}"), on_true, on_false);
			}
			// Elements are never tested in place.
			Expression::Access { .. } => {
				let value = self.reduce(ctx);
				ctx.emit_jumps(value, on_true, on_false);
			}
			_ => ctx.emit_jumps(self, on_true, on_false),
		}
	}
}

fn check_booleans(op: &str, left: &Expression, right: &Expression) -> Result<(), TranslationError> {
	if *left.r#type() == Type::Bool && *right.r#type() == Type::Bool {
		Ok(())
	} else {
		Err(TranslationError::type_error(format!(
			"operands of '{op}' must be bool, found {} and {}",
			left.r#type(),
			right.r#type()
		)))
	}
}

impl From<Identifier> for Expression {
	fn from(id: Identifier) -> Self { Expression::Identifier(id) }
}

impl From<Constant> for Expression {
	fn from(constant: Constant) -> Self { Expression::Constant(constant) }
}

impl fmt::Display for Expression {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Expression::Identifier(id) => write!(f, "{id}"),
			Expression::Temp(temp) => write!(f, "{temp}"),
			Expression::Constant(constant) => write!(f, "{constant}"),
			Expression::Arith { op, left, right, .. } | Expression::Rel { op, left, right } => {
				write!(f, "{left} {op} {right}")
			}
			Expression::Unary { op, operand, .. } => write!(f, "{op} {operand}"),
			Expression::Access { array, index, .. } => write!(f, "{array} [ {index} ]"),
			Expression::Not(operand) => write!(f, "! {operand}"),
			Expression::Or(left, right) => write!(f, "{left} || {right}"),
			Expression::And(left, right) => write!(f, "{left} && {right}"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::TranslationErrorType;

	fn id(name: &str, r#type: Type) -> Expression { Identifier::new(name, r#type, 0).into() }

	fn plus() -> TokenType { TokenType::Char('+') }

	/// Display form, then the code `generate` and `reduce` emit from fresh
	/// contexts.
	fn translate(expr: &Expression) -> (String, String, String) {
		let mut ctx = Context::new();
		expr.generate(&mut ctx);
		let generated = ctx.code().to_string();
		ctx.reset();
		expr.reduce(&mut ctx);
		(expr.to_string(), generated, ctx.into_code())
	}

	fn jumps(expr: &Expression, labels: impl FnOnce(&mut Context) -> (Option<Label>, Option<Label>)) -> String {
		let mut ctx = Context::new();
		let (on_true, on_false) = labels(&mut ctx);
		expr.jump(&mut ctx, on_true, on_false);
		ctx.into_code()
	}

	#[test]
	fn names_are_their_own_value() {
		let expr = id("example", Type::Int);
		assert_eq!(translate(&expr), ("example".into(), "".into(), "".into()));
		let expr = Expression::Constant(Constant::int(42));
		assert_eq!(translate(&expr), ("42".into(), "".into(), "".into()));
		let temp = Expression::Temp(Context::new().new_temp(&Type::Int));
		assert_eq!(translate(&temp), ("t1".into(), "".into(), "".into()));
	}

	#[test]
	fn arithmetic_materializes_on_reduce() {
		let expr = Expression::arith(plus(), id("x", Type::Int), id("y", Type::Int)).unwrap();
		assert_eq!(translate(&expr), ("x + y".into(), "".into(), "\tt1 = x + y\n".into()));

		let expr = Expression::unary(Word::minus().into(), id("x", Type::Int)).unwrap();
		assert_eq!(translate(&expr), ("minus x".into(), "".into(), "\tt1 = minus x\n".into()));
	}

	#[test]
	fn nested_arithmetic_reduces_operands_first() {
		let sum = Expression::arith(plus(), id("a", Type::Int), id("b", Type::Int)).unwrap();
		let expr = Expression::arith(TokenType::Char('*'), sum, id("c", Type::Float)).unwrap();
		assert_eq!(*expr.r#type(), Type::Float);
		let mut ctx = Context::new();
		let value = expr.generate(&mut ctx);
		assert_eq!(value.to_string(), "t1 * c");
		assert_eq!(ctx.code(), "\tt1 = a + b\n");
		let value = expr.reduce(&mut ctx);
		assert_eq!(value.to_string(), "t3");
		assert_eq!(ctx.code(), "\tt1 = a + b\n\tt2 = a + b\n\tt3 = t2 * c\n");
	}

	#[test]
	fn access_reduces_its_index() {
		let array = Identifier::new("arr", Type::array(10, Type::Float), 0);
		let expr = Expression::access(array.clone(), id("x", Type::Int), Type::Float).unwrap();
		assert_eq!(translate(&expr), ("arr [ x ]".into(), "".into(), "\tt1 = arr [ x ]\n".into()));

		let offset = Expression::arith(TokenType::Char('*'), id("i", Type::Int), Constant::int(8).into()).unwrap();
		let expr = Expression::access(array, offset, Type::Float).unwrap();
		assert_eq!(translate(&expr).2, "\tt1 = i * 8\n\tt2 = arr [ t1 ]\n");
	}

	#[test]
	fn access_is_tested_through_a_temporary() {
		let flags = Identifier::new("b", Type::array(4, Type::Bool), 0);
		let expr = Expression::access(flags, id("x", Type::Int), Type::Bool).unwrap();
		assert_eq!(jumps(&expr, |ctx| (Some(ctx.new_label()), None)), "\tt1 = b [ x ]\n\tif t1 goto L1\n");
	}

	#[test]
	fn booleans_generate_through_jumps() {
		let x = || id("x", Type::Bool);
		let y = || id("y", Type::Bool);

		let expr = Expression::not(x()).unwrap();
		assert_eq!(translate(&expr).0, "! x");
		assert_eq!(translate(&expr).1, "\tif x goto L1\n\tt1 = true\n\tgoto L2\nL1:\tt1 = false\nL2:");

		let expr = Expression::or(x(), y()).unwrap();
		assert_eq!(translate(&expr).0, "x || y");
		assert_eq!(
			translate(&expr).1,
			"\tif x goto L3\n\tiffalse y goto L1\nL3:\tt1 = true\n\tgoto L2\nL1:\tt1 = false\nL2:"
		);

		let expr = Expression::and(x(), y()).unwrap();
		assert_eq!(translate(&expr).0, "x && y");
		assert_eq!(
			translate(&expr).1,
			"\tiffalse x goto L1\n\tiffalse y goto L1\n\tt1 = true\n\tgoto L2\nL1:\tt1 = false\nL2:"
		);

		let expr = Expression::rel(Word::eq().into(), x(), y()).unwrap();
		assert_eq!(translate(&expr).0, "x == y");
		assert_eq!(translate(&expr).1, "\tiffalse x == y goto L1\n\tt1 = true\n\tgoto L2\nL1:\tt1 = false\nL2:");
		// Reducing a boolean is the same as generating it.
		assert_eq!(translate(&expr).1, translate(&expr).2);
	}

	#[test]
	fn or_short_circuits_to_a_fresh_label() {
		let expr = Expression::or(id("x", Type::Bool), id("y", Type::Bool)).unwrap();
		assert_eq!(jumps(&expr, |ctx| (None, Some(ctx.new_label()))), "\tif x goto L2\n\tiffalse y goto L1\nL2:");
		// With a true target no label is needed.
		assert_eq!(
			jumps(&expr, |ctx| (Some(ctx.new_label()), Some(ctx.new_label()))),
			"\tif x goto L1\n\tif y goto L1\n\tgoto L2\n"
		);
	}

	#[test]
	fn and_is_the_dual_of_or() {
		let expr = Expression::and(id("x", Type::Bool), id("y", Type::Bool)).unwrap();
		assert_eq!(jumps(&expr, |ctx| (Some(ctx.new_label()), None)), "\tiffalse x goto L2\n\tif y goto L1\nL2:");
		assert_eq!(jumps(&expr, |ctx| (None, Some(ctx.new_label()))), "\tiffalse x goto L1\n\tiffalse y goto L1\n");
	}

	#[test]
	fn not_swaps_targets() {
		let expr = Expression::not(id("x", Type::Bool)).unwrap();
		assert_eq!(jumps(&expr, |ctx| (Some(ctx.new_label()), None)), "\tiffalse x goto L1\n");
		let expr = Expression::not(expr).unwrap();
		assert_eq!(jumps(&expr, |ctx| (Some(ctx.new_label()), None)), "\tif x goto L1\n");
	}

	#[test]
	fn relation_reduces_operands() {
		let sum = Expression::arith(plus(), id("i", Type::Int), Constant::int(1).into()).unwrap();
		let expr = Expression::rel(TokenType::Char('<'), sum, id("j", Type::Int)).unwrap();
		assert_eq!(jumps(&expr, |ctx| (None, Some(ctx.new_label()))), "\tt1 = i + 1\n\tiffalse t1 < j goto L1\n");
	}

	#[test]
	fn constants_jump_unconditionally() {
		let yes: Expression = Constant::r#true().into();
		let no: Expression = Constant::r#false().into();
		assert_eq!(jumps(&yes, |ctx| (Some(ctx.new_label()), Some(ctx.new_label()))), "\tgoto L1\n");
		assert_eq!(jumps(&yes, |ctx| (None, Some(ctx.new_label()))), "");
		assert_eq!(jumps(&no, |ctx| (None, Some(ctx.new_label()))), "\tgoto L1\n");
		assert_eq!(jumps(&no, |ctx| (Some(ctx.new_label()), None)), "");
		assert_eq!(jumps(&yes, |_| (None, None)), "");
	}

	#[test]
	fn checked_constructors_reject_mismatches() {
		let int = || id("i", Type::Int);
		let flag = || id("b", Type::Bool);
		let array = || id("a", Type::array(3, Type::Int));
		let is_type_error = |result: Result<Expression, TranslationError>| {
			matches!(result, Err(e) if matches!(e.r#type, TranslationErrorType::TypeError(_)))
		};

		assert!(is_type_error(Expression::arith(plus(), int(), flag())));
		assert!(is_type_error(Expression::arith(plus(), flag(), flag())));
		assert!(is_type_error(Expression::arith(plus(), array(), int())));
		assert!(is_type_error(Expression::unary(Word::minus().into(), flag())));
		assert!(is_type_error(Expression::not(int())));
		assert!(is_type_error(Expression::or(flag(), int())));
		assert!(is_type_error(Expression::and(int(), flag())));
		assert!(is_type_error(Expression::rel(TokenType::Char('<'), int(), id("f", Type::Float))));
		assert!(is_type_error(Expression::rel(Word::eq().into(), array(), array())));
		assert!(is_type_error(Expression::access(Identifier::new("i", Type::Int, 0), int(), Type::Int)));
		let matrix = Identifier::new("m", Type::array(2, Type::array(3, Type::Int)), 0);
		assert!(is_type_error(Expression::access(matrix, int(), Type::array(3, Type::Int))));
	}

	#[test]
	fn checked_constructors_accept_valid_operands() {
		let char_plus = Expression::arith(plus(), id("c", Type::Char), id("d", Type::Char)).unwrap();
		assert_eq!(*char_plus.r#type(), Type::Char);
		let negated = Expression::unary(Word::minus().into(), id("c", Type::Char)).unwrap();
		assert_eq!(*negated.r#type(), Type::Int);
		let rel = Expression::rel(TokenType::Char('<'), id("b", Type::Bool), id("c", Type::Bool)).unwrap();
		assert_eq!(*rel.r#type(), Type::Bool);
		assert_eq!(rel.op().tag(), Tag::Char('<'));
		assert!(Expression::and(rel, Constant::r#true().into()).is_ok());
	}
}
