//! The closed set of types a declaration can carry.
//!
//! Four scalar base types and one constructor, `Array(size, of)`. Every
//! type-check site in the translator is built from [`Type::is_numeric`],
//! [`Type::max`] and plain structural equality.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Type {
	Int,
	Float,
	Char,
	Bool,
	Array { size: usize, of: Box<Type> },
}

impl Type {
	pub fn array(size: usize, of: Type) -> Self { Type::Array { size, of: Box::new(of) } }

	/// Width in bytes. An array is `size` elements of its element width, `None`
	/// when that does not fit in a `usize`.
	pub fn width(&self) -> Option<usize> {
		match self {
			Type::Int => Some(4),
			Type::Float => Some(8),
			Type::Char | Type::Bool => Some(1),
			Type::Array { size, of } => size.checked_mul(of.width()?),
		}
	}

	pub fn is_numeric(&self) -> bool { matches!(self, Type::Int | Type::Float | Type::Char) }

	pub fn is_array(&self) -> bool { matches!(self, Type::Array { .. }) }

	/// The element type one dimension down, `None` for scalars.
	pub fn element(&self) -> Option<&Type> {
		match self {
			Type::Array { of, .. } => Some(of),
			_ => None,
		}
	}

	/// Numeric promotion: `Float` over `Int` over `Char`. `None` when either side
	/// is not numeric, which covers `Bool` and every array.
	pub fn max(left: &Type, right: &Type) -> Option<Type> {
		if !left.is_numeric() || !right.is_numeric() {
			return None;
		}
		if *left == Type::Float || *right == Type::Float {
			Some(Type::Float)
		} else if *left == Type::Int || *right == Type::Int {
			Some(Type::Int)
		} else {
			Some(Type::Char)
		}
	}

	/// The base type named by a reserved word.
	pub fn basic(lexeme: &str) -> Option<Type> {
		match lexeme {
			"int" => Some(Type::Int),
			"float" => Some(Type::Float),
			"char" => Some(Type::Char),
			"bool" => Some(Type::Bool),
			_ => None,
		}
	}
}

impl fmt::Display for Type {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Type::Int => write!(f, "int"),
			Type::Float => write!(f, "float"),
			Type::Char => write!(f, "char"),
			Type::Bool => write!(f, "bool"),
			Type::Array { size, of } => write!(f, "[{size}]{of}"),
		}
	}
}
