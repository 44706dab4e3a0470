use std::collections::HashMap;

use crate::expression::Identifier;

/// One block scope. Lookups fall back to the enclosing scopes through `outer`.
#[derive(Default, Debug)]
pub struct Environment {
	variables: HashMap<String, Identifier>,
	outer:     Option<Box<Environment>>,
}

impl Environment {
	pub fn new() -> Self { Self { variables: HashMap::new(), outer: None } }

	pub fn set_outer(mut self, outer: Box<Environment>) -> Self {
		self.outer = Some(outer);
		self
	}

	/// Drop this scope and every binding made in it, handing back the
	/// enclosing one.
	pub fn into_outer(self) -> Option<Box<Environment>> { self.outer }

	/// Declarations bind in the innermost scope only, shadowing any outer
	/// binding of the same name.
	pub fn put(&mut self, lexeme: impl Into<String>, id: Identifier) { self.variables.insert(lexeme.into(), id); }

	pub fn get(&self, lexeme: &str) -> Option<&Identifier> {
		self.variables.get(lexeme).or_else(|| self.outer.as_ref().and_then(|env| env.get(lexeme)))
	}

	pub fn depth(&self) -> usize { 1 + self.outer.as_ref().map_or(0, |env| env.depth()) }
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::Type;

	fn id(name: &str, r#type: Type, offset: usize) -> Identifier { Identifier::new(name, r#type, offset) }

	#[test]
	fn lookup_walks_outwards() {
		let mut global = Environment::new();
		global.put("i", id("i", Type::Int, 0));
		let mut block = Environment::new().set_outer(Box::new(global));
		block.put("f", id("f", Type::Float, 4));
		assert_eq!(block.get("i").map(|id| id.offset), Some(0));
		assert_eq!(block.get("f").map(|id| &id.r#type), Some(&Type::Float));
		assert!(block.get("missing").is_none());
		assert_eq!(block.depth(), 2);
	}

	#[test]
	fn shadowing_ends_with_the_scope() {
		let mut global = Environment::new();
		global.put("x", id("x", Type::Int, 0));
		let mut block = Environment::new().set_outer(Box::new(global));
		block.put("x", id("x", Type::Bool, 4));
		assert_eq!(block.get("x").map(|id| &id.r#type), Some(&Type::Bool));

		let global = block.into_outer().unwrap();
		assert_eq!(global.get("x").map(|id| &id.r#type), Some(&Type::Int));
		assert_eq!(global.depth(), 1);
	}

	#[test]
	fn child_bindings_are_discarded() {
		let mut block = Environment::new().set_outer(Box::new(Environment::new()));
		block.put("tmp", id("tmp", Type::Char, 0));
		let global = block.into_outer().unwrap();
		assert!(global.get("tmp").is_none());
		assert!(global.into_outer().is_none());
	}
}
