//! Statements and their label-threaded translation.
//!
//! [`Statement::generate`] takes two labels from its caller: `begin`, where
//! control is when the statement starts, and `after`, where control must go
//! when it ends. A statement never emits its own `begin` label, the caller
//! does that when something can jump there.
//!
//! Loops are built in two phases through [`LoopBuilder`]: the exit slot exists
//! before the body is parsed so that a nested `break` can hold on to it. The
//! loop writes its `after` label into the slot when it is generated, and the
//! `break` reads it back.

use crate::{
	codegen::{Context, Label},
	error::{TranslationError, TranslationErrorType},
	expression::{Expression, Identifier},
	types::Type,
	utils::RcCell,
};

/// Where a loop continues after it ends, filled in when the loop is generated.
pub type LoopExit = RcCell<Option<Label>>;

/// A statement in the source language.
#[derive(Debug)]
pub enum Statement {
	/// No code, also terminates every statement list.
	Empty,
	Assign {
		id:   Identifier,
		expr: Expression,
	},
	/// `array [ index ] = expr` where `index` is a byte offset.
	AssignArray {
		array: Identifier,
		index: Expression,
		expr:  Expression,
	},
	Sequence(Box<Statement>, Box<Statement>),
	If {
		condition: Expression,
		body:      Box<Statement>,
	},
	IfElse {
		condition:   Expression,
		then_branch: Box<Statement>,
		else_branch: Box<Statement>,
	},
	While {
		condition: Expression,
		body:      Box<Statement>,
		exit:      LoopExit,
	},
	DoWhile {
		body:      Box<Statement>,
		condition: Expression,
		exit:      LoopExit,
	},
	/// Jump to the exit of the innermost enclosing loop.
	Break(LoopExit),
}

impl Statement {
	/// Numbers assign to numbers, booleans to booleans.
	pub fn assign(id: Identifier, expr: Expression) -> Result<Self, TranslationError> {
		let (target, value) = (&id.r#type, expr.r#type());
		let compatible =
			(target.is_numeric() && value.is_numeric()) || (*target == Type::Bool && *value == Type::Bool);
		if !compatible {
			return Err(TranslationError::type_error(format!("cannot assign {value} to {id} of type {target}")));
		}
		Ok(Statement::Assign { id, expr })
	}

	/// `access` must be an element reference built by [`Expression::access`].
	pub fn assign_array(access: Expression, expr: Expression) -> Result<Self, TranslationError> {
		let Expression::Access { array, index, r#type } = access else {
			return Err(TranslationError::type_error(format!("{access} is not an array element")));
		};
		let value = expr.r#type();
		let compatible = !r#type.is_array()
			&& !value.is_array()
			&& (r#type == *value || (r#type.is_numeric() && value.is_numeric()));
		if !compatible {
			return Err(TranslationError::type_error(format!("cannot assign {value} to an element of {array}")));
		}
		Ok(Statement::AssignArray { array, index: *index, expr })
	}

	pub fn sequence(head: Statement, tail: Statement) -> Self { Statement::Sequence(Box::new(head), Box::new(tail)) }

	pub fn if_then(condition: Expression, body: Statement) -> Result<Self, TranslationError> {
		check_condition("if", &condition)?;
		Ok(Statement::If { condition, body: Box::new(body) })
	}

	pub fn if_else(
		condition: Expression,
		then_branch: Statement,
		else_branch: Statement,
	) -> Result<Self, TranslationError> {
		check_condition("if", &condition)?;
		Ok(Statement::IfElse { condition, then_branch: Box::new(then_branch), else_branch: Box::new(else_branch) })
	}

	/// `enclosing` is the exit of the innermost loop being parsed, if any.
	pub fn break_from(enclosing: Option<&LoopExit>) -> Result<Self, TranslationError> {
		enclosing
			.map(|exit| Statement::Break(exit.clone()))
			.ok_or_else(|| TranslationError::new(TranslationErrorType::UnenclosedBreak))
	}

	pub fn is_empty(&self) -> bool { matches!(self, Statement::Empty) }

	pub fn generate(&self, ctx: &mut Context, begin: Label, after: Label) -> Result<(), TranslationError> {
		match self {
			Statement::Empty => {}
			Statement::Assign { id, expr } => {
				let value = expr.generate(ctx);
				ctx.emit(format_args!("{id} = {value}"));
			}
			Statement::AssignArray { array, index, expr } => {
				let index = index.reduce(ctx);
				let value = expr.reduce(ctx);
				ctx.emit(format_args!("{array} [ {index} ] = {value}"));
			}
			Statement::Sequence(head, tail) => {
				if head.is_empty() {
					return tail.generate(ctx, begin, after);
				}
				if tail.is_empty() {
					return head.generate(ctx, begin, after);
				}
				let label = ctx.new_label();
				head.generate(ctx, begin, label)?;
				ctx.emit_label(label);
				tail.generate(ctx, label, after)?;
			}
			Statement::If { condition, body } => {
				let label = ctx.new_label();
				condition.jump(ctx, None, Some(after));
				ctx.emit_label(label);
				body.generate(ctx, label, after)?;
			}
			Statement::IfElse { condition, then_branch, else_branch } => {
				let then_label = ctx.new_label();
				let else_label = ctx.new_label();
				condition.jump(ctx, None, Some(else_label));
				ctx.emit_label(then_label);
				then_branch.generate(ctx, then_label, after)?;
				ctx.emit(format_args!("goto {after}"));
				ctx.emit_label(else_label);
				else_branch.generate(ctx, else_label, after)?;
			}
			Statement::While { condition, body, exit } => {
				exit.set(Some(after));
				log::trace!("while loop exits to {after}");
				let label = ctx.new_label();
				condition.jump(ctx, None, Some(after));
				ctx.emit_label(label);
				body.generate(ctx, label, begin)?;
				ctx.emit(format_args!("goto {begin}"));
			}
			Statement::DoWhile { body, condition, exit } => {
				exit.set(Some(after));
				log::trace!("do loop exits to {after}");
				let label = ctx.new_label();
				body.generate(ctx, begin, label)?;
				ctx.emit_label(label);
				condition.jump(ctx, Some(begin), None);
			}
			Statement::Break(exit) => {
				let target =
					exit.get().ok_or_else(|| TranslationError::new(TranslationErrorType::UnresolvedBreakTarget))?;
				ctx.emit(format_args!("goto {target}"));
			}
		}
		Ok(())
	}
}

fn check_condition(construct: &str, condition: &Expression) -> Result<(), TranslationError> {
	if *condition.r#type() == Type::Bool {
		Ok(())
	} else {
		Err(TranslationError::type_error(format!(
			"boolean required in {construct}, found {}",
			condition.r#type()
		)))
	}
}

/// A loop whose exit is known before its condition and body.
#[derive(Debug, Default)]
pub struct LoopBuilder {
	exit: LoopExit,
}

impl LoopBuilder {
	pub fn new() -> Self { Self { exit: RcCell::new(None) } }

	/// The slot nested `break` statements jump through.
	pub fn exit(&self) -> &LoopExit { &self.exit }

	pub fn while_loop(self, condition: Expression, body: Statement) -> Result<Statement, TranslationError> {
		check_condition("while", &condition)?;
		Ok(Statement::While { condition, body: Box::new(body), exit: self.exit })
	}

	pub fn do_while(self, body: Statement, condition: Expression) -> Result<Statement, TranslationError> {
		check_condition("do", &condition)?;
		Ok(Statement::DoWhile { body: Box::new(body), condition, exit: self.exit })
	}
}
