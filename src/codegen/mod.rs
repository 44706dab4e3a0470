//! Translation context: the label and temporary counters and the text being
//! emitted.
//!
//! Each translation owns one [`Context`], so two translations never share
//! numbering. Instructions are written tab indented, one per line; labels are
//! written flush left as `L<n>:` with no line break, so the next instruction
//! lands on the same line.

use std::fmt;

use crate::types::Type;

/// A jump target. Labels start at `L1` and are never reused within a
/// translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub usize);

impl fmt::Display for Label {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "L{}", self.0) }
}

/// A compiler generated scratch name, printed `t<n>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Temp {
	pub number: usize,
	pub r#type: Type,
}

impl fmt::Display for Temp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "t{}", self.number) }
}

#[derive(Debug, Default)]
pub struct Context {
	labels: usize,
	temps:  usize,
	code:   String,
}

impl Context {
	pub fn new() -> Self { Self::default() }

	/// Restart numbering at `L1` and `t1` and drop any emitted text.
	pub fn reset(&mut self) {
		self.labels = 0;
		self.temps = 0;
		self.code.clear();
	}

	pub fn new_label(&mut self) -> Label {
		self.labels += 1;
		Label(self.labels)
	}

	pub fn new_temp(&mut self, r#type: &Type) -> Temp {
		self.temps += 1;
		Temp { number: self.temps, r#type: r#type.clone() }
	}

	pub fn emit(&mut self, instruction: impl fmt::Display) {
		use fmt::Write;
		// Writing into a String cannot fail.
		let _ = writeln!(self.code, "\t{instruction}");
	}

	pub fn emit_label(&mut self, label: Label) {
		use fmt::Write;
		let _ = write!(self.code, "{label}:");
	}

	/// Branch on `test`. With both targets the true branch is conditional and
	/// the false one falls back to an unconditional `goto`; with neither,
	/// nothing is emitted and control falls through.
	pub fn emit_jumps(&mut self, test: impl fmt::Display, on_true: Option<Label>, on_false: Option<Label>) {
		match (on_true, on_false) {
			(Some(t), Some(f)) => {
				self.emit(format_args!("if {test} goto {t}"));
				self.emit(format_args!("goto {f}"));
			}
			(Some(t), None) => self.emit(format_args!("if {test} goto {t}")),
			(None, Some(f)) => self.emit(format_args!("iffalse {test} goto {f}")),
			(None, None) => {}
		}
	}

	pub fn code(&self) -> &str { &self.code }

	pub fn into_code(self) -> String { self.code }
}
