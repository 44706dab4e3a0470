//! # From structured source to three-address code
//!
//! User's source code: `{ int i; int[10] a; while (i < 10) { a[i] = i; i = i + 1; } }`

//! ## Scanning
//!
//! The scanner turns characters into tokens: punctuation and operators,
//! integer and real literals, reserved words like `while` and the base types,
//! and identifiers. Blanks and `//` comments are dropped, newlines only bump
//! the line counter used in error messages.

//! ## Parsing and checking
//!
//! A recursive-descent parser builds a statement tree. Declarations bind names
//! in block scopes and hand out byte offsets, `a[i]` becomes an access at byte
//! offset `i * 4`. Every node checks its operand types as it is built, so the
//! first error stops the translation.

//! ## Generation
//!
//! The tree is walked once. Statements receive the label where they start and
//! the label where control goes next. Expressions either produce a value
//! (`generate` and `reduce`) or branch on it (`jump`), which is how `&&` and
//! `||` short-circuit without ever materializing a boolean:
//!
//! ``` text
//! L1: iffalse i < 10 goto L2
//! L3: t1 = i * 4
//!     a [ t1 ] = i
//! L4: i = i + 1
//!     goto L1
//! L2:
//! ```

pub mod cli;
pub mod codegen;
pub mod environment;
mod error;
pub mod expression;
pub mod parser;
pub mod scanner;
pub mod statement;
mod translator;
pub mod types;
pub mod utils;

pub use error::{DragonError, TranslationError, TranslationErrorType};
pub use translator::Translator;
