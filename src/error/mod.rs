pub mod translation;

pub use translation::{TranslationError, TranslationErrorType};

/// DragonError is the top-level error type for the translator.
#[derive(thiserror::Error, Debug)]
pub enum DragonError {
	/// Internal or I/O failure outside the translation itself
	#[error("CompilerInternalError: {0}")]
	InternalError(#[from] anyhow::Error),
	/// The source was rejected by the translator
	#[error(transparent)]
	Translation(#[from] TranslationError),
}
