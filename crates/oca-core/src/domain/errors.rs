use std::error::Error;
use std::fmt::{Display, Formatter};

pub type OcaResult<T> = Result<T, OcaError>;
pub type ParserResult<T> = OcaResult<T>;
pub type ComputeResult<T> = OcaResult<T>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcaErrorCategory {
    InputValidationError,
    IoSystemError,
    ComputationError,
    InternalError,
}

impl OcaErrorCategory {
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::InputValidationError => 2,
            Self::IoSystemError => 3,
            Self::ComputationError => 4,
            Self::InternalError => 5,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputValidationError => "InputValidationError",
            Self::IoSystemError => "IoSystemError",
            Self::ComputationError => "ComputationError",
            Self::InternalError => "InternalError",
        }
    }
}

/// Error value shared by every tool in the crate.
///
/// `placeholder` is a stable dotted code (`INPUT.TABLE_MISSING_FIELD`,
/// `RUN.ABSORPTION_DENOMINATOR`, ...) that tests and scripts can match on
/// without depending on the human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcaError {
    category: OcaErrorCategory,
    placeholder: &'static str,
    message: String,
}

impl OcaError {
    pub fn new(
        category: OcaErrorCategory,
        placeholder: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            placeholder,
            message: message.into(),
        }
    }

    pub fn input_validation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(
            OcaErrorCategory::InputValidationError,
            placeholder,
            message,
        )
    }

    pub fn io_system(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(OcaErrorCategory::IoSystemError, placeholder, message)
    }

    pub fn computation(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(OcaErrorCategory::ComputationError, placeholder, message)
    }

    pub fn internal(placeholder: &'static str, message: impl Into<String>) -> Self {
        Self::new(OcaErrorCategory::InternalError, placeholder, message)
    }

    pub const fn category(&self) -> OcaErrorCategory {
        self.category
    }

    pub const fn placeholder(&self) -> &'static str {
        self.placeholder
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn exit_code(&self) -> i32 {
        self.category.exit_code()
    }

    pub fn diagnostic_line(&self) -> String {
        format!("ERROR: [{}] {}", self.placeholder, self.message)
    }

    pub fn fatal_exit_line(&self) -> String {
        format!("FATAL EXIT CODE: {}", self.exit_code())
    }
}

impl Display for OcaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.category.as_str(),
            self.placeholder,
            self.message
        )
    }
}

impl Error for OcaError {}
