use crate::runner::ds::object::{ObjectKind, MAX_DENSE_LENGTH};
use crate::runner::ds::operations::type_conversion::to_string;
use crate::runner::ds::value::JsValue;

/// Longest string, in bytes, a script operation may build.
pub const MAX_STRING_LENGTH: usize = 1 << 28;

/// Errors raised while evaluating script code.
///
/// `Interrupted` is raised when the execution budget runs out and is never
/// delivered to a script `catch` block.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JErrorType {
    #[error("ReferenceError: {0}")]
    ReferenceError(String),
    #[error("TypeError: {0}")]
    TypeError(String),
    #[error("RangeError: {0}")]
    RangeError(String),
    #[error("SyntaxError: {0}")]
    SyntaxError(String),
    #[error("{}", describe_thrown(.0))]
    Thrown(JsValue),
    #[error("Interrupted: {0}")]
    Interrupted(String),
}

impl JErrorType {
    pub fn is_catchable(&self) -> bool {
        !matches!(self, JErrorType::Interrupted(_))
    }

    /// Constructor name of the script error this maps to.
    pub fn name(&self) -> &'static str {
        match self {
            JErrorType::ReferenceError(_) => "ReferenceError",
            JErrorType::TypeError(_) => "TypeError",
            JErrorType::RangeError(_) => "RangeError",
            JErrorType::SyntaxError(_) => "SyntaxError",
            JErrorType::Thrown(_) => "Error",
            JErrorType::Interrupted(_) => "Interrupted",
        }
    }

    /// Rejects a string result longer than [`MAX_STRING_LENGTH`].
    pub fn check_string_length(len: usize) -> Result<(), JErrorType> {
        if len > MAX_STRING_LENGTH {
            return Err(JErrorType::RangeError("Invalid string length".to_string()));
        }
        Ok(())
    }

    /// Rejects an array result longer than [`MAX_DENSE_LENGTH`].
    pub fn check_array_length(len: usize) -> Result<(), JErrorType> {
        if len > MAX_DENSE_LENGTH {
            return Err(JErrorType::RangeError("Invalid array length".to_string()));
        }
        Ok(())
    }

    pub fn message(&self) -> String {
        match self {
            JErrorType::ReferenceError(m)
            | JErrorType::TypeError(m)
            | JErrorType::RangeError(m)
            | JErrorType::SyntaxError(m)
            | JErrorType::Interrupted(m) => m.clone(),
            JErrorType::Thrown(v) => describe_thrown(v),
        }
    }
}

/// Renders a thrown script value, using `name: message` for error objects.
pub fn describe_thrown(value: &JsValue) -> String {
    if let JsValue::Object(o) = value {
        let o = o.borrow();
        let is_error = matches!(o.kind, ObjectKind::Error) || o.properties.contains_key("message");
        if is_error {
            let name = o
                .properties
                .get("name")
                .map(to_string)
                .unwrap_or_else(|| "Error".to_string());
            let message = o.properties.get("message").map(to_string).unwrap_or_default();
            return if message.is_empty() {
                name
            } else {
                format!("{}: {}", name, message)
            };
        }
    }
    format!("Uncaught {}", to_string(value))
}
