//! Input parsing errors

use std::error::Error;
use std::fmt;

/// Why the input deck could not be used.
pub enum InputError {
    /// The file could not be opened, or was not valid YAML
    InvalidFile,
    /// A component of the colon-separated path was missing
    MissingField(String, String),
    /// The field exists but did not parse as the target type
    CouldNotParse(String),
}

impl fmt::Debug for InputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use InputError::*;
        let help_msg = "Usage: elver input-file";
        match self {
            InvalidFile => write!(f, "unable to open or parse the configuration file\n{}", help_msg),
            MissingField(path, component) => write!(f, "unable to find \"{}\": component \"{}\" is missing\n{}", path, component, help_msg),
            CouldNotParse(field) => write!(f, "unable to convert field \"{}\" to the target type\n{}", field, help_msg),
        }
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Error for InputError {}
