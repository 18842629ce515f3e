pub mod input;
pub mod output;
pub mod read_input_functions;

use crate::transmissibility::UnknownUnitSystem;

#[derive(thiserror::Error, Debug)]
pub enum InputError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("Variable not found: {0}")]
    VariableNotFound(String),
    #[error("Cannot read '{value}' as value of {name}")]
    InvalidValue { name: String, value: String },
    #[error("Expected {expected} values for {name}, got {actual}")]
    WrongLength {
        name: String,
        expected: usize,
        actual: usize,
    },
    #[error("Unknown well connection '{0}', expected none, radial or linear")]
    UnknownWellConnection(String),
    #[error(transparent)]
    UnitSystem(#[from] UnknownUnitSystem),
}
