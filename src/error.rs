use crate::gl::types::*;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("Program handle is 0")]
    NullProgram,
    #[error("Program {0} declares no uniforms or attributes")]
    EmptyProgram(GLuint),
    #[error("No program named {0:?}")]
    UnknownProgram(String),
}
