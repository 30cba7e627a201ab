use std::fmt;

use crate::device::ShaderStage;

/// Failure to build a [`ShaderProgram`](super::ShaderProgram).
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// `build` was called without a source for `stage`. No backend call was made.
    MissingStage(ShaderStage),
    /// The backend rejected one stage; `log` is its diagnostic output.
    Compile { stage: ShaderStage, log: String },
    /// The stages compiled but could not be linked into a program.
    Link { log: String },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::MissingStage(stage) => {
                write!(f, "shader program has no {stage} source")
            }
            ShaderError::Compile { stage, log } => {
                write!(f, "failed to compile {stage} shader: {log}")
            }
            ShaderError::Link { log } => write!(f, "failed to link shader program: {log}"),
        }
    }
}

impl std::error::Error for ShaderError {}
