use std::io;

pub type VamanaResult<T> = Result<T, VamanaError>;

#[derive(thiserror::Error, Debug)]
pub enum VamanaError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("shape error: {0}")]
    Shape(String),

    #[error("vertex {0} is out of bounds")]
    InvalidVertex(u32),

    #[error("vertex {0} cannot point to itself")]
    SelfLoop(u32),

    #[error("no base vector carries filter label {0}")]
    NoMedoid(f32),
}
