use crate::gl::types::*;

/// Anything that names a GL texture object.
///
/// Loading and owning textures happens elsewhere; program states only need
/// the handle to bind.
pub trait Texture {
    fn handle(&self) -> GLuint;
}

impl Texture for GLuint {
    fn handle(&self) -> GLuint {
        *self
    }
}
