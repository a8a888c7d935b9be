//! The slice of OpenGL ES 2.0 this crate talks to, behind the [`Gl`] trait.

#[macro_use]
mod macros;
mod context;
#[cfg(all(feature = "glow", not(target_arch = "wasm32")))]
mod native;
pub mod trace;

pub use self::context::{Context, RcContext, MAX_TEXTURE_UNITS, MAX_VERTEX_ATTRIBS};

pub mod types {
    pub type GLenum = u32;
    pub type GLint = i32;
    pub type GLuint = u32;
    pub type GLsizei = i32;
    pub type GLfloat = f32;
}

use types::*;

pub const BYTE: GLenum = 0x1400;
pub const UNSIGNED_BYTE: GLenum = 0x1401;
pub const SHORT: GLenum = 0x1402;
pub const UNSIGNED_SHORT: GLenum = 0x1403;
pub const INT: GLenum = 0x1404;
pub const FLOAT: GLenum = 0x1406;

pub const FLOAT_VEC2: GLenum = 0x8B50;
pub const FLOAT_VEC3: GLenum = 0x8B51;
pub const FLOAT_VEC4: GLenum = 0x8B52;
pub const INT_VEC2: GLenum = 0x8B53;
pub const INT_VEC3: GLenum = 0x8B54;
pub const INT_VEC4: GLenum = 0x8B55;
pub const BOOL: GLenum = 0x8B56;
pub const BOOL_VEC2: GLenum = 0x8B57;
pub const BOOL_VEC3: GLenum = 0x8B58;
pub const BOOL_VEC4: GLenum = 0x8B59;
pub const FLOAT_MAT2: GLenum = 0x8B5A;
pub const FLOAT_MAT3: GLenum = 0x8B5B;
pub const FLOAT_MAT4: GLenum = 0x8B5C;
pub const SAMPLER_2D: GLenum = 0x8B5E;
pub const SAMPLER_CUBE: GLenum = 0x8B60;

pub const TEXTURE_2D: GLenum = 0x0DE1;
pub const TEXTURE_CUBE_MAP: GLenum = 0x8513;
pub const TEXTURE0: GLenum = 0x84C0;

/// Symbolic name of a GL type enum, for log output.
pub fn type_name(kind: GLenum) -> &'static str {
    stringify_match!(
        kind,
        (
            BYTE,
            UNSIGNED_BYTE,
            SHORT,
            UNSIGNED_SHORT,
            INT,
            FLOAT,
            FLOAT_VEC2,
            FLOAT_VEC3,
            FLOAT_VEC4,
            INT_VEC2,
            INT_VEC3,
            INT_VEC4,
            BOOL,
            BOOL_VEC2,
            BOOL_VEC3,
            BOOL_VEC4,
            FLOAT_MAT2,
            FLOAT_MAT3,
            FLOAT_MAT4,
            SAMPLER_2D,
            SAMPLER_CUBE
        )
    )
}

/// An active uniform or attribute as reported by program introspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveVariable {
    pub name: String,
    pub size: GLint,
    pub kind: GLenum,
}

/// Graphics context entry points used by program states.
///
/// Implementations forward to a real context (see the `glow` feature) or
/// record the calls, like [`trace::TraceGl`]. Nothing here reports errors;
/// the context is assumed to be current and valid.
pub trait Gl {
    fn use_program(&self, program: GLuint);

    fn uniform_1i(&self, location: GLint, x: GLint);
    fn uniform_1f(&self, location: GLint, x: GLfloat);
    fn uniform_2f(&self, location: GLint, x: GLfloat, y: GLfloat);
    fn uniform_3f(&self, location: GLint, x: GLfloat, y: GLfloat, z: GLfloat);
    fn uniform_4f(&self, location: GLint, x: GLfloat, y: GLfloat, z: GLfloat, w: GLfloat);
    /// Column-major, never transposed.
    fn uniform_matrix_4fv(&self, location: GLint, value: &[GLfloat; 16]);

    /// `unit` is an enum, `TEXTURE0 + n`.
    fn active_texture(&self, unit: GLenum);
    fn bind_texture(&self, target: GLenum, texture: GLuint);

    fn enable_vertex_attrib_array(&self, index: GLuint);
    fn disable_vertex_attrib_array(&self, index: GLuint);
    /// `offset` is in bytes from the start of the bound array buffer.
    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        kind: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    );

    fn active_uniforms(&self, program: GLuint) -> Vec<ActiveVariable>;
    fn active_attributes(&self, program: GLuint) -> Vec<ActiveVariable>;
    fn uniform_location(&self, program: GLuint, name: &str) -> Option<GLint>;
    fn attrib_location(&self, program: GLuint, name: &str) -> Option<GLuint>;
}
