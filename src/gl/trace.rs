//! A [`Gl`] that records calls instead of drawing anything.

use super::{types::*, ActiveVariable, Gl};
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    UseProgram(GLuint),
    Uniform1i(GLint, GLint),
    Uniform1f(GLint, GLfloat),
    Uniform2f(GLint, [GLfloat; 2]),
    Uniform3f(GLint, [GLfloat; 3]),
    Uniform4f(GLint, [GLfloat; 4]),
    UniformMatrix4fv(GLint, [GLfloat; 16]),
    ActiveTexture(GLenum),
    BindTexture(GLenum, GLuint),
    EnableVertexAttribArray(GLuint),
    DisableVertexAttribArray(GLuint),
    VertexAttribPointer {
        index: GLuint,
        size: GLint,
        kind: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    },
}

impl Call {
    /// Location of a uniform write, `None` for other calls.
    pub fn uniform_location(&self) -> Option<GLint> {
        match self {
            Call::Uniform1i(location, _)
            | Call::Uniform1f(location, _)
            | Call::Uniform2f(location, _)
            | Call::Uniform3f(location, _)
            | Call::Uniform4f(location, _)
            | Call::UniformMatrix4fv(location, _) => Some(*location),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Declared {
    uniforms: Vec<(ActiveVariable, GLint)>,
    attributes: Vec<(ActiveVariable, GLuint)>,
}

/// Records every call for later inspection and logs it at trace level.
///
/// Programs must be declared with [`TraceGl::declare_program`] for
/// introspection to report anything.
#[derive(Default)]
pub struct TraceGl {
    calls: RefCell<Vec<Call>>,
    programs: RefCell<HashMap<GLuint, Declared>>,
}

impl TraceGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the active variables of program `handle`.
    ///
    /// Uniform locations and attribute indices are handed out in declaration
    /// order, starting from 0.
    pub fn declare_program(
        &self,
        handle: GLuint,
        uniforms: &[(&str, GLenum)],
        attributes: &[(&str, GLenum)],
    ) {
        let declared = Declared {
            uniforms: uniforms
                .iter()
                .enumerate()
                .map(|(i, &(name, kind))| (variable(name, kind), i as GLint))
                .collect(),
            attributes: attributes
                .iter()
                .enumerate()
                .map(|(i, &(name, kind))| (variable(name, kind), i as GLuint))
                .collect(),
        };
        trace!(
            "Program {} declared with {} uniforms and {} attributes",
            handle,
            uniforms.len(),
            attributes.len()
        );
        self.programs.borrow_mut().insert(handle, declared);
    }

    /// Drains the calls recorded so far.
    pub fn take_calls(&self) -> Vec<Call> {
        self.calls.take()
    }

    fn record(&self, call: Call) {
        trace!("{:?}", call);
        self.calls.borrow_mut().push(call);
    }
}

fn variable(name: &str, kind: GLenum) -> ActiveVariable {
    ActiveVariable {
        name: name.to_string(),
        size: 1,
        kind,
    }
}

impl Gl for TraceGl {
    fn use_program(&self, program: GLuint) {
        self.record(Call::UseProgram(program));
    }

    fn uniform_1i(&self, location: GLint, x: GLint) {
        self.record(Call::Uniform1i(location, x));
    }

    fn uniform_1f(&self, location: GLint, x: GLfloat) {
        self.record(Call::Uniform1f(location, x));
    }

    fn uniform_2f(&self, location: GLint, x: GLfloat, y: GLfloat) {
        self.record(Call::Uniform2f(location, [x, y]));
    }

    fn uniform_3f(&self, location: GLint, x: GLfloat, y: GLfloat, z: GLfloat) {
        self.record(Call::Uniform3f(location, [x, y, z]));
    }

    fn uniform_4f(&self, location: GLint, x: GLfloat, y: GLfloat, z: GLfloat, w: GLfloat) {
        self.record(Call::Uniform4f(location, [x, y, z, w]));
    }

    fn uniform_matrix_4fv(&self, location: GLint, value: &[GLfloat; 16]) {
        self.record(Call::UniformMatrix4fv(location, *value));
    }

    fn active_texture(&self, unit: GLenum) {
        self.record(Call::ActiveTexture(unit));
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        self.record(Call::BindTexture(target, texture));
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        self.record(Call::EnableVertexAttribArray(index));
    }

    fn disable_vertex_attrib_array(&self, index: GLuint) {
        self.record(Call::DisableVertexAttribArray(index));
    }

    fn vertex_attrib_pointer(
        &self,
        index: GLuint,
        size: GLint,
        kind: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        self.record(Call::VertexAttribPointer {
            index,
            size,
            kind,
            normalized,
            stride,
            offset,
        });
    }

    fn active_uniforms(&self, program: GLuint) -> Vec<ActiveVariable> {
        self.programs
            .borrow()
            .get(&program)
            .map(|p| p.uniforms.iter().map(|(v, _)| v.clone()).collect())
            .unwrap_or_default()
    }

    fn active_attributes(&self, program: GLuint) -> Vec<ActiveVariable> {
        self.programs
            .borrow()
            .get(&program)
            .map(|p| p.attributes.iter().map(|(v, _)| v.clone()).collect())
            .unwrap_or_default()
    }

    fn uniform_location(&self, program: GLuint, name: &str) -> Option<GLint> {
        let programs = self.programs.borrow();
        let declared = programs.get(&program)?;
        declared
            .uniforms
            .iter()
            .find(|(v, _)| v.name == name)
            .map(|&(_, location)| location)
    }

    fn attrib_location(&self, program: GLuint, name: &str) -> Option<GLuint> {
        let programs = self.programs.borrow();
        let declared = programs.get(&program)?;
        declared
            .attributes
            .iter()
            .find(|(v, _)| v.name == name)
            .map(|&(_, index)| index)
    }
}
