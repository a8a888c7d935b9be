use super::{types::*, ActiveVariable, Gl};
use glow::HasContext;
use std::num::NonZeroU32;

fn program(handle: GLuint) -> Option<glow::NativeProgram> {
    NonZeroU32::new(handle).map(glow::NativeProgram)
}

fn location(location: GLint) -> glow::NativeUniformLocation {
    glow::NativeUniformLocation(location as u32)
}

impl Gl for glow::Context {
    fn use_program(&self, handle: GLuint) {
        unsafe { HasContext::use_program(self, program(handle)) }
    }

    fn uniform_1i(&self, loc: GLint, x: GLint) {
        unsafe { HasContext::uniform_1_i32(self, Some(&location(loc)), x) }
    }

    fn uniform_1f(&self, loc: GLint, x: GLfloat) {
        unsafe { HasContext::uniform_1_f32(self, Some(&location(loc)), x) }
    }

    fn uniform_2f(&self, loc: GLint, x: GLfloat, y: GLfloat) {
        unsafe { HasContext::uniform_2_f32(self, Some(&location(loc)), x, y) }
    }

    fn uniform_3f(&self, loc: GLint, x: GLfloat, y: GLfloat, z: GLfloat) {
        unsafe { HasContext::uniform_3_f32(self, Some(&location(loc)), x, y, z) }
    }

    fn uniform_4f(&self, loc: GLint, x: GLfloat, y: GLfloat, z: GLfloat, w: GLfloat) {
        unsafe { HasContext::uniform_4_f32(self, Some(&location(loc)), x, y, z, w) }
    }

    fn uniform_matrix_4fv(&self, loc: GLint, value: &[GLfloat; 16]) {
        unsafe { HasContext::uniform_matrix_4_f32_slice(self, Some(&location(loc)), false, value) }
    }

    fn active_texture(&self, unit: GLenum) {
        unsafe { HasContext::active_texture(self, unit) }
    }

    fn bind_texture(&self, target: GLenum, texture: GLuint) {
        unsafe {
            HasContext::bind_texture(self, target, NonZeroU32::new(texture).map(glow::NativeTexture))
        }
    }

    fn enable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { HasContext::enable_vertex_attrib_array(self, index) }
    }

    fn disable_vertex_attrib_array(&self, index: GLuint) {
        unsafe { HasContext::disable_vertex_attrib_array(self, index) }
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
        unsafe {
            HasContext::vertex_attrib_pointer_f32(
                self,
                index,
                size,
                kind,
                normalized,
                stride,
                offset as i32,
            )
        }
    }

    fn active_uniforms(&self, handle: GLuint) -> Vec<ActiveVariable> {
        let Some(program) = program(handle) else {
            return Vec::new();
        };
        unsafe {
            let count = HasContext::get_active_uniforms(self, program);
            (0..count)
                .filter_map(|i| HasContext::get_active_uniform(self, program, i))
                .map(|u| ActiveVariable {
                    name: u.name,
                    size: u.size,
                    kind: u.utype,
                })
                .collect()
        }
    }

    fn active_attributes(&self, handle: GLuint) -> Vec<ActiveVariable> {
        let Some(program) = program(handle) else {
            return Vec::new();
        };
        unsafe {
            let count = HasContext::get_active_attributes(self, program);
            (0..count)
                .filter_map(|i| HasContext::get_active_attribute(self, program, i))
                .map(|a| ActiveVariable {
                    name: a.name,
                    size: a.size,
                    kind: a.atype,
                })
                .collect()
        }
    }

    fn uniform_location(&self, handle: GLuint, name: &str) -> Option<GLint> {
        let program = program(handle)?;
        unsafe { HasContext::get_uniform_location(self, program, name) }.map(|l| l.0 as GLint)
    }

    fn attrib_location(&self, handle: GLuint, name: &str) -> Option<GLuint> {
        let program = program(handle)?;
        unsafe { HasContext::get_attrib_location(self, program, name) }
    }
}
