use crate::gl::types::*;
use crate::program::{Program, VertexAttrib};
use std::fmt;
use std::rc::Rc;

/// Sets up a vertex attribute at apply time.
pub type VertexAttribCallback = Rc<dyn Fn(&Program, &VertexAttrib)>;

/// Arguments of `glVertexAttribPointer`, with the pointer as a byte offset
/// into the bound array buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttribPointer {
    pub size: GLint,
    pub kind: GLenum,
    pub normalized: bool,
    pub stride: GLsizei,
    pub offset: usize,
}

#[derive(Clone)]
pub enum AttribValue {
    Pointer(AttribPointer),
    Callback(VertexAttribCallback),
}

impl fmt::Debug for AttribValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AttribValue::Pointer(pointer) => f.debug_tuple("Pointer").field(pointer).finish(),
            AttribValue::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// The value a program state holds for one vertex attribute.
#[derive(Clone, Debug, Default)]
pub struct VertexAttribValue {
    enabled: bool,
    value: Option<AttribValue>,
}

impl VertexAttribValue {
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn value(&self) -> Option<&AttribValue> {
        self.value.as_ref()
    }

    pub fn uses_callback(&self) -> bool {
        matches!(self.value, Some(AttribValue::Callback(_)))
    }

    pub fn set_pointer(
        &mut self,
        size: GLint,
        kind: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        self.value = Some(AttribValue::Pointer(AttribPointer {
            size,
            kind,
            normalized,
            stride,
            offset,
        }));
        self.enabled = true;
    }

    pub fn set_callback(&mut self, callback: impl Fn(&Program, &VertexAttrib) + 'static) {
        self.value = Some(AttribValue::Callback(Rc::new(callback)));
        self.enabled = true;
    }

    /// Keeps the value but leaves the attribute out of draws.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Issues the pointer for `attrib`, or runs the callback. Enabling the
    /// slot is left to the caller.
    pub fn apply(&self, program: &Program, attrib: &VertexAttrib) {
        if !self.enabled {
            return;
        }
        match &self.value {
            None => {}
            Some(AttribValue::Callback(callback)) => callback(program, attrib),
            Some(AttribValue::Pointer(p)) => program.context().vertex_attrib_pointer(
                attrib.index,
                p.size,
                p.kind,
                p.normalized,
                p.stride,
                p.offset,
            ),
        }
    }
}
