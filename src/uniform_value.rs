use crate::gl::{self, types::*};
use crate::program::{Program, Uniform};
use glam::{Mat4, Vec2, Vec3, Vec4};
use std::fmt;
use std::rc::Rc;

/// Computes and sets a uniform at apply time.
pub type UniformCallback = Rc<dyn Fn(&Program, &Uniform)>;

#[derive(Clone)]
pub enum Value {
    Float(GLfloat),
    Int(GLint),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    Texture { id: GLuint, unit: GLuint },
    Callback(UniformCallback),
}

impl Value {
    /// Whether a uniform of GL type `kind` can be set from this value.
    pub fn fits(&self, kind: GLenum) -> bool {
        match self {
            Value::Float(_) => kind == gl::FLOAT,
            Value::Int(_) => matches!(kind, gl::INT | gl::BOOL | gl::SAMPLER_2D | gl::SAMPLER_CUBE),
            Value::Vec2(_) => kind == gl::FLOAT_VEC2,
            Value::Vec3(_) => kind == gl::FLOAT_VEC3,
            Value::Vec4(_) => kind == gl::FLOAT_VEC4,
            Value::Mat4(_) => kind == gl::FLOAT_MAT4,
            Value::Texture { .. } => matches!(kind, gl::SAMPLER_2D | gl::SAMPLER_CUBE),
            Value::Callback(_) => true,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::Int(x) => f.debug_tuple("Int").field(x).finish(),
            Value::Vec2(v) => f.debug_tuple("Vec2").field(v).finish(),
            Value::Vec3(v) => f.debug_tuple("Vec3").field(v).finish(),
            Value::Vec4(v) => f.debug_tuple("Vec4").field(v).finish(),
            Value::Mat4(m) => f.debug_tuple("Mat4").field(m).finish(),
            Value::Texture { id, unit } => f
                .debug_struct("Texture")
                .field("id", id)
                .field("unit", unit)
                .finish(),
            Value::Callback(_) => f.write_str("Callback"),
        }
    }
}

/// The value a program state holds for one uniform.
#[derive(Clone, Debug, Default)]
pub struct UniformValue {
    value: Option<Value>,
}

impl UniformValue {
    /// The all-zero value for a uniform of GL type `kind`. Types no setter
    /// produces start out empty.
    pub fn zeroed(kind: GLenum) -> Self {
        let value = match kind {
            gl::FLOAT => Some(Value::Float(0.)),
            gl::INT | gl::BOOL => Some(Value::Int(0)),
            gl::FLOAT_VEC2 => Some(Value::Vec2(Vec2::ZERO)),
            gl::FLOAT_VEC3 => Some(Value::Vec3(Vec3::ZERO)),
            gl::FLOAT_VEC4 => Some(Value::Vec4(Vec4::ZERO)),
            gl::FLOAT_MAT4 => Some(Value::Mat4(Mat4::ZERO)),
            gl::SAMPLER_2D | gl::SAMPLER_CUBE => Some(Value::Texture { id: 0, unit: 0 }),
            _ => None,
        };
        Self { value }
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn uses_callback(&self) -> bool {
        matches!(self.value, Some(Value::Callback(_)))
    }

    /// Unit of the texture currently held, if any.
    pub fn texture_unit(&self) -> Option<GLuint> {
        match self.value {
            Some(Value::Texture { unit, .. }) => Some(unit),
            _ => None,
        }
    }

    pub fn set(&mut self, value: Value) {
        self.value = Some(value);
    }

    pub fn set_float(&mut self, x: f32) {
        self.set(Value::Float(x));
    }

    pub fn set_int(&mut self, x: i32) {
        self.set(Value::Int(x));
    }

    pub fn set_vec2(&mut self, v: Vec2) {
        self.set(Value::Vec2(v));
    }

    pub fn set_vec3(&mut self, v: Vec3) {
        self.set(Value::Vec3(v));
    }

    pub fn set_vec4(&mut self, v: Vec4) {
        self.set(Value::Vec4(v));
    }

    pub fn set_mat4(&mut self, m: Mat4) {
        self.set(Value::Mat4(m));
    }

    pub fn set_texture(&mut self, id: GLuint, unit: GLuint) {
        self.set(Value::Texture { id, unit });
    }

    pub fn set_callback(&mut self, callback: impl Fn(&Program, &Uniform) + 'static) {
        self.set(Value::Callback(Rc::new(callback)));
    }

    /// Pushes the held value to `uniform` of `program`, which must be in use.
    pub fn apply(&self, program: &Program, uniform: &Uniform) {
        let location = uniform.location;
        match &self.value {
            None => {}
            Some(Value::Callback(callback)) => callback(program, uniform),
            Some(Value::Float(x)) => program.set_uniform_f32(location, *x),
            Some(Value::Int(x)) => program.set_uniform_i32(location, *x),
            Some(Value::Vec2(v)) => program.set_uniform_vec2(location, *v),
            Some(Value::Vec3(v)) => program.set_uniform_vec3(location, *v),
            Some(Value::Vec4(v)) => program.set_uniform_vec4(location, *v),
            Some(Value::Mat4(m)) => program.set_uniform_mat4(location, m),
            Some(Value::Texture { id, unit }) => {
                let target = match uniform.kind {
                    gl::SAMPLER_CUBE => gl::TEXTURE_CUBE_MAP,
                    _ => gl::TEXTURE_2D,
                };
                program.set_uniform_i32(location, *unit as GLint);
                program.context().bind_texture_n(*unit, target, *id);
            }
        }
    }
}
