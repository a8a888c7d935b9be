use crate::gl::{self, types::*, ActiveVariable, RcContext};
use glam::{Mat4, Vec2, Vec3, Vec4};
use log::{debug, trace, warn};
use std::collections::HashMap;

/// A uniform declared by a program.
#[derive(Clone, Debug, PartialEq)]
pub struct Uniform {
    pub name: String,
    pub location: GLint,
    pub size: GLint,
    pub kind: GLenum,
}

/// A vertex attribute declared by a program.
#[derive(Clone, Debug, PartialEq)]
pub struct VertexAttrib {
    pub name: String,
    pub index: GLuint,
    pub size: GLint,
    pub kind: GLenum,
}

/// Uniforms set by [`Program::set_uniforms_for_builtins`] rather than by
/// program states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    Projection,
    ModelView,
    ModelViewProjection,
    Time,
    SinTime,
    CosTime,
    Random01,
    Texture0,
}

impl Builtin {
    pub const ALL: [Builtin; 8] = [
        Builtin::Projection,
        Builtin::ModelView,
        Builtin::ModelViewProjection,
        Builtin::Time,
        Builtin::SinTime,
        Builtin::CosTime,
        Builtin::Random01,
        Builtin::Texture0,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Projection => "u_projection",
            Builtin::ModelView => "u_model_view",
            Builtin::ModelViewProjection => "u_mvp",
            Builtin::Time => "u_time",
            Builtin::SinTime => "u_sin_time",
            Builtin::CosTime => "u_cos_time",
            Builtin::Random01 => "u_random01",
            Builtin::Texture0 => "u_texture0",
        }
    }

    pub fn from_name(name: &str) -> Option<Builtin> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }
}

/// Array uniforms are reported as `name[0]`.
fn strip_array_suffix(name: &str) -> &str {
    name.strip_suffix("[0]").unwrap_or(name)
}

/// A linked shader program and what it declares.
///
/// The GL program object belongs to whoever linked it, dropping this does not
/// delete it.
pub struct Program {
    ctx: RcContext,
    handle: GLuint,
    uniforms: HashMap<String, Uniform>,
    attributes: HashMap<String, VertexAttrib>,
    builtins: [Option<GLint>; Builtin::ALL.len()],
}

impl Program {
    /// Wraps `handle` and introspects its active uniforms and attributes.
    pub fn from_linked(ctx: RcContext, handle: GLuint) -> Program {
        let mut uniforms = HashMap::new();
        let mut builtins = [None; Builtin::ALL.len()];

        for ActiveVariable { name, size, kind } in ctx.active_uniforms(handle) {
            let Some(location) = ctx.uniform_location(handle, &name) else {
                trace!("Program {} uniform {} has no location", handle, name);
                continue;
            };
            let name = strip_array_suffix(&name).to_string();

            match Builtin::from_name(&name) {
                Some(builtin) => builtins[builtin as usize] = Some(location),
                None => {
                    uniforms.insert(
                        name.clone(),
                        Uniform {
                            name,
                            location,
                            size,
                            kind,
                        },
                    );
                }
            }
        }

        let mut attributes = HashMap::new();
        for ActiveVariable { name, size, kind } in ctx.active_attributes(handle) {
            let Some(index) = ctx.attrib_location(handle, &name) else {
                trace!("Program {} attribute {} has no location", handle, name);
                continue;
            };
            if index >= gl::MAX_VERTEX_ATTRIBS {
                warn!(
                    "Program {} attribute {} at slot {} is beyond the tracked slots",
                    handle, name, index
                );
            }
            attributes.insert(
                name.clone(),
                VertexAttrib {
                    name,
                    index,
                    size,
                    kind,
                },
            );
        }

        debug!(
            "Program {} has {} uniforms, {} built-ins and {} attributes",
            handle,
            uniforms.len(),
            builtins.iter().flatten().count(),
            attributes.len()
        );

        Program {
            ctx,
            handle,
            uniforms,
            attributes,
            builtins,
        }
    }

    pub fn handle(&self) -> GLuint {
        self.handle
    }

    pub fn context(&self) -> &RcContext {
        &self.ctx
    }

    /// User uniforms, built-ins excluded.
    pub fn uniforms(&self) -> &HashMap<String, Uniform> {
        &self.uniforms
    }

    pub fn attributes(&self) -> &HashMap<String, VertexAttrib> {
        &self.attributes
    }

    pub fn uniform(&self, name: &str) -> Option<&Uniform> {
        self.uniforms.get(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&VertexAttrib> {
        self.attributes.get(name)
    }

    pub fn builtin_location(&self, builtin: Builtin) -> Option<GLint> {
        self.builtins[builtin as usize]
    }

    /// True when there is nothing to set on this program at all.
    pub fn declares_nothing(&self) -> bool {
        self.uniforms.is_empty()
            && self.attributes.is_empty()
            && self.builtins.iter().all(Option::is_none)
    }

    pub fn use_program(&self) {
        self.ctx.use_program(self.handle);
    }

    pub fn set_uniform_i32(&self, location: GLint, x: i32) {
        self.ctx.uniform_1i(location, x);
    }

    pub fn set_uniform_f32(&self, location: GLint, x: f32) {
        self.ctx.uniform_1f(location, x);
    }

    pub fn set_uniform_vec2(&self, location: GLint, v: Vec2) {
        self.ctx.uniform_2f(location, v.x, v.y);
    }

    pub fn set_uniform_vec3(&self, location: GLint, v: Vec3) {
        self.ctx.uniform_3f(location, v.x, v.y, v.z);
    }

    pub fn set_uniform_vec4(&self, location: GLint, v: Vec4) {
        self.ctx.uniform_4f(location, v.x, v.y, v.z, v.w);
    }

    pub fn set_uniform_mat4(&self, location: GLint, m: &Mat4) {
        self.ctx
            .uniform_matrix_4fv(location, bytemuck::cast_ref::<Mat4, [f32; 16]>(m));
    }

    /// Sets every built-in uniform this program declares. The program must be
    /// in use.
    pub fn set_uniforms_for_builtins(&self, model_view: &Mat4) {
        let projection = self.ctx.projection();
        let t = self.ctx.time();

        for builtin in Builtin::ALL {
            let Some(location) = self.builtin_location(builtin) else {
                continue;
            };
            match builtin {
                Builtin::Projection => self.set_uniform_mat4(location, &projection),
                Builtin::ModelView => self.set_uniform_mat4(location, model_view),
                Builtin::ModelViewProjection => {
                    self.set_uniform_mat4(location, &(projection * *model_view))
                }
                Builtin::Time => {
                    self.set_uniform_vec4(location, Vec4::new(t / 10., t, t * 2., t * 4.))
                }
                Builtin::SinTime => self.set_uniform_vec4(
                    location,
                    Vec4::new((t / 8.).sin(), (t / 4.).sin(), (t / 2.).sin(), t.sin()),
                ),
                Builtin::CosTime => self.set_uniform_vec4(
                    location,
                    Vec4::new((t / 8.).cos(), (t / 4.).cos(), (t / 2.).cos(), t.cos()),
                ),
                Builtin::Random01 => self.set_uniform_vec4(
                    location,
                    Vec4::new(
                        self.ctx.random01(),
                        self.ctx.random01(),
                        self.ctx.random01(),
                        self.ctx.random01(),
                    ),
                ),
                Builtin::Texture0 => self.set_uniform_i32(location, 0),
            }
        }
    }
}
