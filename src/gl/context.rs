use super::{types::*, Gl};
use glam::Mat4;
use log::trace;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro128Plus;
use std::cell::{Cell, RefCell};
use std::ops::Deref;
use std::rc::Rc;

/// Vertex attribute slots tracked by [`Context::enable_vertex_attribs`].
pub const MAX_VERTEX_ATTRIBS: GLuint = 16;
/// Texture units whose bindings are cached.
pub const MAX_TEXTURE_UNITS: GLuint = 16;

const DEFAULT_SEED: u64 = 0x5eed_0f_5ade5;

pub type RcContext = Rc<Context>;

/// A [`Gl`] plus a client side copy of the state this crate changes, so that
/// redundant calls can be skipped, and the per-frame values built-in uniforms
/// read from.
///
/// Cached state is `None` when unknown, and the next change always reaches
/// the context.
pub struct Context {
    gl: Rc<dyn Gl>,
    current_program: Cell<Option<GLuint>>,
    enabled_attribs: Cell<Option<u32>>,
    active_unit: Cell<Option<GLuint>>,
    bound_textures: RefCell<[Option<GLuint>; MAX_TEXTURE_UNITS as usize]>,
    projection: Cell<Mat4>,
    time: Cell<f32>,
    rng: RefCell<Xoshiro128Plus>,
}

impl Context {
    pub fn new(gl: Rc<dyn Gl>) -> Self {
        Self::with_seed(gl, DEFAULT_SEED)
    }

    pub fn with_seed(gl: Rc<dyn Gl>, seed: u64) -> Self {
        Self {
            gl,
            current_program: Cell::new(Some(0)),
            enabled_attribs: Cell::new(Some(0)),
            active_unit: Cell::new(Some(0)),
            bound_textures: RefCell::new([Some(0); MAX_TEXTURE_UNITS as usize]),
            projection: Cell::new(Mat4::IDENTITY),
            time: Cell::new(0.),
            rng: RefCell::new(Xoshiro128Plus::seed_from_u64(seed)),
        }
    }

    pub fn use_program(&self, program: GLuint) {
        if self.current_program.get() != Some(program) {
            self.gl.use_program(program);
            self.current_program.set(Some(program));
        }
    }

    /// `None` after [`Context::invalidate`] until a program is used again.
    pub fn current_program(&self) -> Option<GLuint> {
        self.current_program.get()
    }

    /// Enables the slots whose bit is set in `flags` and disables all others.
    pub fn enable_vertex_attribs(&self, flags: u32) {
        let enabled = self.enabled_attribs.get();
        for index in 0..MAX_VERTEX_ATTRIBS {
            let bit = 1 << index;
            let wanted = flags & bit != 0;
            if enabled.map_or(true, |enabled| wanted != (enabled & bit != 0)) {
                if wanted {
                    self.gl.enable_vertex_attrib_array(index);
                } else {
                    self.gl.disable_vertex_attrib_array(index);
                }
            }
        }
        self.enabled_attribs.set(Some(flags));
    }

    /// `None` after [`Context::invalidate`] until slots are enabled again.
    pub fn enabled_vertex_attribs(&self) -> Option<u32> {
        self.enabled_attribs.get()
    }

    /// Binds `texture` to texture unit `unit` (a plain index, not an enum).
    pub fn bind_texture_n(&self, unit: GLuint, target: GLenum, texture: GLuint) {
        let mut bound = self.bound_textures.borrow_mut();
        let cached = bound.get_mut(unit as usize);
        if cached.as_deref() == Some(&Some(texture)) {
            return;
        }

        if self.active_unit.get() != Some(unit) {
            self.gl.active_texture(super::TEXTURE0 + unit);
            self.active_unit.set(Some(unit));
        }
        self.gl.bind_texture(target, texture);

        match cached {
            Some(cached) => *cached = Some(texture),
            None => trace!("Texture unit {} is beyond the binding cache", unit),
        }
    }

    /// Forgets all cached state, for when something else has touched the context.
    pub fn invalidate(&self) {
        trace!("Context state cache invalidated");
        self.current_program.set(None);
        self.enabled_attribs.set(None);
        self.active_unit.set(None);
        self.bound_textures.replace([None; MAX_TEXTURE_UNITS as usize]);
    }

    pub fn set_projection(&self, projection: Mat4) {
        self.projection.set(projection);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection.get()
    }

    /// Seconds since the start of rendering.
    pub fn set_time(&self, secs: f32) {
        self.time.set(secs);
    }

    pub fn time(&self) -> f32 {
        self.time.get()
    }

    /// A random number in `[0, 1)`.
    pub fn random01(&self) -> f32 {
        self.rng.borrow_mut().gen()
    }
}

impl Deref for Context {
    type Target = dyn Gl;

    fn deref(&self) -> &Self::Target {
        self.gl.as_ref()
    }
}
