use crate::gl::{self, types::*};
use crate::program::{Program, Uniform, VertexAttrib};
use crate::texture::Texture;
use crate::uniform_value::{UniformValue, Value};
use crate::vertex_attrib_value::VertexAttribValue;
use crate::Error;
use glam::{Mat4, Vec2, Vec3, Vec4};
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// First texture unit handed to texture uniforms. Unit 0 belongs to the
/// built-in sampler.
pub const BASE_TEXTURE_UNIT: GLuint = 1;

/// Uniform and attribute values for one program.
///
/// A program can be drawn by any number of nodes, and nodes that want the
/// same values share one state through an `Rc`. A node that needs values of
/// its own gets a private copy with `Rc::make_mut` before setting them.
#[derive(Clone)]
pub struct ProgramState {
    program: Rc<Program>,
    uniforms: HashMap<String, UniformValue>,
    attributes: HashMap<String, VertexAttribValue>,
    texture_unit_index: GLuint,
    vertex_attribs_flags: u32,
}

impl ProgramState {
    pub fn new(program: Rc<Program>) -> Result<Self, Error> {
        if program.handle() == 0 {
            return Err(Error::NullProgram);
        }
        if program.declares_nothing() {
            return Err(Error::EmptyProgram(program.handle()));
        }
        Ok(Self::build(program))
    }

    /// A new state of its own, not shared with any cache.
    pub fn create(program: Rc<Program>) -> Result<Rc<Self>, Error> {
        Self::new(program).map(Rc::new)
    }

    fn build(program: Rc<Program>) -> Self {
        let uniforms: HashMap<_, _> = program
            .uniforms()
            .values()
            .map(|u| (u.name.clone(), UniformValue::zeroed(u.kind)))
            .collect();
        let attributes: HashMap<_, _> = program
            .attributes()
            .keys()
            .map(|name| (name.clone(), VertexAttribValue::default()))
            .collect();

        debug!(
            "State for program {} with {} uniforms and {} attributes",
            program.handle(),
            uniforms.len(),
            attributes.len()
        );

        Self {
            program,
            uniforms,
            attributes,
            texture_unit_index: BASE_TEXTURE_UNIT,
            vertex_attribs_flags: 0,
        }
    }

    pub fn program(&self) -> &Rc<Program> {
        &self.program
    }

    /// Switches to `program`. Every value set so far is dropped. On error the
    /// state is left as it was.
    pub fn set_program(&mut self, program: Rc<Program>) -> Result<(), Error> {
        *self = Self::new(program)?;
        Ok(())
    }

    /// Drops every value set so far.
    pub fn reset_program(&mut self) {
        *self = Self::build(self.program.clone());
    }

    /// Binds the program and pushes every value to it. Call right before drawing.
    pub fn apply(&self, model_view: &Mat4) {
        let program = self.program.as_ref();
        program.use_program();
        program.set_uniforms_for_builtins(model_view);

        program
            .context()
            .enable_vertex_attribs(self.vertex_attribs_flags);
        for (name, value) in &self.attributes {
            if let Some(attrib) = program.attribute(name) {
                value.apply(program, attrib);
            }
        }

        for (name, value) in &self.uniforms {
            if let Some(uniform) = program.uniform(name) {
                value.apply(program, uniform);
            }
        }
    }

    // Vertex attributes

    /// Bit `i` is set when the attribute in slot `i` takes part in draws.
    pub fn vertex_attribs_flags(&self) -> u32 {
        self.vertex_attribs_flags
    }

    pub fn vertex_attrib_count(&self) -> usize {
        self.attributes.len()
    }

    pub fn vertex_attrib_value(&self, name: &str) -> Option<&VertexAttribValue> {
        self.attributes.get(name)
    }

    pub fn set_vertex_attrib_pointer(
        &mut self,
        name: &str,
        size: GLint,
        kind: GLenum,
        normalized: bool,
        stride: GLsizei,
        offset: usize,
    ) {
        if let Some(value) = self.vertex_attrib_value_mut(name) {
            value.set_pointer(size, kind, normalized, stride, offset);
            self.set_attrib_bit(name, true);
        }
    }

    pub fn set_vertex_attrib_callback(
        &mut self,
        name: &str,
        callback: impl Fn(&Program, &VertexAttrib) + 'static,
    ) {
        if let Some(value) = self.vertex_attrib_value_mut(name) {
            value.set_callback(callback);
            self.set_attrib_bit(name, true);
        }
    }

    /// Leaves the attribute out of draws until it is set again.
    pub fn disable_vertex_attrib(&mut self, name: &str) {
        if let Some(value) = self.vertex_attrib_value_mut(name) {
            value.disable();
            self.set_attrib_bit(name, false);
        }
    }

    fn vertex_attrib_value_mut(&mut self, name: &str) -> Option<&mut VertexAttribValue> {
        let value = self.attributes.get_mut(name);
        if value.is_none() {
            warn!(
                "Program {} has no vertex attribute {}",
                self.program.handle(),
                name
            );
        }
        value
    }

    fn set_attrib_bit(&mut self, name: &str, on: bool) {
        let Some(attrib) = self.program.attribute(name) else {
            return;
        };
        let Some(bit) = 1u32.checked_shl(attrib.index) else {
            warn!("Vertex attribute {} slot {} doesn't fit the flags", name, attrib.index);
            return;
        };
        if on {
            self.vertex_attribs_flags |= bit;
        } else {
            self.vertex_attribs_flags &= !bit;
        }
    }

    // Uniforms

    pub fn uniform_count(&self) -> usize {
        self.uniforms.len()
    }

    pub fn uniform_value(&self, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(name)
    }

    pub fn set_uniform_int(&mut self, name: &str, x: i32) {
        self.set_uniform(name, Value::Int(x));
    }

    pub fn set_uniform_float(&mut self, name: &str, x: f32) {
        self.set_uniform(name, Value::Float(x));
    }

    pub fn set_uniform_vec2(&mut self, name: &str, v: Vec2) {
        self.set_uniform(name, Value::Vec2(v));
    }

    pub fn set_uniform_vec3(&mut self, name: &str, v: Vec3) {
        self.set_uniform(name, Value::Vec3(v));
    }

    pub fn set_uniform_vec4(&mut self, name: &str, v: Vec4) {
        self.set_uniform(name, Value::Vec4(v));
    }

    pub fn set_uniform_mat4(&mut self, name: &str, m: Mat4) {
        self.set_uniform(name, Value::Mat4(m));
    }

    pub fn set_uniform_callback(
        &mut self,
        name: &str,
        callback: impl Fn(&Program, &Uniform) + 'static,
    ) {
        self.set_uniform(name, Value::Callback(Rc::new(callback)));
    }

    pub fn set_uniform_texture(&mut self, name: &str, texture: &dyn Texture) {
        self.set_uniform_texture_id(name, texture.handle());
    }

    /// Binds texture `id` to the uniform. Each texture uniform keeps the unit
    /// it was first given.
    pub fn set_uniform_texture_id(&mut self, name: &str, id: GLuint) {
        let handle = self.program.handle();
        if !self.uniforms.contains_key(name) {
            warn!("Program {} has no uniform {}", handle, name);
            return;
        }
        self.check_fits(name, &Value::Texture { id, unit: 0 });
        let Some(value) = self.uniforms.get_mut(name) else {
            return;
        };

        let unit = match value.texture_unit() {
            Some(unit) if unit >= BASE_TEXTURE_UNIT => unit,
            _ => {
                let unit = self.texture_unit_index;
                self.texture_unit_index += 1;
                if unit >= gl::MAX_TEXTURE_UNITS {
                    warn!("Program {} uniform {} got texture unit {}", handle, name, unit);
                }
                unit
            }
        };
        value.set_texture(id, unit);
    }

    fn set_uniform(&mut self, name: &str, value: Value) {
        if self.program.uniform(name).is_none() {
            warn!("Program {} has no uniform {}", self.program.handle(), name);
            return;
        }
        self.check_fits(name, &value);
        if let Some(slot) = self.uniforms.get_mut(name) {
            slot.set(value);
        }
    }

    /// Warns when `value` does not match the declared type of uniform `name`.
    /// The value is stored either way.
    fn check_fits(&self, name: &str, value: &Value) -> bool {
        let Some(uniform) = self.program.uniform(name) else {
            return false;
        };
        let fits = value.fits(uniform.kind);
        if !fits {
            warn!(
                "Setting {:?} on {} uniform {} of program {}",
                value,
                gl::type_name(uniform.kind),
                name,
                self.program.handle()
            );
        }
        fits
    }
}

impl fmt::Debug for ProgramState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ProgramState")
            .field("program", &self.program.handle())
            .field("uniforms", &self.uniforms)
            .field("attributes", &self.attributes)
            .field("texture_unit_index", &self.texture_unit_index)
            .field("vertex_attribs_flags", &self.vertex_attribs_flags)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::trace::{Call, TraceGl};
    use crate::gl::{Context, FLOAT, FLOAT_MAT4, FLOAT_VEC2, FLOAT_VEC3, FLOAT_VEC4, SAMPLER_2D};
    use std::cell::Cell;

    struct Fixture {
        gl: Rc<TraceGl>,
        ctx: Rc<Context>,
    }

    impl Fixture {
        fn new() -> Self {
            let gl = Rc::new(TraceGl::new());
            gl.declare_program(
                1,
                &[
                    ("u_mvp", FLOAT_MAT4),
                    ("u_color", FLOAT_VEC4),
                    ("u_diffuse", SAMPLER_2D),
                    ("u_normals", SAMPLER_2D),
                    ("u_fade", FLOAT),
                ],
                &[("a_position", FLOAT_VEC3), ("a_tex_coord", FLOAT_VEC2), ("a_normal", FLOAT_VEC3)],
            );
            gl.declare_program(2, &[("u_color", FLOAT_VEC4)], &[("a_position", FLOAT_VEC3)]);
            gl.declare_program(3, &[], &[]);
            let ctx = Rc::new(Context::new(gl.clone()));
            Self { gl, ctx }
        }

        fn program(&self, handle: GLuint) -> Rc<Program> {
            Rc::new(Program::from_linked(self.ctx.clone(), handle))
        }

        fn state(&self) -> ProgramState {
            ProgramState::new(self.program(1)).unwrap()
        }
    }

    fn uniform_calls(calls: &[Call], location: GLint) -> Vec<Call> {
        calls
            .iter()
            .filter(|c| c.uniform_location() == Some(location))
            .cloned()
            .collect()
    }

    #[test]
    fn init_builds_one_value_per_declared_name() {
        let fixture = Fixture::new();
        let state = fixture.state();

        // u_mvp is a built-in
        assert_eq!(state.uniform_count(), 4);
        assert_eq!(state.vertex_attrib_count(), 3);
        assert_eq!(state.vertex_attribs_flags(), 0);
        assert!(state.uniform_value("u_mvp").is_none());
        assert!(state.vertex_attrib_value("a_normal").is_some());
    }

    #[test]
    fn init_rejects_unusable_programs() {
        let fixture = Fixture::new();
        assert_eq!(
            ProgramState::new(fixture.program(3)).unwrap_err(),
            Error::EmptyProgram(3)
        );
        assert_eq!(
            ProgramState::new(fixture.program(0)).unwrap_err(),
            Error::NullProgram
        );
    }

    #[test]
    fn apply_pushes_last_set_value() {
        let fixture = Fixture::new();
        let mut state = fixture.state();
        state.set_uniform_vec4("u_color", Vec4::ONE);
        state.set_uniform_vec4("u_color", Vec4::new(1., 0., 0., 1.));
        state.set_uniform_float("u_fade", 0.25);

        state.apply(&Mat4::IDENTITY);
        let calls = fixture.gl.take_calls();

        assert_eq!(calls[0], Call::UseProgram(1));
        assert_eq!(
            uniform_calls(&calls, 1),
            vec![Call::Uniform4f(1, [1., 0., 0., 1.])]
        );
        assert_eq!(uniform_calls(&calls, 4), vec![Call::Uniform1f(4, 0.25)]);
        assert_eq!(
            uniform_calls(&calls, 0),
            vec![Call::UniformMatrix4fv(0, Mat4::IDENTITY.to_cols_array())]
        );
    }

    #[test]
    fn uniform_callback_runs_once_per_apply() {
        let fixture = Fixture::new();
        let mut state = fixture.state();
        let runs = Rc::new(Cell::new(0));

        state.set_uniform_float("u_fade", 3.);
        let counter = runs.clone();
        state.set_uniform_callback("u_fade", move |program, uniform| {
            counter.set(counter.get() + 1);
            program.set_uniform_f32(uniform.location, 0.5);
        });

        state.apply(&Mat4::IDENTITY);
        assert_eq!(runs.get(), 1);
        state.apply(&Mat4::IDENTITY);
        assert_eq!(runs.get(), 2);

        let calls = fixture.gl.take_calls();
        assert_eq!(
            uniform_calls(&calls, 4),
            vec![Call::Uniform1f(4, 0.5), Call::Uniform1f(4, 0.5)]
        );
    }

    #[test]
    fn attribute_flags_track_set_attributes() {
        let fixture = Fixture::new();
        let mut state = fixture.state();
        state.set_vertex_attrib_pointer("a_position", 3, FLOAT, false, 32, 0);
        state.set_vertex_attrib_callback("a_normal", |_, _| {});

        assert_eq!(state.vertex_attribs_flags(), 0b101);

        state.disable_vertex_attrib("a_normal");
        assert_eq!(state.vertex_attribs_flags(), 0b001);
        assert!(!state.vertex_attrib_value("a_normal").unwrap().is_enabled());
    }

    #[test]
    fn apply_enables_exactly_the_flagged_slots() {
        let fixture = Fixture::new();
        let mut state = fixture.state();
        state.set_vertex_attrib_pointer("a_tex_coord", 2, FLOAT, false, 20, 12);

        state.apply(&Mat4::IDENTITY);
        let calls = fixture.gl.take_calls();

        assert!(calls.contains(&Call::EnableVertexAttribArray(1)));
        assert!(!calls.contains(&Call::EnableVertexAttribArray(0)));
        assert!(!calls.contains(&Call::EnableVertexAttribArray(2)));
        assert!(calls.contains(&Call::VertexAttribPointer {
            index: 1,
            size: 2,
            kind: FLOAT,
            normalized: false,
            stride: 20,
            offset: 12,
        }));
        assert_eq!(
            calls
                .iter()
                .filter(|c| matches!(c, Call::VertexAttribPointer { .. }))
                .count(),
            1
        );
        assert_eq!(fixture.ctx.enabled_vertex_attribs(), Some(0b010));
    }

    #[test]
    fn texture_uniforms_get_distinct_units() {
        let fixture = Fixture::new();
        let mut state = fixture.state();
        state.set_uniform_texture_id("u_diffuse", 10);
        state.set_uniform_texture("u_normals", &11u32);
        // Re-setting keeps the unit.
        state.set_uniform_texture_id("u_diffuse", 12);

        let diffuse = state.uniform_value("u_diffuse").unwrap().texture_unit();
        let normals = state.uniform_value("u_normals").unwrap().texture_unit();
        assert_eq!(diffuse, Some(BASE_TEXTURE_UNIT));
        assert_eq!(normals, Some(BASE_TEXTURE_UNIT + 1));

        state.apply(&Mat4::IDENTITY);
        let calls = fixture.gl.take_calls();
        assert_eq!(uniform_calls(&calls, 2), vec![Call::Uniform1i(2, 1)]);
        assert_eq!(uniform_calls(&calls, 3), vec![Call::Uniform1i(3, 2)]);
        assert!(calls.contains(&Call::BindTexture(gl::TEXTURE_2D, 12)));
        assert!(calls.contains(&Call::BindTexture(gl::TEXTURE_2D, 11)));
        assert!(!calls.contains(&Call::BindTexture(gl::TEXTURE_2D, 10)));
    }

    #[test]
    fn texture_on_non_sampler_is_flagged_but_stored() {
        let fixture = Fixture::new();
        let mut state = fixture.state();
        let texture = Value::Texture { id: 4, unit: 0 };
        assert!(state.check_fits("u_diffuse", &texture));
        assert!(!state.check_fits("u_fade", &texture));
        assert!(!state.check_fits("u_fade", &Value::Vec4(Vec4::ONE)));

        state.set_uniform_texture_id("u_fade", 4);
        assert_eq!(
            state.uniform_value("u_fade").and_then(UniformValue::texture_unit),
            Some(BASE_TEXTURE_UNIT)
        );
    }

    #[test]
    fn unknown_names_are_ignored() {
        let fixture = Fixture::new();
        let mut state = fixture.state();
        state.set_uniform_float("u_colour", 1.);
        state.set_uniform_texture_id("u_missing", 4);
        state.set_vertex_attrib_pointer("a_missing", 3, FLOAT, false, 0, 0);

        assert_eq!(state.uniform_count(), 4);
        assert!(state.uniform_value("u_colour").is_none());
        assert_eq!(state.vertex_attribs_flags(), 0);
        assert_eq!(state.texture_unit_index, BASE_TEXTURE_UNIT);
    }

    #[test]
    fn set_program_discards_old_values() {
        let fixture = Fixture::new();
        let mut state = fixture.state();
        state.set_uniform_vec4("u_color", Vec4::ONE);
        state.set_vertex_attrib_pointer("a_position", 3, FLOAT, false, 0, 0);

        state.set_program(fixture.program(2)).unwrap();

        assert_eq!(state.program().handle(), 2);
        assert_eq!(state.uniform_count(), 1);
        assert_eq!(state.vertex_attribs_flags(), 0);
        match state.uniform_value("u_color").and_then(UniformValue::value) {
            Some(Value::Vec4(v)) => assert_eq!(*v, Vec4::ZERO),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn failed_set_program_keeps_state() {
        let fixture = Fixture::new();
        let mut state = fixture.state();
        state.set_uniform_float("u_fade", 2.);

        assert!(state.set_program(fixture.program(3)).is_err());
        assert_eq!(state.program().handle(), 1);
        assert!(matches!(
            state.uniform_value("u_fade").and_then(UniformValue::value),
            Some(Value::Float(x)) if *x == 2.
        ));
    }

    #[test]
    fn reset_program_zeroes_values() {
        let fixture = Fixture::new();
        let mut state = fixture.state();
        state.set_uniform_float("u_fade", 2.);
        state.set_uniform_texture_id("u_diffuse", 8);

        state.reset_program();

        assert!(matches!(
            state.uniform_value("u_fade").and_then(UniformValue::value),
            Some(Value::Float(x)) if *x == 0.
        ));
        assert_eq!(state.texture_unit_index, BASE_TEXTURE_UNIT);
    }

    #[test]
    fn shared_state_is_copied_on_write() {
        let fixture = Fixture::new();
        let shared = ProgramState::create(fixture.program(1)).unwrap();
        let mut node = shared.clone();

        Rc::make_mut(&mut node).set_uniform_float("u_fade", 1.);

        assert!(!Rc::ptr_eq(&shared, &node));
        assert!(matches!(
            shared.uniform_value("u_fade").and_then(UniformValue::value),
            Some(Value::Float(x)) if *x == 0.
        ));
    }

    #[test]
    fn second_apply_skips_redundant_state_changes() {
        let fixture = Fixture::new();
        let mut state = fixture.state();
        state.set_vertex_attrib_pointer("a_position", 3, FLOAT, false, 0, 0);
        state.set_uniform_texture_id("u_diffuse", 5);

        state.apply(&Mat4::IDENTITY);
        fixture.gl.take_calls();
        state.apply(&Mat4::IDENTITY);
        let calls = fixture.gl.take_calls();

        assert!(!calls.iter().any(|c| matches!(
            c,
            Call::UseProgram(_)
                | Call::EnableVertexAttribArray(_)
                | Call::BindTexture(..)
                | Call::ActiveTexture(_)
        )));
    }
}
