use crate::gl::types::*;
use crate::program::Program;
use crate::program_state::ProgramState;
use crate::Error;
use log::{debug, trace};
use std::collections::HashMap;
use std::rc::Rc;

/// Linked programs by name.
#[derive(Default)]
pub struct ProgramCache {
    programs: HashMap<String, Rc<Program>>,
}

impl ProgramCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `program` under `name`, returning the program it replaces.
    pub fn add_program(&mut self, name: &str, program: Rc<Program>) -> Option<Rc<Program>> {
        trace!("Program {} registered as {}", program.handle(), name);
        self.programs.insert(name.to_string(), program)
    }

    pub fn program(&self, name: &str) -> Option<&Rc<Program>> {
        self.programs.get(name)
    }

    pub fn remove_program(&mut self, name: &str) -> Option<Rc<Program>> {
        self.programs.remove(name)
    }
}

/// One shared [`ProgramState`] per program, created on first request.
#[derive(Default)]
pub struct ProgramStateCache {
    states: HashMap<GLuint, Rc<ProgramState>>,
}

impl ProgramStateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_create_with_program(
        &mut self,
        program: &Rc<Program>,
    ) -> Result<Rc<ProgramState>, Error> {
        if let Some(state) = self.states.get(&program.handle()) {
            return Ok(state.clone());
        }

        let state = ProgramState::create(program.clone())?;
        debug!("Cached a state for program {}", program.handle());
        self.states.insert(program.handle(), state.clone());
        Ok(state)
    }

    pub fn get_or_create_with_program_name(
        &mut self,
        programs: &ProgramCache,
        name: &str,
    ) -> Result<Rc<ProgramState>, Error> {
        let program = programs
            .program(name)
            .ok_or_else(|| Error::UnknownProgram(name.to_string()))?;
        self.get_or_create_with_program(program)
    }

    /// Drops the states nothing outside the cache holds on to.
    pub fn remove_unused(&mut self) {
        let before = self.states.len();
        self.states.retain(|_, state| Rc::strong_count(state) > 1);
        debug!("Removed {} unused program states", before - self.states.len());
    }

    pub fn remove_all(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gl::trace::TraceGl;
    use crate::gl::{Context, FLOAT, FLOAT_VEC3};

    fn programs() -> ProgramCache {
        let gl = Rc::new(TraceGl::new());
        gl.declare_program(1, &[("u_fade", FLOAT)], &[("a_position", FLOAT_VEC3)]);
        gl.declare_program(2, &[], &[]);
        let ctx = Rc::new(Context::new(gl));

        let mut programs = ProgramCache::new();
        programs.add_program("fade", Rc::new(Program::from_linked(ctx.clone(), 1)));
        programs.add_program("empty", Rc::new(Program::from_linked(ctx, 2)));
        programs
    }

    #[test]
    fn same_program_gives_same_state() {
        let programs = programs();
        let program = programs.program("fade").unwrap();
        let mut cache = ProgramStateCache::new();

        let a = cache.get_or_create_with_program(program).unwrap();
        let b = cache.get_or_create_with_program(program).unwrap();
        let c = cache.get_or_create_with_program_name(&programs, "fade").unwrap();

        assert!(Rc::ptr_eq(&a, &b));
        assert!(Rc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn create_is_never_cached() {
        let programs = programs();
        let program = programs.program("fade").unwrap();
        let mut cache = ProgramStateCache::new();

        let cached = cache.get_or_create_with_program(program).unwrap();
        let fresh = ProgramState::create(program.clone()).unwrap();
        assert!(!Rc::ptr_eq(&cached, &fresh));
    }

    #[test]
    fn lookup_failures() {
        let programs = programs();
        let mut cache = ProgramStateCache::new();

        assert_eq!(
            cache.get_or_create_with_program_name(&programs, "missing").unwrap_err(),
            Error::UnknownProgram("missing".to_string())
        );
        assert_eq!(
            cache.get_or_create_with_program_name(&programs, "empty").unwrap_err(),
            Error::EmptyProgram(2)
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn private_copies_leave_the_cached_state_alone() {
        let programs = programs();
        let mut cache = ProgramStateCache::new();
        let mut node = cache.get_or_create_with_program_name(&programs, "fade").unwrap();

        Rc::make_mut(&mut node).set_uniform_float("u_fade", 0.5);

        let cached = cache.get_or_create_with_program_name(&programs, "fade").unwrap();
        assert!(!Rc::ptr_eq(&node, &cached));
        assert!(node.uniform_value("u_fade").unwrap().value().is_some());
        assert!(matches!(
            cached.uniform_value("u_fade").and_then(|v| v.value()),
            Some(crate::Value::Float(x)) if *x == 0.
        ));
    }

    #[test]
    fn remove_unused_keeps_held_states() {
        let programs = programs();
        let mut cache = ProgramStateCache::new();
        let held = cache.get_or_create_with_program_name(&programs, "fade").unwrap();

        cache.remove_unused();
        assert_eq!(cache.len(), 1);

        drop(held);
        cache.remove_unused();
        assert!(cache.is_empty());

        cache.get_or_create_with_program_name(&programs, "fade").unwrap();
        cache.remove_all();
        assert!(cache.is_empty());
    }
}
