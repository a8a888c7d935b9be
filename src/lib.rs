//! Uniform and vertex attribute values for shader programs, kept per node and
//! pushed to the graphics context right before drawing.
//!
//! ```ignore
//! let mut state = cache.get_or_create_with_program_name(&programs, "sprite")?;
//! Rc::make_mut(&mut state).set_uniform_vec4("u_color", Vec4::ONE);
//! state.apply(&model_view);
//! ```

mod cache;
mod error;
pub mod gl;
mod program;
mod program_state;
mod texture;
mod uniform_value;
mod vertex_attrib_value;

pub use cache::{ProgramCache, ProgramStateCache};
pub use error::Error;
pub use program::{Builtin, Program, Uniform, VertexAttrib};
pub use program_state::{ProgramState, BASE_TEXTURE_UNIT};
pub use texture::Texture;
pub use uniform_value::{UniformCallback, UniformValue, Value};
pub use vertex_attrib_value::{AttribPointer, AttribValue, VertexAttribCallback, VertexAttribValue};
