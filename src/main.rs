mod logger;

use anyhow::{anyhow, Context, Result};
use glam::*;
use pico_args::Arguments;
use shader_state::gl::{self, trace::TraceGl, types::GLuint};
use shader_state::{Program, ProgramCache, ProgramStateCache};
use std::rc::Rc;

const SPRITE: GLuint = 1;
const FRAME_SECS: f32 = 1. / 60.;

fn print_help() {
    print!(
        r#"Prints the GL calls a sprite program state makes when applied.

List of available options:
    --help              Print this help
    --frames n          Number of frames to apply (default 2)
    --seed n            Seed for the u_random01 built-in
    -v, --verbose       Log at trace level
"#
    );
}

/// Declares a textured sprite program on the tracing context.
fn sprite_program(trace: &TraceGl, ctx: gl::RcContext) -> Program {
    trace.declare_program(
        SPRITE,
        &[
            ("u_mvp", gl::FLOAT_MAT4),
            ("u_time", gl::FLOAT_VEC4),
            ("u_color", gl::FLOAT_VEC4),
            ("u_diffuse", gl::SAMPLER_2D),
            ("u_mask", gl::SAMPLER_2D),
        ],
        &[
            ("a_position", gl::FLOAT_VEC3),
            ("a_tex_coord", gl::FLOAT_VEC2),
            ("a_color", gl::FLOAT_VEC4),
        ],
    );
    Program::from_linked(ctx, SPRITE)
}

fn main() -> Result<()> {
    // Process CLI
    let mut pargs = Arguments::from_env();
    if pargs.contains("--help") {
        print_help();
        return Ok(());
    }
    let verbose = pargs.contains(["-v", "--verbose"]);
    let frames: u32 = pargs.opt_value_from_str("--frames")?.unwrap_or(2);
    let seed: Option<u64> = pargs.opt_value_from_str("--seed")?;

    // Finish args
    let remaining = pargs.finish();
    if !remaining.is_empty() {
        return Err(anyhow!("Unknown arguments {:?}", remaining));
    }

    // Initialize logging
    log::set_logger(&logger::Logger)
        .map_err(|e| eprintln!("{}\nFailed to initialize logger. Going without.", e))
        .ok();
    log::set_max_level(if verbose {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Info
    });

    // Tracing context
    let trace = Rc::new(TraceGl::new());
    let ctx = Rc::new(match seed {
        Some(seed) => gl::Context::with_seed(trace.clone(), seed),
        None => gl::Context::new(trace.clone()),
    });
    ctx.set_projection(Mat4::orthographic_rh_gl(0., 1280., 0., 720., -1., 1.));

    let mut programs = ProgramCache::new();
    programs.add_program("sprite", Rc::new(sprite_program(&trace, ctx.clone())));

    // Every sprite starts from the shared state, this one gets its own values
    let mut states = ProgramStateCache::new();
    let mut sprite = states
        .get_or_create_with_program_name(&programs, "sprite")
        .context("Failed to set up the sprite program state")?;
    {
        let state = Rc::make_mut(&mut sprite);
        state.set_vertex_attrib_pointer("a_position", 3, gl::FLOAT, false, 36, 0);
        state.set_vertex_attrib_pointer("a_tex_coord", 2, gl::FLOAT, false, 36, 12);
        state.set_vertex_attrib_pointer("a_color", 4, gl::FLOAT, false, 36, 20);
        state.set_uniform_vec4("u_color", vec4(1., 0.5, 0.25, 1.));
        state.set_uniform_texture_id("u_diffuse", 1);
        state.set_uniform_texture_id("u_mask", 2);
    }
    trace.take_calls();

    for frame in 0..frames {
        let secs = frame as f32 * FRAME_SECS;
        ctx.set_time(secs);

        let model_view =
            Mat4::from_translation(vec3(640., 360., 0.)) * Mat4::from_rotation_z(secs);
        sprite.apply(&model_view);

        println!("Frame {}", frame);
        for call in trace.take_calls() {
            println!("    {:?}", call);
        }
    }

    Ok(())
}
