//! Scene editor: place spheres and shape a mirror curve in a top-down view.

mod app;
mod constants;
mod curve;
mod objects;
mod sphere;

use anyhow::Result;
use orrery_gl::ShaderSources;
use orrery_gl::logging::init_logging;
use orrery_gl::window::{Runtime, RuntimeConfig};

use crate::app::Editor;

fn main() -> Result<()> {
    init_logging("info");

    let config = RuntimeConfig {
        title: "the dream of the 80s is alive in Portland".to_string(),
        width: constants::WIDTH,
        height: constants::HEIGHT,
    };
    Runtime::run(config, ShaderSources::default(), Editor::new())
}
