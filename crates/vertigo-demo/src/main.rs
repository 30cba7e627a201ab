mod cube;
mod geometry;

use std::process::ExitCode;

use vertigo_engine::logging::{LoggingConfig, init_logging};
use vertigo_engine::{Engine, EngineError};

use crate::cube::CubeScene;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let mut engine = Engine::new("#glCanvas");
    engine.set_scene(CubeScene::new());

    match engine.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Startup failures already reached the user through the notifier.
            if !EngineError::is_reported(&err) {
                eprintln!("Error: {err:#}");
            }
            ExitCode::FAILURE
        }
    }
}
