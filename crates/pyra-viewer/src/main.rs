use std::process::ExitCode;

use anyhow::{Context, Result};

use pyra_engine::device::GpuConfig;
use pyra_engine::logging::{init_logging, LoggingConfig};
use pyra_engine::render::PYRAMID_SHADER;
use pyra_engine::window::{Runtime, RuntimeConfig};

/// Overrides the bundled shader with a WGSL file on disk.
const SHADER_ENV: &str = "PYRA_SHADER";

fn load_shader() -> Result<String> {
    match std::env::var_os(SHADER_ENV) {
        Some(path) => {
            log::info!("loading shader from {}", path.to_string_lossy());
            std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read shader `{}`", path.to_string_lossy()))
        }
        None => Ok(PYRAMID_SHADER.to_string()),
    }
}

fn run() -> Result<()> {
    let shader = load_shader()?;
    let config = RuntimeConfig {
        title: "pyra".to_string(),
        ..Default::default()
    };
    Runtime::run(config, GpuConfig::from_env(), shader)
}

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pyra: {e:#}");
            ExitCode::FAILURE
        }
    }
}
