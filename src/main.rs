#![allow(non_snake_case)]
use RadialDiffusion::Examples::diffusion_examples::run_studies;
use RadialDiffusion::numerical::RadialDiffusion::task_config::TaskConfig;
use std::path::Path;
use std::process::ExitCode;

/// RadialDiffusion [task_file]
/// runs all studies with the parameters of the task file (defaults without it)
fn main() -> ExitCode {
    let cfg = match std::env::args().nth(1) {
        Some(path) => TaskConfig::from_file(Path::new(&path)),
        None => Ok(TaskConfig::default()),
    };
    match cfg.and_then(|cfg| run_studies(&cfg)) {
        Ok(written) => {
            println!("{} images written", written.len());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
