mod config;
mod exit;
mod logging;

use tracing::{error, info};

use crate::config::WorkerConfig;
use crate::exit::{CliResult, SUCCESS, USAGE};
use crate::logging::init_logging;

fn main() {
    let config = match WorkerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            let _ = err.print();
            std::process::exit(USAGE);
        }
    };
    init_logging(config.log_format, config.log_level);

    let args: Vec<String> = std::env::args_os()
        .skip(1)
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect();

    match run(&config, &args) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            error!(code = err.code, "{err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(unix)]
fn run(config: &WorkerConfig, args: &[String]) -> CliResult<i32> {
    use portworker::worker::Worker;
    use portworker::ForecastPredictor;

    use crate::exit::worker_error;

    let mut worker = Worker::bind(
        ForecastPredictor,
        config.channels(),
        config.frames(),
        args,
    )
    .map_err(worker_error)?;

    let summary = worker.run().map_err(worker_error)?;
    info!(requests = summary.requests, "worker finished");
    Ok(SUCCESS)
}

#[cfg(not(unix))]
fn run(_config: &WorkerConfig, _args: &[String]) -> CliResult<i32> {
    Err(exit::CliError::new(
        exit::INTERNAL,
        "descriptor-based channels require a unix platform",
    ))
}
