use std::process::ExitCode;

use dist_server::{logger, Config, Server};

fn main() -> ExitCode {
    let cfg = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            logger::log_fatal(&e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logger::init(&cfg) {
        logger::log_fatal(&format!("Failed to open log file: {e}"));
        return ExitCode::FAILURE;
    }

    // Worker thread count from config, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }

    let runtime = match runtime_builder.build() {
        Ok(runtime) => runtime,
        Err(e) => {
            logger::log_fatal(&format!("Failed to start runtime: {e}"));
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(Server::from_config(&cfg).run()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logger::log_fatal(&e);
            ExitCode::FAILURE
        }
    }
}
