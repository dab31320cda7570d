use std::process::ExitCode;

use engine::run_app;
use tracing::error;

use super::bootstrap::{AppWiring, LaunchMode};

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        mut scene,
        mode,
    } = app;

    match mode {
        LaunchMode::Window => {
            if let Err(err) = run_app(config, Box::new(scene)) {
                error!(error = %err, "startup_failed");
                return ExitCode::FAILURE;
            }
        }
        LaunchMode::Script(script) => {
            let report = script.replay(&mut scene);
            for fired in &report.fired {
                println!("{}", fired.describe());
            }
            match report.final_state_json() {
                Ok(state) => println!("{state}"),
                Err(err) => {
                    error!(error = %err, "script_report_failed");
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    ExitCode::SUCCESS
}
