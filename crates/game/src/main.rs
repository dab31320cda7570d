use std::process::ExitCode;

use tracing::{error, info};

mod app;

fn main() -> ExitCode {
    app::init_tracing();
    info!("=== Adventure Startup ===");

    match app::build_app(std::env::args().skip(1)) {
        Ok(wiring) => app::run(wiring),
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
