//! Main application entry point (native).
//!
//! Replays a gesture script and prints the report as JSON:
//! `slidecraft <script.json>`

#[cfg(feature = "native")]
fn main() -> std::process::ExitCode {
    env_logger::init();
    log::info!("Starting SlideCraft");

    match slidecraft_app::cli::run_from_env() {
        Ok(json) => {
            println!("{json}");
            std::process::ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("Replay failed: {}", err);
            eprintln!("error: {err}");
            std::process::ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "native"))]
fn main() {
    panic!("Native feature not enabled. Use `cargo run --features native`");
}
