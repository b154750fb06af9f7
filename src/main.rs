use beta_harness::cli;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // Detect the system locale before anything prints
    beta_harness::init();

    match cli::run().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
