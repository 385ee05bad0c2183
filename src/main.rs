use std::process::ExitCode;

use berth::cli::CliApp;

#[tokio::main]
async fn main() -> ExitCode {
    CliApp::run().await
}
