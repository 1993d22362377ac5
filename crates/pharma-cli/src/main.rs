mod cli;

use pharma_core::ApiError;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{e:#}"); // pretty anyhow chain
        if matches!(e.downcast_ref::<ApiError>(), Some(ApiError::SessionExpired)) {
            eprintln!("Run `pharma login` to sign in again.");
        }
        std::process::exit(1);
    }
}
