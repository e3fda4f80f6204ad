use scenesmith::{cli, log_error, ui};

#[tokio::main]
async fn main() {
    if let Err(e) = cli::main().await {
        log_error!("Fatal error: {:#}", e);
        ui::print_error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
