//! cf-tls binary entry point

#[tokio::main]
async fn main() {
    if let Err(e) = cf_tls_cli::run().await {
        cf_tls_cli::print_error(&e.to_string());
        std::process::exit(1);
    }
}
