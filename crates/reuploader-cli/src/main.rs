use std::process;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = reuploader_cli::run().await;
    if exit_code != 0 {
        process::exit(exit_code);
    }
}
