// src/main.rs

use tideps::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(err) => {
            eprintln!("tideps error: {err:?}");
            std::process::exit(1);
        }
    }
}

/// `Ok(false)` when the task instance was denied.
async fn run_main() -> anyhow::Result<bool> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;
    let decision = run(args).await?;
    Ok(decision.is_none_or(|d| d.admitted))
}
