// src/main.rs

use as_soon::errors::AsSoonError;
use as_soon::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        match &err {
            AsSoonError::MissingCommand => {
                eprintln!("{err}");
                eprintln!("{}", cli::usage());
            }
            AsSoonError::Usage(message) => eprintln!("{}", message.trim_end()),
            e if e.is_configuration() => eprintln!("as-soon: {err}"),
            _ => eprintln!("as-soon error: {err:?}"),
        }
        std::process::exit(1);
    }
}

async fn run_main() -> as_soon::errors::Result<()> {
    let args = cli::parse()?;
    logging::init_logging(args.log_level)?;
    run(args).await
}
