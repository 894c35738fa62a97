use clap::Parser;
use colored::*;
use tracing_subscriber::EnvFilter;

use askdoc::api::HttpBackend;
use askdoc::cli::{self, Args};
use askdoc::controller::ChatController;
use askdoc::ui;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log)),
        )
        .with_writer(std::io::stderr)
        .init();

    let backend = HttpBackend::new(cli::normalize_base_url(&args.backend));
    let mut controller = ChatController::new(
        backend,
        args.file.unwrap_or_default(),
        args.language.unwrap_or_default(),
    );

    // One-shot mode: a single ask with the same gate rules, answer on stdout.
    if let Some(question) = args.question {
        controller.set_query(&question);
        controller.press_enter(false).await;

        if let Some(message) = controller.doc_message() {
            eprintln!("{}", message.red());
            std::process::exit(2);
        }
        match controller.transcript().turns().last() {
            Some(turn) => println!("{}", turn.answer_html),
            None => {
                eprintln!("{}", "no answer received".red());
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    ui::run(controller).await
}
