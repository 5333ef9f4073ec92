mod history;

use anyhow::{Context, Result};
use bat::PrettyPrinter;
use clap::Parser;
use cliclack::{input, spinner};
use console::style;
use course_rag::configuration::Settings;
use course_rag::generator::{GenerationRequest, ResponseGenerator};
use tracing_subscriber::EnvFilter;

use history::History;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of previous exchanges sent along with each question
    #[arg(long, default_value_t = 2)]
    max_history: usize,

    /// Show raw model output without stripping leaked reasoning
    #[arg(long)]
    no_sanitize: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = Settings::new().context("Failed to load settings")?;
    if cli.no_sanitize {
        settings.sanitizer.enabled = false;
    }
    let generator =
        ResponseGenerator::from_settings(settings).context("Failed to set up the provider")?;
    let mut history = History::new(cli.max_history);

    println!(
        "Course assistant {}",
        style("- type \"exit\" to end the session").dim()
    );
    println!("\n");

    loop {
        let query: String = input("Question:").placeholder("").multiline().interact()?;

        if query.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        let spin = spinner();
        spin.start("awaiting reply");

        let context = history.formatted();
        let mut request = GenerationRequest::new(&query);
        if let Some(context) = context.as_deref() {
            request = request.with_history(context);
        }
        let answer = generator.generate(&request).await;

        spin.stop("");

        render(&answer);
        history.record(&query, &answer);

        println!("\n");
    }
    Ok(())
}

fn render(content: &str) {
    let printed = PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print();

    if let Err(e) = printed {
        tracing::debug!("markdown rendering failed: {}", e);
        println!("{}", content);
    }
}
