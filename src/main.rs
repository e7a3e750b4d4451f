use std::path::PathBuf;

use clap::Parser;

/// XEQT Reddit Bot - responds to FAQ triggers
#[derive(Parser)]
#[command(name = "xeqtbot", version)]
#[command(after_help = "Examples:
  xeqtbot                    # Run the Reddit bot
  xeqtbot dividend           # Test response for 'dividend' keyword
  xeqtbot --keyword lumpsum  # Test response for 'lumpsum' keyword")]
struct Cli {
    /// Test keyword to generate response for (skips Reddit bot mode)
    keyword: Option<String>,

    /// Alternative way to specify test keyword
    #[arg(short = 'k', long = "keyword", value_name = "KEYWORD")]
    keyword_flag: Option<String>,

    /// Directory holding triggers.md, faq/ and template/
    #[arg(long)]
    content_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> xeqtbot::error::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("xeqtbot=info"))
        .init();

    let cli = Cli::parse();

    if let Some(keyword) = cli.keyword.or(cli.keyword_flag) {
        let response = xeqtbot::preview(&keyword, cli.content_dir)?;
        println!("Testing response for keyword: '{keyword}'");
        println!("{}", "=".repeat(60));
        println!("{response}");
        return Ok(());
    }

    log::info!("Starting xeqtbot");
    match xeqtbot::run(cli.content_dir).await {
        Ok(_) => {
            log::info!("Bot shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Bot encountered an error: {}", e);
            Err(e)
        }
    }
}
