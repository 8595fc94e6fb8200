use checkers_arena::web::run_server;
use checkers_arena::*;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "serve".to_string());
    let config_path = args.next().map(PathBuf::from);
    let config = AppConfig::load(config_path.as_deref())?;

    match command.as_str() {
        "serve" => run_server(&config).await?,
        "match" => {
            let result = tokio::task::spawn_blocking(move || play_match(&config)).await?;
            match result.winner() {
                Some(winner) => println!("Winner: {}", winner),
                None => println!("Game ended in a draw"),
            }
        }
        other => return Err(format!("unknown command `{other}`, expected `serve` or `match`").into()),
    }

    Ok(())
}

fn play_match(config: &AppConfig) -> MatchResult {
    let white = Box::new(MinimaxBot::new(
        format!("Minimax(depth {})", config.ai_depth),
        config.ai_depth,
    ));
    let black = Box::new(GreedyBot::new("Greedy".to_string()));

    let mut game = Match::new(white, black, config.match_config());
    let result = game.play();
    println!("{}", game.board().display_board());
    result
}
