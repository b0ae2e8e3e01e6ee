use std::process::ExitCode;

use gator::commands::{self, Command, Session};
use gator::{Config, Database};

#[tokio::main]
async fn main() -> ExitCode {
    gator::logging::init("info");

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gator: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> gator::Result<()> {
    let config_path = Config::default_path()?;
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(gator::GatorError::Io(_)) => {
            // First run: no config file yet.
            eprintln!(
                "gator: no config at {}, using defaults",
                config_path.display()
            );
            Config::default()
        }
        Err(e) => return Err(e),
    };

    let Some(cmd) = Command::from_args(std::env::args().skip(1).collect()) else {
        return Err(gator::GatorError::Usage("<command> [args...]"));
    };

    let db = Database::connect(&config.db_url).await?;
    let mut session = Session {
        db,
        config,
        config_path,
    };

    commands::run(&mut session, &cmd).await
}
