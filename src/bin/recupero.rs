use anyhow::Result;
use recupero::cli::{actions, actions::Action, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let action = start()?;

    // Handle the action
    match action {
        Action::Server { port, args } => actions::server::handle(port, *args).await?,
    }

    Ok(())
}
