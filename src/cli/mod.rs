pub mod commands;
pub mod parser;

pub use parser::{Cli, Commands, LogFormat};

use crate::utils::Result;

pub fn execute_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Run(args) => commands::run::execute(args),
        Commands::Config(args) => commands::config::execute(args),
    }
}
