use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "codeq")]
#[command(version, about = "Ask a chat model a question and run the code it writes")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interprets the given query
    Q {
        query: String,
        /// Log the code the model asked to run
        #[arg(long)]
        verbose: bool,
    },
    /// Runs code from stdin in a fresh interpreter and reports the result
    /// as JSON on stdout
    #[command(hide = true)]
    Exec,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        match self.command {
            Command::Q { verbose, .. } => verbose,
            Command::Exec => false,
        }
    }
}
