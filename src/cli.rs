use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "stackform",
    about = "Evaluate stack declarations, apply auto tags and check tag policies"
)]
pub struct Cli {
    /// Path to config file (default: ./stackform.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print declared resources and outputs without resolving anything
    Preview,
    /// Resolve the stack with the local engine and print outputs
    Up,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command.clone().unwrap_or(Command::Preview)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command};

    #[test]
    fn defaults_to_preview_when_command_is_missing() {
        let cli = Cli::parse_from(["stackform"]);

        assert!(matches!(cli.command_or_default(), Command::Preview));
    }

    #[test]
    fn parses_up_with_global_config() {
        let cli = Cli::parse_from(["stackform", "up", "--config", "custom.toml"]);

        assert!(matches!(cli.command_or_default(), Command::Up));
        assert_eq!(
            cli.config
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("custom.toml".to_owned())
        );
    }
}
