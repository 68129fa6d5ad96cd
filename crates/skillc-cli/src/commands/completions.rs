//! Shell completion generation command.

use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use skillc_core::cli::ExitCode;
use std::io::{self, Write};
use tracing::info;

/// Writes the completion script for `shell` to `out`.
pub fn write_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    let bin_name = cmd.get_name().to_string();
    generate(shell, cmd, bin_name, out);
}

/// Runs the completions command, printing the script to stdout.
///
/// # Examples
///
/// ```no_run
/// use clap::CommandFactory;
/// use clap_complete::Shell;
/// use skillc_cli::cli::Cli;
/// use skillc_cli::commands::completions;
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut cmd = Cli::command();
/// completions::run(Shell::Bash, &mut cmd).await.unwrap();
/// # }
/// ```
pub async fn run(shell: Shell, cmd: &mut Command) -> Result<ExitCode> {
    info!("Generating {shell} completions");
    write_completions(shell, cmd, &mut io::stdout());
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::CommandFactory;

    fn script(shell: Shell) -> String {
        let mut buf = Vec::new();
        write_completions(shell, &mut Cli::command(), &mut buf);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_bash_completions_name_subcommands() {
        let script = script(Shell::Bash);
        assert!(script.contains("skillc"));
        assert!(script.contains("compile"));
        assert!(script.contains("init"));
    }

    #[test]
    fn test_fish_and_zsh_completions() {
        assert!(script(Shell::Fish).contains("strict-schemas"));
        assert!(script(Shell::Zsh).contains("#compdef skillc"));
    }

    #[tokio::test]
    async fn test_run_returns_success() {
        let mut cmd = Cli::command();
        assert_eq!(run(Shell::Zsh, &mut cmd).await.unwrap(), ExitCode::SUCCESS);
    }
}
