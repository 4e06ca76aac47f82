use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, CommandFactory};
use clap_complete::Shell;

use crate::error::{AvatarError, Result};

/// Generate shell completions
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,

    /// Write to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

pub fn run(args: CompletionsArgs) -> Result<()> {
    match &args.output {
        Some(path) => {
            let mut file = File::create(path).map_err(|e| AvatarError::Io {
                path: path.clone(),
                message: format!("Failed to create completions file: {}", e),
            })?;
            write_completions(args.shell, &mut file);
        }
        None => write_completions(args.shell, &mut io::stdout()),
    }
    Ok(())
}

/// Completion script for `avakit` in the given shell.
pub fn write_completions(shell: Shell, out: &mut dyn Write) {
    let mut cmd = super::Cli::command();
    clap_complete::generate(shell, &mut cmd, "avakit", out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bash_completions_list_subcommands() {
        let mut buffer = Vec::new();
        write_completions(Shell::Bash, &mut buffer);
        let script = String::from_utf8(buffer).unwrap();

        assert!(script.contains("avakit"));
        for command in ["render", "validate", "slice", "init", "completions"] {
            assert!(script.contains(command), "missing {}", command);
        }
    }
}
