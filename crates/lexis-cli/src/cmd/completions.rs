use anyhow::Result;
use clap::Args;
use clap_complete::{Shell, generate};

/// Arguments for `lx completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `shell` to stdout.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn run_completions(shell: Shell, command: &mut clap::Command) -> Result<()> {
    let mut out = std::io::stdout();
    generate(shell, command, "lx", &mut out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: CompletionsArgs,
    }

    #[test]
    fn parses_known_shells() {
        for shell in ["bash", "zsh", "fish", "powershell", "elvish"] {
            assert!(Wrapper::try_parse_from(["test", shell]).is_ok(), "{shell}");
        }
    }

    #[test]
    fn rejects_unknown_shell() {
        assert!(Wrapper::try_parse_from(["test", "tcsh"]).is_err());
    }
}
