use std::io::IsTerminal;

use async_trait::async_trait;
use nebula_offer_reconciler::ConfirmationPrompt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

/// Reads the confirmation from the operator's terminal. Outside of an
/// interactive session the default answer is used unchanged.
pub struct StdinPrompt;

#[async_trait]
impl ConfirmationPrompt for StdinPrompt {
    async fn confirm(&self, message: &str, default_yes: bool) -> bool {
        if !std::io::stdin().is_terminal() {
            let answer = if default_yes { "yes" } else { "no" };
            info!("Non-interactive session; assuming \"{answer}\"");
            return default_yes;
        }

        let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            eprint!("{message} {hint} ");
            let Ok(Some(line)) = lines.next_line().await else {
                return default_yes;
            };
            match line.trim().to_lowercase().as_str() {
                "" => return default_yes,
                "y" | "yes" => return true,
                "n" | "no" => return false,
                other => eprintln!("Unrecognized answer \"{other}\"; expected yes or no"),
            }
        }
    }
}

/// Backs the `--yes` flag: every confirmation succeeds without prompting.
pub struct AlwaysYes;

#[async_trait]
impl ConfirmationPrompt for AlwaysYes {
    async fn confirm(&self, _message: &str, _default_yes: bool) -> bool {
        true
    }
}
