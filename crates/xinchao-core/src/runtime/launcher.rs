use anyhow::{anyhow, Context, Result};
use std::process::{Child, Command, Stdio};
use std::sync::Mutex;
use tracing::info;

/// Starts the inference runtime on demand. [`ServeCommand`] shells out;
/// tests substitute their own.
pub trait RuntimeLauncher: Send + Sync {
    /// Start the runtime if this launcher hasn't already. Launching twice
    /// is a no-op, not an error.
    fn launch(&self) -> Result<()>;
}

/// Launches the runtime by spawning a configured command, `ollama serve`
/// by default. The child is intentionally never killed on shutdown so the
/// model stays warm for the next session.
pub struct ServeCommand {
    argv: Vec<String>,
    child: Mutex<Option<Child>>,
}

impl ServeCommand {
    pub fn new(argv: Vec<String>) -> Self {
        Self {
            argv,
            child: Mutex::new(None),
        }
    }
}

impl RuntimeLauncher for ServeCommand {
    fn launch(&self) -> Result<()> {
        let mut slot = self
            .child
            .lock()
            .map_err(|_| anyhow!("launcher mutex poisoned"))?;
        if slot.is_some() {
            return Ok(());
        }

        let program = self
            .argv
            .first()
            .ok_or_else(|| anyhow!("serve command is empty"))?;

        // Detach stdio so the child cannot write over the TUI.
        let child = Command::new(program)
            .args(&self.argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to start runtime with `{}`", self.argv.join(" ")))?;

        info!(pid = child.id(), "started inference runtime");
        *slot = Some(child);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_is_rejected() {
        let launcher = ServeCommand::new(vec![]);
        assert!(launcher.launch().is_err());
    }

    #[test]
    fn test_unknown_program_fails_with_context() {
        let launcher = ServeCommand::new(vec!["xinchao-no-such-binary".to_string()]);
        let err = launcher.launch().unwrap_err();
        assert!(err.to_string().contains("xinchao-no-such-binary"));
    }

    #[test]
    fn test_second_launch_is_a_no_op() {
        let launcher = ServeCommand::new(vec!["true".to_string()]);
        assert!(launcher.launch().is_ok());
        assert!(launcher.launch().is_ok());
    }
}
