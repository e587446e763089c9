//! The external chooser: an opaque synchronous collaborator that is handed
//! a list of candidate strings and hands back at most one of them.

use std::io::Write;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{FactotumError, Result};

pub trait Chooser {
    /// Presents the candidates and returns the selection, or `Ok(None)` when
    /// the user cancels. Blocks until either happens; there is no timeout.
    fn choose(&mut self, candidates: &[String], prompt: &str) -> Result<Option<String>>;
}

/// Pipes the candidates to an external menu program (dmenu or anything
/// speaking its protocol: candidates on stdin, one per line, the selection
/// echoed on stdout). With no candidates the program doubles as a free-text
/// prompt, which is how shortcuts get typed in.
pub struct CommandChooser {
    program: String,
    arguments: Vec<String>,
}

impl CommandChooser {
    pub fn new(program: &str, arguments: &[String]) -> Self {
        Self {
            program: program.to_string(),
            arguments: arguments.to_vec(),
        }
    }
}

impl Chooser for CommandChooser {
    fn choose(&mut self, candidates: &[String], prompt: &str) -> Result<Option<String>> {
        debug!(program = %self.program, candidates = candidates.len(), "invoking chooser");
        let mut child = Command::new(&self.program)
            .args(&self.arguments)
            .arg("-p")
            .arg(prompt)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| FactotumError::Chooser(format!("{}: {e}", self.program)))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(candidates.join("\n").as_bytes())
                .map_err(|e| FactotumError::Chooser(format!("{}: {e}", self.program)))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|e| FactotumError::Chooser(format!("{}: {e}", self.program)))?;
        // dmenu exits non-zero on escape; that is a cancel, not a failure
        if !output.status.success() {
            return Ok(None);
        }
        let selection = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if selection.is_empty() {
            Ok(None)
        } else {
            Ok(Some(selection))
        }
    }
}
