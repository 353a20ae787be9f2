//! Pretty-printing SMT-LIB code.

use std::{
    fmt::{self, Display},
    io::Write,
    process::Command,
};

use tempfile::NamedTempFile;
use thiserror::Error;
use z3::Solver;

use crate::util::PrefixWriter;

#[derive(Debug, Error)]
pub enum RacoReadError {
    #[error("{0}")]
    IoError(#[from] std::io::Error),
    #[error("{0}")]
    ReadError(String),
}

/// SMT-LIB text, usually taken from the state of a solver.
#[derive(Debug, Clone)]
pub struct Smtlib(String);

impl Smtlib {
    pub fn from_solver(solver: &Solver<'_>) -> Self {
        Smtlib(format!("{}", solver))
    }

    /// Prepend a `(set-logic ...)` command.
    pub fn set_logic(&mut self, logic: &str) {
        self.0 = format!("(set-logic {})\n{}", logic, self.0);
    }

    /// Add a `(check-sat)` command at the end.
    pub fn add_check_sat(&mut self) {
        if !self.0.is_empty() && !self.0.ends_with('\n') {
            self.0.push('\n');
        }
        self.0.push_str("(check-sat)\n");
    }

    /// Run `raco read` to format this SMT-LIB.
    ///
    /// `raco read` is Racket's Lisp formatter. It can be installed by
    /// installing Racket and then running `raco pkg install compiler-lib`.
    pub fn pretty_raco_read(&mut self) -> Result<(), RacoReadError> {
        let mut command = Command::new("raco");
        command.arg("read");

        let mut input_file = NamedTempFile::new()?;
        input_file.write_all(self.0.as_bytes())?;
        let input_path = input_file.into_temp_path();
        command.arg(&input_path);

        let output = command.output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            return Err(RacoReadError::ReadError(stderr));
        }

        input_path.close()?;

        self.0 = String::from_utf8_lossy(&output.stdout).into_owned();

        Ok(())
    }

    /// Like [`Smtlib::pretty_raco_read`], but keeps the text unchanged and
    /// logs the error if formatting fails (e.g. if Racket is not installed).
    pub fn try_pretty(&mut self) {
        if let Err(err) = self.pretty_raco_read() {
            tracing::debug!(err=?err, "could not pretty-print SMT-LIB with raco read");
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the underlying String.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Build a new writer that wraps every line in an SMT-LIB comment.
    pub fn comment_writer<W>(writer: W) -> PrefixWriter<'static, W> {
        PrefixWriter::new(b"; ", writer)
    }
}

impl Display for Smtlib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod test {
    use z3::{ast::Bool, Config, Context, Solver};

    use super::Smtlib;

    #[test]
    fn test_logic_and_check_sat() {
        let ctx = Context::new(&Config::default());
        let solver = Solver::new(&ctx);
        solver.assert(&Bool::new_const(&ctx, "p"));
        let mut smtlib = Smtlib::from_solver(&solver);
        smtlib.set_logic("HORN");
        smtlib.add_check_sat();
        let text = smtlib.into_string();
        assert!(text.starts_with("(set-logic HORN)\n"));
        assert!(text.contains("(declare-fun p () Bool)"));
        assert!(text.ends_with("(check-sat)\n"));
    }
}
