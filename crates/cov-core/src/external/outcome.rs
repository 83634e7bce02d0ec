use std::time::Duration;

/// Resultado observable de ejecutar un comando externo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    /// El proceso terminó. `code = None` cuando murió por una señal.
    Exited { code: Option<i32> },
    /// Se alcanzó el timeout y el proceso fue terminado.
    TimedOut { after: Duration },
}

impl ExecOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExecOutcome::Exited { code: Some(0) })
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecOutcome::Exited { code } => *code,
            ExecOutcome::TimedOut { .. } => None,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, ExecOutcome::TimedOut { .. })
    }

    /// Descripción corta para logs y eventos.
    pub fn describe(&self) -> String {
        match self {
            ExecOutcome::Exited { code: Some(c) } => format!("exit code {c}"),
            ExecOutcome::Exited { code: None } => "terminated by signal".to_string(),
            ExecOutcome::TimedOut { after } => format!("timed out after {}ms", after.as_millis()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_zero_exit_is_success() {
        assert!(ExecOutcome::Exited { code: Some(0) }.success());
        assert!(!ExecOutcome::Exited { code: Some(2) }.success());
        assert!(!ExecOutcome::Exited { code: None }.success());
        let t = ExecOutcome::TimedOut { after: Duration::from_millis(10) };
        assert!(!t.success());
        assert!(t.timed_out());
        assert_eq!(t.exit_code(), None);
        assert_eq!(t.describe(), "timed out after 10ms");
    }
}
