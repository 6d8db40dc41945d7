// Completion notifier writing to the log, with an optional terminal bell
use crate::application::notifier::CompletionNotifier;
use crate::domain::cycle::CycleProgress;
use std::io::Write;

#[derive(Debug, Clone)]
pub struct LogNotifier {
    bell: bool,
}

impl LogNotifier {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }
}

impl CompletionNotifier for LogNotifier {
    fn cycle_finished(&self, progress: &CycleProgress) {
        tracing::info!(
            kind = ?progress.kind,
            status = ?progress.status,
            erroneous = progress.erroneous,
            "regenbox cycle ended"
        );
        if self.bell {
            ring_bell(&mut std::io::stderr());
        }
    }
}

/// Returns whether the bell reached `out`.
fn ring_bell<W: Write>(out: &mut W) -> bool {
    match out.write_all(b"\x07").and_then(|_| out.flush()) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(error = %e, "couldn't ring terminal bell");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ClosedTerminal;

    impl Write for ClosedTerminal {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_ring_bell() {
        let mut out = Vec::new();
        assert!(ring_bell(&mut out));
        assert_eq!(out, b"\x07");
    }

    #[test]
    fn test_bell_failure_is_reported() {
        assert!(!ring_bell(&mut ClosedTerminal));
    }
}
