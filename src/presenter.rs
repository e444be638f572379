use std::io::{self, Write};
use std::sync::Mutex;
use tracing::{error, info};

/// Sink for rendered frames and transient notices
pub trait Presenter: Send + Sync {
    /// A fully rendered board (summary and listing)
    fn board(&self, frame: &str);

    /// A rendered clock/countdown line
    fn clock(&self, frame: &str);

    /// A transient, dismissible notice such as a failed feed load
    fn notice(&self, message: &str);
}

/// Writes frames to the terminal
#[derive(Debug, Default)]
pub struct ConsolePresenter {
    last_board: Mutex<Option<String>>,
}

impl ConsolePresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Presenter for ConsolePresenter {
    fn board(&self, frame: &str) {
        // Identical frames are not reprinted
        let mut last = match self.last_board.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if last.as_deref() == Some(frame) {
            return;
        }
        *last = Some(frame.to_string());

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", frame) {
            error!("Failed to write board: {}", e);
        }
    }

    fn clock(&self, frame: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = write!(stdout, "\r{}", frame).and_then(|_| stdout.flush()) {
            error!("Failed to write clock: {}", e);
        }
    }

    fn notice(&self, message: &str) {
        info!("Notice: {}", message);
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "! {}", message);
    }
}
