use indicatif::{ProgressBar, ProgressStyle};
use wordlist_core::TransferEvent;

const BAR_TEMPLATE: &str =
    "Downloading... [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "Downloading... {spinner} {bytes} ({bytes_per_sec})";

/// Terminal progress display fed by transfer events.
pub struct TransferProgress {
    bar: ProgressBar,
}

impl TransferProgress {
    pub fn new() -> Self {
        TransferProgress {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn on_event(&mut self, event: TransferEvent) {
        match event {
            TransferEvent::Started { resume_from, total } => {
                self.bar = match total {
                    Some(total) => ProgressBar::new(total).with_style(style(BAR_TEMPLATE)),
                    None => ProgressBar::new_spinner().with_style(style(SPINNER_TEMPLATE)),
                };
                self.bar.set_position(resume_from);
            }
            TransferEvent::ProgressChanged(bytes) => self.bar.inc(bytes),
            TransferEvent::Retrying { .. } => {}
            TransferEvent::Completed { .. } => self.bar.finish_and_clear(),
        }
    }

    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl Default for TransferProgress {
    fn default() -> Self {
        Self::new()
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}
