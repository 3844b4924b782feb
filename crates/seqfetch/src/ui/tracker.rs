use indicatif::{HumanBytes, ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

use seqfetch_engine::{ProgressSink, ProgressState};

const PB_STYLE: &str =
    "{spinner:.blue} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} fragments {msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const PB_CHARS: &str = "█▓▒░  ";

static PB_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    let pb_style = match ProgressStyle::with_template(PB_STYLE) {
        Ok(pb_style) => pb_style.tick_chars(TICK).progress_chars(PB_CHARS),
        Err(_) => return None,
    };

    Some(pb_style)
});

/// Terminal progress bar fed by the engine's tracker.
///
/// The length follows the highest fragment seen so far, so the bar moves
/// backwards whenever a probe lands further out.
#[derive(Debug, Clone)]
pub struct BarSink {
    pb: ProgressBar,
}

impl BarSink {
    pub fn new() -> Self {
        let pb = ProgressBar::no_length();
        if let Some(pb_style) = PB_TEMPLATE.as_ref() {
            pb.set_style(pb_style.clone());
        }
        Self { pb }
    }

    /// A sink that draws nothing, for non-interactive output.
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self, msg: Option<String>) {
        match msg {
            Some(msg) => self.pb.finish_with_message(msg),
            None => self.pb.finish(),
        }
    }

    pub fn abandon(&self) {
        self.pb.abandon();
    }

    fn render(state: &ProgressState) -> String {
        format!(
            "{:>5.1}% {}",
            state.percentage(),
            HumanBytes(state.bytes)
        )
    }
}

impl ProgressSink for BarSink {
    fn on_progress(&self, state: &ProgressState) {
        self.pb.set_length(state.max_index + 1);
        self.pb.set_position(state.len() as u64);
        self.pb.set_message(Self::render(state));
    }
}
