use std::io::{self, Write};

use dv::driver::PlaybackSnapshot;
use indicatif::style::TemplateError;
use indicatif::{ProgressBar, ProgressStyle};

enum Target<W> {
    Off,
    /// Status line kept at the bottom of the terminal.
    Bar(ProgressBar),
    /// One JSON object per line.
    Json(W),
}

/// Shows playback status whenever the snapshot changes.
pub struct StatusDisplay<W: Write> {
    target: Target<W>,
    last: Option<PlaybackSnapshot>,
}

impl<W: Write> StatusDisplay<W> {
    pub fn off() -> Self {
        Self {
            target: Target::Off,
            last: None,
        }
    }

    pub fn bar(pb: ProgressBar) -> Result<Self, TemplateError> {
        pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg} | elapsed: {elapsed_precise}")?);
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Ok(Self {
            target: Target::Bar(pb),
            last: None,
        })
    }

    pub fn json(out: W) -> Self {
        Self {
            target: Target::Json(out),
            last: None,
        }
    }

    /// Show `snapshot` if it differs from the last one shown.
    pub fn update(&mut self, snapshot: &PlaybackSnapshot) -> io::Result<()> {
        if self.last.as_ref() == Some(snapshot) {
            return Ok(());
        }

        match &mut self.target {
            Target::Off => {}
            Target::Bar(pb) => pb.set_message(status_line(snapshot)),
            Target::Json(out) => {
                serde_json::to_writer(&mut *out, snapshot)?;
                writeln!(out)?;
                out.flush()?;
            }
        }
        self.last = Some(snapshot.clone());
        Ok(())
    }

    pub fn finish(&mut self) {
        if let Target::Bar(pb) = &self.target {
            pb.finish();
        }
    }
}

pub fn status_line(snapshot: &PlaybackSnapshot) -> String {
    let mut line = format!(
        "{} {} frame {:>7}",
        snapshot.standard, snapshot.timecode, snapshot.frame
    );
    if snapshot.paused {
        line.push_str(" [paused]");
    }
    if snapshot.dropped_packets > 0 {
        line.push_str(&format!(" dropped {}", snapshot.dropped_packets));
    }
    line
}
