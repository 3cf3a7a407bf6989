//! Colored terminal output.

use crate::bundler::{BuildObserver, Stage};
use std::io::{self, Write};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Writes progress and status lines to the terminal.
#[derive(Debug, Clone)]
pub struct OutputManager {
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Create a new output manager
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self { verbose, quiet }
    }

    fn color_choice() -> ColorChoice {
        if std::env::var_os("NO_COLOR").is_some() {
            ColorChoice::Never
        } else {
            ColorChoice::Auto
        }
    }

    fn write_line(
        stream: &mut StandardStream,
        prefix: &str,
        spec: &ColorSpec,
        message: &str,
    ) -> io::Result<()> {
        stream.set_color(spec)?;
        write!(stream, "{prefix}")?;
        stream.reset()?;
        writeln!(stream, "{message}")
    }

    fn stdout_line(&self, prefix: &str, color: Color, bold: bool, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = StandardStream::stdout(Self::color_choice());
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color)).set_bold(bold);
        Self::write_line(&mut stdout, prefix, &spec, message)
    }

    /// Print a message only in verbose mode
    pub fn verbose(&self, message: &str) -> io::Result<()> {
        if !self.verbose {
            return Ok(());
        }
        self.stdout_line("  ", Color::White, false, message)
    }

    /// Print a progress message
    pub fn progress(&self, message: &str) -> io::Result<()> {
        self.stdout_line("→ ", Color::Cyan, true, message)
    }

    /// Print a success message
    pub fn success(&self, message: &str) -> io::Result<()> {
        self.stdout_line("✓ ", Color::Green, true, message)
    }

    /// Print a warning to stderr
    pub fn warn(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stderr = StandardStream::stderr(Self::color_choice());
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Yellow)).set_bold(true);
        Self::write_line(&mut stderr, "⚠ ", &spec, message)
    }

    /// Print an error to stderr; never suppressed
    pub fn error(&self, message: &str) -> io::Result<()> {
        let mut stderr = StandardStream::stderr(Self::color_choice());
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::Red)).set_bold(true);
        Self::write_line(&mut stderr, "✗ ", &spec, message)
    }

    /// Print a section header
    pub fn section(&self, title: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = StandardStream::stdout(Self::color_choice());
        let mut spec = ColorSpec::new();
        spec.set_bold(true).set_underline(true);
        stdout.set_color(&spec)?;
        writeln!(stdout, "{title}")?;
        stdout.reset()
    }

    /// Print an indented line
    pub fn indent(&self, message: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let mut stdout = StandardStream::stdout(Self::color_choice());
        writeln!(stdout, "    {message}")
    }
}

// Terminal write failures must not fail the build.
impl BuildObserver for OutputManager {
    fn stage_started(&self, stage: Stage) {
        let _ = self.progress(&format!("{}...", capitalize(stage.description())));
    }

    fn stage_finished(&self, stage: Stage) {
        let _ = self.verbose(&format!("done {}", stage.description()));
    }

    fn stage_failed(&self, stage: Stage) {
        let _ = self.error(&format!("failed {}", stage.description()));
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
