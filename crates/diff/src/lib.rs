//! Text diff rendering shared by the konfigurator crates.
//!
//! Diffs are line based and printed in unified format, optionally colored
//! for terminal output (red for deletions, green for additions).

use std::{
	fmt,
	io::{self, IsTerminal, Write},
	str::FromStr,
};

use nu_ansi_term::{Color, Style};
use similar::{DiffTag, TextDiff};

/// Lines of unchanged context printed around every hunk.
pub const CONTEXT_RADIUS: usize = 3;

/// When to color diff output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
	/// Color only when stdout is a terminal.
	#[default]
	Auto,
	Always,
	Never,
}

impl ColorMode {
	/// Resolve the mode into a yes/no decision for the current process.
	pub fn should_colorize(self) -> bool {
		match self {
			ColorMode::Auto => io::stdout().is_terminal(),
			ColorMode::Always => true,
			ColorMode::Never => false,
		}
	}
}

/// Error returned when parsing an unknown color mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownColorMode(pub String);

impl fmt::Display for UnknownColorMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"unknown color mode '{}', must be \"auto\", \"always\", or \"never\"",
			self.0
		)
	}
}

impl std::error::Error for UnknownColorMode {}

impl FromStr for ColorMode {
	type Err = UnknownColorMode;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"auto" => Ok(ColorMode::Auto),
			"always" => Ok(ColorMode::Always),
			"never" => Ok(ColorMode::Never),
			other => Err(UnknownColorMode(other.to_string())),
		}
	}
}

impl fmt::Display for ColorMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ColorMode::Auto => write!(f, "auto"),
			ColorMode::Always => write!(f, "always"),
			ColorMode::Never => write!(f, "never"),
		}
	}
}

/// Returns true if `old` and `new` differ in at least one line.
pub fn has_changes(old: &str, new: &str) -> bool {
	TextDiff::from_lines(old, new)
		.ops()
		.iter()
		.any(|op| op.tag() != DiffTag::Equal)
}

/// Write a unified diff of `old` against `new`.
///
/// Headers are `--- a/<old_label>` and `+++ b/<new_label>`. Nothing is written
/// when the inputs are identical. Returns whether any change was found.
pub fn write_unified_diff<W: Write + ?Sized>(
	writer: &mut W,
	old_label: &str,
	new_label: &str,
	old: &str,
	new: &str,
	colored: bool,
) -> io::Result<bool> {
	let diff = TextDiff::from_lines(old, new);
	if diff.ops().iter().all(|op| op.tag() == DiffTag::Equal) {
		return Ok(false);
	}

	let old_header = format!("a/{}", old_label);
	let new_header = format!("b/{}", new_label);
	let rendered = diff
		.unified_diff()
		.context_radius(CONTEXT_RADIUS)
		.header(&old_header, &new_header)
		.to_string();

	if !colored {
		writer.write_all(rendered.as_bytes())?;
		return Ok(true);
	}

	for line in rendered.lines() {
		match line_style(line) {
			Some(style) => writeln!(writer, "{}", style.paint(line))?,
			None => writeln!(writer, "{}", line)?,
		}
	}

	Ok(true)
}

fn line_style(line: &str) -> Option<Style> {
	if line.starts_with("--- ") || line.starts_with("+++ ") {
		Some(Style::new().bold())
	} else if line.starts_with("@@") {
		Some(Color::Cyan.normal())
	} else if line.starts_with('-') {
		Some(Color::Red.normal())
	} else if line.starts_with('+') {
		Some(Color::Green.normal())
	} else {
		None
	}
}
