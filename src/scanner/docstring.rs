//! Parser for the plain-text documentation block attached to a route handler.
//!
//! The format is line oriented. Keys (`Summary:`, `Description:`, `Endpoint:`, `Method:`) take
//! the rest of the line. Section headers (`Parameters:`, `Request:`/`Body:`,
//! `Response:`/`Responses:`, `Security:`) open a list of entries that runs until the next blank
//! line or key. Any other line is free text.

// std
use std::sync::LazyLock;
// crates.io
use regex::Regex;
// self
use crate::openapi::{ParameterLocation, SchemaType};

/// Parsed documentation block.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocBlock {
	/// Explicit `Summary:` value.
	pub summary: Option<String>,
	/// Explicit `Description:` value.
	pub description: Option<String>,
	/// `Endpoint:` value, used when the route annotation has no path.
	pub endpoint: Option<String>,
	/// `Method:` values, used when the route annotation names no methods.
	pub methods: Vec<String>,
	/// Lines outside any key or section.
	pub free_text: Vec<String>,
	/// `Parameters:` entries.
	pub parameters: Vec<FieldDoc>,
	/// `Request:`/`Body:` entries.
	pub request: Vec<FieldDoc>,
	/// `Response:`/`Responses:` entries.
	pub responses: Vec<FieldDoc>,
	/// `Security:` entries.
	pub security: Vec<FieldDoc>,
}
impl DocBlock {
	/// Parses `text`. Never fails: anything unrecognized becomes free text or is ignored.
	pub fn parse(text: &str) -> Self {
		let mut block = DocBlock::default();
		let mut section = None;

		for line in text.lines().map(clean_line) {
			if line.is_empty() {
				section = None;

				continue;
			}
			if let Some((key, value)) = Key::split(line) {
				section = None;

				match key {
					Key::Summary => block.summary = non_empty(value),
					Key::Description => block.description = non_empty(value),
					Key::Endpoint => block.endpoint = non_empty(value),
					Key::Methods =>
						block.methods = value
							.split([',', ' '])
							.map(|m| m.trim().to_ascii_uppercase())
							.filter(|m| !m.is_empty())
							.collect(),
				}

				continue;
			}
			if let Some(header) = Section::parse(line) {
				section = Some(header);

				continue;
			}

			match section {
				Some(section) =>
					if let Some(entry) = FieldDoc::parse(line) {
						block.section_mut(section).push(entry);
					},
				None => block.free_text.push(line.to_owned()),
			}
		}

		block
	}

	fn section_mut(&mut self, section: Section) -> &mut Vec<FieldDoc> {
		match section {
			Section::Parameters => &mut self.parameters,
			Section::Request => &mut self.request,
			Section::Responses => &mut self.responses,
			Section::Security => &mut self.security,
		}
	}
}

/// One `[-] name [(hints)]: description` entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldDoc {
	/// Field, parameter, status code, or scheme name.
	pub name: String,
	/// Location hint.
	pub location: Option<ParameterLocation>,
	/// Type hint.
	pub kind: Option<SchemaType>,
	/// Whether the entry was marked `optional`.
	pub optional: bool,
	/// Free-form description.
	pub description: Option<String>,
}
impl FieldDoc {
	/// Parses a section entry, tolerating bullets and pseudo-JSON punctuation.
	pub fn parse(line: &str) -> Option<Self> {
		let line = line.trim_start_matches(['-', '*', '•']).trim();
		let line = line.trim_start_matches(['{', '[']).trim_end_matches([',', '}', ']']).trim();

		if line.is_empty() {
			return None;
		}

		let captures = ENTRY.captures(line)?;
		let name = captures.name("name")?.as_str().trim_matches(['"', '\'', '`']);

		if name.is_empty() {
			return None;
		}

		let mut entry = FieldDoc { name: name.to_owned(), ..Default::default() };

		if let Some(hints) = captures.name("hints") {
			for hint in hints.as_str().split([',', ' ', '|']).filter(|h| !h.is_empty()) {
				if hint.eq_ignore_ascii_case("optional") {
					entry.optional = true;
				} else if hint.eq_ignore_ascii_case("required") {
					entry.optional = false;
				} else if let Some(location) = ParameterLocation::parse(hint) {
					entry.location = Some(location);
				} else if let Some(kind) = SchemaType::parse(hint) {
					entry.kind = Some(kind);
				}
			}
		}

		entry.description = captures
			.name("desc")
			.map(|d| d.as_str().trim().trim_matches(['"', '\'']).trim().to_owned())
			.filter(|d| !d.is_empty());

		Some(entry)
	}
}

static ENTRY: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r#"^(?P<name>["'`]?[^\s():"'`]+["'`]?)\s*(?:\((?P<hints>[^)]*)\))?\s*(?::\s*(?P<desc>.*))?$"#,
	)
	.expect("valid regex")
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Key {
	Summary,
	Description,
	Endpoint,
	Methods,
}
impl Key {
	fn split(line: &str) -> Option<(Self, &str)> {
		let (key, value) = line.split_once(':')?;
		let key = match key.trim().to_ascii_lowercase().as_str() {
			"summary" => Self::Summary,
			"description" => Self::Description,
			"endpoint" | "path" => Self::Endpoint,
			"method" | "methods" => Self::Methods,
			_ => return None,
		};

		Some((key, value))
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
	Parameters,
	Request,
	Responses,
	Security,
}
impl Section {
	fn parse(line: &str) -> Option<Self> {
		let header = line.strip_suffix(':')?.trim().to_ascii_lowercase();

		match header.as_str() {
			"parameters" | "params" | "args" | "arguments" => Some(Self::Parameters),
			"request" | "body" | "request body" => Some(Self::Request),
			"response" | "responses" | "returns" => Some(Self::Responses),
			"security" => Some(Self::Security),
			_ => None,
		}
	}
}

// Strips indentation and the `*` gutter used by block comments.
fn clean_line(line: &str) -> &str {
	let line = line.trim();

	match line.strip_prefix('*') {
		Some(rest) if !rest.starts_with('*') => rest.trim(),
		_ => line,
	}
}

fn non_empty(value: &str) -> Option<String> {
	let value = value.trim();

	(!value.is_empty()).then(|| value.to_owned())
}
