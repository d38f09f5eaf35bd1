//! Route discovery for JavaScript and TypeScript sources.
//!
//! Express-style `obj.verb('/path', ...)` calls are routes; the documentation block is the
//! `/* ... */` comment that immediately precedes the call, separated by whitespace only.

// std
use std::{ops::Range, sync::LazyLock};
// crates.io
use regex::Regex;
// self
use crate::scanner::{Route, ScanError};

static ROUTE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r#"[A-Za-z_$][\w$]*\s*\.\s*(?P<verb>get|post|put|patch|delete|head|options)\s*\(\s*(?:'(?P<sq>[^'\n]*)'|"(?P<dq>[^"\n]*)"|`(?P<bq>[^`]*)`)"#,
	)
	.expect("valid regex")
});

/// Extracts every route call in `source`, in source order.
pub fn routes(source: &str) -> Result<Vec<Route>, ScanError> {
	let lexed = Lexed::new(source)?;
	let routes = ROUTE
		.captures_iter(source)
		.filter_map(|captures| {
			let start = captures.get(0)?.start();

			if lexed.is_masked(start) {
				return None;
			}

			let path = captures
				.name("sq")
				.or_else(|| captures.name("dq"))
				.or_else(|| captures.name("bq"))?
				.as_str();

			if !path.starts_with('/') {
				return None;
			}

			Some(Route {
				path: Some(path.to_owned()),
				methods: vec![captures["verb"].to_ascii_uppercase()],
				content_types: Vec::new(),
				handler: None,
				doc: lexed.doc_before(source, start).unwrap_or_default().to_owned(),
				line: line_of(source, start),
			})
		})
		.collect();

	Ok(routes)
}

// Comment and string spans of a source file.
#[derive(Debug, Default)]
struct Lexed {
	block_comments: Vec<Range<usize>>,
	masked: Vec<Range<usize>>,
}
impl Lexed {
	fn new(source: &str) -> Result<Self, ScanError> {
		let bytes = source.as_bytes();
		let mut lexed = Lexed::default();
		let mut idx = 0;

		while idx < bytes.len() {
			match (bytes[idx], bytes.get(idx + 1)) {
				(b'/', Some(b'/')) => {
					let end = source[idx..].find('\n').map_or(bytes.len(), |off| idx + off);

					lexed.masked.push(idx..end);

					idx = end;
				},
				(b'/', Some(b'*')) => {
					let Some(off) = source[idx + 2..].find("*/") else {
						return Err(ScanError::UnterminatedComment { line: line_of(source, idx) });
					};
					let end = idx + 2 + off + 2;

					lexed.block_comments.push(idx..end);
					lexed.masked.push(idx..end);

					idx = end;
				},
				(quote @ (b'\'' | b'"' | b'`'), _) => {
					let end = string_end(bytes, idx, quote);

					lexed.masked.push(idx..end);

					idx = end;
				},
				_ => idx += 1,
			}
		}

		Ok(lexed)
	}

	fn is_masked(&self, pos: usize) -> bool {
		let next = self.masked.partition_point(|span| span.start <= pos);

		next > 0 && self.masked[next - 1].contains(&pos)
	}

	// Inner text of the block comment ending right before `pos`, if only whitespace separates them.
	fn doc_before<'a>(&self, source: &'a str, pos: usize) -> Option<&'a str> {
		let comment = self.block_comments.iter().rev().find(|c| c.end <= pos)?;

		if !source[comment.end..pos].trim().is_empty() {
			return None;
		}

		let inner = &source[comment.start + 2..comment.end - 2];

		Some(inner.strip_prefix('*').unwrap_or(inner))
	}
}

fn string_end(bytes: &[u8], start: usize, quote: u8) -> usize {
	let mut idx = start + 1;

	while idx < bytes.len() {
		match bytes[idx] {
			b'\\' => idx += 2,
			b if b == quote => return idx + 1,
			b'\n' if quote != b'`' => return idx,
			_ => idx += 1,
		}
	}

	bytes.len()
}

fn line_of(source: &str, pos: usize) -> usize {
	source[..pos].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	const EXPRESS: &str = r#"
const express = require('express');
const router = express.Router();

/**
 * Summary: Fetch a user.
 * Parameters:
 * - id (path): User ID
 */
router.get('/users/:id', async (req, res) => {
	res.json({});
});

// app.get('/commented-out', handler);
const note = "app.post('/inside-a-string')";

/* Not attached: code follows. */
const unrelated = 1;
app.delete("/users/:id", remove);
"#;

	#[test]
	fn routes_and_preceding_block_comments_are_paired() {
		let routes = routes(EXPRESS).expect("Source should scan.");

		assert_eq!(routes.len(), 2);
		assert_eq!(routes[0].path.as_deref(), Some("/users/:id"));
		assert_eq!(routes[0].methods, ["GET"]);
		assert!(routes[0].doc.contains("Summary: Fetch a user."));
		assert_eq!(routes[0].line, 10);
		assert_eq!(routes[1].methods, ["DELETE"]);
		assert!(routes[1].doc.is_empty());
	}

	#[test]
	fn calls_without_a_route_path_are_ignored() {
		let routes = routes("const v = map.get('key');\nconfig.get(`/a`);\n")
			.expect("Source should scan.");

		assert_eq!(routes.len(), 1);
		assert_eq!(routes[0].path.as_deref(), Some("/a"));
	}

	#[test]
	fn unterminated_block_comment_is_an_error() {
		let source = "app.get('/a', h);\n\n/* never closed\napp.get('/b', h);\n";

		assert!(matches!(routes(source), Err(ScanError::UnterminatedComment { line: 3 })));
	}
}
