//! Route discovery for Python sources.
//!
//! Recognizes Flask/Chalice-style `@obj.route("/path", methods=[...])` decorators and the
//! FastAPI-style `@obj.get("/path")` family. The decorated handler is the next `def` or
//! `async def`, and its docstring is the first statement of the body.

// std
use std::{ops::Range, sync::LazyLock};
// crates.io
use regex::{Captures, Regex};
// self
use crate::scanner::{Route, ScanError};

static DECORATOR: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^@\s*(?:[A-Za-z_]\w*\s*\.\s*)+(?P<verb>route|get|post|put|patch|delete|head|options)\s*\((?P<args>.*)\)\s*(?:#.*)?$",
	)
	.expect("valid regex")
});
static POSITIONAL_PATH: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"^\s*[rRuU]?(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#).expect("valid regex")
});
static KEYWORD_PATH: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r#"\b(?:path|rule)\s*=\s*[rRuU]?(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)')"#)
		.expect("valid regex")
});
static METHODS: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\bmethods\s*=\s*[\[\(\{](?P<list>[^\]\)\}]*)[\]\)\}]").expect("valid regex")
});
static CONTENT_TYPES: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\bcontent_types\s*=\s*[\[\(\{](?P<list>[^\]\)\}]*)[\]\)\}]")
		.expect("valid regex")
});
static STRING_LITERAL: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#""(?P<dq>[^"]*)"|'(?P<sq>[^']*)'"#).expect("valid regex"));
static DEF: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^(?:async\s+)?def\s+(?P<name>[A-Za-z_]\w*)").expect("valid regex")
});

const TRIPLE_QUOTES: [&str; 2] = ["\"\"\"", "'''"];

#[derive(Debug)]
struct Annotation {
	path: Option<String>,
	methods: Vec<String>,
	content_types: Vec<String>,
	line: usize,
}

/// Extracts every annotated handler in `source`, in source order.
pub fn routes(source: &str) -> Result<Vec<Route>, ScanError> {
	let strings = multiline_strings(source)?;
	let lines = source.lines().collect::<Vec<_>>();
	let starts = line_starts(source);
	let mut routes = Vec::new();
	let mut pending = Vec::new();
	let mut idx = 0;

	while idx < lines.len() {
		if inside(&strings, starts[idx]) {
			idx += 1;

			continue;
		}

		let trimmed = lines[idx].trim_start();

		if trimmed.starts_with('@') {
			let (text, next) = join_decorator(&lines, idx);

			if let Some(annotation) = parse_decorator(&text, idx + 1) {
				pending.push(annotation);
			}

			idx = next;

			continue;
		}
		if let Some(name) = DEF.captures(trimmed).and_then(|c| c.name("name")) {
			if pending.is_empty() {
				idx += 1;

				continue;
			}

			let (doc, next) = docstring(&lines, idx)?;

			for annotation in pending.drain(..) {
				routes.push(Route {
					path: annotation.path,
					methods: annotation.methods,
					content_types: annotation.content_types,
					handler: Some(name.as_str().to_owned()),
					doc: doc.clone().unwrap_or_default(),
					line: annotation.line,
				});
			}

			idx = next;

			continue;
		}
		if !trimmed.is_empty() && !trimmed.starts_with('#') {
			pending.clear();
		}

		idx += 1;
	}

	Ok(routes)
}

fn join_decorator(lines: &[&str], start: usize) -> (String, usize) {
	let mut text = lines[start].trim().to_owned();
	let mut depth = paren_delta(&text);
	let mut idx = start;

	while depth > 0 && idx + 1 < lines.len() {
		idx += 1;

		let line = lines[idx].trim();

		text.push(' ');
		text.push_str(line);

		depth += paren_delta(line);
	}

	(text, idx + 1)
}

fn paren_delta(text: &str) -> i32 {
	text.chars().fold(0, |depth, ch| match ch {
		'(' => depth + 1,
		')' => depth - 1,
		_ => depth,
	})
}

fn parse_decorator(text: &str, line: usize) -> Option<Annotation> {
	let captures = DECORATOR.captures(text)?;
	let verb = captures.name("verb")?.as_str();
	let args = captures.name("args").map_or("", |m| m.as_str());
	let path = POSITIONAL_PATH
		.captures(args)
		.or_else(|| KEYWORD_PATH.captures(args))
		.and_then(|c| literal(&c));
	let methods = if verb == "route" {
		string_list(&METHODS, args).into_iter().map(|m| m.to_ascii_uppercase()).collect()
	} else {
		vec![verb.to_ascii_uppercase()]
	};

	Some(Annotation { path, methods, content_types: string_list(&CONTENT_TYPES, args), line })
}

fn string_list(pattern: &Regex, args: &str) -> Vec<String> {
	pattern
		.captures(args)
		.and_then(|c| c.name("list"))
		.map(|list| STRING_LITERAL.captures_iter(list.as_str()).filter_map(|c| literal(&c)).collect())
		.unwrap_or_default()
}

fn literal(captures: &Captures) -> Option<String> {
	captures.name("dq").or_else(|| captures.name("sq")).map(|m| m.as_str().to_owned())
}

// Returns the docstring of the handler defined at `def_idx` and the index of the first line after
// it (or after the signature when there is no docstring).
fn docstring(lines: &[&str], def_idx: usize) -> Result<(Option<String>, usize), ScanError> {
	let mut depth = 0;
	let mut idx = def_idx;

	loop {
		let line = lines[idx];

		depth += paren_delta(line);

		if depth <= 0 {
			let after_params = line.rfind(')').map_or(0, |pos| pos + 1);

			if let Some(colon) = line[after_params..].find(':') {
				let inline = line[after_params + colon + 1..].trim();

				if !inline.is_empty() {
					return string_at(lines, idx, inline);
				}

				break;
			}
		}
		if idx + 1 >= lines.len() {
			return Ok((None, lines.len()));
		}

		idx += 1;
	}

	let body = (idx + 1..lines.len()).find(|&i| {
		let trimmed = lines[i].trim();

		!trimmed.is_empty() && !trimmed.starts_with('#')
	});

	match body {
		Some(body_idx) => string_at(lines, body_idx, lines[body_idx].trim()),
		None => Ok((None, lines.len())),
	}
}

// Reads a string literal beginning at `text`, which is found on line `idx`.
fn string_at(lines: &[&str], idx: usize, text: &str) -> Result<(Option<String>, usize), ScanError> {
	let text = match text.strip_prefix(['r', 'R', 'u', 'U']) {
		Some(rest) if rest.starts_with(['"', '\'']) => rest,
		_ => text,
	};

	if let Some(delimiter) = TRIPLE_QUOTES.into_iter().find(|d| text.starts_with(d)) {
		let rest = &text[delimiter.len()..];

		if let Some(end) = rest.find(delimiter) {
			return Ok((Some(rest[..end].to_owned()), idx + 1));
		}

		let mut doc = format!("{rest}\n");

		for (offset, line) in lines[idx + 1..].iter().enumerate() {
			if let Some(end) = line.find(delimiter) {
				doc.push_str(&line[..end]);

				return Ok((Some(doc), idx + offset + 2));
			}

			doc.push_str(line);
			doc.push('\n');
		}

		return Err(ScanError::UnterminatedDocstring { line: idx + 1 });
	}

	for quote in ['"', '\''] {
		if let Some(rest) = text.strip_prefix(quote) {
			return Ok((rest.find(quote).map(|end| rest[..end].to_owned()), idx + 1));
		}
	}

	Ok((None, idx))
}

// Byte spans of every triple-quoted string, found by a lexer that also steps over comments and
// single-line string literals.
fn multiline_strings(source: &str) -> Result<Vec<Range<usize>>, ScanError> {
	let bytes = source.as_bytes();
	let mut spans = Vec::new();
	let mut idx = 0;

	while idx < bytes.len() {
		match bytes[idx] {
			b'#' => idx = source[idx..].find('\n').map_or(bytes.len(), |off| idx + off),
			quote @ (b'"' | b'\'') => {
				let triple = bytes[idx..].starts_with(&[quote; 3]);
				let end = literal_end(bytes, idx, quote, triple);

				if triple {
					let end = end.ok_or(ScanError::UnterminatedDocstring {
						line: source[..idx].matches('\n').count() + 1,
					})?;

					spans.push(idx..end);
				}

				idx = end.unwrap_or(bytes.len());
			},
			_ => idx += 1,
		}
	}

	Ok(spans)
}

// End of the literal opened at `start`. A single-quoted literal also ends at a newline; only an
// unterminated triple-quoted one yields `None`.
fn literal_end(bytes: &[u8], start: usize, quote: u8, triple: bool) -> Option<usize> {
	let mut idx = start + if triple { 3 } else { 1 };

	while idx < bytes.len() {
		match bytes[idx] {
			b'\\' => idx += 2,
			b if b == quote && !triple => return Some(idx + 1),
			b if b == quote && bytes[idx..].starts_with(&[quote; 3]) => return Some(idx + 3),
			b'\n' if !triple => return Some(idx),
			_ => idx += 1,
		}
	}

	(!triple).then_some(bytes.len())
}

fn line_starts(source: &str) -> Vec<usize> {
	std::iter::once(0).chain(source.match_indices('\n').map(|(idx, _)| idx + 1)).collect()
}

fn inside(spans: &[Range<usize>], pos: usize) -> bool {
	let next = spans.partition_point(|span| span.start < pos);

	next > 0 && pos < spans[next - 1].end
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn route_decorators_collect_path_methods_and_content_types() {
		let source = r#"
@app.route(
    "/users/<int:user_id>",
    methods=["GET", "delete"],
    content_types=["application/json", "text/plain"],
)
def user(user_id):
    """
    Summary: Fetch or delete a user.
    """
    return {}
"#;
		let routes = routes(source).expect("Source should scan.");

		assert_eq!(routes.len(), 1);
		assert_eq!(routes[0].path.as_deref(), Some("/users/<int:user_id>"));
		assert_eq!(routes[0].methods, ["GET", "DELETE"]);
		assert_eq!(routes[0].content_types, ["application/json", "text/plain"]);
		assert_eq!(routes[0].handler.as_deref(), Some("user"));
		assert!(routes[0].doc.contains("Summary: Fetch or delete a user."));
	}

	#[test]
	fn verb_decorators_and_async_handlers_are_recognized() {
		let source = r#"
@router.post('/items')
@requires_auth
async def create_item(
    item: Item,
) -> Item:
    '''Create an item.'''
    ...
"#;
		let routes = routes(source).expect("Source should scan.");

		assert_eq!(routes.len(), 1);
		assert_eq!(routes[0].methods, ["POST"]);
		assert_eq!(routes[0].handler.as_deref(), Some("create_item"));
		assert_eq!(routes[0].doc, "Create an item.");
	}

	#[test]
	fn undecorated_functions_are_skipped() {
		let source = r#"
def helper():
    """Summary: Not a route."""

@app.get("/health")
def health(): return "ok"
"#;
		let routes = routes(source).expect("Source should scan.");

		assert_eq!(routes.len(), 1);
		assert_eq!(routes[0].path.as_deref(), Some("/health"));
		assert!(routes[0].doc.is_empty());
	}

	#[test]
	fn decorator_examples_inside_strings_are_ignored() {
		let source = r#"
"""
Usage:

@app.route("/fake")
def fake():
"""
"#;

		assert!(routes(source).expect("Source should scan.").is_empty());
	}

	#[test]
	fn quotes_in_comments_and_short_strings_do_not_hide_routes() {
		let source = r#"
QUOTE = '"""'
# the closing """ is below

@app.get('/a')
def a():
    """Summary: A."""

@app.get("/b")
def b():
    '''Summary: B.'''
"#;
		let routes = routes(source).expect("Source should scan.");

		assert_eq!(
			routes.iter().filter_map(|r| r.path.as_deref()).collect::<Vec<_>>(),
			["/a", "/b"]
		);
		assert_eq!(routes[0].doc, "Summary: A.");
	}

	#[test]
	fn unterminated_module_string_is_an_error() {
		let source = "@app.get('/a')\ndef a():\n    pass\n\nNOTES = '''\n@app.get('/b')\n";

		assert!(matches!(routes(source), Err(ScanError::UnterminatedDocstring { line: 5 })));
	}

	#[test]
	fn unterminated_handler_docstring_is_an_error() {
		let source = "@app.get('/x')\ndef x():\n    \"\"\"Never closed.\n    return 1\n";

		assert!(matches!(routes(source), Err(ScanError::UnterminatedDocstring { line: 3 })));
	}
}
