//! Docstring-to-OpenAPI scanner.
//!
//! Each source file is scanned by a lightweight per-language parser that finds route-annotated
//! handlers and their documentation blocks. The blocks become OpenAPI operations merged into one
//! document keyed by path and method; later files overwrite earlier ones on collision. A file that
//! cannot be read or parsed is logged, recorded in [`ScanOutcome::skipped`], and otherwise ignored.

pub mod docstring;
pub mod javascript;
pub mod python;

pub use docstring::{DocBlock, FieldDoc};

// std
use std::{fs, io, sync::LazyLock};
// crates.io
use regex::{Captures, Regex};
// self
use crate::{
	_prelude::*,
	openapi::{
		MediaType, OpenApiDocument, Operation, Parameter, ParameterLocation, RequestBody, Response,
		Schema, SecurityScheme, SecuritySchemeType,
	},
};

/// Content type used when a route annotation names none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";
/// Description of the `200` response when the documentation block does not provide one.
pub const DEFAULT_RESPONSE_DESCRIPTION: &str = "Successful response";
/// Header carrying the key for `apiKey` schemes inferred from a scheme name.
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

static FLASK_PARAM: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"<(?:[^<>:]+:)?(?P<name>[^<>:]+)>").expect("valid regex"));
static EXPRESS_PARAM: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?P<lead>^|/):(?P<name>[A-Za-z_][A-Za-z0-9_]*)\??").expect("valid regex")
});
static TEMPLATE_PARAM: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"\{(?P<name>[^}]+)\}").expect("valid regex"));

/// Per-file scanning failures.
#[derive(Debug, ThisError)]
pub enum ScanError {
	/// Source file could not be read.
	#[error("Source file could not be read.")]
	Read(#[from] io::Error),
	/// No parser handles the file's extension.
	#[error("Unsupported source file extension: {extension:?}.")]
	UnsupportedExtension {
		/// Extension found on the path, empty when absent.
		extension: String,
	},
	/// A Python string literal is never closed.
	#[error("Unterminated docstring starting on line {line}.")]
	UnterminatedDocstring {
		/// 1-based line of the opening quotes.
		line: usize,
	},
	/// A JavaScript block comment is never closed.
	#[error("Unterminated block comment starting on line {line}.")]
	UnterminatedComment {
		/// 1-based line of the opening `/*`.
		line: usize,
	},
}

/// Source languages the scanner understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Language {
	/// `.py`
	Python,
	/// `.js`, `.ts`, `.mjs`, `.cjs`
	JavaScript,
}
impl Language {
	/// Selects the language from the file extension.
	pub fn from_path(path: &Path) -> Result<Self, ScanError> {
		let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();

		match extension.to_ascii_lowercase().as_str() {
			"py" => Ok(Self::Python),
			"js" | "ts" | "mjs" | "cjs" => Ok(Self::JavaScript),
			_ => Err(ScanError::UnsupportedExtension { extension: extension.to_owned() }),
		}
	}
}

/// A route-annotated handler found in a source file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Route {
	/// Path declared by the annotation, in the framework's own template syntax.
	pub path: Option<String>,
	/// Uppercase methods declared by the annotation; empty when unspecified.
	pub methods: Vec<String>,
	/// Content types declared by the annotation; empty when unspecified.
	pub content_types: Vec<String>,
	/// Handler name, when the language exposes one.
	pub handler: Option<String>,
	/// Raw documentation block, empty when the handler has none.
	pub doc: String,
	/// 1-based line of the annotation.
	pub line: usize,
}

/// Result of a scanner run.
#[derive(Debug, Default)]
pub struct ScanOutcome {
	/// Merged document.
	pub document: OpenApiDocument,
	/// Files that were skipped and why.
	pub skipped: Vec<(PathBuf, ScanError)>,
}

/// Scans `files` in order and merges their routes into one document.
pub fn scan<I, P>(files: I) -> ScanOutcome
where
	I: IntoIterator<Item = P>,
	P: AsRef<Path>,
{
	let mut outcome = ScanOutcome::default();

	for file in files {
		let path = file.as_ref();

		match scan_file(path) {
			Ok(document) => {
				tracing::debug!(
					path = %path.display(),
					paths = document.paths.len(),
					"scanned source file"
				);

				outcome.document.merge(document);
			},
			Err(e) => {
				tracing::warn!(path = %path.display(), error = %e, "skipping source file");

				outcome.skipped.push((path.to_owned(), e));
			},
		}
	}

	outcome
}

/// Scans a single file.
pub fn scan_file(path: &Path) -> Result<OpenApiDocument, ScanError> {
	let language = Language::from_path(path)?;
	let source = fs::read_to_string(path)?;

	scan_source(&source, language)
}

/// Scans source text written in `language`.
pub fn scan_source(source: &str, language: Language) -> Result<OpenApiDocument, ScanError> {
	let routes = match language {
		Language::Python => python::routes(source)?,
		Language::JavaScript => javascript::routes(source)?,
	};
	let mut document = OpenApiDocument::default();

	for route in routes {
		let doc = DocBlock::parse(&route.doc);
		let Some(raw_path) = route.path.as_deref().or(doc.endpoint.as_deref()) else {
			tracing::warn!(line = route.line, "route annotation without a path; skipping");

			continue;
		};
		let path = normalize_path(raw_path);
		let methods = if !route.methods.is_empty() {
			route.methods.clone()
		} else if !doc.methods.is_empty() {
			doc.methods.clone()
		} else {
			vec!["GET".into()]
		};

		for method in methods {
			let operation = build_operation(&route, &path, &method, &doc);

			document.insert_operation(path.clone(), &method, operation);
		}
		for entry in &doc.security {
			document.insert_security_scheme(entry.name.clone(), security_scheme(entry));
		}
	}

	Ok(document)
}

/// Rewrites Flask `<int:id>` and Express `:id` segments as OpenAPI `{id}` templates.
pub fn normalize_path(path: &str) -> String {
	let path = FLASK_PARAM.replace_all(path, |c: &Captures| format!("{{{}}}", &c["name"]));
	let path = EXPRESS_PARAM
		.replace_all(&path, |c: &Captures| format!("{}{{{}}}", &c["lead"], &c["name"]));

	path.into_owned()
}

/// Names of the `{name}` templates in `path`, in order.
pub fn path_parameters(path: &str) -> Vec<String> {
	TEMPLATE_PARAM.captures_iter(path).map(|c| c["name"].to_owned()).collect()
}

/// Assembles the operation for one path + method of `route`.
pub fn build_operation(route: &Route, path: &str, method: &str, doc: &DocBlock) -> Operation {
	let fallback = || match &route.handler {
		Some(handler) => format!("Endpoint for {handler}"),
		None => format!("Endpoint for {} {path}", method.to_ascii_uppercase()),
	};
	let summary =
		doc.summary.clone().or_else(|| doc.free_text.first().cloned()).unwrap_or_else(fallback);
	let description = doc.description.clone().or_else(|| {
		let rest = if doc.summary.is_some() {
			&doc.free_text[..]
		} else {
			doc.free_text.get(1..).unwrap_or_default()
		};

		(!rest.is_empty()).then(|| rest.join(" "))
	});
	let content_types = if route.content_types.is_empty() {
		vec![DEFAULT_CONTENT_TYPE.to_owned()]
	} else {
		route.content_types.clone()
	};
	let request_body = (!doc.request.is_empty()).then(|| RequestBody {
		description: None,
		required: true,
		content: content(&content_types, &object_schema(&doc.request)),
	});
	let security = doc
		.security
		.iter()
		.map(|scheme| BTreeMap::from([(scheme.name.clone(), Vec::new())]))
		.collect();

	Operation {
		summary,
		description,
		parameters: parameters(path, &doc.parameters),
		request_body,
		responses: responses(&content_types, &doc.responses),
		security,
	}
}

/// Declares the scheme named by a `Security:` entry.
///
/// Names mentioning `bearer`, `jwt`, `token`, or `cognito` become HTTP bearer schemes, `basic`
/// becomes HTTP basic, `iam`/`sigv4` an `Authorization` header key, and anything else an API key
/// read from [`DEFAULT_API_KEY_HEADER`]. A location hint moves an API key out of the header.
pub fn security_scheme(entry: &FieldDoc) -> SecurityScheme {
	let name = entry.name.to_ascii_lowercase();
	let mentions = |needles: &[&str]| needles.iter().any(|needle| name.contains(needle));
	let mut scheme = if mentions(&["jwt", "cognito"]) {
		SecurityScheme::http("bearer").bearer_format("JWT")
	} else if mentions(&["bearer", "token"]) {
		SecurityScheme::http("bearer")
	} else if mentions(&["basic"]) {
		SecurityScheme::http("basic")
	} else if mentions(&["iam", "sigv4"]) {
		SecurityScheme::api_key_header("Authorization")
	} else {
		SecurityScheme::api_key_header(DEFAULT_API_KEY_HEADER)
	};

	let location = entry
		.location
		.filter(|l| *l != ParameterLocation::Path && scheme.kind == SecuritySchemeType::ApiKey);

	if let Some(location) = location {
		if location != ParameterLocation::Header {
			scheme.name = Some(entry.name.clone());
		}

		scheme.location = Some(location);
	}

	scheme.description(entry.description.clone())
}

fn parameters(path: &str, documented: &[FieldDoc]) -> Vec<Parameter> {
	let templated = path_parameters(path);
	let mut parameters = documented
		.iter()
		.map(|field| {
			let location = field.location.unwrap_or(if templated.contains(&field.name) {
				ParameterLocation::Path
			} else {
				ParameterLocation::Query
			});

			Parameter {
				name: field.name.clone(),
				location,
				description: field.description.clone(),
				required: location == ParameterLocation::Path || !field.optional,
				schema: Schema::of(field.kind.unwrap_or_default()),
			}
		})
		.collect::<Vec<_>>();

	for name in templated {
		if !parameters.iter().any(|p| p.location == ParameterLocation::Path && p.name == name) {
			parameters.push(Parameter {
				name,
				location: ParameterLocation::Path,
				description: None,
				required: true,
				schema: Schema::default(),
			});
		}
	}

	parameters
}

fn responses(content_types: &[String], documented: &[FieldDoc]) -> BTreeMap<String, Response> {
	let (statuses, fields) =
		documented.iter().partition::<Vec<_>, _>(|entry| is_status_code(&entry.name));
	let body = if fields.is_empty() {
		Schema::object()
	} else {
		object_schema(fields)
	};
	let mut responses = BTreeMap::from([(
		"200".to_owned(),
		Response {
			description: DEFAULT_RESPONSE_DESCRIPTION.into(),
			content: content(content_types, &body),
		},
	)]);

	for status in statuses {
		let description = status.description.clone();

		match responses.get_mut(&status.name) {
			Some(existing) =>
				if let Some(description) = description {
					existing.description = description;
				},
			None => {
				responses.insert(
					status.name.clone(),
					Response {
						description: description.unwrap_or_else(|| "No description".into()),
						content: BTreeMap::new(),
					},
				);
			},
		}
	}

	responses
}

fn object_schema<'a>(fields: impl IntoIterator<Item = &'a FieldDoc>) -> Schema {
	let mut schema = Schema::object();

	for field in fields {
		schema.properties.insert(
			field.name.clone(),
			Schema {
				description: field.description.clone(),
				..Schema::of(field.kind.unwrap_or_default())
			},
		);

		if !field.optional && !schema.required.contains(&field.name) {
			schema.required.push(field.name.clone());
		}
	}

	schema
}

fn content(content_types: &[String], schema: &Schema) -> BTreeMap<String, MediaType> {
	content_types.iter().map(|ty| (ty.clone(), MediaType { schema: schema.clone() })).collect()
}

fn is_status_code(name: &str) -> bool {
	name.eq_ignore_ascii_case("default")
		|| (name.len() == 3 && name.bytes().all(|b| b.is_ascii_digit()))
}
