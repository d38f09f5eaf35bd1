//! Minimal OpenAPI 3.0 document model with deterministic YAML output.
//!
//! Only the subset the scanner produces is modeled. Every map is a [`BTreeMap`], so serializing
//! the same document twice yields byte-identical output regardless of insertion order.

// std
use std::{fs, io};
// self
use crate::_prelude::*;

/// OpenAPI version written into every document.
pub const OPENAPI_VERSION: &str = "3.0.3";

/// Operations of one path, keyed by lowercase HTTP method.
pub type PathItem = BTreeMap<String, Operation>;

/// Errors raised while writing a document.
#[derive(Debug, ThisError)]
pub enum OutputError {
	/// Document could not be rendered as YAML.
	#[error("OpenAPI document could not be serialized.")]
	Serialize(#[from] serde_yaml::Error),
	/// Output file could not be written.
	#[error("OpenAPI document could not be written to {}.", path.display())]
	Write {
		/// Destination path.
		path: PathBuf,
		/// Underlying I/O failure.
		#[source]
		source: io::Error,
	},
}

/// Root OpenAPI document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
	/// OpenAPI version.
	pub openapi: String,
	/// API metadata.
	pub info: Info,
	/// Path items keyed by templated path.
	pub paths: BTreeMap<String, PathItem>,
	/// Reusable components referenced by operations.
	#[serde(default, skip_serializing_if = "Components::is_empty")]
	pub components: Components,
}
impl OpenApiDocument {
	/// Inserts `operation` at `path` + `method`, replacing any existing operation wholesale.
	///
	/// Other methods already registered under `path` are kept. Returns the replaced operation.
	pub fn insert_operation(
		&mut self,
		path: impl Into<String>,
		method: &str,
		operation: Operation,
	) -> Option<Operation> {
		self.paths.entry(path.into()).or_default().insert(method.to_ascii_lowercase(), operation)
	}

	/// Returns the operation registered at `path` + `method`.
	pub fn operation(&self, path: &str, method: &str) -> Option<&Operation> {
		self.paths.get(path)?.get(&method.to_ascii_lowercase())
	}

	/// Declares a security scheme, replacing any earlier declaration under `name`.
	pub fn insert_security_scheme(&mut self, name: impl Into<String>, scheme: SecurityScheme) {
		self.components.security_schemes.insert(name.into(), scheme);
	}

	/// Merges `other` into `self`; operations and schemes from `other` win on collisions.
	pub fn merge(&mut self, other: OpenApiDocument) {
		for (path, item) in other.paths {
			for (method, operation) in item {
				self.insert_operation(path.clone(), &method, operation);
			}
		}

		self.components.security_schemes.extend(other.components.security_schemes);
	}

	/// Renders the document as YAML.
	pub fn to_yaml(&self) -> Result<String, OutputError> {
		Ok(serde_yaml::to_string(self)?)
	}

	/// Writes the YAML rendering to `path`, replacing any existing file.
	pub fn write_yaml(&self, path: impl AsRef<Path>) -> Result<(), OutputError> {
		let path = path.as_ref();
		let yaml = self.to_yaml()?;

		fs::write(path, yaml).map_err(|source| OutputError::Write { path: path.to_owned(), source })
	}
}
impl Default for OpenApiDocument {
	fn default() -> Self {
		Self {
			openapi: OPENAPI_VERSION.into(),
			info: Info::default(),
			paths: BTreeMap::new(),
			components: Components::default(),
		}
	}
}

/// API metadata block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
	/// API title.
	pub title: String,
	/// API version.
	pub version: String,
}
impl Default for Info {
	fn default() -> Self {
		Self { title: "API Specification".into(), version: "1.0.0".into() }
	}
}

/// Reusable document components.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
	/// Security schemes keyed by the name operations use in their requirements.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub security_schemes: BTreeMap<String, SecurityScheme>,
}
impl Components {
	/// Whether there is nothing to render.
	pub fn is_empty(&self) -> bool {
		self.security_schemes.is_empty()
	}
}

/// Security scheme kinds the scanner emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecuritySchemeType {
	/// Key carried in a header, query parameter, or cookie.
	ApiKey,
	/// `Authorization` header with an HTTP scheme such as `bearer`.
	Http,
}

/// Security scheme declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
	/// Scheme kind.
	#[serde(rename = "type")]
	pub kind: SecuritySchemeType,
	/// Scheme description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Key name, for `apiKey` schemes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// Key location, for `apiKey` schemes.
	#[serde(default, rename = "in", skip_serializing_if = "Option::is_none")]
	pub location: Option<ParameterLocation>,
	/// HTTP authorization scheme, for `http` schemes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub scheme: Option<String>,
	/// Token format hint, for `http` bearer schemes.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub bearer_format: Option<String>,
}
impl SecurityScheme {
	/// `apiKey` scheme read from header `header`.
	pub fn api_key_header(header: impl Into<String>) -> Self {
		Self {
			kind: SecuritySchemeType::ApiKey,
			description: None,
			name: Some(header.into()),
			location: Some(ParameterLocation::Header),
			scheme: None,
			bearer_format: None,
		}
	}

	/// `http` scheme such as `bearer` or `basic`.
	pub fn http(scheme: impl Into<String>) -> Self {
		Self {
			kind: SecuritySchemeType::Http,
			description: None,
			name: None,
			location: None,
			scheme: Some(scheme.into()),
			bearer_format: None,
		}
	}

	/// Sets the bearer token format.
	pub fn bearer_format(mut self, format: impl Into<String>) -> Self {
		self.bearer_format = Some(format.into());

		self
	}

	/// Sets the description.
	pub fn description(mut self, description: Option<String>) -> Self {
		self.description = description;

		self
	}
}

/// A single API operation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
	/// Short summary.
	pub summary: String,
	/// Longer description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Path, query, header, and cookie parameters.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub parameters: Vec<Parameter>,
	/// Request body, when documented.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request_body: Option<RequestBody>,
	/// Responses keyed by status code.
	pub responses: BTreeMap<String, Response>,
	/// Security requirements.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub security: Vec<BTreeMap<String, Vec<String>>>,
}

/// Parameter location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
	/// Query string.
	Query,
	/// Templated path segment.
	Path,
	/// Request header.
	Header,
	/// Cookie.
	Cookie,
}
impl ParameterLocation {
	/// Parses a location hint, case-insensitively.
	pub fn parse(hint: &str) -> Option<Self> {
		match hint.to_ascii_lowercase().as_str() {
			"query" => Some(Self::Query),
			"path" => Some(Self::Path),
			"header" => Some(Self::Header),
			"cookie" => Some(Self::Cookie),
			_ => None,
		}
	}
}

/// Operation parameter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
	/// Parameter name.
	pub name: String,
	/// Parameter location.
	#[serde(rename = "in")]
	pub location: ParameterLocation,
	/// Parameter description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Whether the parameter is required; always `true` for path parameters.
	pub required: bool,
	/// Value schema.
	pub schema: Schema,
}

/// JSON schema primitive types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
	/// UTF-8 string.
	#[default]
	String,
	/// Integer.
	Integer,
	/// Floating-point number.
	Number,
	/// Boolean.
	Boolean,
	/// Array.
	Array,
	/// Object.
	Object,
}
impl SchemaType {
	/// Parses a type hint, accepting common aliases from Python and TypeScript.
	pub fn parse(hint: &str) -> Option<Self> {
		match hint.to_ascii_lowercase().as_str() {
			"string" | "str" => Some(Self::String),
			"integer" | "int" => Some(Self::Integer),
			"number" | "float" | "double" => Some(Self::Number),
			"boolean" | "bool" => Some(Self::Boolean),
			"array" | "list" => Some(Self::Array),
			"object" | "dict" => Some(Self::Object),
			_ => None,
		}
	}
}

/// Schema subset: a type plus optional object members.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
	/// Value type.
	#[serde(rename = "type")]
	pub kind: SchemaType,
	/// Member description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Element schema; always present for arrays.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub items: Option<Box<Schema>>,
	/// Object properties.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub properties: BTreeMap<String, Schema>,
	/// Required property names.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub required: Vec<String>,
}
impl Schema {
	/// Schema of the given type. Arrays get string elements.
	pub fn of(kind: SchemaType) -> Self {
		let items = (kind == SchemaType::Array).then(|| Box::new(Self::default()));

		Self { kind, items, ..Default::default() }
	}

	/// Empty object schema.
	pub fn object() -> Self {
		Self::of(SchemaType::Object)
	}
}

/// Media type entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
	/// Body schema.
	pub schema: Schema,
}

/// Request body.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
	/// Body description.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub description: Option<String>,
	/// Whether a body is required.
	pub required: bool,
	/// Schemas keyed by content type.
	pub content: BTreeMap<String, MediaType>,
}

/// Response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
	/// Response description.
	pub description: String,
	/// Schemas keyed by content type.
	#[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
	pub content: BTreeMap<String, MediaType>,
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn operation(summary: &str) -> Operation {
		let mut responses = BTreeMap::new();

		responses
			.insert("200".into(), Response { description: "ok".into(), content: BTreeMap::new() });

		Operation { summary: summary.into(), responses, ..Default::default() }
	}

	#[test]
	fn collisions_replace_only_the_same_method() {
		let mut doc = OpenApiDocument::default();

		doc.insert_operation("/items", "GET", operation("first"));
		doc.insert_operation("/items", "post", operation("create"));

		let replaced = doc.insert_operation("/items", "get", operation("second"));

		assert_eq!(replaced.map(|op| op.summary), Some("first".into()));
		assert_eq!(doc.operation("/items", "GET").map(|op| op.summary.as_str()), Some("second"));
		assert_eq!(doc.operation("/items", "POST").map(|op| op.summary.as_str()), Some("create"));
	}

	#[test]
	fn merge_keeps_paths_from_both_documents() {
		let mut left = OpenApiDocument::default();
		let mut right = OpenApiDocument::default();

		left.insert_operation("/a", "get", operation("a"));
		right.insert_operation("/b", "get", operation("b"));
		left.merge(right);

		assert_eq!(left.paths.keys().map(String::as_str).collect::<Vec<_>>(), ["/a", "/b"]);
	}

	#[test]
	fn yaml_output_is_independent_of_insertion_order() {
		let mut first = OpenApiDocument::default();
		let mut second = OpenApiDocument::default();

		first.insert_operation("/z", "get", operation("z"));
		first.insert_operation("/a", "delete", operation("a"));
		second.insert_operation("/a", "delete", operation("a"));
		second.insert_operation("/z", "get", operation("z"));

		let yaml = first.to_yaml().expect("Document should serialize.");

		assert_eq!(yaml, second.to_yaml().expect("Document should serialize."));
		assert!(yaml.starts_with("openapi:"));

		let a = yaml.find("/a:").expect("Path /a should render.");
		let z = yaml.find("/z:").expect("Path /z should render.");

		assert!(a < z);
	}

	#[test]
	fn array_schemas_always_carry_items() {
		let json = serde_json::to_value(Schema::of(SchemaType::Array))
			.expect("Schema should serialize.");

		assert_eq!(json["type"], "array");
		assert_eq!(json["items"]["type"], "string");
		assert!(
			serde_json::to_value(Schema::of(SchemaType::Integer))
				.expect("Schema should serialize.")
				.get("items")
				.is_none()
		);
	}

	#[test]
	fn components_render_only_when_schemes_exist() {
		let mut doc = OpenApiDocument::default();

		assert!(!doc.to_yaml().expect("Document should serialize.").contains("components"));

		let mut other = OpenApiDocument::default();

		other.insert_security_scheme("jwt", SecurityScheme::http("bearer").bearer_format("JWT"));
		doc.merge(other);

		let json = serde_json::to_value(&doc).expect("Document should serialize.");

		assert_eq!(json["components"]["securitySchemes"]["jwt"]["type"], "http");
		assert_eq!(json["components"]["securitySchemes"]["jwt"]["bearerFormat"], "JWT");
	}

	#[test]
	fn parameter_location_serializes_as_in() {
		let parameter = Parameter {
			name: "id".into(),
			location: ParameterLocation::Path,
			description: None,
			required: true,
			schema: Schema::of(SchemaType::Integer),
		};
		let json = serde_json::to_value(&parameter).expect("Parameter should serialize.");

		assert_eq!(json["in"], "path");
		assert_eq!(json["schema"]["type"], "integer");
		assert!(json.get("description").is_none());
	}
}
