// std
use std::fs;
// crates.io
use tempfile::TempDir;
// self
use autodoc::scanner::{self, ScanError};

const USERS_PY: &str = r#"
@app.route("/users/<int:user_id>", methods=["GET"])
def get_user(user_id):
    """
    Summary: Fetch a user (Python).

    Responses:
    - 404: No such user
    """
    return {}

@app.post("/users")
def create_user():
    """Create a user."""
    return {}
"#;
const USERS_JS: &str = r#"
/**
 * Summary: Fetch a user (Express).
 */
app.get('/users/:user_id', (req, res) => res.json({}));
"#;
const ORDERS_JS: &str = r#"
/* Summary: List orders. */
router.get("/orders", listOrders);
"#;
const BROKEN_PY: &str = r#"
@app.get("/broken")
def broken():
    """Never closed.
"#;

fn write(dir: &TempDir, name: &str, source: &str) -> std::path::PathBuf {
	let path = dir.path().join(name);

	fs::write(&path, source).expect("Fixture should be written.");

	path
}

#[test]
fn repeated_runs_produce_byte_identical_output() {
	let dir = TempDir::new().expect("Temp dir should be created.");
	let files = [write(&dir, "users.py", USERS_PY), write(&dir, "orders.js", ORDERS_JS)];
	let first = dir.path().join("first.yaml");
	let second = dir.path().join("second.yaml");

	scanner::scan(&files).document.write_yaml(&first).expect("First output should be written.");
	scanner::scan(&files).document.write_yaml(&second).expect("Second output should be written.");

	assert_eq!(
		fs::read(&first).expect("First output should be readable."),
		fs::read(&second).expect("Second output should be readable.")
	);
}

#[test]
fn files_documenting_different_paths_are_merged() {
	let dir = TempDir::new().expect("Temp dir should be created.");
	let outcome =
		scanner::scan([write(&dir, "users.py", USERS_PY), write(&dir, "orders.js", ORDERS_JS)]);
	let paths = outcome.document.paths.keys().map(String::as_str).collect::<Vec<_>>();

	assert!(outcome.skipped.is_empty());
	assert_eq!(paths, ["/orders", "/users", "/users/{user_id}"]);
	assert_eq!(
		outcome.document.operation("/orders", "get").map(|op| op.summary.as_str()),
		Some("List orders.")
	);
	assert_eq!(
		outcome.document.operation("/users", "post").map(|op| op.summary.as_str()),
		Some("Create a user.")
	);
}

#[test]
fn the_last_scanned_file_wins_a_path_and_method_collision() {
	let dir = TempDir::new().expect("Temp dir should be created.");
	let python = write(&dir, "users.py", USERS_PY);
	let express = write(&dir, "users.js", USERS_JS);
	let outcome = scanner::scan([&python, &express]);
	let op = outcome.document.operation("/users/{user_id}", "get").expect("GET should exist.");

	assert_eq!(op.summary, "Fetch a user (Express).");
	assert!(!op.responses.contains_key("404"));

	let reversed = scanner::scan([&express, &python]);
	let op = reversed.document.operation("/users/{user_id}", "get").expect("GET should exist.");

	assert_eq!(op.summary, "Fetch a user (Python).");
	assert_eq!(op.responses["404"].description, "No such user");
}

#[test]
fn unparseable_files_are_skipped_without_failing_the_run() {
	let dir = TempDir::new().expect("Temp dir should be created.");
	let broken = write(&dir, "broken.py", BROKEN_PY);
	let outcome = scanner::scan([write(&dir, "orders.js", ORDERS_JS), broken.clone()]);

	assert_eq!(outcome.document.paths.len(), 1);
	assert_eq!(outcome.skipped.len(), 1);
	assert_eq!(outcome.skipped[0].0, broken);
	assert!(matches!(outcome.skipped[0].1, ScanError::UnterminatedDocstring { line: 4 }));
}
