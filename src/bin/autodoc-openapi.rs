//! Scans route-annotated source files and writes the merged OpenAPI document to
//! `openapi_spec.yaml` in the working directory.

// crates.io
use clap::Parser;
use color_eyre::Result;
// self
use autodoc::{
	config::{OPENAPI_OUTPUT, ScannerArgs},
	obs, scanner,
};

fn main() -> Result<()> {
	color_eyre::install()?;
	obs::init_subscriber("autodoc=info")?;

	let args = ScannerArgs::parse();
	let outcome = scanner::scan(&args.files);

	outcome.document.write_yaml(OPENAPI_OUTPUT)?;

	tracing::info!(
		output = OPENAPI_OUTPUT,
		paths = outcome.document.paths.len(),
		skipped = outcome.skipped.len(),
		"OpenAPI document written"
	);

	Ok(())
}
