//! Template parameter files
//!
//! A parameter file is a tera template that renders to a JSON array of
//! `{"ParameterKey": .., "ParameterValue": ..}` objects. Rendering happens
//! with an empty context; the `get_env` built-in pulls values from the
//! environment.

use log::{debug, info};
use std::error::Error as _;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tera::{Context, Tera};

use crate::error::{CfnctlError, CfnctlResult};
use crate::types::ParameterSet;

/// File read when no parameter file is named.
pub const DEFAULT_PARAMETER_FILE: &str = "parameters.json";

/// Render `content` as a tera template.
pub fn render_parameters(path: &Path, content: &str) -> CfnctlResult<String> {
    Tera::one_off(content, &Context::new(), false).map_err(|e| CfnctlError::ParameterRender {
        path: path.to_path_buf(),
        message: error_chain(&e),
    })
}

/// Parse rendered JSON into an ordered parameter set.
pub fn parse_parameters(path: &Path, rendered: &str) -> CfnctlResult<ParameterSet> {
    serde_json::from_str(rendered).map_err(|e| CfnctlError::ParameterParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load, render and parse the parameter file.
///
/// With `None` the default file in the working directory is used, and its
/// absence yields an empty set. A named file that is missing is an error.
pub fn load_parameters(path: Option<&Path>) -> CfnctlResult<ParameterSet> {
    let (path, explicit) = match path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_PARAMETER_FILE), false),
    };

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound && !explicit => {
            debug!("No {} found, deploying without parameters", path.display());
            return Ok(ParameterSet::default());
        }
        Err(e) => return Err(CfnctlError::io("read parameter file", path, e)),
    };

    let rendered = render_parameters(path, &content)?;
    let parameters = parse_parameters(path, &rendered)?;
    info!(
        "Loaded {} parameters from {}",
        parameters.len(),
        path.display()
    );
    Ok(parameters)
}

// tera keeps the useful detail in the source chain
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
