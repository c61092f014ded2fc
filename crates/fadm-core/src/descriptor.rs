//! Project descriptor (`fadm.xml`) loading and validation.
//!
//! ```xml
//! <Project xmlns="urn:project-schema">
//!   <Dependencies>
//!     <Dependency>
//!       <Name>Acme.Core</Name>
//!       <Version>1.2.0.0</Version>
//!       <Culture>fr-FR</Culture>
//!       <Architecture>MSIL</Architecture>
//!     </Dependency>
//!   </Dependencies>
//! </Project>
//! ```

use std::path::Path;

use fadm_model::{Architecture, Culture, Dependency, Project, Version};
use tracing::debug;
use xmltree::{Element, XMLNode};

/// File name of the descriptor inside a project directory.
pub const DESCRIPTOR_FILE: &str = "fadm.xml";

/// Namespace every descriptor element belongs to.
pub const DESCRIPTOR_NAMESPACE: &str = "urn:project-schema";

#[derive(Debug, thiserror::Error)]
pub enum DescriptorError {
  #[error("failed to read descriptor: {0}")]
  Io(#[from] std::io::Error),

  #[error("malformed XML: {message}")]
  Xml { message: String },

  #[error("schema violation: {message}")]
  Schema { message: String },
}

fn schema(message: impl Into<String>) -> DescriptorError {
  DescriptorError::Schema {
    message: message.into(),
  }
}

/// Load and validate the descriptor at `path`.
pub async fn load(path: &Path) -> Result<Project, DescriptorError> {
  let content = tokio::fs::read(path).await?;
  let project = parse(&content)?;
  debug!(
    path = %path.display(),
    dependencies = project.dependencies.len(),
    "descriptor loaded"
  );
  Ok(project)
}

/// Parse and validate descriptor content.
pub fn parse(content: &[u8]) -> Result<Project, DescriptorError> {
  let root = Element::parse(content).map_err(|e| DescriptorError::Xml {
    message: e.to_string(),
  })?;

  if root.name != "Project" || root.namespace.as_deref() != Some(DESCRIPTOR_NAMESPACE) {
    return Err(schema(format!(
      "root element must be 'Project' in namespace '{DESCRIPTOR_NAMESPACE}'"
    )));
  }

  let sections = elements(&root, "Project", &["Dependencies"])?;
  if sections.len() > 1 {
    return Err(schema("'Dependencies' must appear at most once"));
  }

  let mut dependencies = Vec::new();
  for section in sections {
    for element in elements(section, "Dependencies", &["Dependency"])? {
      dependencies.push(dependency(element)?);
    }
  }

  Ok(Project::new(dependencies))
}

/// Child elements of `parent`, all of which must be in the descriptor
/// namespace and named one of `allowed`.
fn elements<'a>(
  parent: &'a Element,
  parent_name: &str,
  allowed: &[&str],
) -> Result<Vec<&'a Element>, DescriptorError> {
  let mut found = Vec::new();
  for node in &parent.children {
    let XMLNode::Element(child) = node else {
      continue;
    };
    if child.namespace.as_deref() != Some(DESCRIPTOR_NAMESPACE)
      || !allowed.contains(&child.name.as_str())
    {
      return Err(schema(format!(
        "unexpected element '{}' in '{parent_name}'",
        child.name
      )));
    }
    found.push(child);
  }
  Ok(found)
}

fn dependency(element: &Element) -> Result<Dependency, DescriptorError> {
  let children = elements(
    element,
    "Dependency",
    &["Name", "Version", "Culture", "Architecture"],
  )?;

  let single = |name: &str, required: bool| -> Result<Option<String>, DescriptorError> {
    let mut matching = children.iter().filter(|child| child.name == name);
    let first = matching.next();
    if matching.next().is_some() {
      return Err(schema(format!("'{name}' must appear at most once in 'Dependency'")));
    }
    match first {
      Some(child) => Ok(Some(
        child
          .get_text()
          .map(|text| text.trim().to_string())
          .unwrap_or_default(),
      )),
      None if required => Err(schema(format!("'Dependency' is missing '{name}'"))),
      None => Ok(None),
    }
  };

  let name = single("Name", true)?.unwrap_or_default();
  let version = single("Version", true)?.unwrap_or_default();
  let culture = single("Culture", false)?;
  let architecture = single("Architecture", false)?;

  if name.is_empty() {
    return Err(schema("'Name' must not be empty"));
  }
  let version: Version = version
    .parse()
    .map_err(|e| schema(format!("dependency '{name}': {e}")))?;

  let dependency = Dependency::new(name, version)
    .map_err(|e| schema(e.to_string()))?
    .with_culture(Culture::parse_lenient(culture.as_deref()))
    .with_architecture(Architecture::parse_lenient(architecture.as_deref()));
  Ok(dependency)
}
