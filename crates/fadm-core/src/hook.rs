//! Build hooks: solution parsing and MSBuild project rewriting.
//!
//! A project is hooked when it imports the C# targets and runs `Fadm copy`
//! before the build and `Fadm install` after it:
//!
//! ```xml
//! <Import Project="$(MSBuildToolsPath)\Microsoft.CSharp.targets" />
//! <Target Name="BeforeBuild">
//!   <Exec Command="Fadm copy $(ProjectDir)" />
//! </Target>
//! <Target Name="AfterBuild">
//!   <Exec Command="Fadm install $(TargetPath)" />
//! </Target>
//! ```

use std::fmt;
use std::path::{MAIN_SEPARATOR_STR, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use xmltree::{Element, EmitterConfig, XMLNode};

pub const IMPORT_PROJECT: &str = r"$(MSBuildToolsPath)\Microsoft.CSharp.targets";
pub const BEFORE_BUILD: &str = "BeforeBuild";
pub const AFTER_BUILD: &str = "AfterBuild";
pub const COPY_COMMAND: &str = "Fadm copy $(ProjectDir)";
pub const INSTALL_COMMAND: &str = "Fadm install $(TargetPath)";

static SOLUTION_PROJECT: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"^Project\("\{(.+)\}"\) *= *"(.+)" *, *"(.+)" *, *"\{(.+)\}"$"#)
    .expect("solution project pattern is valid")
});

/// Paths of the projects a solution references, joined to `solution_dir`.
///
/// Solution folders match the same pattern, so callers still have to check
/// that each path is a file.
pub fn solution_projects(content: &str, solution_dir: &Path) -> Vec<PathBuf> {
  content
    .lines()
    .filter_map(|line| SOLUTION_PROJECT.captures(line))
    .map(|captures| {
      let relative = captures[3].replace('\\', MAIN_SEPARATOR_STR);
      solution_dir.join(relative)
    })
    .collect()
}

/// A piece of the hook added to a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Injection {
  Import,
  Target(&'static str),
  Exec(&'static str),
}

impl fmt::Display for Injection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Injection::Import => f.write_str("MSBuild Import injected"),
      Injection::Target(step) => write!(f, "{step} injected"),
      Injection::Exec(command) => write!(f, "{command} injected"),
    }
  }
}

fn has_attribute(element: &Element, name: &str, value: &str) -> bool {
  element.attributes.get(name).is_some_and(|v| v == value)
}

/// Every element below `element`, in document order.
fn descendants(element: &Element) -> Vec<&Element> {
  let mut found = Vec::new();
  for node in &element.children {
    if let XMLNode::Element(child) = node {
      found.push(child);
      found.extend(descendants(child));
    }
  }
  found
}

/// First element below `element`, in document order, matching `predicate`.
fn find_mut<'a>(
  element: &'a mut Element,
  predicate: &dyn Fn(&Element) -> bool,
) -> Option<&'a mut Element> {
  for node in element.children.iter_mut() {
    if let XMLNode::Element(child) = node {
      if predicate(child) {
        return Some(child);
      }
      if let Some(found) = find_mut(child, predicate) {
        return Some(found);
      }
    }
  }
  None
}

fn is_target(element: &Element, step: &str) -> bool {
  element.name == "Target" && has_attribute(element, "Name", step)
}

/// New element in the namespace of `root`.
fn new_element(root: &Element, name: &str, attribute: &str, value: &str) -> XMLNode {
  let mut element = Element::new(name);
  element.prefix = root.prefix.clone();
  element.namespace = root.namespace.clone();
  element
    .attributes
    .insert(attribute.to_string(), value.to_string());
  XMLNode::Element(element)
}

struct StepScan {
  target: bool,
  exec: bool,
}

fn scan_step(root: &Element, step: &str, command: &str) -> StepScan {
  let targets: Vec<&Element> = descendants(root)
    .into_iter()
    .filter(|element| is_target(element, step))
    .collect();
  let exec = targets.iter().any(|target| {
    descendants(target)
      .iter()
      .any(|element| element.name == "Exec" && has_attribute(element, "Command", command))
  });

  StepScan {
    target: !targets.is_empty(),
    exec,
  }
}

fn ensure_step(
  root: &mut Element,
  scan: &StepScan,
  step: &'static str,
  command: &'static str,
  injected: &mut Vec<Injection>,
) {
  if !scan.target {
    let target = new_element(root, "Target", "Name", step);
    root.children.push(target);
    injected.push(Injection::Target(step));
  }

  if !scan.exec {
    let exec = new_element(root, "Exec", "Command", command);
    if let Some(target) = find_mut(root, &|element: &Element| is_target(element, step)) {
      target.children.push(exec);
      injected.push(Injection::Exec(command));
    }
  }
}

/// Add whatever part of the hook `root` is missing and report what was added.
/// An empty list means the project was already hooked and is unchanged.
///
/// Elements are matched on their local names, so projects with or without the
/// MSBuild namespace are handled alike.
pub fn inject(root: &mut Element) -> Vec<Injection> {
  let import = descendants(root)
    .iter()
    .any(|element| element.name == "Import" && has_attribute(element, "Project", IMPORT_PROJECT));
  let copy = scan_step(root, BEFORE_BUILD, COPY_COMMAND);
  let install = scan_step(root, AFTER_BUILD, INSTALL_COMMAND);

  let mut injected = Vec::new();
  if import && copy.exec && install.exec {
    return injected;
  }

  if !import {
    let element = new_element(root, "Import", "Project", IMPORT_PROJECT);
    root.children.push(element);
    injected.push(Injection::Import);
  }
  ensure_step(root, &copy, BEFORE_BUILD, COPY_COMMAND, &mut injected);
  ensure_step(root, &install, AFTER_BUILD, INSTALL_COMMAND, &mut injected);
  injected
}

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Byte-level layout of a project file that survives a rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentLayout {
  pub bom: bool,
  pub line_separator: &'static str,
  pub trailing_newline: bool,
}

impl DocumentLayout {
  /// Layout of an existing document. CRLF wins as soon as one line uses it.
  pub fn detect(content: &[u8]) -> Self {
    let crlf = content.windows(2).any(|pair| pair == b"\r\n");
    Self {
      bom: content.starts_with(UTF8_BOM),
      line_separator: if crlf { "\r\n" } else { "\n" },
      trailing_newline: content.ends_with(b"\n"),
    }
  }
}

impl Default for DocumentLayout {
  fn default() -> Self {
    Self {
      bom: false,
      line_separator: "\n",
      trailing_newline: true,
    }
  }
}

/// Serialize a project document, indented, with an XML declaration.
pub fn write_document(root: &Element, layout: DocumentLayout) -> Result<Vec<u8>, xmltree::Error> {
  let mut output = Vec::new();
  if layout.bom {
    output.extend_from_slice(UTF8_BOM);
  }

  let config = EmitterConfig::new()
    .perform_indent(true)
    .line_separator(layout.line_separator);
  root.write_with_config(&mut output, config)?;

  if layout.trailing_newline {
    output.extend_from_slice(layout.line_separator.as_bytes());
  }
  Ok(output)
}

#[cfg(test)]
mod tests {
  use super::*;

  const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";

  fn parse(content: &str) -> Element {
    Element::parse(content.as_bytes()).unwrap()
  }

  #[test]
  fn test_solution_projects() {
    let solution = concat!(
      "Microsoft Visual Studio Solution File, Format Version 12.00\r\n",
      "Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"App\", \"src\\App\\App.csproj\", \"{11111111-1111-1111-1111-111111111111}\"\r\n",
      "EndProject\r\n",
      "Project(\"{2150E333-8FDC-42A3-9474-1A3956D46DE8}\") = \"Docs\", \"Docs\", \"{22222222-2222-2222-2222-222222222222}\"\r\n",
      "EndProject\r\n",
      "Global\r\n",
    );

    let projects = solution_projects(solution, Path::new("/work"));
    assert_eq!(
      projects,
      [
        Path::new("/work").join(format!("src{MAIN_SEPARATOR_STR}App{MAIN_SEPARATOR_STR}App.csproj")),
        Path::new("/work").join("Docs"),
      ]
    );
  }

  #[test]
  fn test_inject_into_bare_project() {
    let mut root = parse(&format!(r#"<Project xmlns="{MSBUILD_NAMESPACE}"></Project>"#));
    let injected = inject(&mut root);

    assert_eq!(
      injected,
      [
        Injection::Import,
        Injection::Target(BEFORE_BUILD),
        Injection::Exec(COPY_COMMAND),
        Injection::Target(AFTER_BUILD),
        Injection::Exec(INSTALL_COMMAND),
      ]
    );
    let messages: Vec<String> = injected.iter().map(ToString::to_string).collect();
    assert_eq!(
      messages,
      [
        "MSBuild Import injected",
        "BeforeBuild injected",
        "Fadm copy $(ProjectDir) injected",
        "AfterBuild injected",
        "Fadm install $(TargetPath) injected",
      ]
    );

    let targets: Vec<&Element> = descendants(&root)
      .into_iter()
      .filter(|element| element.name == "Target")
      .collect();
    assert_eq!(targets.len(), 2);
    assert!(
      descendants(&root)
        .iter()
        .all(|element| element.namespace.as_deref() == Some(MSBUILD_NAMESPACE))
    );

    assert!(inject(&mut root).is_empty());
  }

  #[test]
  fn test_exec_added_to_existing_target() {
    let mut root = parse(&format!(
      r#"<Project xmlns="{MSBUILD_NAMESPACE}">
        <Import Project="$(MSBuildToolsPath)\Microsoft.CSharp.targets" />
        <Target Name="BeforeBuild"><Exec Command="Fadm copy $(ProjectDir)" /></Target>
        <Target Name="AfterBuild"><Exec Command="echo done" /></Target>
      </Project>"#
    ));

    let injected = inject(&mut root);
    assert_eq!(injected, [Injection::Exec(INSTALL_COMMAND)]);

    let after_build = descendants(&root)
      .into_iter()
      .find(|element| is_target(element, AFTER_BUILD))
      .unwrap();
    let commands: Vec<&str> = descendants(after_build)
      .iter()
      .filter_map(|element| element.attributes.get("Command").map(String::as_str))
      .collect();
    assert_eq!(commands, ["echo done", INSTALL_COMMAND]);
  }

  #[test]
  fn test_project_without_namespace() {
    let mut root = parse("<Project><PropertyGroup /></Project>");
    assert_eq!(inject(&mut root).len(), 5);
    assert!(inject(&mut root).is_empty());

    let written = write_document(&root, DocumentLayout::default()).unwrap();
    let written = String::from_utf8(written).unwrap();
    assert!(written.starts_with("<?xml"));
    assert!(written.ends_with("</Project>\n"));
    assert!(written.contains(r#"Command="Fadm install $(TargetPath)""#));
  }

  #[test]
  fn test_detect_layout() {
    let layout = DocumentLayout::detect(b"\xEF\xBB\xBF<Project>\r\n</Project>\r\n");
    assert_eq!(
      layout,
      DocumentLayout {
        bom: true,
        line_separator: "\r\n",
        trailing_newline: true,
      }
    );

    let layout = DocumentLayout::detect(b"<Project>\n</Project>");
    assert_eq!(
      layout,
      DocumentLayout {
        bom: false,
        line_separator: "\n",
        trailing_newline: false,
      }
    );
  }

  #[test]
  fn test_write_keeps_bom_and_crlf() {
    let original = "\u{FEFF}<Project>\r\n  <PropertyGroup />\r\n</Project>\r\n";
    let mut root = parse(original.trim_start_matches('\u{FEFF}'));
    inject(&mut root);

    let written = write_document(&root, DocumentLayout::detect(original.as_bytes())).unwrap();

    assert!(written.starts_with(UTF8_BOM));
    let text = String::from_utf8(written[UTF8_BOM.len()..].to_vec()).unwrap();
    assert!(text.ends_with("</Project>\r\n"));
    assert!(text.contains("\r\n"));
    assert!(!text.replace("\r\n", "").contains('\n'));
  }
}
