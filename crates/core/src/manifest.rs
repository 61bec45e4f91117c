//! Module manifest reading
//!
//! A manifest declares a module's identifier on its first `<declaration> <id>`
//! line and links to sibling modules through redirection directives
//! (`<redirect> original => ../path`) and plain dependency declarations
//! (`<require> original v1.2.3`), either single-line or inside a parenthesised
//! block. The scanner only understands those two directive shapes and
//! ignores everything else.

use std::collections::HashSet;
use std::path::Path;

use crate::types::{OrbitError, OrbitResult};

pub const ROOT_MARKER: &str = ".";
const ARROW: &str = "=>";
const LINE_COMMENT: &str = "//";

/// Keywords and file names of the manifest format being scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestDialect {
    pub file_name: String,
    pub declaration_keyword: String,
    pub redirect_keyword: String,
    pub require_keyword: String,
    /// Vendored dependencies live here and are never descended into.
    pub vendor_dir: String,
    /// Dot-prefixed directories that are still scanned.
    pub allowed_hidden_dirs: Vec<String>,
}

impl Default for ManifestDialect {
    fn default() -> Self {
        Self {
            file_name: "go.mod".to_string(),
            declaration_keyword: "module".to_string(),
            redirect_keyword: "replace".to_string(),
            require_keyword: "require".to_string(),
            vendor_dir: "vendor".to_string(),
            allowed_hidden_dirs: vec![".github".to_string()],
        }
    }
}

/// Contents of one manifest file.
#[derive(Debug, Clone)]
pub struct Manifest {
    pub identifier: String,
    pub text: String,
}

/// Read a manifest and extract its declared identifier.
pub fn read_manifest(path: &Path, dialect: &ManifestDialect) -> OrbitResult<Manifest> {
    let text = std::fs::read_to_string(path)?;
    let identifier = parse_declaration(&text, &dialect.declaration_keyword, path)?;
    Ok(Manifest { identifier, text })
}

/// Find the first `<keyword> <identifier>` line, with any trailing `//` comment removed.
pub fn parse_declaration(text: &str, keyword: &str, path: &Path) -> OrbitResult<String> {
    for line in text.lines() {
        let line = line.trim();
        let Some(rest) = strip_keyword(line, keyword) else {
            continue;
        };
        let identifier = match rest.find(LINE_COMMENT) {
            Some(idx) => rest[..idx].trim(),
            None => rest.trim(),
        };
        return Ok(identifier.to_string());
    }

    Err(OrbitError::DeclarationNotFound {
        keyword: keyword.to_string(),
        path: path.to_path_buf(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Redirect,
    Require,
}

/// Collect the identifiers of workspace modules a manifest depends on.
///
/// A redirection only counts when it points at a local path (`.` or `/`
/// prefix) and its original is a known module. Plain declarations count when
/// the declared identifier is a known module. Results keep first-seen order
/// and contain no duplicates.
pub fn scan_dependencies(
    text: &str,
    dialect: &ManifestDialect,
    known: &HashSet<&str>,
) -> Vec<String> {
    let mut dependencies: Vec<String> = Vec::new();
    let mut block = Block::None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(LINE_COMMENT) {
            continue;
        }

        if block == Block::None {
            if opens_block(line, &dialect.redirect_keyword) {
                block = Block::Redirect;
                continue;
            }
            if opens_block(line, &dialect.require_keyword) {
                block = Block::Require;
                continue;
            }
        } else if line == ")" {
            block = Block::None;
            continue;
        }

        let found = match block {
            Block::Redirect if line.contains(ARROW) => parse_redirect(line, known),
            Block::Redirect => None,
            Block::Require => parse_require(line, known),
            Block::None => {
                if let Some(rest) = strip_keyword(line, &dialect.redirect_keyword) {
                    parse_redirect(rest, known)
                } else if let Some(rest) = strip_keyword(line, &dialect.require_keyword) {
                    parse_require(rest, known)
                } else {
                    None
                }
            }
        };

        if let Some(dep) = found {
            if !dependencies.iter().any(|d| d == dep) {
                dependencies.push(dep.to_string());
            }
        }
    }

    dependencies
}

/// `original [version] => replacement [version]`
fn parse_redirect<'a>(line: &str, known: &HashSet<&'a str>) -> Option<&'a str> {
    let mut sides = line.split(ARROW);
    let (left, right) = (sides.next()?, sides.next()?);
    if sides.next().is_some() {
        return None;
    }

    let original = left.split_whitespace().next()?;
    let replacement = right.split_whitespace().next()?;
    if !(replacement.starts_with('.') || replacement.starts_with('/')) {
        return None;
    }

    known.get(original).copied()
}

/// `identifier version [// comment]`
fn parse_require<'a>(line: &str, known: &HashSet<&'a str>) -> Option<&'a str> {
    let identifier = line.split_whitespace().next()?;
    known.get(identifier).copied()
}

fn strip_keyword<'l>(line: &'l str, keyword: &str) -> Option<&'l str> {
    let rest = line.strip_prefix(keyword)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn opens_block(line: &str, keyword: &str) -> bool {
    line.strip_prefix(keyword)
        .map(|rest| rest.trim_start() == "(")
        .unwrap_or(false)
}
