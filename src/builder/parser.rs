//! JSDoc comment scraping.
//!
//! [`DocParser`] is the seam between the build pipeline and the comment
//! format. [`JsDocParser`] reads `/** ... */` blocks from JavaScript
//! sources, pairs each with the line of code that follows it and turns the
//! pair into a [`MethodDoc`].

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::builder::doc::{
    ExampleDoc, FileDoc, MethodDoc, ParamDoc, ResourceDoc, ReturnDoc, TableOfContents, TocService,
    TypeEntry,
};
use crate::util::Config;

/// Error raised while reading the comments of one file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unterminated doc comment starting on line {line}")]
    UnterminatedComment { line: usize },

    #[error("malformed @{tag} tag on line {line}: {message}")]
    MalformedTag {
        tag: String,
        line: usize,
        message: String,
    },
}

/// Converts source files into JSON documentation.
pub trait DocParser {
    /// Parse one file. `path` is relative to the checkout root.
    fn parse_file(&self, path: &str, contents: &str) -> Result<FileDoc, ParseError>;

    /// Build the type dictionary for a set of parsed files.
    fn create_types_dictionary(&self, docs: &[FileDoc]) -> Vec<TypeEntry>;

    /// Build the table of contents for a type dictionary.
    fn create_toc(&self, types: &[TypeEntry], tag_name: &str) -> TableOfContents;

    /// Usage snippet shown on a service's landing page.
    fn create_overview(&self, service: &str, is_bundle: bool) -> String;
}

static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:export\s+)?(?:default\s+)?class\s+([A-Za-z_$][\w$]*)").unwrap()
});
static FUNCTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:export\s+)?(?:async\s+)?function\s*\*?\s*([A-Za-z_$][\w$]*)\s*\(").unwrap()
});
static ASSIGNED_FN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:var|let|const)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?function").unwrap()
});
static PROTO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_$][\w$]*)\.prototype\.([A-Za-z_$][\w$]*)\s*=").unwrap()
});
static STATIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_$][\w$]*)\.([A-Za-z_$][\w$]*)\s*=").unwrap());
static METHOD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(static\s+)?(?:async\s+)?\*?\s*([A-Za-z_$][\w$]*)\s*\([^)]*\)\s*\{").unwrap()
});
static PARAM_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(\[[^\]]*\]|\S+)\s*(?:-\s+)?(.*)$").unwrap());
static RESOURCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\{@link\s+([^}\s]+)\s*\}").unwrap());
static CAPTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\s*<caption>(.*?)</caption>[ \t]*\n?").unwrap());

const KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch", "function", "return"];

/// The built-in JSDoc parser.
#[derive(Debug, Clone)]
pub struct JsDocParser {
    umbrella: String,
    scope: String,
}

impl JsDocParser {
    pub fn new(umbrella: impl Into<String>, scope: impl Into<String>) -> Self {
        JsDocParser {
            umbrella: umbrella.into(),
            scope: scope.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.umbrella(), config.scope())
    }
}

impl Default for JsDocParser {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl DocParser for JsDocParser {
    fn parse_file(&self, path: &str, contents: &str) -> Result<FileDoc, ParseError> {
        let (package, rel) = split_source_path(path);
        let is_index = rel == "index";
        let id = match package {
            Some(pkg) if is_index => pkg.to_string(),
            Some(pkg) => format!("{}/{}", pkg, rel),
            None => rel.clone(),
        };
        let overview = match package {
            Some(pkg) if is_index => self.create_overview(pkg, false),
            _ => String::new(),
        };

        let mut doc = FileDoc {
            id: id.clone(),
            kind: "class".to_string(),
            name: String::new(),
            overview,
            description: String::new(),
            source: path.to_string(),
            parent: None,
            children: Vec::new(),
            methods: Vec::new(),
            path: String::new(),
        };

        let mut current_class: Option<String> = None;
        let mut first_description: Option<String> = None;

        for block in scan_blocks(contents)? {
            let parsed = parse_block(&block);
            if ["private", "hidden", "ignore"].iter().any(|t| parsed.has(t)) {
                continue;
            }
            if first_description.is_none() && !parsed.description.is_empty() {
                first_description = Some(parsed.description.clone());
            }
            if doc.name.is_empty() {
                // `module:` paths name a location, not a display title.
                if let Some(alias) = parsed.text("alias").or_else(|| parsed.text("module")) {
                    if !alias.starts_with("module:") {
                        doc.name = alias.trim().to_string();
                    }
                }
            }

            let Some((code_line, code)) = &block.code else {
                continue;
            };
            let is_ctor = parsed.has("constructor") || parsed.has("class");
            let Some(symbol) = detect_symbol(code, current_class.as_deref(), is_ctor) else {
                continue;
            };

            if symbol.kind == SymbolKind::Class {
                current_class = Some(symbol.name.clone());
                if doc.name.is_empty() {
                    doc.name = symbol.name.clone();
                }
                if doc.description.is_empty() {
                    doc.description = parsed.description.clone();
                }
            }

            let method = build_method(&id, path, *code_line, &symbol, &parsed)?;
            tracing::trace!("{}: documented {}", path, method.id);
            doc.methods.push(method);
        }

        if doc.description.is_empty() {
            doc.description = first_description.unwrap_or_default();
        }
        if doc.name.is_empty() {
            doc.name = match package {
                Some(pkg) if is_index => pkg.to_string(),
                _ => rel.rsplit('/').next().unwrap_or(&rel).to_string(),
            };
        }

        Ok(doc)
    }

    fn create_types_dictionary(&self, docs: &[FileDoc]) -> Vec<TypeEntry> {
        docs.iter()
            .map(|doc| TypeEntry {
                id: doc.id.clone(),
                title: doc.name.clone(),
                contents: doc.path.clone(),
            })
            .collect()
    }

    fn create_toc(&self, types: &[TypeEntry], tag_name: &str) -> TableOfContents {
        let mut services: Vec<TocService> = Vec::new();

        for entry in types {
            let root = entry.id.split('/').next().unwrap_or(&entry.id);
            let index = match services.iter().position(|s| s.type_id == root) {
                Some(index) => index,
                None => {
                    services.push(TocService {
                        title: root.to_string(),
                        type_id: root.to_string(),
                        nav: Vec::new(),
                    });
                    services.len() - 1
                }
            };

            let service = &mut services[index];
            if entry.id == root {
                service.title = entry.title.clone();
            } else {
                service.nav.push(TocService {
                    title: entry.title.clone(),
                    type_id: entry.id.clone(),
                    nav: Vec::new(),
                });
            }
        }

        TableOfContents {
            tag_name: tag_name.to_string(),
            guides: Vec::new(),
            services,
        }
    }

    fn create_overview(&self, service: &str, is_bundle: bool) -> String {
        let ident = camel_case(service);
        let config = "{\n  projectId: 'grape-spaceship-123',\n  keyFilename: '/path/to/keyfile.json'\n}";

        if is_bundle {
            format!(
                "```js\nvar gcloud = require('{}')({});\n\nvar {} = gcloud.{}();\n```",
                self.umbrella, config, ident, ident
            )
        } else {
            format!(
                "```js\nvar {} = require('{}/{}')({});\n```",
                ident, self.scope, service, config
            )
        }
    }
}

/// A raw `/** ... */` block and the code line following it.
struct CommentBlock {
    line: usize,
    body: String,
    code: Option<(usize, String)>,
}

struct Tag {
    name: String,
    text: String,
    line: usize,
}

struct ParsedBlock {
    description: String,
    tags: Vec<Tag>,
}

impl ParsedBlock {
    fn has(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.name == name)
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.text.as_str())
    }

    fn all<'a>(&'a self, names: &'a [&'a str]) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags.iter().filter(move |t| names.contains(&t.name.as_str()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SymbolKind {
    Class,
    Instance,
    Static,
    Function,
}

impl SymbolKind {
    fn as_str(self) -> &'static str {
        match self {
            SymbolKind::Class => "constructor",
            SymbolKind::Instance => "instance",
            SymbolKind::Static => "static",
            SymbolKind::Function => "function",
        }
    }
}

struct Symbol {
    name: String,
    kind: SymbolKind,
}

fn line_of(contents: &str, index: usize) -> usize {
    contents[..index].matches('\n').count() + 1
}

fn scan_blocks(contents: &str) -> Result<Vec<CommentBlock>, ParseError> {
    let mut blocks = Vec::new();
    let mut offset = 0;

    while let Some(found) = contents[offset..].find("/**") {
        let start = offset + found;
        if contents[start..].starts_with("/**/") {
            offset = start + 4;
            continue;
        }

        // Only a `/**` opening its own line starts a doc block.
        let line_start = contents[..start].rfind('\n').map_or(0, |i| i + 1);
        if !contents[line_start..start].trim().is_empty() {
            offset = start + 3;
            continue;
        }

        let body_start = start + 3;
        let Some(end) = contents[body_start..].find("*/") else {
            return Err(ParseError::UnterminatedComment {
                line: line_of(contents, start),
            });
        };
        let end = body_start + end;
        let after = end + 2;

        blocks.push(CommentBlock {
            line: line_of(contents, start),
            body: contents[body_start..end].to_string(),
            code: next_code_line(contents, after),
        });
        offset = after;
    }

    Ok(blocks)
}

fn next_code_line(contents: &str, pos: usize) -> Option<(usize, String)> {
    let first_line = line_of(contents, pos);
    for (i, line) in contents[pos..].lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with("/*") || trimmed.starts_with("//") {
            return None;
        }
        return Some((first_line + i, trimmed.to_string()));
    }
    None
}

fn parse_block(block: &CommentBlock) -> ParsedBlock {
    let lines: Vec<String> = block
        .body
        .lines()
        .map(|l| {
            let t = l.trim_start();
            let t = t.strip_prefix('*').unwrap_or(t);
            t.strip_prefix(' ').unwrap_or(t).trim_end().to_string()
        })
        .collect();

    let mut description = Vec::new();
    let mut tags: Vec<Tag> = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        if let Some(rest) = line.strip_prefix('@') {
            let (name, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            tags.push(Tag {
                name: name.to_string(),
                text: text.trim_start().to_string(),
                line: block.line + i,
            });
        } else if let Some(tag) = tags.last_mut() {
            tag.text.push('\n');
            tag.text.push_str(line);
        } else {
            description.push(line.as_str());
        }
    }

    for tag in &mut tags {
        if tag.name != "example" {
            tag.text = tag.text.trim().to_string();
        }
    }

    ParsedBlock {
        description: description.join("\n").trim().to_string(),
        tags,
    }
}

fn detect_symbol(code: &str, current_class: Option<&str>, is_ctor: bool) -> Option<Symbol> {
    if let Some(caps) = CLASS_RE.captures(code) {
        return Some(Symbol {
            name: caps[1].to_string(),
            kind: SymbolKind::Class,
        });
    }

    let function_name = FUNCTION_RE
        .captures(code)
        .or_else(|| ASSIGNED_FN_RE.captures(code))
        .map(|caps| caps[1].to_string());
    if let Some(name) = function_name {
        let is_class = is_ctor || name.starts_with(|c: char| c.is_ascii_uppercase());
        let kind = if is_class {
            SymbolKind::Class
        } else {
            SymbolKind::Function
        };
        return Some(Symbol { name, kind });
    }

    if let Some(caps) = PROTO_RE.captures(code) {
        return Some(Symbol {
            name: caps[2].to_string(),
            kind: SymbolKind::Instance,
        });
    }

    if let Some(caps) = STATIC_RE.captures(code) {
        let kind = match &caps[1] {
            "module" => return None,
            "exports" => SymbolKind::Function,
            _ => SymbolKind::Static,
        };
        return Some(Symbol {
            name: caps[2].to_string(),
            kind,
        });
    }

    current_class?;
    let caps = METHOD_RE.captures(code)?;
    let name = &caps[2];
    if name == "constructor" || KEYWORDS.contains(&name) {
        return None;
    }
    let kind = if caps.get(1).is_some() {
        SymbolKind::Static
    } else {
        SymbolKind::Instance
    };
    Some(Symbol {
        name: name.to_string(),
        kind,
    })
}

fn build_method(
    file_id: &str,
    path: &str,
    code_line: usize,
    symbol: &Symbol,
    parsed: &ParsedBlock,
) -> Result<MethodDoc, ParseError> {
    let mut method = MethodDoc {
        id: format!("{}?method={}", file_id, symbol.name),
        name: symbol.name.clone(),
        kind: symbol.kind.as_str().to_string(),
        description: parsed.description.clone(),
        source: format!("{}#L{}", path, code_line),
        resources: Vec::new(),
        examples: Vec::new(),
        params: Vec::new(),
        exceptions: Vec::new(),
        returns: Vec::new(),
    };

    for tag in parsed.all(&["param", "arg", "argument"]) {
        method.params.push(parse_param(tag)?);
    }
    for tag in parsed.all(&["return", "returns"]) {
        method.returns.push(parse_typed(tag)?);
    }
    for tag in parsed.all(&["throws", "exception"]) {
        method.exceptions.push(parse_typed(tag)?);
    }
    for tag in parsed.all(&["resource"]) {
        let caps = RESOURCE_RE
            .captures(&tag.text)
            .ok_or_else(|| malformed(tag, "expected `[Title]{@link url}`"))?;
        method.resources.push(ResourceDoc {
            title: caps[1].to_string(),
            link: caps[2].to_string(),
        });
    }
    for tag in parsed.all(&["example"]) {
        method.examples.push(parse_example(&tag.text));
    }

    Ok(method)
}

fn malformed(tag: &Tag, message: &str) -> ParseError {
    ParseError::MalformedTag {
        tag: tag.name.clone(),
        line: tag.line,
        message: message.to_string(),
    }
}

/// Split `{Type} rest` and parse the type expression.
///
/// The type is optional: `@param name - desc` yields no types.
fn split_typed(tag: &Tag) -> Result<(TypeExpr, &str), ParseError> {
    let text = tag.text.trim_start();
    if !text.starts_with('{') {
        return Ok((
            TypeExpr {
                types: Vec::new(),
                optional: false,
                nullable: false,
            },
            text,
        ));
    }

    let mut depth = 0usize;
    let mut close = None;
    for (i, c) in text.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close.ok_or_else(|| malformed(tag, "unbalanced `{` in type"))?;

    let types = parse_types(&text[1..close]);
    if types.types.is_empty() {
        return Err(malformed(tag, "empty type expression"));
    }
    Ok((types, text[close + 1..].trim_start()))
}

fn parse_typed(tag: &Tag) -> Result<ReturnDoc, ParseError> {
    let (types, rest) = split_typed(tag)?;
    Ok(ReturnDoc {
        types: types.types,
        description: rest.trim().to_string(),
    })
}

fn parse_param(tag: &Tag) -> Result<ParamDoc, ParseError> {
    let (types, rest) = split_typed(tag)?;
    let caps = PARAM_NAME_RE
        .captures(rest)
        .ok_or_else(|| malformed(tag, "missing parameter name"))?;

    let raw_name = &caps[1];
    let (name, bracketed) = match raw_name
        .strip_prefix('[')
        .and_then(|n| n.strip_suffix(']'))
    {
        Some(inner) => (inner.split('=').next().unwrap_or(inner).trim(), true),
        None => (raw_name, false),
    };
    if name.is_empty() {
        return Err(malformed(tag, "missing parameter name"));
    }

    Ok(ParamDoc {
        name: name.to_string(),
        description: caps[2].trim().to_string(),
        types: types.types,
        optional: bracketed || types.optional,
        nullable: types.nullable,
    })
}

struct TypeExpr {
    types: Vec<String>,
    optional: bool,
    nullable: bool,
}

fn parse_types(expr: &str) -> TypeExpr {
    let mut expr = expr.trim();
    let nullable = expr.starts_with('?');
    expr = expr.trim_start_matches(['?', '!']);
    let optional = expr.ends_with('=');
    expr = expr.trim_end_matches('=');
    let expr = expr.trim_start_matches('(').trim_end_matches(')');

    TypeExpr {
        types: expr
            .split('|')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect(),
        optional,
        nullable,
    }
}

fn parse_example(text: &str) -> ExampleDoc {
    let (caption, code) = match CAPTION_RE.captures(text) {
        Some(caps) => {
            let end = caps.get(0).map_or(0, |m| m.end());
            (Some(caps[1].trim().to_string()), &text[end..])
        }
        None => (None, text),
    };

    ExampleDoc {
        caption,
        code: code.trim_matches('\n').trim_end().to_string(),
    }
}

/// Split `packages/<pkg>/src/<rel>.js` into `(Some(pkg), rel)`.
fn split_source_path(path: &str) -> (Option<&str>, String) {
    let parts: Vec<&str> = path.split('/').collect();
    let strip_ext = |p: String| match p.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => p,
    };

    if let Some(i) = parts.iter().position(|p| *p == "packages") {
        if parts.len() > i + 2 {
            let package = parts[i + 1];
            let mut rest = &parts[i + 2..];
            if rest.len() > 1 && rest[0] == "src" {
                rest = &rest[1..];
            }
            return (Some(package), strip_ext(rest.join("/")));
        }
    }

    (None, strip_ext(path.to_string()))
}

fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '-' || c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
