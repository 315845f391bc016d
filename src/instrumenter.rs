//! Main instrumentation pipeline
//!
//! This module orchestrates the whole run: parse, traverse once, then patch
//! the source and serialize the artifacts.

use crate::analysis::{Analysis, ScopeVisitor};
use crate::patch::SourcePatcher;
use crate::{Error, Result};
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix the upstream deanonymization step gives its output files
pub const INPUT_PREFIX: &str = "updated_";

/// Options for an instrumentation run
#[derive(Debug, Clone)]
pub struct InstrumentOptions {
    /// Name of the generated tracking-table variable
    pub table_identifier: String,
    /// Source type used when parsing from a string
    pub source_type: SourceType,
}

impl Default for InstrumentOptions {
    fn default() -> Self {
        Self {
            table_identifier: "stateManager".to_string(),
            source_type: SourceType::mjs(),
        }
    }
}

/// Artifacts of a full run
#[derive(Debug, Clone)]
pub struct InstrumentOutput {
    pub analysis: Analysis,
    /// Tracking table as compact JSON
    pub state_table_json: String,
    /// Archived scopes as compact JSON
    pub scope_list_json: String,
    pub instrumented_source: String,
}

/// Output locations for one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub state_table: PathBuf,
    pub scope_list: PathBuf,
    pub instrumented: PathBuf,
}

impl ArtifactPaths {
    /// Paths for `input` under `out_dir`, following the `updated_<key>.js` convention
    pub fn for_input(input: &Path, out_dir: &Path) -> Self {
        let key = file_key(input);
        Self {
            state_table: out_dir.join(format!("state_manager_{key}.json")),
            scope_list: out_dir.join(format!("scope_list_{key}.json")),
            instrumented: out_dir.join(format!("final_{key}.js")),
        }
    }
}

/// File key of an input: its stem without the `updated_` prefix
pub fn file_key(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    match stem.strip_prefix(INPUT_PREFIX) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => stem,
    }
}

/// Main instrumenter
pub struct Instrumenter {
    options: InstrumentOptions,
}

impl Instrumenter {
    /// Create an instrumenter, rejecting table identifiers that are not plain JS identifiers
    pub fn new(options: InstrumentOptions) -> Result<Self> {
        if !is_identifier(&options.table_identifier) {
            return Err(Error::InvalidIdentifier {
                name: options.table_identifier,
            });
        }
        Ok(Self { options })
    }

    /// Parse and traverse `source` once
    pub fn analyze(&self, source: &str) -> Result<Analysis> {
        self.analyze_as(source, "<input>", self.options.source_type)
    }

    /// Analyze a file, picking the source type from its extension
    pub fn analyze_file(&self, input: &Path) -> Result<Analysis> {
        let source = read_source(input)?;
        self.analyze_path(input, &source)
    }

    /// Analyze `source` and produce every artifact
    pub fn instrument(&self, source: &str) -> Result<InstrumentOutput> {
        let analysis = self.analyze(source)?;
        self.finish(source, analysis)
    }

    /// Instrument one file and write its three artifacts into `out_dir`
    pub fn instrument_file(&self, input: &Path, out_dir: &Path) -> Result<ArtifactPaths> {
        let source = read_source(input)?;
        let analysis = self.analyze_path(input, &source)?;
        let output = self.finish(&source, analysis)?;

        let paths = ArtifactPaths::for_input(input, out_dir);
        write_artifact(&paths.state_table, &output.state_table_json)?;
        write_artifact(&paths.scope_list, &output.scope_list_json)?;
        write_artifact(&paths.instrumented, &output.instrumented_source)?;
        Ok(paths)
    }

    fn analyze_path(&self, input: &Path, source: &str) -> Result<Analysis> {
        let source_type = SourceType::from_path(input).unwrap_or(self.options.source_type);
        self.analyze_as(source, &input.display().to_string(), source_type)
    }

    fn analyze_as(&self, source: &str, name: &str, source_type: SourceType) -> Result<Analysis> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, source_type).parse();
        if ret.panicked || !ret.errors.is_empty() {
            let message = if ret.errors.is_empty() {
                "parser aborted".to_string()
            } else {
                ret.errors
                    .iter()
                    .map(|error| error.to_string())
                    .collect::<Vec<_>>()
                    .join("; ")
            };
            return Err(Error::parse(name, message));
        }

        let visitor = ScopeVisitor::new(source, &self.options.table_identifier);
        let analysis = visitor.analyze(&ret.program);
        log::debug!(
            "{name}: {} tracked variables, {} scopes, {} update sites",
            analysis.state_table.len(),
            analysis.scopes.len(),
            analysis.update_sites.len()
        );
        Ok(analysis)
    }

    fn finish(&self, source: &str, analysis: Analysis) -> Result<InstrumentOutput> {
        let state_table_json = analysis.state_table.to_json()?;
        let scope_list_json = serde_json::to_string(&analysis.scopes)?;
        let patcher = SourcePatcher::new(self.options.table_identifier.as_str());
        let instrumented_source = patcher.apply(source, &analysis.update_sites, &state_table_json)?;
        Ok(InstrumentOutput {
            analysis,
            state_table_json,
            scope_list_json,
            instrumented_source,
        })
    }
}

fn read_source(input: &Path) -> Result<String> {
    fs::read_to_string(input)
        .map_err(|e| Error::Io(format!("failed to read {}: {e}", input.display())))
}

fn write_artifact(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)
        .map_err(|e| Error::Io(format!("failed to write {}: {e}", path.display())))?;
    log::info!("wrote {}", path.display());
    Ok(())
}

/// Words that cannot name a `let` binding in module or strict code
const RESERVED_WORDS: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue",
    "debugger", "default", "delete", "do", "else", "enum", "eval", "export", "extends",
    "false", "finally", "for", "function", "if", "implements", "import", "in",
    "instanceof", "interface", "let", "new", "null", "package", "private", "protected",
    "public", "return", "static", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "yield",
];

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let well_formed = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    };
    well_formed && !RESERVED_WORDS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_key_strips_prefix() {
        assert_eq!(file_key(Path::new("scripts/updated_xkcd_src.js")), "xkcd_src");
        assert_eq!(file_key(Path::new("app.js")), "app");
        assert_eq!(file_key(Path::new("updated_.js")), "updated_");
    }

    #[test]
    fn test_artifact_paths() {
        let paths = ArtifactPaths::for_input(Path::new("in/updated_demo.js"), Path::new("out"));
        assert_eq!(paths.state_table, Path::new("out/state_manager_demo.json"));
        assert_eq!(paths.scope_list, Path::new("out/scope_list_demo.json"));
        assert_eq!(paths.instrumented, Path::new("out/final_demo.js"));
    }

    #[test]
    fn test_rejects_invalid_table_identifier() {
        let options = InstrumentOptions {
            table_identifier: "state manager".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            Instrumenter::new(options),
            Err(Error::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn test_rejects_reserved_table_identifier() {
        for name in ["let", "class", "yield", "await"] {
            let options = InstrumentOptions {
                table_identifier: name.to_string(),
                ..Default::default()
            };
            assert!(
                matches!(Instrumenter::new(options), Err(Error::InvalidIdentifier { .. })),
                "{name} should be rejected"
            );
        }
        assert!(is_identifier("letters"));
        assert!(is_identifier("$state"));
    }

    #[test]
    fn test_analyze_file_uses_extension() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("updated_view.jsx");
        fs::write(&input, "let el = <div />;\nel = 2;").unwrap();

        let instrumenter = Instrumenter::new(InstrumentOptions::default()).unwrap();
        let analysis = instrumenter.analyze_file(&input).unwrap();
        assert!(analysis.state_table.contains("Program:el"));
        assert_eq!(analysis.update_sites.len(), 2);
    }

    #[test]
    fn test_parse_errors_are_fatal() {
        let instrumenter = Instrumenter::new(InstrumentOptions::default()).unwrap();
        assert!(matches!(
            instrumenter.analyze("let = ;"),
            Err(Error::Parse { .. })
        ));
    }

    #[test]
    fn test_scope_list_json_shape() {
        let instrumenter = Instrumenter::new(InstrumentOptions::default()).unwrap();
        let output = instrumenter.instrument("function f(a) { let b = a + 1; }").unwrap();
        assert_eq!(
            output.scope_list_json,
            r#"[{"name":"Program:f","declared":["b"]},{"name":"Program","declared":[]}]"#
        );
        assert_eq!(output.state_table_json, r#"{"Program:f:a":null,"Program:f:b":null}"#);
    }
}
