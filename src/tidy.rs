//! Mechanical code quality checks, run as part of `cargo test`.
//!
//! `rustfmt --check` and `cargo clippy` cover formatting and common lints in CI.
//! This linter enforces the project rules they cannot express:
//!
//! **Critical** (fail the test)
//! - No `.unwrap()` or `.expect()` outside test code.
//! - Public functions, methods and structs are documented.
//! - Public API names spell words out (`addresses`, not `addrs`).
//! - No `FIXME` comments.
//! - No catch-all modules such as `utils.rs`.
//!
//! **Ratchet** (fail the test; raise the constant deliberately)
//! - Module size high-water mark.
//! - Struct field count.

use std::path::{Path, PathBuf};

use proc_macro2::Span;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{
    Attribute, ExprMethodCall, FnArg, ImplItemFn, ItemFn, ItemMod, ItemStruct, Pat, PatType,
    Signature, Visibility,
};

// --- Configuration Constants ---

/// Max fields in any struct.
const STRUCT_FIELD_COUNT_MAX: usize = 12;

/// Max lines in any single module.
const MODULE_SIZE_HIGH_WATER_MARK: usize = 450;

/// Abbreviations not allowed in public API names, with their spelled-out form.
const PUBLIC_NAME_ABBREVIATIONS: &[(&str, &str)] = &[
    ("ctx", "context"),
    ("addrs", "addresses"),
    ("cfg", "config"),
    ("hdr", "header"),
];

/// File names that signal a catch-all module.
const ANTI_PATTERN_MODULES: &[&str] = &["utils.rs", "helpers.rs", "misc.rs", "common.rs"];

// --- Violations ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Severity {
    Ratchet,
    Critical,
}

#[derive(Debug)]
struct TidyViolation {
    severity: Severity,
    path: String,
    line: usize,
    message: String,
}

impl TidyViolation {
    fn new(severity: Severity, path: &Path, line: usize, message: impl Into<String>) -> Self {
        TidyViolation {
            severity,
            path: path.display().to_string(),
            line,
            message: message.into(),
        }
    }
}

// --- AST Visitor ---

/// Walks one file and collects violations. Items inside `#[cfg(test)]` modules are
/// exempt from the production-code rules.
struct TidyVisitor<'a> {
    path: &'a Path,
    test_depth: usize,
    violations: Vec<TidyViolation>,
}

impl<'a> TidyVisitor<'a> {
    fn new(path: &'a Path) -> Self {
        Self {
            path,
            test_depth: 0,
            violations: Vec::new(),
        }
    }

    fn in_production_code(&self) -> bool {
        self.test_depth == 0
    }

    fn add_violation(&mut self, severity: Severity, span: Span, message: impl Into<String>) {
        self.violations.push(TidyViolation::new(
            severity,
            self.path,
            span.start().line,
            message,
        ));
    }

    fn check_public_fn(&mut self, attrs: &[Attribute], sig: &Signature) {
        if !has_doc(attrs) {
            self.add_violation(
                Severity::Critical,
                sig.fn_token.span(),
                format!("Public function '{}' must have documentation.", sig.ident),
            );
        }

        let fn_name = sig.ident.to_string();
        for (short, long) in PUBLIC_NAME_ABBREVIATIONS {
            if fn_name.split('_').any(|word| word == *short) {
                self.add_violation(
                    Severity::Critical,
                    sig.ident.span(),
                    format!("Public function '{fn_name}' uses '{short}'; prefer '{long}'."),
                );
            }
        }

        for arg in &sig.inputs {
            let FnArg::Typed(PatType { pat, .. }) = arg else {
                continue;
            };
            let Pat::Ident(pat_ident) = &**pat else {
                continue;
            };
            let param_name = pat_ident.ident.to_string();
            for (short, long) in PUBLIC_NAME_ABBREVIATIONS {
                if param_name == *short {
                    self.add_violation(
                        Severity::Critical,
                        pat_ident.span(),
                        format!("Public API parameter '{short}' must be named '{long}'."),
                    );
                }
            }
        }
    }
}

fn has_doc(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| attr.path().is_ident("doc"))
}

fn is_cfg_test(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.path().is_ident("cfg")
            && attr
                .parse_args::<syn::Ident>()
                .is_ok_and(|ident| ident == "test")
    })
}

impl<'ast> Visit<'ast> for TidyVisitor<'_> {
    fn visit_item_mod(&mut self, item: &'ast ItemMod) {
        let is_test = is_cfg_test(&item.attrs);
        if is_test {
            self.test_depth += 1;
        }
        visit::visit_item_mod(self, item);
        if is_test {
            self.test_depth -= 1;
        }
    }

    fn visit_item_fn(&mut self, item: &'ast ItemFn) {
        if self.in_production_code() && matches!(item.vis, Visibility::Public(_)) {
            self.check_public_fn(&item.attrs, &item.sig);
        }
        visit::visit_item_fn(self, item);
    }

    fn visit_impl_item_fn(&mut self, item: &'ast ImplItemFn) {
        if self.in_production_code() && matches!(item.vis, Visibility::Public(_)) {
            self.check_public_fn(&item.attrs, &item.sig);
        }
        visit::visit_impl_item_fn(self, item);
    }

    fn visit_item_struct(&mut self, item: &'ast ItemStruct) {
        if item.fields.len() > STRUCT_FIELD_COUNT_MAX {
            self.add_violation(
                Severity::Ratchet,
                item.ident.span(),
                format!(
                    "Struct '{}' has {} fields, exceeding the max of {}.",
                    item.ident,
                    item.fields.len(),
                    STRUCT_FIELD_COUNT_MAX
                ),
            );
        }

        if self.in_production_code()
            && matches!(item.vis, Visibility::Public(_))
            && !has_doc(&item.attrs)
        {
            self.add_violation(
                Severity::Critical,
                item.struct_token.span(),
                format!("Public struct '{}' must have documentation.", item.ident),
            );
        }

        visit::visit_item_struct(self, item);
    }

    fn visit_expr_method_call(&mut self, call: &'ast ExprMethodCall) {
        if self.in_production_code() && (call.method == "unwrap" || call.method == "expect") {
            self.add_violation(
                Severity::Critical,
                call.method.span(),
                format!(
                    "Do not use .{}() in production code; propagate a structured error.",
                    call.method
                ),
            );
        }
        visit::visit_expr_method_call(self, call);
    }
}

// --- File Checks ---

fn check_for_fixme(path: &Path, text: &str, violations: &mut Vec<TidyViolation>) {
    for (index, line) in text.lines().enumerate() {
        if line.contains("FIXME") {
            violations.push(TidyViolation::new(
                Severity::Critical,
                path,
                index + 1,
                "FIXME comments are not allowed in the main branch.",
            ));
        }
    }
}

fn check_for_anti_pattern_module(path: &Path, violations: &mut Vec<TidyViolation>) {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    if ANTI_PATTERN_MODULES.contains(&file_name.as_str()) {
        violations.push(TidyViolation::new(
            Severity::Critical,
            path,
            0,
            "Catch-all module name. Use a focused, descriptive module name.",
        ));
    }
}

fn list_rust_files() -> Vec<PathBuf> {
    walkdir::WalkDir::new("src")
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| {
            entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "rs")
        })
        .map(|entry| entry.path().to_path_buf())
        .collect()
}

fn tidy_file(path: &Path, text: &str) -> Vec<TidyViolation> {
    let mut violations = Vec::new();
    check_for_fixme(path, text, &mut violations);
    check_for_anti_pattern_module(path, &mut violations);

    let line_count = text.lines().count();
    if line_count > MODULE_SIZE_HIGH_WATER_MARK {
        violations.push(TidyViolation::new(
            Severity::Ratchet,
            path,
            0,
            format!(
                "Module has {line_count} lines, exceeding the high-water mark of {MODULE_SIZE_HIGH_WATER_MARK}."
            ),
        ));
    }

    match syn::parse_file(text) {
        Ok(ast) => {
            let mut visitor = TidyVisitor::new(path);
            visitor.visit_file(&ast);
            violations.extend(visitor.violations);
        }
        Err(e) => violations.push(TidyViolation::new(
            Severity::Critical,
            path,
            e.span().start().line,
            format!("Failed to parse file: {e}"),
        )),
    }
    violations
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn tidy_main() {
        let mut violations = Vec::new();
        for path in list_rust_files() {
            if path.ends_with("tidy.rs") {
                continue;
            }
            let text = fs::read_to_string(&path).expect("Failed to read source file");
            violations.extend(tidy_file(&path, &text));
        }

        if violations.is_empty() {
            return;
        }
        violations.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| (&a.path, a.line).cmp(&(&b.path, b.line)))
        });
        panic!(
            "\n--- Tidy Failures ---\n{}\n",
            violations
                .iter()
                .map(|v| format!("[{:?}] {}:{}: {}", v.severity, v.path, v.line, v.message))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    #[test]
    fn flags_unwrap_outside_test_modules_only() {
        let source = r#"
            /// Documented.
            pub fn parse(input: &[u8]) -> u8 {
                input.first().copied().unwrap()
            }

            #[cfg(test)]
            mod tests {
                #[test]
                fn uses_unwrap() {
                    Some(1).unwrap();
                }
            }
        "#;
        let violations = tidy_file(Path::new("src/sample.rs"), source);
        assert_eq!(violations.len(), 1, "{violations:?}");
        assert!(violations[0].message.contains(".unwrap()"));
    }

    #[test]
    fn flags_undocumented_public_items_and_abbreviations() {
        let source = r#"
            pub struct Frame;

            /// Documented.
            pub struct Codec;

            impl Codec {
                pub fn run(&self, addrs: &[u8]) {}
            }
        "#;
        let violations = tidy_file(Path::new("src/sample.rs"), source);
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        assert_eq!(violations.len(), 3, "{messages:?}");
        assert!(messages.iter().any(|m| m.contains("struct 'Frame'")));
        assert!(messages.iter().any(|m| m.contains("function 'run'")));
        assert!(messages.iter().any(|m| m.contains("'addrs'")));
    }

    #[test]
    fn flags_fixme_and_catch_all_modules() {
        let violations = tidy_file(Path::new("src/utils.rs"), "// FIXME: later\n");
        assert_eq!(violations.len(), 2, "{violations:?}");
        assert!(violations.iter().all(|v| v.severity == Severity::Critical));
    }
}
