//! Declaration discovery and procedure scope regions.
//!
//! A single pass with one combined regex finds `Class`, `Module`, `Sub`,
//! `Function`, `Property` and `Dim` declarations. A second pass pairs
//! procedure openers with their `End Sub` / `End Function` lines to
//! produce scope regions; `Dim` declarations are then attributed to the
//! innermost region containing them.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::symbols::text::split_lines;

static DECLARATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(Class|Module|Sub|Function|Property|Dim)\s+([A-Za-z_][A-Za-z0-9_]*)")
        .unwrap()
});

static SCOPE_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:Public|Private|Friend|Protected|Shared|Partial|Overloads|Overrides|Overridable|MustOverride|NotOverridable|Async|Iterator|Static)\s+)*(Sub|Function)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});

static SCOPE_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*End\s+(Sub|Function)\b").unwrap());

static CONTAINER_START_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^\s*(?:(?:Public|Private|Friend|Protected|Partial|Shared)\s+)*(Class|Module|Structure)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});

static CONTAINER_END_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*End\s+(Class|Module|Structure)\b").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Class,
    Module,
    Sub,
    Function,
    Property,
    Dim,
}

impl DeclarationKind {
    fn parse(keyword: &str) -> Option<Self> {
        let kind = match keyword.to_ascii_lowercase().as_str() {
            "class" => Self::Class,
            "module" => Self::Module,
            "sub" => Self::Sub,
            "function" => Self::Function,
            "property" => Self::Property,
            "dim" => Self::Dim,
            _ => return None,
        };
        Some(kind)
    }

    /// True for `Dim`, whose visibility is limited to its enclosing
    /// procedure rather than the whole file.
    pub fn is_local(self) -> bool {
        matches!(self, Self::Dim)
    }
}

/// A declaration found by the line scan. `character` is the char offset of
/// the name itself, not of the introducing keyword. `scope` is the line
/// range the declaration is visible in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclarationKind,
    pub line: usize,
    pub character: usize,
    pub scope: ScopeRange,
}

/// Inclusive line range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeRange {
    pub start_line: usize,
    pub end_line: usize,
}

impl ScopeRange {
    pub fn contains(&self, line: usize) -> bool {
        self.start_line <= line && line <= self.end_line
    }
}

/// A procedure body, from its `Sub`/`Function` line to its matching
/// `End` line, both inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureScope {
    pub name: String,
    pub range: ScopeRange,
}

/// Pair procedure openers with their `End Sub` / `End Function` lines.
///
/// Openers are kept on a stack; an `End` line closes the top entry only
/// when the kinds agree. A mismatched `End` is ignored and leaves the
/// stack untouched, so a stray `End Function` inside a `Sub` does not
/// silently close the `Sub`. Unterminated openers produce no region.
pub fn procedure_scopes(text: &str) -> Vec<ProcedureScope> {
    let lines = split_lines(text);
    let mut open: Vec<(String, String, usize)> = Vec::new();
    let mut scopes = Vec::new();

    for (line_index, line) in lines.iter().enumerate() {
        if let Some(caps) = SCOPE_START_RE.captures(line) {
            let kind = caps[1].to_ascii_lowercase();
            open.push((kind, caps[2].to_string(), line_index));
            continue;
        }
        if let Some(caps) = SCOPE_END_RE.captures(line) {
            let kind = caps[1].to_ascii_lowercase();
            if open.last().is_some_and(|(open_kind, _, _)| *open_kind == kind) {
                let (_, name, start_line) = open.pop().unwrap_or_default();
                scopes.push(ProcedureScope {
                    name,
                    range: ScopeRange {
                        start_line,
                        end_line: line_index,
                    },
                });
            }
        }
    }

    scopes.sort_by_key(|scope| scope.range.start_line);
    scopes
}

/// Pair `Class`/`Module`/`Structure` openers with their `End` lines,
/// with the same mismatch rule as [`procedure_scopes`].
pub fn container_scopes(text: &str) -> Vec<ProcedureScope> {
    let lines = split_lines(text);
    let mut open: Vec<(String, String, usize)> = Vec::new();
    let mut scopes = Vec::new();

    for (line_index, line) in lines.iter().enumerate() {
        if let Some(caps) = CONTAINER_START_RE.captures(line) {
            open.push((caps[1].to_ascii_lowercase(), caps[2].to_string(), line_index));
            continue;
        }
        if let Some(caps) = CONTAINER_END_RE.captures(line) {
            let kind = caps[1].to_ascii_lowercase();
            if open.last().is_some_and(|(open_kind, _, _)| *open_kind == kind) {
                let (_, name, start_line) = open.pop().unwrap_or_default();
                scopes.push(ProcedureScope {
                    name,
                    range: ScopeRange {
                        start_line,
                        end_line: line_index,
                    },
                });
            }
        }
    }

    scopes.sort_by_key(|scope| scope.range.start_line);
    scopes
}

/// All declarations in `text`, in source order.
///
/// File-level declarations are visible over the whole document. A `Dim`
/// is scoped to the first procedure region containing it; a `Dim` outside
/// any procedure falls back to document scope.
pub fn find_declarations(text: &str) -> Vec<Declaration> {
    let lines = split_lines(text);
    let document_scope = ScopeRange {
        start_line: 0,
        end_line: lines.len().saturating_sub(1),
    };
    let scopes = procedure_scopes(text);
    let mut declarations = Vec::new();

    for (line_index, line) in lines.iter().enumerate() {
        for caps in DECLARATION_RE.captures_iter(line) {
            let Some(kind) = DeclarationKind::parse(&caps[1]) else {
                continue;
            };
            let name_match = match caps.get(2) {
                Some(m) => m,
                None => continue,
            };
            let scope = if kind.is_local() {
                // Innermost containing region: the one opening latest.
                scopes
                    .iter()
                    .filter(|scope| scope.range.contains(line_index))
                    .max_by_key(|scope| scope.range.start_line)
                    .map(|scope| scope.range)
                    .unwrap_or(document_scope)
            } else {
                document_scope
            };
            declarations.push(Declaration {
                name: name_match.as_str().to_string(),
                kind,
                line: line_index,
                // The regex works in bytes, positions are chars.
                character: line[..name_match.start()].chars().count(),
                scope,
            });
        }
    }

    declarations
}

#[cfg(test)]
mod tests {
    use indoc::indoc;

    use super::*;

    #[test]
    fn finds_every_declaration_kind() {
        let text = indoc! {"
            Public Class Calculator
                Private total As Integer
                Public Property Precision As Integer
                Public Sub Reset()
                    Dim snapshot As Integer
                End Sub
                Public Function Add(x As Integer) As Integer
                End Function
            End Class
        "};
        let decls = find_declarations(text);
        let kinds: Vec<_> = decls.iter().map(|d| (d.name.as_str(), d.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("Calculator", DeclarationKind::Class),
                ("Precision", DeclarationKind::Property),
                ("Reset", DeclarationKind::Sub),
                ("snapshot", DeclarationKind::Dim),
                ("Add", DeclarationKind::Function),
            ]
        );
    }

    #[test]
    fn name_position_is_a_char_offset() {
        let decls = find_declarations("Public Sub Bar()");
        assert_eq!(decls[0].character, 11);
    }

    #[test]
    fn dim_scope_is_the_enclosing_procedure() {
        let text = indoc! {"
            Class Foo
                Sub Bar()
                    Dim x As Integer
                End Sub
                Sub Baz()
                End Sub
            End Class
        "};
        let dim = find_declarations(text)
            .into_iter()
            .find(|d| d.name == "x")
            .unwrap();
        assert_eq!(dim.scope, ScopeRange { start_line: 1, end_line: 3 });
    }

    #[test]
    fn dim_in_nested_procedures_binds_to_the_innermost_scope() {
        let text = indoc! {"
            Sub Outer()
                Sub Inner()
                    Dim x As Integer
                End Sub
            End Sub
        "};
        let dim = find_declarations(text)
            .into_iter()
            .find(|d| d.name == "x")
            .unwrap();
        assert_eq!(dim.scope, ScopeRange { start_line: 1, end_line: 3 });
    }

    #[test]
    fn dim_outside_any_procedure_gets_document_scope() {
        let text = "Dim shared_state As Integer\n' trailing\n";
        let dim = &find_declarations(text)[0];
        assert_eq!(dim.scope.start_line, 0);
        assert_eq!(dim.scope.end_line, 2);
    }

    #[test]
    fn modifier_stacks_still_open_a_scope() {
        let text = indoc! {"
            Public Shared Async Function Fetch() As Task
            End Function
        "};
        let scopes = procedure_scopes(text);
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].name, "Fetch");
        assert_eq!(scopes[0].range, ScopeRange { start_line: 0, end_line: 1 });
    }

    #[test]
    fn nested_scopes_close_innermost_first() {
        let text = indoc! {"
            Sub Outer()
                Sub Inner()
                End Sub
            End Sub
        "};
        let scopes = procedure_scopes(text);
        assert_eq!(scopes.len(), 2);
        assert_eq!(scopes[0].name, "Outer");
        assert_eq!(scopes[0].range, ScopeRange { start_line: 0, end_line: 3 });
        assert_eq!(scopes[1].name, "Inner");
        assert_eq!(scopes[1].range, ScopeRange { start_line: 1, end_line: 2 });
    }

    #[test]
    fn mismatched_end_does_not_close_the_open_scope() {
        // End Sub under an open Function is ignored outright: the
        // Function stays open for its real End Function, and the Sub
        // above it never finds a terminator.
        let text = indoc! {"
            Sub A()
                Function B()
            End Sub
                End Function
        "};
        let scopes = procedure_scopes(text);
        assert_eq!(scopes.len(), 1);
        assert_eq!(scopes[0].name, "B");
        assert_eq!(scopes[0].range, ScopeRange { start_line: 1, end_line: 3 });
    }

    #[test]
    fn container_scopes_cover_class_and_module_bodies() {
        let text = indoc! {"
            Public Class Outer
                Module Helpers
                End Module
            End Class
        "};
        let scopes = container_scopes(text);
        assert_eq!(scopes.len(), 2);
        assert_eq!(scopes[0].name, "Outer");
        assert_eq!(scopes[0].range, ScopeRange { start_line: 0, end_line: 3 });
        assert_eq!(scopes[1].name, "Helpers");
        assert_eq!(scopes[1].range, ScopeRange { start_line: 1, end_line: 2 });
    }

    #[test]
    fn unterminated_procedure_produces_no_region() {
        assert!(procedure_scopes("Sub Dangling()\nDim x As Integer\n").is_empty());
    }
}
