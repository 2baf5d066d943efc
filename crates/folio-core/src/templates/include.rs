//! The `include` directive.
//!
//! `{{include "partials/repository" repo=this lines=../repo_description_lines_max}}`
//! renders the named template with a context made **only** of the hash parameters.
//! Nothing from the caller's context leaks into the included template unless it is
//! passed explicitly.
//!
//! Include targets written as string literals are also scanned statically by
//! [`references`] so that unknown targets and include cycles are reported when the
//! templates are loaded, before any page is rendered.

use std::cell::RefCell;
use std::collections::BTreeMap;

use handlebars::template::{Parameter, TemplateElement};
use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderErrorReason, Template,
};
use serde_json::{Map, Value};

use crate::error::{FolioError, Result};

/// Name the helper is registered under.
pub const INCLUDE_HELPER: &str = "include";

/// Deepest include nesting a render may reach.
pub const MAX_INCLUDE_DEPTH: usize = 32;

thread_local! {
    // Templates currently being expanded by `include` on this thread, outermost first.
    static INCLUDE_STACK: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Pops the include stack when an expansion finishes, including on error.
struct StackFrame;

impl StackFrame {
    fn enter(name: &str) -> std::result::Result<Self, RenderErrorReason> {
        INCLUDE_STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            if let Some(from) = stack.iter().position(|n| n == name) {
                let mut chain = stack[from..].to_vec();
                chain.push(name.to_string());
                return Err(RenderErrorReason::Other(format!(
                    "include cycle: {}",
                    chain.join(" -> ")
                )));
            }
            if stack.len() >= MAX_INCLUDE_DEPTH {
                return Err(RenderErrorReason::Other(format!(
                    "includes nested deeper than {MAX_INCLUDE_DEPTH} levels at '{name}'"
                )));
            }
            stack.push(name.to_string());
            Ok(StackFrame)
        })
    }
}

impl Drop for StackFrame {
    fn drop(&mut self) {
        INCLUDE_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

pub struct IncludeHelper;

impl HelperDef for IncludeHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        r: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let name = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex(INCLUDE_HELPER, 0))?
            .value()
            .as_str()
            .ok_or_else(|| {
                RenderErrorReason::Other(format!("{INCLUDE_HELPER}: template name must be a string"))
            })?;

        if !r.has_template(name) {
            return Err(RenderErrorReason::TemplateNotFound(name.to_string()).into());
        }

        let params: Map<String, Value> = h
            .hash()
            .iter()
            .map(|(key, value)| (key.to_string(), value.value().clone()))
            .collect();

        let _frame = StackFrame::enter(name)?;
        let rendered = r.render(name, &Value::Object(params))?;
        out.write(&rendered)?;
        Ok(())
    }
}

/// A literal include target found in a template source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeRef {
    pub target: String,
    pub line: usize,
}

/// Find every `{{include "name" ...}}` with a literal name in `source`.
///
/// The source is compiled and its expressions walked, so includes inside comments or
/// raw blocks are not references. A source that does not compile has none.
pub fn references(source: &str) -> Vec<IncludeRef> {
    let mut refs = Vec::new();
    if let Ok(template) = Template::compile(source) {
        collect_references(&template, &mut refs);
    }
    refs
}

fn collect_references(template: &Template, refs: &mut Vec<IncludeRef>) {
    for (index, element) in template.elements.iter().enumerate() {
        let helper = match element {
            TemplateElement::Expression(helper)
            | TemplateElement::HtmlExpression(helper)
            | TemplateElement::HelperBlock(helper) => helper,
            _ => continue,
        };

        if helper.name.as_name() == Some(INCLUDE_HELPER) {
            if let Some(Parameter::Literal(Value::String(target))) = helper.params.first() {
                let line = template.mapping.get(index).map_or(0, |m| m.0);
                refs.push(IncludeRef {
                    target: target.clone(),
                    line,
                });
            }
        }
        for nested in [&helper.template, &helper.inverse].into_iter().flatten() {
            collect_references(nested, refs);
        }
    }
}

/// Verify that every literal include target exists and that includes do not loop.
pub fn check_graph(sources: &BTreeMap<String, String>) -> Result<()> {
    let mut graph: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (name, source) in sources {
        let mut targets = Vec::new();
        for reference in references(source) {
            if !sources.contains_key(&reference.target) {
                return Err(FolioError::UnknownInclude {
                    template: name.clone(),
                    include: reference.target,
                    line: reference.line,
                });
            }
            targets.push(reference.target);
        }
        graph.insert(name.as_str(), targets);
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Visiting,
        Done,
    }

    fn visit<'a>(
        node: &'a str,
        graph: &'a BTreeMap<&'a str, Vec<String>>,
        marks: &mut BTreeMap<&'a str, Mark>,
        stack: &mut Vec<&'a str>,
    ) -> Result<()> {
        match marks.get(node) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::Visiting) => {
                let from = stack.iter().position(|n| *n == node).unwrap_or(0);
                let mut chain: Vec<&str> = stack[from..].to_vec();
                chain.push(node);
                return Err(FolioError::IncludeCycle(chain.join(" -> ")));
            }
            None => {}
        }
        marks.insert(node, Mark::Visiting);
        stack.push(node);
        for target in graph.get(node).into_iter().flatten() {
            visit(target, graph, marks, stack)?;
        }
        stack.pop();
        marks.insert(node, Mark::Done);
        Ok(())
    }

    let mut marks = BTreeMap::new();
    for node in graph.keys() {
        visit(node, &graph, &mut marks, &mut Vec::new())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(n, s)| (n.to_string(), s.to_string()))
            .collect()
    }

    #[test]
    fn test_references_found_with_lines() {
        let src = "<ul>\n{{#each repositories}}\n  {{include \"partials/repo\" repo=this}}\n{{/each}}\n{{~ include \"partials/footer\"}}";
        let refs = references(src);
        assert_eq!(
            refs,
            vec![
                IncludeRef { target: "partials/repo".into(), line: 3 },
                IncludeRef { target: "partials/footer".into(), line: 5 },
            ]
        );
    }

    #[test]
    fn test_references_ignore_similar_names() {
        assert!(references("{{included}} {{include_me \"x\"}} {{include name}}").is_empty());
    }

    #[test]
    fn test_references_skip_comments() {
        let src = "{{!-- old: {{include \"partials/gone\"}} --}}ok\n{{! {{include \"x\"}} }}";
        assert!(references(src).is_empty());
        check_graph(&sources(&[("page", src)])).unwrap();
    }

    #[test]
    fn test_references_inside_else_branch() {
        let src = "{{#if a}}\nyes\n{{else}}\n{{include \"partials/fallback\"}}\n{{/if}}";
        let refs = references(src);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].target, "partials/fallback");
        assert_eq!(refs[0].line, 4);
    }

    #[test]
    fn test_check_graph_unknown_target() {
        let err = check_graph(&sources(&[("page", "line one\n{{include \"missing\"}}")]))
            .unwrap_err();
        match err {
            FolioError::UnknownInclude { template, include, line } => {
                assert_eq!(template, "page");
                assert_eq!(include, "missing");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_graph_cycle() {
        let err = check_graph(&sources(&[
            ("a", "{{include \"b\"}}"),
            ("b", "{{include \"c\"}}"),
            ("c", "{{include \"a\"}}"),
        ]))
        .unwrap_err();
        assert_eq!(err.to_string(), "include cycle: a -> b -> c -> a");
    }

    #[test]
    fn test_check_graph_diamond_is_fine() {
        check_graph(&sources(&[
            ("page", "{{include \"left\"}}{{include \"right\"}}"),
            ("left", "{{include \"leaf\"}}"),
            ("right", "{{include \"leaf\"}}"),
            ("leaf", "leaf"),
        ]))
        .unwrap();
    }
}
