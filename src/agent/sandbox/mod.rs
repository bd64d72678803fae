//! Sandboxed interpreter for model-written analysis code.
//!
//! Code blocks run as Starlark, a deterministic Python dialect with no file,
//! network or process access. The globals are the Starlark standard library
//! plus the functions in [`builtins`]: a capturing `print`, `sum`, a
//! budgeted `range` and an `llm_query` stub that explains delegation.
//! Top-level `for`/`if` and f-strings are enabled; `load` is not.
//!
//! The document is bound as `context` (and `chunks` when the segmenter
//! produced any). Every run evaluates in a fresh module: the bindings and
//! the variables kept from earlier runs are injected first, and afterwards
//! every serializable top-level variable is kept for the next run.
//!
//! # Example
//!
//! ```
//! use rlm_reader::agent::sandbox::Sandbox;
//!
//! let mut sandbox = Sandbox::new("alpha beta gamma");
//! let out = sandbox.run("words = context.split()\nprint(len(words))");
//! assert_eq!(out, "3\n");
//! ```

mod builtins;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;
use starlark::environment::{GlobalsBuilder, Module};
use starlark::eval::Evaluator;
use starlark::syntax::{AstModule, Dialect};
use starlark::values::dict::AllocDict;
use starlark::values::list::AllocList;
use starlark::values::{Heap, Value};
use tracing::debug;

use crate::error::SandboxError;

use builtins::{RunState, sandbox_builtins};

/// Items `range` may produce across one [`Sandbox::run`] call.
pub const DEFAULT_RANGE_BUDGET: usize = 1_000_000;

/// Output reported when code ran cleanly without printing.
pub const NO_OUTPUT: &str = "<code executed successfully, no output>";

/// Name of the document binding.
pub const CONTEXT_BINDING: &str = "context";

/// Name of the chunk list binding.
pub const CHUNKS_BINDING: &str = "chunks";

const SOURCE_NAME: &str = "code_block.star";

/// Persistent interpreter state for one orchestration session.
#[derive(Debug, Clone)]
pub struct Sandbox {
    context: Arc<str>,
    chunks: Option<Vec<Arc<str>>>,
    vars: BTreeMap<String, JsonValue>,
    range_budget: usize,
}

impl Sandbox {
    /// Creates a sandbox with `context` bound to the given text.
    pub fn new(context: impl Into<Arc<str>>) -> Self {
        Self {
            context: context.into(),
            chunks: None,
            vars: BTreeMap::new(),
            range_budget: DEFAULT_RANGE_BUDGET,
        }
    }

    /// Binds `chunks` to a list of chunk texts.
    #[must_use]
    pub fn with_chunks<I, S>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Arc<str>>,
    {
        self.chunks = Some(chunks.into_iter().map(Into::into).collect());
        self
    }

    /// Overrides how many items `range` may produce per run.
    #[must_use]
    pub const fn with_range_budget(mut self, range_budget: usize) -> Self {
        self.range_budget = range_budget;
        self
    }

    /// Runs code and returns what it printed.
    ///
    /// Never fails: faults are rendered as `<execution error: ...>` and a
    /// silent run yields [`NO_OUTPUT`].
    pub fn run(&mut self, code: &str) -> String {
        match self.try_run(code) {
            Ok(out) if out.is_empty() => NO_OUTPUT.to_string(),
            Ok(out) => out,
            Err(e) => {
                debug!(error = %e, "sandbox execution failed");
                format!("<execution error: {e}>")
            }
        }
    }

    /// Runs code, surfacing faults as errors.
    ///
    /// Assignments completed before a runtime fault are kept.
    pub fn try_run(&mut self, code: &str) -> Result<String, SandboxError> {
        let ast = AstModule::parse(SOURCE_NAME, code.to_owned(), &dialect())
            .map_err(|e| SandboxError::Syntax(e.to_string().trim_end().to_owned()))?;
        let globals = GlobalsBuilder::standard().with(sandbox_builtins).build();
        let module = Module::new();
        self.inject(&module);

        let state = RefCell::new(RunState::new(self.range_budget));
        let result = {
            let mut eval = Evaluator::new(&module);
            eval.extra = Some(&state);
            eval.eval_module(ast, &globals).map(|_| ())
        };
        self.keep_variables(&module);

        match result {
            Ok(()) => Ok(state.into_inner().output),
            Err(e) => Err(SandboxError::Runtime(e.to_string().trim_end().to_owned())),
        }
    }

    /// Looks up a variable kept from earlier runs.
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.vars.get(name)
    }

    /// Names kept from earlier runs, in sorted order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    fn inject(&self, module: &Module) {
        let heap = module.heap();
        module.set(CONTEXT_BINDING, heap.alloc(&*self.context));
        if let Some(chunks) = &self.chunks {
            module.set(CHUNKS_BINDING, heap.alloc(AllocList(chunks.iter().map(|c| &**c))));
        }
        for (name, value) in &self.vars {
            module.set(name, alloc_json(heap, value));
        }
    }

    fn keep_variables(&mut self, module: &Module) {
        for name in module.names() {
            let name = name.as_str();
            if name == CONTEXT_BINDING || name == CHUNKS_BINDING {
                continue;
            }
            let Some(value) = module.get(name) else {
                continue;
            };
            match serde_json::to_value(value) {
                Ok(json) => {
                    self.vars.insert(name.to_owned(), json);
                }
                Err(e) => debug!(name, error = %e, "variable not kept between runs"),
            }
        }
    }
}

fn dialect() -> Dialect {
    let mut dialect = Dialect::Extended.clone();
    dialect.enable_f_strings = true;
    dialect.enable_load = false;
    dialect
}

/// Rebuilds a kept variable on a run's heap.
fn alloc_json<'v>(heap: &'v Heap, value: &JsonValue) -> Value<'v> {
    match value {
        JsonValue::Null => Value::new_none(),
        JsonValue::Bool(b) => Value::new_bool(*b),
        JsonValue::Number(n) => n
            .as_i64()
            .map_or_else(|| heap.alloc(n.as_f64().unwrap_or(f64::NAN)), |i| heap.alloc(i)),
        JsonValue::String(s) => heap.alloc(s.as_str()),
        JsonValue::Array(items) => heap.alloc(AllocList(items.iter().map(|item| alloc_json(heap, item)))),
        JsonValue::Object(map) => heap.alloc(AllocDict(
            map.iter().map(|(key, item)| (key.as_str(), alloc_json(heap, item))),
        )),
    }
}
