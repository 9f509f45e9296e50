//! Execution tracing for the evaluator and the bytecode VM.
//!
//! Default no-op hooks so [`NoopTracer`] compiles away under
//! monomorphization, with [`StderrTracer`] as the `--trace` human-readable
//! log.

/// Hook points fired by the tree-walker and the VM. All default to
/// no-ops so a tracer only needs to override what it cares about.
pub trait Tracer {
    fn on_statement(&mut self, _line: u32, _current_group: &str) {}
    fn on_call(&mut self, _func_name: &str, _frame: &str, _depth: usize) {}
    fn on_return(&mut self, _func_name: &str, _depth: usize) {}
    fn on_opcode(&mut self, _ip: usize, _name: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl Tracer for NoopTracer {}

/// Writes one line per hook to stderr; selected by the CLI's `--trace`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrTracer;

impl Tracer for StderrTracer {
    fn on_statement(&mut self, line: u32, current_group: &str) {
        eprintln!("[trace] stmt line={line} group={current_group}");
    }

    fn on_call(&mut self, func_name: &str, frame: &str, depth: usize) {
        eprintln!("[trace] call {func_name} frame={frame} depth={depth}");
    }

    fn on_return(&mut self, func_name: &str, depth: usize) {
        eprintln!("[trace] return {func_name} depth={depth}");
    }

    fn on_opcode(&mut self, ip: usize, name: &str) {
        eprintln!("[trace] op ip={ip} {name}");
    }
}
