//! Lowering of a parsed FSM into language-neutral combinational processes.
//! Writers only decide syntax; every decision about which assignments and
//! branches exist is taken here.
use super::encode::StateEncoding;
use super::parse::{self, FsmDescription, GuardTest, OutputBit, StateRecord, Transition};
use crate::params::LibraryRef;
use rtlgen_ir::{BackendConf, Direction, Module, Port};
use rtlgen_utils::{Error, RtlResult};
use smallvec::SmallVec;

pub const PRESENT_STATE_PORT_NAME: &str = "present_state";
pub const NEXT_STATE_PORT_NAME: &str = "next_state";
pub const SELECTOR_REGISTER_FILE: &str = "selector_register_file";

/// Outputs forced to unknown while waiting for start when FSMX is enabled.
const FSMX_OUTPUT_PREFIXES: &[&str] = &["selector_MUX", "wrenable_reg"];

/// Test of one input: any of the alternatives holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputTest<'a> {
    pub port: &'a Port,
    pub width: u64,
    pub alternatives: SmallVec<[GuardTest; 2]>,
}

/// Conjunction of input tests.
pub type Condition<'a> = Vec<InputTest<'a>>;

/// Assignments performed by a branch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Action {
    pub next_state: Option<String>,
    /// Output index and driven value; never [OutputBit::DontCare].
    pub outputs: Vec<(usize, OutputBit)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Branches<'a> {
    /// The state has no transition.
    None,
    /// Exactly one transition.
    Unconditional(Action),
    /// `if` / `else if` chain ending in an unconditional `else`.
    Chain {
        arms: Vec<(Condition<'a>, Action)>,
        otherwise: Action,
    },
}

/// Priority encoded single-input chain: every arm tests one bit of `port`.
pub struct PriorityCase<'b, 'a> {
    pub port: &'a Port,
    pub width: u64,
    pub arms: Vec<(u32, &'b Action)>,
    pub otherwise: &'b Action,
}

impl<'a> Branches<'a> {
    /// View a chain as a priority case over one input, if every arm tests a
    /// single bit of the same input.
    pub fn as_priority_case(&self) -> Option<PriorityCase<'_, 'a>> {
        let Branches::Chain { arms, otherwise } = self else {
            return None;
        };
        let mut port = None;
        let mut bits = Vec::new();
        for (cond, action) in arms {
            let [test] = cond.as_slice() else {
                return None;
            };
            let [GuardTest::Bit(bit)] = test.alternatives.as_slice() else {
                return None;
            };
            match port {
                None => port = Some((test.port, test.width)),
                Some((p, _)) if std::ptr::eq(p, test.port) => (),
                Some(_) => return None,
            }
            bits.push((*bit, action));
        }
        let (port, width) = port?;
        Some(PriorityCase {
            port,
            width,
            arms: bits,
            otherwise,
        })
    }
}

/// The code emitted for one state inside one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateArm<'a> {
    pub state: &'a StateRecord,
    /// Present for the reset state: what happens while start is low.
    pub wait_for_start: Option<Action>,
    /// State outputs differing from the all-zero default.
    pub state_outputs: Vec<(usize, OutputBit)>,
    pub branches: Branches<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOwner {
    /// Single-process mode.
    All,
    Output(usize),
    NextState,
}

impl ProcessOwner {
    fn owns_output(&self, index: usize) -> bool {
        match self {
            ProcessOwner::All => true,
            ProcessOwner::Output(i) => *i == index,
            ProcessOwner::NextState => false,
        }
    }

    pub fn owns_next_state(&self) -> bool {
        matches!(self, ProcessOwner::All | ProcessOwner::NextState)
    }
}

/// A combinational process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsmProcess<'a> {
    pub owner: ProcessOwner,
    /// Outputs assigned zero before the case statement.
    pub default_outputs: Vec<usize>,
    /// Assign the reset state to next-state before the case statement.
    pub default_next_state: bool,
    pub arms: Vec<StateArm<'a>>,
    /// Body of the catch-all arm for unreachable codes.
    pub default_arm: Action,
}

/// Everything a writer needs to emit an FSM module body.
#[derive(Debug)]
pub struct FsmPlan<'a> {
    pub fsm: FsmDescription,
    pub encoding: StateEncoding,
    /// Output ports driven by the machine, in output-string order.
    pub outputs: Vec<&'a Port>,
    pub inputs: Vec<&'a Port>,
    pub context_switch: bool,
    /// Depth of the context-switch state file.
    pub contexts: u64,
    /// The module exposes `present_state` and `next_state`.
    pub exports_state: bool,
    /// Library parameters sizing the ports of the module.
    pub lib: LibraryRef,
}

impl<'a> FsmPlan<'a> {
    /// Parse `text` against the ports of `module` and choose the encoding.
    pub fn new(
        module: &'a Module,
        text: &str,
        context_switch: bool,
        bc: &BackendConf,
    ) -> RtlResult<Self> {
        let outputs: Vec<&Port> = module
            .ports_with(Direction::Out)
            .filter(|p| p.name != PRESENT_STATE_PORT_NAME && p.name != NEXT_STATE_PORT_NAME)
            .collect();
        let in_names: Vec<&str> = module
            .ports_with(Direction::In)
            .map(|p| p.name.as_str())
            .collect();
        let extra: &[&str] = if context_switch {
            &[SELECTOR_REGISTER_FILE]
        } else {
            &[]
        };
        let fsm = parse::parse(text, &in_names, extra, outputs.len())?;
        let inputs = fsm
            .guard_inputs
            .iter()
            .map(|name| {
                module.port(name).ok_or_else(|| {
                    Error::malformed(format!("guard input `{}' is not a port", name))
                })
            })
            .collect::<RtlResult<Vec<_>>>()?;
        let encoding = StateEncoding::choose(&fsm, bc);
        log::debug!(
            "FSM of `{}': {} states, {:?}",
            module.type_name,
            fsm.states.len(),
            encoding
        );
        Ok(Self {
            fsm,
            encoding,
            outputs,
            inputs,
            context_switch,
            contexts: bc.context_switch.max(1),
            exports_state: module.port(PRESENT_STATE_PORT_NAME).is_some(),
            lib: LibraryRef::of(module)?,
        })
    }

    fn condition(&self, t: &Transition) -> RtlResult<Condition<'a>> {
        t.guards
            .iter()
            .zip(&self.inputs)
            .filter_map(|(g, port)| g.as_ref().map(|alts| (alts, *port)))
            .map(|(alts, port)| {
                let width = port.total_size().ok_or_else(|| {
                    Error::malformed(format!("width of guard input `{}' is unknown", port.name))
                })?;
                Ok(InputTest {
                    port,
                    width,
                    alternatives: alts.clone(),
                })
            })
            .collect()
    }

    fn action(&self, owner: ProcessOwner, t: &Transition) -> Action {
        Action {
            next_state: owner.owns_next_state().then(|| t.next_state.clone()),
            outputs: t
                .outputs
                .iter()
                .enumerate()
                .filter(|(i, b)| owner.owns_output(*i) && **b != OutputBit::DontCare)
                .map(|(i, b)| (i, *b))
                .collect(),
        }
    }

    fn branches(&self, owner: ProcessOwner, state: &StateRecord) -> RtlResult<Branches<'a>> {
        match state.transitions.as_slice() {
            [] => Ok(Branches::None),
            [t] => Ok(Branches::Unconditional(self.action(owner, t))),
            [init @ .., last] => {
                let arms = init
                    .iter()
                    .map(|t| Ok((self.condition(t)?, self.action(owner, t))))
                    .collect::<RtlResult<_>>()?;
                Ok(Branches::Chain {
                    arms,
                    otherwise: self.action(owner, last),
                })
            }
        }
    }

    /// Hold the reset state while start is low.
    fn wait_for_start(&self, owner: ProcessOwner, bc: &BackendConf) -> Action {
        Action {
            next_state: owner
                .owns_next_state()
                .then(|| self.fsm.reset_state.clone()),
            outputs: self.fsmx_outputs(owner, bc),
        }
    }

    fn fsmx_outputs(&self, owner: ProcessOwner, bc: &BackendConf) -> Vec<(usize, OutputBit)> {
        if bc.enable_fsmx {
            self.outputs
                .iter()
                .enumerate()
                .filter(|(i, p)| {
                    owner.owns_output(*i)
                        && FSMX_OUTPUT_PREFIXES.iter().any(|pre| p.name.starts_with(pre))
                })
                .map(|(i, _)| (i, OutputBit::Unknown))
                .collect()
        } else {
            Vec::new()
        }
    }

    /// An output process has no transition logic in a state whose
    /// transitions all leave its output as don't care.
    fn owns_no_transition(&self, owner: ProcessOwner, state: &StateRecord) -> bool {
        let ProcessOwner::Output(i) = owner else {
            return false;
        };
        state
            .transitions
            .iter()
            .all(|t| t.outputs[i] == OutputBit::DontCare)
    }

    /// A state is skipped by an output process when it leaves the output at
    /// its default everywhere.
    fn skip_state(&self, owner: ProcessOwner, state: &StateRecord) -> bool {
        let ProcessOwner::Output(i) = owner else {
            return false;
        };
        state.outputs[i] == OutputBit::Zero && self.owns_no_transition(owner, state)
    }

    fn process(&self, owner: ProcessOwner, bc: &BackendConf) -> RtlResult<FsmProcess<'_>> {
        let mut arms = Vec::new();
        for (idx, state) in self.fsm.states.iter().enumerate() {
            if self.skip_state(owner, state) {
                continue;
            }
            let state_outputs = state
                .outputs
                .iter()
                .enumerate()
                .filter(|(i, b)| {
                    owner.owns_output(*i)
                        && matches!(b, OutputBit::One | OutputBit::Unknown)
                })
                .map(|(i, b)| (i, *b))
                .collect();
            arms.push(StateArm {
                state,
                wait_for_start: (idx == 0).then(|| self.wait_for_start(owner, bc)),
                state_outputs,
                branches: if self.owns_no_transition(owner, state) {
                    Branches::None
                } else {
                    self.branches(owner, state)?
                },
            });
        }
        Ok(FsmProcess {
            owner,
            default_outputs: (0..self.outputs.len())
                .filter(|i| owner.owns_output(*i))
                .collect(),
            default_next_state: owner == ProcessOwner::NextState,
            arms,
            default_arm: if owner == ProcessOwner::All {
                self.wait_for_start(owner, bc)
            } else {
                Action::default()
            },
        })
    }

    /// The combinational processes: one in single-process mode, otherwise
    /// one per output followed by the next-state process.
    pub fn processes(&self, bc: &BackendConf) -> RtlResult<Vec<FsmProcess<'_>>> {
        if !bc.multi_proc_fsm {
            return Ok(vec![self.process(ProcessOwner::All, bc)?]);
        }
        (0..self.outputs.len())
            .map(ProcessOwner::Output)
            .chain(std::iter::once(ProcessOwner::NextState))
            .map(|owner| self.process(owner, bc))
            .collect()
    }

    /// Code of the reset state.
    pub fn reset_code(&self) -> String {
        self.encoding.code(self.fsm.reset().ordinal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtlgen_ir::{FsmEncoding, TypeDescriptor};

    pub(crate) fn fsm_module(text: &str) -> Module {
        let mut m = Module::new("ctrl", "controller")
            .with_port(Port::new("clock", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("reset", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("start_port", Direction::In, TypeDescriptor::bool()))
            .with_port(Port::new("cond", Direction::In, TypeDescriptor::uint(4)))
            .with_port(Port::new("done_port", Direction::Out, TypeDescriptor::bool()))
            .with_port(Port::new("selector_MUX_0", Direction::Out, TypeDescriptor::bool()));
        m.behavior.fsm = Some(text.to_string());
        m
    }

    const TEXT: &str = "S_0 reset start_port clock;\
        S_0 00:- S_1 01;\
        S_1 00:&0 S_2 1-:&1 S_0 0-:- S_1 00;\
        S_2 10:- S_0 --;";

    #[test]
    fn single_process() {
        let m = fsm_module(TEXT);
        let bc = BackendConf::default();
        let plan = FsmPlan::new(&m, TEXT, false, &bc).unwrap();
        assert_eq!(plan.encoding, StateEncoding::Binary { width: 2 });
        let procs = plan.processes(&bc).unwrap();
        assert_eq!(procs.len(), 1);
        let p = &procs[0];
        assert_eq!(p.default_outputs, vec![0, 1]);
        assert!(!p.default_next_state);
        assert!(matches!(p.arms[0].branches, Branches::Unconditional(_)));
        assert!(p.arms[0].wait_for_start.is_some());
        assert_eq!(p.arms[2].state_outputs, vec![(0, OutputBit::One)]);
        assert_eq!(p.default_arm.next_state.as_deref(), Some("S_0"));
        let Branches::Chain { arms, otherwise } = &p.arms[1].branches else {
            panic!("expected a chain");
        };
        assert_eq!(arms.len(), 2);
        assert_eq!(otherwise.next_state.as_deref(), Some("S_1"));
        assert!(p.arms[1].branches.as_priority_case().is_some());
    }

    #[test]
    fn multi_process_skips_untouched_states() {
        let m = fsm_module(TEXT);
        let bc = BackendConf {
            multi_proc_fsm: true,
            fsm_encoding: FsmEncoding::OneHot,
            ..Default::default()
        };
        let plan = FsmPlan::new(&m, TEXT, false, &bc).unwrap();
        let procs = plan.processes(&bc).unwrap();
        assert_eq!(procs.len(), 3);
        // output 1 is don't care in S_2 and zero there
        let out1: Vec<_> = procs[1].arms.iter().map(|a| a.state.name.as_str()).collect();
        assert_eq!(out1, vec!["S_0", "S_1"]);
        assert!(procs[2].default_next_state);
        assert!(procs[2].arms.iter().all(|a| a.state_outputs.is_empty()));
        assert_eq!(procs[2].default_arm, Action::default());
    }

    #[test]
    fn fsmx_drives_selectors_unknown_while_idle() {
        let m = fsm_module(TEXT);
        let bc = BackendConf {
            enable_fsmx: true,
            ..Default::default()
        };
        let plan = FsmPlan::new(&m, TEXT, false, &bc).unwrap();
        let procs = plan.processes(&bc).unwrap();
        let wait = procs[0].arms[0].wait_for_start.as_ref().unwrap();
        assert_eq!(wait.outputs, vec![(1, OutputBit::Unknown)]);
        assert_eq!(wait.next_state.as_deref(), Some("S_0"));
    }
}
