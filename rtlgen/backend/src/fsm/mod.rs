//! Finite-state machines: parsing of the textual description, state
//! assignment and lowering into processes the writers render.
mod encode;
mod lower;
mod parse;

pub use encode::StateEncoding;
pub use lower::{
    Action, Branches, Condition, FsmPlan, FsmProcess, InputTest, NEXT_STATE_PORT_NAME,
    PRESENT_STATE_PORT_NAME, PriorityCase, ProcessOwner, SELECTOR_REGISTER_FILE, StateArm,
};
pub use parse::{
    FsmDescription, Guard, GuardTest, OutputBit, STATE_NAME_PREFIX, StateRecord, Transition,
    parse,
};
