//! Structural object graph consumed by the RTL code generator.
mod behavior;
mod context;
mod from_json;
mod structure;
mod tech;
mod types;

pub use behavior::{Behavior, Language, Representation};
pub use context::{BackendConf, Context, Device, FsmEncoding, ResetType};
pub use from_json::Design;
pub use structure::{
    Bound, BoundObject, BusConnection, Constant, Internal, MEMORY_PARAMETER,
    Module, ModuleKind, PIPE_PARAMETER, Port, PortElement, Signal, SignalVector,
};
pub use tech::{
    BUILTIN_GATES, FuTiming, OperationTiming, PinDelay, TechLibrary,
    TechnologyManager,
};
pub use types::{Direction, TypeDescriptor, TypeKind};
