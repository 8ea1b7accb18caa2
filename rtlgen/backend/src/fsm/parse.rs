//! Parser of the textual FSM description.
//!
//! The description is a `;` separated list. The first entry is the header
//! `reset_state reset_port start_port clock_port`; every following entry is a
//! state record
//!
//! ```text
//! S_<n> <outputs>:<transition>:<transition>...
//! ```
//!
//! where a transition is `<guards> <next state> <outputs>` and the guards are
//! omitted when the machine has no guard inputs. Guards are one comma
//! separated field per guard input: `-` ignores the input, `&k` tests bit `k`,
//! anything else is an integer value; `|` separates alternatives. Output
//! strings hold one character per output port: `0`, `1`, `2` for unknown and
//! `-` for don't care.
use rtlgen_utils::{Error, RtlResult};
use smallvec::SmallVec;
use std::collections::HashSet;

/// Prefix of state names; the remainder is the state ordinal.
pub const STATE_NAME_PREFIX: &str = "S_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputBit {
    Zero,
    One,
    /// Driven to the backend's unknown value.
    Unknown,
    DontCare,
}

impl OutputBit {
    fn parse(c: char) -> Option<Self> {
        match c {
            '0' => Some(OutputBit::Zero),
            '1' => Some(OutputBit::One),
            '2' | 'X' | 'x' => Some(OutputBit::Unknown),
            '-' => Some(OutputBit::DontCare),
            _ => None,
        }
    }
}

/// One alternative of a guard on an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardTest {
    /// Bit `k` of the input is set.
    Bit(u32),
    /// The input equals the value.
    Value(i64),
}

/// Guard on one input: `None` ignores the input, otherwise any of the
/// alternatives must hold.
pub type Guard = Option<SmallVec<[GuardTest; 2]>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// One guard per guard input.
    pub guards: Vec<Guard>,
    pub next_state: String,
    pub outputs: Vec<OutputBit>,
}

impl Transition {
    /// Does any guard constrain an input?
    pub fn is_guarded(&self) -> bool {
        self.guards.iter().any(Option::is_some)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateRecord {
    pub name: String,
    pub ordinal: u64,
    pub outputs: Vec<OutputBit>,
    pub transitions: Vec<Transition>,
}

/// A fully parsed FSM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsmDescription {
    pub reset_state: String,
    pub reset_port: String,
    pub start_port: String,
    pub clock_port: String,
    /// Input ports tested by guards, in guard field order.
    pub guard_inputs: Vec<String>,
    pub states: Vec<StateRecord>,
}

impl FsmDescription {
    pub fn max_ordinal(&self) -> u64 {
        self.states.iter().map(|s| s.ordinal).max().unwrap_or(0)
    }

    pub fn reset(&self) -> &StateRecord {
        &self.states[0]
    }
}

fn ordinal_of(name: &str) -> RtlResult<u64> {
    name.strip_prefix(STATE_NAME_PREFIX)
        .and_then(|n| n.parse::<u64>().ok())
        .ok_or_else(|| {
            Error::malformed(format!(
                "state name `{}' does not carry an ordinal",
                name
            ))
        })
}

fn parse_outputs(bits: &str, n_outputs: usize, at: &str) -> RtlResult<Vec<OutputBit>> {
    let outputs = bits
        .chars()
        .map(OutputBit::parse)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| {
            Error::malformed(format!("invalid output string `{}' in `{}'", bits, at))
        })?;
    if outputs.len() != n_outputs {
        return Err(Error::malformed(format!(
            "output string `{}' in `{}' has {} bits, expected {}",
            bits,
            at,
            outputs.len(),
            n_outputs
        )));
    }
    Ok(outputs)
}

fn parse_guard(field: &str, at: &str) -> RtlResult<Guard> {
    if field == "-" {
        return Ok(None);
    }
    field
        .split('|')
        .map(|alt| {
            let test = match alt.strip_prefix('&') {
                Some(bit) => bit.parse().map(GuardTest::Bit).ok(),
                None => alt.parse().map(GuardTest::Value).ok(),
            };
            test.ok_or_else(|| {
                Error::malformed(format!("invalid guard `{}' in `{}'", alt, at))
            })
        })
        .collect::<RtlResult<SmallVec<_>>>()
        .map(Some)
}

fn parse_transition(
    text: &str,
    n_guards: usize,
    n_outputs: usize,
) -> RtlResult<Transition> {
    let tokens: Vec<_> = text.split_whitespace().collect();
    let (guard_field, rest) = if n_guards > 0 {
        match tokens.split_first() {
            Some((g, rest)) => (Some(*g), rest),
            None => (None, &tokens[..]),
        }
    } else {
        (None, &tokens[..])
    };
    let (next_state, bits) = match rest {
        [next, bits] => (*next, *bits),
        [next] if n_outputs == 0 => (*next, ""),
        _ => {
            return Err(Error::malformed(format!(
                "malformed transition `{}'",
                text
            )));
        }
    };
    let guards = match guard_field {
        Some(field) => {
            let fields: Vec<_> = field.split(',').collect();
            if fields.len() != n_guards {
                return Err(Error::malformed(format!(
                    "transition `{}' tests {} inputs, expected {}",
                    text,
                    fields.len(),
                    n_guards
                )));
            }
            fields
                .iter()
                .map(|f| parse_guard(f, text))
                .collect::<RtlResult<_>>()?
        }
        None => Vec::new(),
    };
    Ok(Transition {
        guards,
        next_state: next_state.to_string(),
        outputs: parse_outputs(bits, n_outputs, text)?,
    })
}

fn parse_state(text: &str, n_guards: usize, n_outputs: usize) -> RtlResult<StateRecord> {
    let mut parts = text.split(':');
    let head = parts.next().unwrap_or_default();
    let tokens: Vec<_> = head.split_whitespace().collect();
    let (name, bits) = match tokens.as_slice() {
        [name, bits] => (*name, *bits),
        [name] if n_outputs == 0 => (*name, ""),
        _ => {
            return Err(Error::malformed(format!(
                "malformed state record `{}'",
                text
            )));
        }
    };
    let transitions = parts
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| parse_transition(t, n_guards, n_outputs))
        .collect::<RtlResult<_>>()?;
    Ok(StateRecord {
        name: name.to_string(),
        ordinal: ordinal_of(name)?,
        outputs: parse_outputs(bits, n_outputs, text)?,
        transitions,
    })
}

/// Parse `text` for a machine with the given input ports and `n_outputs`
/// outputs. Reset, start, clock and `extra_ignored` inputs are not guard
/// inputs.
pub fn parse(
    text: &str,
    in_ports: &[&str],
    extra_ignored: &[&str],
    n_outputs: usize,
) -> RtlResult<FsmDescription> {
    let text: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    let mut entries = text.split(';').map(str::trim).filter(|e| !e.is_empty());

    let header = entries
        .next()
        .ok_or_else(|| Error::malformed("empty FSM description".to_string()))?;
    let fields: Vec<_> = header.split_whitespace().collect();
    let [reset_state, reset_port, start_port, clock_port] = fields.as_slice() else {
        return Err(Error::malformed(format!(
            "FSM header `{}' must name the reset state, reset, start and clock ports",
            header
        )));
    };

    let guard_inputs: Vec<String> = in_ports
        .iter()
        .filter(|p| {
            **p != *reset_port
                && **p != *start_port
                && **p != *clock_port
                && !extra_ignored.contains(*p)
        })
        .map(|p| p.to_string())
        .collect();

    let states = entries
        .map(|e| parse_state(e, guard_inputs.len(), n_outputs))
        .collect::<RtlResult<Vec<_>>>()?;

    let Some(first) = states.first() else {
        return Err(Error::malformed("FSM has no states".to_string()));
    };
    if first.name != *reset_state {
        return Err(Error::malformed(format!(
            "reset state `{}' is not the first state `{}'",
            reset_state, first.name
        )));
    }
    let mut seen = HashSet::new();
    for s in &states {
        if !seen.insert(s.name.as_str()) {
            return Err(Error::malformed(format!("state `{}' is defined twice", s.name)));
        }
    }
    for s in &states {
        if let Some(t) = s.transitions.iter().find(|t| !seen.contains(t.next_state.as_str())) {
            return Err(Error::malformed(format!(
                "state `{}' moves to undefined state `{}'",
                s.name, t.next_state
            )));
        }
    }

    Ok(FsmDescription {
        reset_state: reset_state.to_string(),
        reset_port: reset_port.to_string(),
        start_port: start_port.to_string(),
        clock_port: clock_port.to_string(),
        guard_inputs,
        states,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    const PORTS: &[&str] = &["clock", "reset", "start_port", "cond", "sel"];

    #[test]
    fn parse_three_states() {
        let text = "S_0 reset start_port clock;\n\
                    S_0 00:-,- S_1 10;\n\
                    S_1 10:1,- S_2 01:0,- S_0 00;\n\
                    S_5 01:-,&2|&0 S_0 0-;";
        let fsm = parse(text, PORTS, &[], 2).unwrap();
        assert_eq!(fsm.guard_inputs, vec!["cond", "sel"]);
        assert_eq!(fsm.states.len(), 3);
        assert_eq!(fsm.states[2].ordinal, 5);
        assert_eq!(fsm.max_ordinal(), 5);
        assert!(!fsm.states[0].transitions[0].is_guarded());
        assert_eq!(
            fsm.states[1].transitions[0].guards,
            vec![Some(smallvec![GuardTest::Value(1)]), None]
        );
        assert_eq!(
            fsm.states[2].transitions[0].guards[1],
            Some(smallvec![GuardTest::Bit(2), GuardTest::Bit(0)])
        );
        assert_eq!(
            fsm.states[2].transitions[0].outputs,
            vec![OutputBit::Zero, OutputBit::DontCare]
        );
    }

    #[test]
    fn no_guard_inputs() {
        let text = "S_0 reset start clock;S_0 1:S_1 0;S_1 2:S_0 1;";
        let fsm = parse(text, &["clock", "reset", "start"], &[], 1).unwrap();
        assert!(fsm.guard_inputs.is_empty());
        assert_eq!(fsm.states[1].outputs, vec![OutputBit::Unknown]);
        assert_eq!(fsm.states[1].transitions[0].next_state, "S_0");
    }

    #[test]
    fn rejects_malformed_descriptions() {
        let ports = &["clock", "reset", "start"];
        // empty state list
        assert!(parse("S_0 reset start clock;", ports, &[], 1).is_err());
        // reset is not first
        assert!(parse("S_1 reset start clock;S_0 0:S_1 0;S_1 0:S_0 0;", ports, &[], 1).is_err());
        // wrong header
        assert!(parse("S_0 reset start;S_0 0:S_0 0;", ports, &[], 1).is_err());
        // bad output width
        assert!(parse("S_0 reset start clock;S_0 00:S_0 0;", ports, &[], 1).is_err());
        // ordinal missing
        assert!(parse("IDLE reset start clock;IDLE 0:IDLE 0;", ports, &[], 1).is_err());
        // undefined next state
        assert!(parse("S_0 reset start clock;S_0 0:S_9 0;", ports, &[], 1).is_err());
    }

    #[test]
    fn guard_count_must_match_inputs() {
        let err = parse(
            "S_0 reset start_port clock;S_0 00:1 S_0 00;",
            PORTS,
            &[],
            2,
        )
        .unwrap_err();
        assert!(err.is_malformed());
    }
}
