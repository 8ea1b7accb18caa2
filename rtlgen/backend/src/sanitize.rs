//! Mapping of arbitrary names to legal identifiers of each target language.
//! The mapping is a pure function of the name, so every reference to the
//! same logical name is escaped identically.
use lazy_static::lazy_static;
use rtlgen_ir::Language;
use std::borrow::Cow;
use std::collections::HashSet;

/// Reserved words of Verilog-2005 and Verilog-AMS.
const VERILOG_KEYWORDS: &[&str] = &[
    "abs", "abstol", "access", "acos", "acosh", "always", "analog", "and",
    "asin", "asinh", "assign", "atan", "atan2", "atanh", "automatic", "begin",
    "bool", "buf", "bufif0", "bufif1", "case", "casex", "casez", "ceil",
    "cell", "cmos", "config", "continuous", "cos", "cosh", "ddt_nature",
    "deassign", "default", "defparam", "design", "disable", "discipline",
    "discrete", "domain", "edge", "else", "end", "endcase", "endconfig",
    "enddiscipline", "endfunction", "endgenerate", "endmodule", "endnature",
    "endprimitive", "endspecify", "endtable", "endtask", "event", "exclude",
    "exp", "floor", "flow", "for", "force", "forever", "fork", "from",
    "function", "generate", "genvar", "ground", "highz0", "highz1", "hypot",
    "idt_nature", "if", "ifnone", "incdir", "include", "inf", "initial",
    "inout", "input", "instance", "integer", "join", "large", "liblist",
    "library", "ln", "localparam", "log", "macromodule", "max", "medium",
    "min", "module", "nand", "nature", "negedge", "nmos", "nor",
    "noshowcancelled", "not", "notif0", "notif1", "or", "output", "parameter",
    "pmos", "posedge", "potential", "pow", "primitive", "pull0", "pull1",
    "pulldown", "pullup", "pulsestyle_onevent", "pulsestyle_ondetect",
    "rcmos", "real", "realtime", "reg", "release", "repeat", "rnmos", "rpmos",
    "rtran", "rtranif0", "rtranif1", "scalared", "showcancelled", "signed",
    "sin", "sinh", "small", "specify", "specparam", "sqrt", "strong0",
    "strong1", "supply0", "supply1", "table", "tan", "tanh", "task", "time",
    "tran", "tranif0", "tranif1", "tri", "tri0", "tri1", "triand", "trior",
    "trireg", "units", "unsigned", "use", "uwire", "vectored", "wait", "wand",
    "weak0", "weak1", "while", "wire", "wone", "wor", "xnor", "xor",
];

/// Reserved words added by SystemVerilog 2005, 2009 and 2012.
const SYSTEM_VERILOG_KEYWORDS: &[&str] = &[
    "alias", "always_comb", "always_ff", "always_latch", "assert", "assume",
    "before", "bind", "bins", "binsof", "bit", "break", "byte", "chandle",
    "class", "clocking", "const", "constraint", "context", "continue",
    "cover", "covergroup", "coverpoint", "cross", "dist", "do", "endclass",
    "endgroup", "endsequence", "endclocking", "endpackage", "endinterface",
    "endprogram", "endproperty", "enum", "expect", "export", "extends",
    "extern", "final", "first_match", "foreach", "forkjoin", "iff",
    "ignore_bins", "illegal_bins", "import", "intersect", "inside",
    "interface", "int", "join_any", "join_none", "local", "logic", "longint",
    "matches", "modport", "new", "null", "package", "packed", "priority",
    "program", "property", "protected", "pure", "rand", "randc", "randcase",
    "randomize", "randsequence", "ref", "return", "sequence", "shortint",
    "shortreal", "solve", "static", "string", "struct", "super", "tagged",
    "this", "throughout", "timeprecision", "timeunit", "type", "typedef",
    "unique", "var", "virtual", "void", "wait_order", "wildcard", "with",
    "within", "accept_on", "checker", "endchecker", "eventually", "global",
    "implies", "let", "nexttime", "reject_on", "restrict", "s_always",
    "s_eventually", "s_nexttime", "s_until", "s_until_with", "strong",
    "sync_accept_on", "sync_reject_on", "unique0", "until", "until_with",
    "untyped", "weak", "implements", "interconnect", "nettype", "soft",
];

/// Reserved words of VHDL-93.
const VHDL_KEYWORDS: &[&str] = &[
    "abs", "access", "after", "alias", "all", "and", "architecture", "array",
    "assert", "attribute", "begin", "block", "body", "buffer", "bus", "case",
    "component", "configuration", "constant", "disconnect", "downto", "else",
    "elsif", "end", "entity", "exit", "file", "for", "function", "generate",
    "generic", "group", "guarded", "if", "impure", "in", "inertial", "inout",
    "is", "label", "library", "linkage", "literal", "loop", "map", "mod",
    "nand", "new", "next", "nor", "not", "null", "of", "on", "open", "or",
    "others", "out", "package", "port", "postponed", "procedure", "process",
    "pure", "range", "record", "register", "reject", "rem", "return", "rol",
    "ror", "select", "severity", "signal", "shared", "sla", "sli", "sra",
    "srl", "subtype", "then", "to", "transport", "type", "unaffected",
    "units", "until", "use", "variable", "wait", "when", "while", "with",
    "xnor", "xor",
];

lazy_static! {
    static ref VERILOG_RESERVED: HashSet<&'static str> = VERILOG_KEYWORDS
        .iter()
        .chain(SYSTEM_VERILOG_KEYWORDS.iter())
        .copied()
        .collect();
    /// VHDL is case insensitive; stored upper case.
    static ref VHDL_RESERVED: HashSet<String> =
        VHDL_KEYWORDS.iter().map(|k| k.to_uppercase()).collect();
}

/// Is `id` a reserved word of `lang`?
pub fn is_keyword(lang: Language, id: &str) -> bool {
    match lang {
        Language::Verilog | Language::SystemVerilog => {
            VERILOG_RESERVED.contains(id)
        }
        Language::Vhdl => VHDL_RESERVED.contains(&id.to_uppercase()),
    }
}

fn verilog_identifier(id: &str) -> Cow<'_, str> {
    if id == "array" {
        return Cow::Owned("array_S".to_string());
    }
    let illegal = id.starts_with(|c: char| c.is_ascii_digit())
        || id
            .chars()
            .any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'));
    if illegal || is_keyword(Language::Verilog, id) {
        // Escaped identifiers are terminated by white space.
        Cow::Owned(format!("\\{} ", id))
    } else {
        Cow::Borrowed(id)
    }
}

fn vhdl_identifier(id: &str) -> Cow<'_, str> {
    let illegal = id.starts_with(|c: char| c == '_' || c.is_ascii_digit())
        || id.ends_with('_')
        || id.contains("__")
        || id.chars().any(|c| !(c.is_ascii_alphanumeric() || c == '_'));
    if illegal || is_keyword(Language::Vhdl, id) {
        Cow::Owned(format!("\\{}\\", id))
    } else {
        Cow::Borrowed(id)
    }
}

/// Legal identifier for `id` in `lang`.
pub fn identifier(lang: Language, id: &str) -> Cow<'_, str> {
    match lang {
        Language::Verilog | Language::SystemVerilog => verilog_identifier(id),
        Language::Vhdl => vhdl_identifier(id),
    }
}
