// EVM-flavored dialect: the builtin function table consulted by the
// analyzer and the optimizer steps.

use indexmap::IndexMap;

/// Side-effect classification of a builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effects {
    /// No observable effect; calls may be folded, moved or dropped.
    Pure,
    /// Reads execution state (memory, storage, environment).
    Reads,
    /// Writes execution state.
    Writes,
    /// Ends execution of the surrounding code unconditionally.
    Terminating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinFunction {
    pub name: &'static str,
    pub parameters: usize,
    pub returns: usize,
    pub effects: Effects,
    /// First argument must be a literal string naming an object member
    /// (`datasize`, `dataoffset`).
    pub needs_literal_member: bool,
}

impl BuiltinFunction {
    pub fn is_movable(&self) -> bool {
        self.effects == Effects::Pure
    }

    pub fn is_terminating(&self) -> bool {
        self.effects == Effects::Terminating
    }
}

/// Dialect describing the target execution environment: which builtins
/// exist and which identifiers are off limits for user code.
#[derive(Debug, Clone)]
pub struct Dialect {
    builtins: IndexMap<&'static str, BuiltinFunction>,
}

macro_rules! builtin {
    ($table:expr, $name:literal, $params:expr, $returns:expr, $effects:expr) => {
        builtin!($table, $name, $params, $returns, $effects, false)
    };
    ($table:expr, $name:literal, $params:expr, $returns:expr, $effects:expr, $literal:expr) => {
        $table.insert(
            $name,
            BuiltinFunction {
                name: $name,
                parameters: $params,
                returns: $returns,
                effects: $effects,
                needs_literal_member: $literal,
            },
        )
    };
}

impl Dialect {
    /// Strict-assembly dialect for EVM objects.
    pub fn evm() -> Self {
        use Effects::*;
        let mut t = IndexMap::new();

        // Arithmetic and comparison
        builtin!(t, "add", 2, 1, Pure);
        builtin!(t, "sub", 2, 1, Pure);
        builtin!(t, "mul", 2, 1, Pure);
        builtin!(t, "div", 2, 1, Pure);
        builtin!(t, "sdiv", 2, 1, Pure);
        builtin!(t, "mod", 2, 1, Pure);
        builtin!(t, "smod", 2, 1, Pure);
        builtin!(t, "exp", 2, 1, Pure);
        builtin!(t, "addmod", 3, 1, Pure);
        builtin!(t, "mulmod", 3, 1, Pure);
        builtin!(t, "signextend", 2, 1, Pure);
        builtin!(t, "lt", 2, 1, Pure);
        builtin!(t, "gt", 2, 1, Pure);
        builtin!(t, "slt", 2, 1, Pure);
        builtin!(t, "sgt", 2, 1, Pure);
        builtin!(t, "eq", 2, 1, Pure);
        builtin!(t, "iszero", 1, 1, Pure);

        // Bit operations
        builtin!(t, "and", 2, 1, Pure);
        builtin!(t, "or", 2, 1, Pure);
        builtin!(t, "xor", 2, 1, Pure);
        builtin!(t, "not", 1, 1, Pure);
        builtin!(t, "byte", 2, 1, Pure);
        builtin!(t, "shl", 2, 1, Pure);
        builtin!(t, "shr", 2, 1, Pure);
        builtin!(t, "sar", 2, 1, Pure);

        // Stack
        builtin!(t, "pop", 1, 0, Pure);

        // Memory
        builtin!(t, "mload", 1, 1, Reads);
        builtin!(t, "mstore", 2, 0, Writes);
        builtin!(t, "mstore8", 2, 0, Writes);
        builtin!(t, "msize", 0, 1, Reads);
        builtin!(t, "keccak256", 2, 1, Reads);

        // Storage
        builtin!(t, "sload", 1, 1, Reads);
        builtin!(t, "sstore", 2, 0, Writes);

        // Execution environment
        builtin!(t, "address", 0, 1, Reads);
        builtin!(t, "balance", 1, 1, Reads);
        builtin!(t, "selfbalance", 0, 1, Reads);
        builtin!(t, "caller", 0, 1, Reads);
        builtin!(t, "callvalue", 0, 1, Reads);
        builtin!(t, "calldataload", 1, 1, Reads);
        builtin!(t, "calldatasize", 0, 1, Reads);
        builtin!(t, "calldatacopy", 3, 0, Writes);
        builtin!(t, "codesize", 0, 1, Reads);
        builtin!(t, "codecopy", 3, 0, Writes);
        builtin!(t, "extcodesize", 1, 1, Reads);
        builtin!(t, "origin", 0, 1, Reads);
        builtin!(t, "gasprice", 0, 1, Reads);
        builtin!(t, "coinbase", 0, 1, Reads);
        builtin!(t, "timestamp", 0, 1, Reads);
        builtin!(t, "number", 0, 1, Reads);
        builtin!(t, "gas", 0, 1, Reads);
        builtin!(t, "chainid", 0, 1, Reads);
        builtin!(t, "basefee", 0, 1, Reads);

        // Calls and logging
        builtin!(t, "call", 7, 1, Writes);
        builtin!(t, "callcode", 7, 1, Writes);
        builtin!(t, "delegatecall", 6, 1, Writes);
        builtin!(t, "staticcall", 6, 1, Writes);
        builtin!(t, "create", 3, 1, Writes);
        builtin!(t, "create2", 4, 1, Writes);
        builtin!(t, "log0", 2, 0, Writes);
        builtin!(t, "log1", 3, 0, Writes);
        builtin!(t, "log2", 4, 0, Writes);
        builtin!(t, "log3", 5, 0, Writes);
        builtin!(t, "log4", 6, 0, Writes);

        // Control flow
        builtin!(t, "stop", 0, 0, Terminating);
        builtin!(t, "return", 2, 0, Terminating);
        builtin!(t, "revert", 2, 0, Terminating);
        builtin!(t, "invalid", 0, 0, Terminating);
        builtin!(t, "selfdestruct", 1, 0, Terminating);

        // Object access
        builtin!(t, "datasize", 1, 1, Pure, true);
        builtin!(t, "dataoffset", 1, 1, Pure, true);
        builtin!(t, "datacopy", 3, 0, Writes);

        Dialect { builtins: t }
    }

    pub fn builtin(&self, name: &str) -> Option<&BuiltinFunction> {
        self.builtins.get(name)
    }

    /// Builtin names may not be shadowed by user identifiers.
    pub fn is_reserved(&self, name: &str) -> bool {
        self.builtins.contains_key(name)
    }

    pub fn builtin_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.builtins.keys().copied()
    }
}
