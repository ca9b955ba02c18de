/// Number of logical key codes, including the reserved "no key" code 0.
/// Every logical key lives in `1..MAX_KEYS`.
pub const MAX_KEYS: usize = 227;

/// First logical code of the modifier block (LShift). Keys at or above this
/// code are modifier keys and never feed the application input buffer.
pub const MODIFIERS_START: u16 = 215;

/// Sentinel of a hardware code whose backend reports no symbol.
pub const SENTINEL_IGNORED: i32 = -1;

/// Sentinel of a hardware code without an assignment.
pub const SENTINEL_UNRESOLVED: i32 = 0;
