pub mod styles;

pub use styles::*;

pub fn warn(mesg: &str) {
    eprintln!("{}", mesg.warn());
}

/// Formats a value the way the dumps show raw fields, e.g. "64(0x40)".
pub fn dec_hex(value: impl Into<u64>) -> String {
    let value = value.into();
    format!("{value}(0x{value:x})")
}

/// Remove escape sequences from the string (e.g. for colors).
#[cfg(test)]
pub fn strip_escapes(s: &str) -> String {
    // Note that escape sequences can be fairly gnarly, e.g. for RGB colors.
    // See https://gist.github.com/fnky/458719343aabd01cfb17a3a4f7296797
    let mut result = String::with_capacity(s.len());
    let mut escaping = false;
    for c in s.chars() {
        if c == '\x1b' {
            escaping = true;
        } else if escaping {
            if c == 'm' {
                escaping = false;
            }
        } else {
            result.push(c);
        }
    }
    result
}
