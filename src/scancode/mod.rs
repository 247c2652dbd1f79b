//! Scancode set 2 lookup tables.
//!
//! A table maps a payload byte (0x00..=0x8F), optionally preceded by the
//! 0xE0 extended prefix, to a key identifier.  Two flavours exist with
//! the identical lookup contract:
//!
//! - [`SET2_KEYCODES`]: direct HID keycodes (layout-free).
//! - [`SET2_NAMES`]: printed key names, resolved through a layout.
//!
//! Both are checked against each other at startup by [`validate`].

mod set2_hid;
mod set2_names;

pub use set2_hid::SET2_KEYCODES;
pub use set2_names::SET2_NAMES;

use crate::hid::KeyId;

/// Number of entries in the dense (non-extended) table: codes 0x00..=0x8F.
pub const SCANCODE_TABLE_LEN: usize = 0x90;

/// Printed name of a key, e.g. `"a"`, `"F7"`, `"PGUP"`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyName(pub &'static str);

/// Immutable scancode → key identifier mapping.
pub struct ScancodeTable<K: 'static> {
    codes: [Option<K>; SCANCODE_TABLE_LEN],
    extended: &'static [(u8, K)],
}

impl<K: Copy> ScancodeTable<K> {
    pub const fn new(codes: [Option<K>; SCANCODE_TABLE_LEN], extended: &'static [(u8, K)]) -> Self {
        Self { codes, extended }
    }

    /// Key for `code`, consulting the sparse table when `extended`.
    pub fn lookup(&self, code: u8, extended: bool) -> Option<K> {
        if extended {
            self.extended
                .iter()
                .find_map(|&(c, key)| (c == code).then_some(key))
        } else {
            self.codes.get(usize::from(code)).copied().flatten()
        }
    }

    pub fn is_mapped(&self, code: u8, extended: bool) -> bool {
        self.lookup(code, extended).is_some()
    }

    /// Iterate over every mapped `(code, extended)` pair.
    pub fn mapped(&self) -> impl Iterator<Item = (u8, bool)> + '_ {
        let base = self
            .codes
            .iter()
            .enumerate()
            .filter(|(_, key)| key.is_some())
            .map(|(code, _)| (code as u8, false));
        let ext = self.extended.iter().map(|&(code, _)| (code, true));
        base.chain(ext)
    }

    /// First scancode mapped by exactly one of the two tables.
    pub fn first_mismatch<J: Copy>(&self, other: &ScancodeTable<J>) -> Option<(u8, bool)> {
        self.mapped()
            .find(|&(code, ext)| !other.is_mapped(code, ext))
            .or_else(|| {
                other
                    .mapped()
                    .find(|&(code, ext)| !self.is_mapped(code, ext))
            })
    }
}

/// A table entry that fails startup validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TableFault {
    /// The two table flavours disagree on whether this code is mapped.
    Coverage { code: u8, extended: bool },
    /// A mapped key cannot be turned into host keycodes.
    Unresolvable { code: u8, extended: bool },
}

/// Check both table flavours for completeness against each other and
/// make sure every mapped key resolves to a HID chord.
pub fn validate() -> Result<(), TableFault> {
    if let Some((code, extended)) = SET2_KEYCODES.first_mismatch(&SET2_NAMES) {
        return Err(TableFault::Coverage { code, extended });
    }
    check_resolvable(&SET2_KEYCODES)?;
    check_resolvable(&SET2_NAMES)
}

fn check_resolvable<K: KeyId>(table: &ScancodeTable<K>) -> Result<(), TableFault> {
    for (code, extended) in table.mapped() {
        let resolves = table.lookup(code, extended).and_then(KeyId::chord).is_some();
        if !resolves {
            return Err(TableFault::Unresolvable { code, extended });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::keycode;

    #[test]
    fn tables_pass_startup_validation() {
        assert_eq!(validate(), Ok(()));
    }

    #[test]
    fn base_lookup() {
        assert_eq!(SET2_KEYCODES.lookup(0x1C, false), Some(keycode::A));
        assert_eq!(SET2_NAMES.lookup(0x1C, false), Some(KeyName("a")));
        assert_eq!(SET2_KEYCODES.lookup(0x83, false), Some(keycode::F7));
        assert_eq!(SET2_NAMES.lookup(0x5A, false), Some(KeyName("ENTER")));
    }

    #[test]
    fn unmapped_codes_are_none() {
        assert_eq!(SET2_KEYCODES.lookup(0x00, false), None);
        assert_eq!(SET2_KEYCODES.lookup(0x8F, false), None);
        assert_eq!(SET2_NAMES.lookup(0x8F, false), None);
        // Out of the dense range entirely.
        assert_eq!(SET2_KEYCODES.lookup(0x90, false), None);
        assert_eq!(SET2_KEYCODES.lookup(0xFF, false), None);
    }

    #[test]
    fn extended_lookup_ignores_base_table() {
        // 0x75 is keypad 8 in the base table, Up Arrow when extended.
        assert_eq!(SET2_KEYCODES.lookup(0x75, false), Some(keycode::KEYPAD_EIGHT));
        assert_eq!(SET2_KEYCODES.lookup(0x75, true), Some(keycode::UP_ARROW));
        assert_eq!(SET2_NAMES.lookup(0x75, true), Some(KeyName("UP")));

        // 0x1C is 'a' in the base table but has no extended meaning.
        assert_eq!(SET2_KEYCODES.lookup(0x1C, true), None);
    }

    #[test]
    fn extended_right_modifiers() {
        assert_eq!(SET2_KEYCODES.lookup(0x14, true), Some(keycode::RIGHT_CONTROL));
        assert_eq!(SET2_KEYCODES.lookup(0x11, true), Some(keycode::RIGHT_ALT));
        assert_eq!(SET2_KEYCODES.lookup(0x14, false), Some(keycode::LEFT_CONTROL));
    }

    #[test]
    fn tables_map_the_same_codes() {
        assert_eq!(SET2_KEYCODES.first_mismatch(&SET2_NAMES), None);
        assert_eq!(SET2_KEYCODES.mapped().count(), SET2_NAMES.mapped().count());
        assert_eq!(SET2_KEYCODES.mapped().filter(|&(_, ext)| ext).count(), 19);
    }

    #[test]
    fn mismatch_is_reported() {
        static SPARSE: ScancodeTable<u8> =
            ScancodeTable::new([None; SCANCODE_TABLE_LEN], &[(0x75, 1)]);
        // SET2_KEYCODES maps 0x01 (F9); SPARSE does not.
        assert_eq!(SPARSE.first_mismatch(&SET2_KEYCODES), Some((0x01, false)));
        assert_eq!(SET2_KEYCODES.first_mismatch(&SPARSE), Some((0x01, false)));
    }
}
