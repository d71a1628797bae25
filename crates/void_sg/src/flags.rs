//! Node flags
//!
//! Flags steer validity checking during the verify traversal.

use core::fmt;

/// Bit set attached to every node
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NodeFlags(u32);

impl NodeFlags {
    /// No flags
    pub const NONE: Self = Self(0);

    /// Parent is only valid while this child is valid
    pub const REQUIRED: Self = Self(1 << 1);

    /// Value must lie inside the node's min/max range
    pub const VALID_MIN_MAX: Self = Self(1 << 2);

    /// Value must not be one of the node's blacklisted values
    pub const VALID_BLACKLIST: Self = Self(1 << 3);

    /// Value must be one of the node's whitelisted values
    pub const VALID_WHITELIST: Self = Self(1 << 4);

    const NAMES: [(NodeFlags, &'static str); 4] = [
        (Self::REQUIRED, "required"),
        (Self::VALID_MIN_MAX, "valid_min_max"),
        (Self::VALID_BLACKLIST, "valid_blacklist"),
        (Self::VALID_WHITELIST, "valid_whitelist"),
    ];

    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check if all specified flags are set
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    #[inline]
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Look up a single flag by its lowercase name (as written in scene files)
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(flag, _)| *flag)
    }
}

impl core::ops::BitOr for NodeFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl core::ops::BitOrAssign for NodeFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl core::ops::BitAnd for NodeFlags {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for NodeFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "NodeFlags({})", names.join(" | "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_ops() {
        let mut flags = NodeFlags::REQUIRED | NodeFlags::VALID_MIN_MAX;
        assert!(flags.contains(NodeFlags::REQUIRED));
        assert!(!flags.contains(NodeFlags::VALID_WHITELIST));
        flags.remove(NodeFlags::REQUIRED);
        assert!(!flags.contains(NodeFlags::REQUIRED));
        assert!(NodeFlags::NONE.is_empty());
        assert!(NodeFlags::NONE.contains(NodeFlags::NONE));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(NodeFlags::from_name("required"), Some(NodeFlags::REQUIRED));
        assert_eq!(NodeFlags::from_name("VALID_MIN_MAX"), Some(NodeFlags::VALID_MIN_MAX));
        assert_eq!(NodeFlags::from_name("gui_slider"), None);
    }

    #[test]
    fn test_debug_lists_names() {
        let flags = NodeFlags::REQUIRED | NodeFlags::VALID_BLACKLIST;
        assert_eq!(format!("{:?}", flags), "NodeFlags(required | valid_blacklist)");
    }
}
