//! Class access flags.
//!
//! [`crate::SparseClassInfo::flags`] returns the raw 16-bit value exactly as stored; this
//! module provides a typed view of it for callers that want to test individual bits.

use bitflags::bitflags;

/// The name the sentinel super class id resolves to.
pub const ROOT_CLASS_NAME: &str = "java.lang.Object";

/// Reserved `superNameId` value marking a class without a superclass.
pub const ROOT_SUPER_SENTINEL: u32 = 0xFFFF_FFFF;

bitflags! {
    /// Access and property flags of a compiled class.
    ///
    /// Unknown bits are retained, so converting back with [`ClassModifiers::bits`] always
    /// yields the original raw value.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ClassModifiers: u16 {
        /// Declared public; may be accessed from outside its package
        const PUBLIC = 0x0001;
        /// Declared final; no subclasses allowed
        const FINAL = 0x0010;
        /// Treat superclass methods specially when invoked by invokespecial
        const SUPER = 0x0020;
        /// Is an interface, not a class
        const INTERFACE = 0x0200;
        /// Declared abstract; must not be instantiated
        const ABSTRACT = 0x0400;
        /// Declared synthetic; not present in the source code
        const SYNTHETIC = 0x1000;
        /// Declared as an annotation interface
        const ANNOTATION = 0x2000;
        /// Declared as an enum class
        const ENUM = 0x4000;
        /// Is a module, not a class or interface
        const MODULE = 0x8000;
    }
}

impl ClassModifiers {
    /// Wraps a raw flags value, keeping bits without a named constant.
    #[must_use]
    pub fn from_raw(flags: u16) -> Self {
        Self::from_bits_retain(flags)
    }
}
