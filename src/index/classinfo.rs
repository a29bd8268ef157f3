//! Per-class views over a [`crate::SparseIndex`].
//!
//! A [`SparseClassInfo`] is a borrowed façade over one [`crate::index::classtable::ClassRecord`].
//! Creating one allocates nothing. Scalar facts (name, flags) are answered from the record
//! directly; everything stored in a region is decoded on each call, with only the name strings
//! memoized by the pool.
//!
//! Annotation accessors return flat sets of annotation type names. Which field or method carries
//! an annotation is not recorded, only that some field or method of the class does.

use std::{collections::HashSet, sync::Arc};

use crate::{
    index::{
        classtable::{
            AnnotationRecord, ClassRecord, InterfaceRecord, MemberRecord, RecordReadable, Region,
            RegionIter,
        },
        dotname::SparseDotName,
        flags::ClassModifiers,
        SparseIndex,
    },
    Result,
};

/// A field or method, reduced to its name and raw flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SparseMemberInfo {
    name: SparseDotName,
    flags: u16,
}

impl SparseMemberInfo {
    /// The member name.
    #[must_use]
    pub fn name(&self) -> &SparseDotName {
        &self.name
    }

    /// The raw access flags, exactly as stored.
    #[must_use]
    pub fn flags(&self) -> u16 {
        self.flags
    }
}

/// A lazily decoded view of one class.
///
/// # Examples
///
/// ```rust,no_run
/// use annodex::SparseIndex;
///
/// let index = SparseIndex::from_file("classes.idx")?;
/// if let Some(class) = index.class_by_name("com.acme.Foo") {
///     println!("{} extends {}", class.name(), class.super_name()?);
///     for interface in class.interface_names()? {
///         println!("  implements {}", interface);
///     }
///     if class.method_annotations()?.contains("com.acme.Deprecated") {
///         println!("  has deprecated methods");
///     }
/// }
/// # Ok::<(), annodex::Error>(())
/// ```
#[derive(Clone, Copy)]
pub struct SparseClassInfo<'a> {
    index: &'a SparseIndex,
    rid: u32,
    record: &'a ClassRecord,
    name: &'a Arc<str>,
}

impl<'a> SparseClassInfo<'a> {
    pub(crate) fn new(
        index: &'a SparseIndex,
        rid: u32,
        record: &'a ClassRecord,
        name: &'a Arc<str>,
    ) -> Self {
        SparseClassInfo {
            index,
            rid,
            record,
            name,
        }
    }

    /// 0-based position of this class in the class table.
    #[must_use]
    pub fn rid(&self) -> u32 {
        self.rid
    }

    /// The underlying record.
    #[must_use]
    pub fn record(&self) -> &'a ClassRecord {
        self.record
    }

    /// The class name. Resolved during decode, so this never fails.
    #[must_use]
    pub fn name(&self) -> SparseDotName {
        SparseDotName::new(self.record.name_id, self.name.clone())
    }

    /// The raw access flags, exactly as stored.
    #[must_use]
    pub fn flags(&self) -> u16 {
        self.record.flags
    }

    /// The access flags as [`ClassModifiers`].
    #[must_use]
    pub fn modifiers(&self) -> ClassModifiers {
        ClassModifiers::from_raw(self.record.flags)
    }

    /// Returns `true` if the class is an interface (including annotation interfaces).
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.modifiers().contains(ClassModifiers::INTERFACE)
    }

    /// Returns `true` if the class is an annotation interface.
    #[must_use]
    pub fn is_annotation(&self) -> bool {
        self.modifiers().contains(ClassModifiers::ANNOTATION)
    }

    /// Returns `true` if the class is an enum.
    #[must_use]
    pub fn is_enum(&self) -> bool {
        self.modifiers().contains(ClassModifiers::ENUM)
    }

    /// Returns `true` if the record stores no superclass.
    ///
    /// [`SparseClassInfo::super_name`] still answers with the root class name in that case.
    #[must_use]
    pub fn has_root_super(&self) -> bool {
        self.record.has_root_super()
    }

    /// The superclass name.
    ///
    /// A class stored without a superclass reports the root class,
    /// [`crate::index::flags::ROOT_CLASS_NAME`], never an absent value.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the name is not valid UTF-8.
    pub fn super_name(&self) -> Result<SparseDotName> {
        if self.record.has_root_super() {
            return Ok(self.index.root_name());
        }

        self.index.resolve_name(self.record.super_name_id)
    }

    /// Number of implemented interfaces, read from the record without decoding the region.
    #[must_use]
    pub fn interface_count(&self) -> usize {
        usize::from(self.record.interfaces.count)
    }

    /// Number of declared fields.
    #[must_use]
    pub fn field_count(&self) -> usize {
        usize::from(self.record.fields.count)
    }

    /// Number of declared methods.
    #[must_use]
    pub fn method_count(&self) -> usize {
        usize::from(self.record.methods.count)
    }

    /// Names of the directly implemented interfaces, in stored order.
    ///
    /// The result always has exactly [`SparseClassInfo::interface_count`] entries.
    ///
    /// # Errors
    /// Returns [`crate::Error::NameResolution`] if the region references an id outside the
    /// name pool.
    pub fn interface_names(&self) -> Result<Vec<SparseDotName>> {
        let mut names = Vec::with_capacity(self.interface_count());
        for interface in self.region::<InterfaceRecord>(self.record.interfaces)? {
            names.push(self.index.resolve_name(interface?.name_id)?);
        }

        Ok(names)
    }

    /// Declared fields, in stored order.
    ///
    /// # Errors
    /// Returns [`crate::Error::NameResolution`] if a field name id is outside the name pool.
    pub fn fields(&self) -> Result<Vec<SparseMemberInfo>> {
        self.members(self.record.fields)
    }

    /// Declared methods, in stored order.
    ///
    /// # Errors
    /// Returns [`crate::Error::NameResolution`] if a method name id is outside the name pool.
    pub fn methods(&self) -> Result<Vec<SparseMemberInfo>> {
        self.members(self.record.methods)
    }

    /// Annotation types applied to the class itself.
    ///
    /// # Errors
    /// Returns [`crate::Error::NameResolution`] if the region references an id outside the
    /// name pool.
    pub fn class_annotations(&self) -> Result<HashSet<SparseDotName>> {
        let mut annotations = HashSet::with_capacity(usize::from(self.record.annotations.count));
        self.collect_annotations(self.record.annotations, &mut annotations)?;
        Ok(annotations)
    }

    /// Annotation types applied to any field of the class.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if a field's annotation region lies outside the
    /// buffer, or [`crate::Error::NameResolution`] for an id outside the name pool.
    pub fn field_annotations(&self) -> Result<HashSet<SparseDotName>> {
        self.member_annotations(self.record.fields)
    }

    /// Annotation types applied to any method of the class.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if a method's annotation region lies outside the
    /// buffer, or [`crate::Error::NameResolution`] for an id outside the name pool.
    pub fn method_annotations(&self) -> Result<HashSet<SparseDotName>> {
        self.member_annotations(self.record.methods)
    }

    /// Returns `true` if the class itself carries the annotation `name`.
    ///
    /// # Errors
    /// Returns [`crate::Error::NameResolution`] if the region references an id outside the
    /// name pool.
    pub fn has_annotation(&self, name: &str) -> Result<bool> {
        for annotation in self.region::<AnnotationRecord>(self.record.annotations)? {
            if self.index.resolve_name(annotation?.type_name_id)? == name {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn region<T: RecordReadable>(&self, region: Region) -> Result<RegionIter<'a, T>> {
        RegionIter::new(self.index.data(), region)
    }

    fn members(&self, region: Region) -> Result<Vec<SparseMemberInfo>> {
        let mut members = Vec::with_capacity(usize::from(region.count));
        for member in self.region::<MemberRecord>(region)? {
            let member = member?;
            members.push(SparseMemberInfo {
                name: self.index.resolve_name(member.name_id)?,
                flags: member.flags,
            });
        }

        Ok(members)
    }

    fn member_annotations(&self, region: Region) -> Result<HashSet<SparseDotName>> {
        let mut annotations = HashSet::new();
        for member in self.region::<MemberRecord>(region)? {
            self.collect_annotations(member?.annotations, &mut annotations)?;
        }

        Ok(annotations)
    }

    fn collect_annotations(
        &self,
        region: Region,
        into: &mut HashSet<SparseDotName>,
    ) -> Result<()> {
        for annotation in self.region::<AnnotationRecord>(region)? {
            into.insert(self.index.resolve_name(annotation?.type_name_id)?);
        }

        Ok(())
    }
}

impl std::fmt::Debug for SparseClassInfo<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseClassInfo")
            .field("rid", &self.rid)
            .field("name", &&**self.name)
            .field("flags", &format_args!("0x{:04X}", self.record.flags))
            .finish()
    }
}
