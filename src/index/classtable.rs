//! Class table and the fixed-stride records it points into.
//!
//! The class table is a `class_count` long array of 34-byte [`ClassRecord`]s directly following
//! the name pool. A record holds the scalar facts of a class (name, superclass, flags) and four
//! [`Region`] pointers into separately stored variable-length regions:
//!
//! | Region       | Element                 | Stride |
//! |--------------|-------------------------|--------|
//! | interfaces   | [`InterfaceRecord`]     | 4      |
//! | fields       | [`MemberRecord`]        | 12     |
//! | methods      | [`MemberRecord`]        | 12     |
//! | annotations  | [`AnnotationRecord`]    | 4      |
//!
//! Member records in turn point at their own annotation region.
//!
//! Decoding the table reads the records and nothing else. The regions are bounds-checked as a
//! whole, but their elements are only read when a view asks for them, through
//! [`RegionIter`].

use std::{collections::HashMap, marker::PhantomData, sync::Arc};

use crate::{
    file::parser::Parser,
    index::{
        config::DecodeConfig,
        flags::ROOT_SUPER_SENTINEL,
        namepool::NamePool,
    },
    Error, Result,
};

/// Trait for fixed-stride records stored in a [`Region`].
pub trait RecordReadable: Sized {
    /// Encoded size of one record in bytes.
    const SIZE: usize;

    /// Reads one record at the parser's position, advancing past it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the record is cut off by the buffer end.
    fn read(parser: &mut Parser) -> Result<Self>;
}

/// An `(offset, count)` pointer to a run of fixed-stride records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Region {
    /// Absolute offset of the first record; ignored when `count` is 0
    pub offset: u32,
    /// Number of records
    pub count: u16,
}

impl Region {
    /// Reads an `offset:u32, count:u16` pair.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than six bytes remain.
    pub fn read(parser: &mut Parser) -> Result<Region> {
        Ok(Region {
            offset: parser.read_be::<u32>()?,
            count: parser.read_be::<u16>()?,
        })
    }

    /// Returns `true` if the region holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `true` if `count` records of `stride` bytes starting at `offset` lie within a
    /// buffer of `data_len` bytes. Empty regions are always in bounds.
    #[must_use]
    pub fn fits(&self, stride: usize, data_len: usize) -> bool {
        if self.count == 0 {
            return true;
        }

        let end = self.offset as usize + usize::from(self.count) * stride;
        end <= data_len
    }
}

/// One entry of an interfaces region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceRecord {
    /// Pool id of the interface name
    pub name_id: u32,
}

impl RecordReadable for InterfaceRecord {
    const SIZE: usize = 4;

    fn read(parser: &mut Parser) -> Result<Self> {
        Ok(InterfaceRecord {
            name_id: parser.read_be::<u32>()?,
        })
    }
}

/// One entry of an annotations region.
///
/// Only the annotation type is retained; which element of the owner carries it is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// Pool id of the annotation type name
    pub type_name_id: u32,
}

impl RecordReadable for AnnotationRecord {
    const SIZE: usize = 4;

    fn read(parser: &mut Parser) -> Result<Self> {
        Ok(AnnotationRecord {
            type_name_id: parser.read_be::<u32>()?,
        })
    }
}

/// One entry of a fields or methods region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRecord {
    /// Pool id of the member name
    pub name_id: u32,
    /// Raw access flags
    pub flags: u16,
    /// Annotations attached to this member
    pub annotations: Region,
}

impl RecordReadable for MemberRecord {
    #[rustfmt::skip]
    const SIZE: usize =
        /* name_id */       4 +
        /* flags */         2 +
        /* annotations */   6;

    fn read(parser: &mut Parser) -> Result<Self> {
        Ok(MemberRecord {
            name_id: parser.read_be::<u32>()?,
            flags: parser.read_be::<u16>()?,
            annotations: Region::read(parser)?,
        })
    }
}

/// The fixed-stride decoded entry describing one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassRecord {
    /// Pool id of the class name
    pub name_id: u32,
    /// Pool id of the superclass name, or [`ROOT_SUPER_SENTINEL`]
    pub super_name_id: u32,
    /// Raw access flags
    pub flags: u16,
    /// Implemented interfaces
    pub interfaces: Region,
    /// Declared fields
    pub fields: Region,
    /// Declared methods
    pub methods: Region,
    /// Class-level annotations
    pub annotations: Region,
}

impl ClassRecord {
    /// Returns `true` if the record stores the root sentinel instead of a superclass id.
    #[must_use]
    pub fn has_root_super(&self) -> bool {
        self.super_name_id == ROOT_SUPER_SENTINEL
    }

    /// The four regions in storage order, paired with their element stride.
    fn regions(&self) -> [(&'static str, Region, usize); 4] {
        [
            ("interfaces", self.interfaces, InterfaceRecord::SIZE),
            ("fields", self.fields, MemberRecord::SIZE),
            ("methods", self.methods, MemberRecord::SIZE),
            ("annotations", self.annotations, AnnotationRecord::SIZE),
        ]
    }
}

impl RecordReadable for ClassRecord {
    #[rustfmt::skip]
    const SIZE: usize =
        /* name_id */       4 +
        /* super_name_id */ 4 +
        /* flags */         2 +
        /* interfaces */    6 +
        /* fields */        6 +
        /* methods */       6 +
        /* annotations */   6;

    fn read(parser: &mut Parser) -> Result<Self> {
        Ok(ClassRecord {
            name_id: parser.read_be::<u32>()?,
            super_name_id: parser.read_be::<u32>()?,
            flags: parser.read_be::<u16>()?,
            interfaces: Region::read(parser)?,
            fields: Region::read(parser)?,
            methods: Region::read(parser)?,
            annotations: Region::read(parser)?,
        })
    }
}

/// Lazily reads the records of a [`Region`].
///
/// Iteration stops after the first error.
pub struct RegionIter<'a, T> {
    parser: Parser<'a>,
    remaining: u16,
    failed: bool,
    _phantom: PhantomData<T>,
}

impl<'a, T: RecordReadable> RegionIter<'a, T> {
    /// Positions a reader on the first record of `region`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the region does not lie within `data`.
    pub fn new(data: &'a [u8], region: Region) -> Result<Self> {
        let mut parser = Parser::new(data);

        if !region.is_empty() {
            if !region.fits(T::SIZE, data.len()) {
                return Err(Error::OutOfBounds);
            }

            parser.seek(region.offset as usize)?;
        }

        Ok(RegionIter {
            parser,
            remaining: region.count,
            failed: false,
            _phantom: PhantomData,
        })
    }
}

impl<T: RecordReadable> Iterator for RegionIter<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 || self.failed {
            return None;
        }

        self.remaining -= 1;
        let result = T::read(&mut self.parser);
        if result.is_err() {
            self.failed = true;
        }

        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = if self.failed {
            0
        } else {
            usize::from(self.remaining)
        };
        (0, Some(remaining))
    }
}

/// All class records of an index plus the name lookup built while reading them.
pub struct ClassTable {
    records: Vec<ClassRecord>,
    names: Vec<Arc<str>>,
    by_name: HashMap<Arc<str>, u32>,
}

impl ClassTable {
    /// Reads `count` class records at the parser's current position.
    ///
    /// This is the only pass over the classes performed during decode. Each record is checked
    /// for in-pool name ids and in-buffer regions, and its name is resolved to build the
    /// by-name lookup.
    ///
    /// # Arguments
    /// * `parser` - Positioned at the first record
    /// * `count` - Number of records declared by the header
    /// * `pool` - The already decoded name pool
    /// * `config` - Controls the optional deep validation of the referenced regions
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for any structural defect of the table.
    pub fn read(
        parser: &mut Parser,
        count: u32,
        pool: &NamePool,
        config: &DecodeConfig,
    ) -> Result<ClassTable> {
        let data = parser.data();
        let Some(table_size) = (count as usize).checked_mul(ClassRecord::SIZE) else {
            return Err(malformed_error!("Class count {} overflows the table size", count));
        };

        if table_size > parser.remaining() {
            return Err(malformed_error!(
                "Class table of {} records needs {} bytes, only {} remain",
                count,
                table_size,
                parser.remaining()
            ));
        }

        let mut records = Vec::with_capacity(count as usize);
        let mut names = Vec::with_capacity(count as usize);
        let mut by_name = HashMap::with_capacity(count as usize);

        for rid in 0..count {
            let record = ClassRecord::read(parser)?;

            if !pool.contains(record.name_id) {
                return Err(malformed_error!(
                    "Class {} references name id {} outside of the pool ({} entries)",
                    rid,
                    record.name_id,
                    pool.len()
                ));
            }

            if !record.has_root_super() && !pool.contains(record.super_name_id) {
                return Err(malformed_error!(
                    "Class {} references super name id {} outside of the pool ({} entries)",
                    rid,
                    record.super_name_id,
                    pool.len()
                ));
            }

            for (kind, region, stride) in record.regions() {
                if !region.fits(stride, data.len()) {
                    return Err(malformed_error!(
                        "Class {} {} region ({} x {} bytes at {}) exceeds the buffer",
                        rid,
                        kind,
                        region.count,
                        stride,
                        region.offset
                    ));
                }
            }

            if config.validate_members {
                Self::validate_regions(data, pool, rid, &record)?;
            }

            let name = pool.resolve(data, record.name_id)?;
            if by_name.insert(name.clone(), rid).is_some() {
                return Err(malformed_error!("Duplicate class name - {}", name));
            }

            records.push(record);
            names.push(name);
        }

        Ok(ClassTable {
            records,
            names,
            by_name,
        })
    }

    /// Number of class records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the record at the 0-based position `rid`.
    #[must_use]
    pub fn get(&self, rid: u32) -> Option<&ClassRecord> {
        self.records.get(rid as usize)
    }

    /// Returns the resolved name of the record at `rid`.
    #[must_use]
    pub fn name(&self, rid: u32) -> Option<&Arc<str>> {
        self.names.get(rid as usize)
    }

    /// Resolved names of all records, parallel to [`ClassTable::records`].
    #[must_use]
    pub fn names(&self) -> &[Arc<str>] {
        &self.names
    }

    /// Returns the position of the class named `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    /// All records in storage order.
    #[must_use]
    pub fn records(&self) -> &[ClassRecord] {
        &self.records
    }

    fn validate_regions(data: &[u8], pool: &NamePool, rid: u32, record: &ClassRecord) -> Result<()> {
        let check_id = |kind: &str, id: u32| -> Result<()> {
            if pool.contains(id) {
                Ok(())
            } else {
                Err(malformed_error!(
                    "Class {} {} entry references name id {} outside of the pool",
                    rid,
                    kind,
                    id
                ))
            }
        };

        let structural = |e: Error| e.into_structural("Class region");

        for interface in RegionIter::<InterfaceRecord>::new(data, record.interfaces).map_err(structural)? {
            check_id("interfaces", interface.map_err(structural)?.name_id)?;
        }

        for annotation in
            RegionIter::<AnnotationRecord>::new(data, record.annotations).map_err(structural)?
        {
            check_id("annotations", annotation.map_err(structural)?.type_name_id)?;
        }

        for (kind, region) in [("fields", record.fields), ("methods", record.methods)] {
            for member in RegionIter::<MemberRecord>::new(data, region).map_err(structural)? {
                let member = member.map_err(structural)?;
                check_id(kind, member.name_id)?;

                if !member.annotations.fits(AnnotationRecord::SIZE, data.len()) {
                    return Err(malformed_error!(
                        "Class {} {} entry has an annotation region outside the buffer",
                        rid,
                        kind
                    ));
                }

                for annotation in RegionIter::<AnnotationRecord>::new(data, member.annotations)
                    .map_err(structural)?
                {
                    check_id(kind, annotation.map_err(structural)?.type_name_id)?;
                }
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for ClassTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassTable")
            .field("records", &self.records.len())
            .finish()
    }
}
