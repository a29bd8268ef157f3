//! Serializer producing version 1 indices.
//!
//! The builders collect a class model and lay it out in the binary format the decoder reads:
//! header, name pool, class table, then the variable-length regions. Every distinct name is
//! interned into the pool exactly once, in first-use order.
//!
//! # Examples
//!
//! ```rust
//! use annodex::{ClassBuilder, IndexBuilder, MemberBuilder, SparseIndex};
//!
//! let mut builder = IndexBuilder::new();
//! builder.add_class(
//!     ClassBuilder::new("com.acme.Foo")
//!         .flags(0x0021)
//!         .interface("java.io.Serializable")
//!         .field(MemberBuilder::new("count", 0x0002))
//!         .method(MemberBuilder::new("run", 0x0001).annotation("com.acme.Deprecated")),
//! );
//!
//! let index = SparseIndex::from_mem(builder.build()?)?;
//! let foo = index.class_by_name("com.acme.Foo").unwrap();
//! assert!(foo.method_annotations()?.contains("com.acme.Deprecated"));
//! # Ok::<(), annodex::Error>(())
//! ```

use std::collections::{HashMap, HashSet};

use crate::{
    file::io::{packed_u32_size, write_be_at, write_packed_u32_at},
    index::{
        classtable::{AnnotationRecord, ClassRecord, InterfaceRecord, MemberRecord, RecordReadable},
        flags::ROOT_SUPER_SENTINEL,
        header::{HEADER_SIZE, INDEX_MAGIC, INDEX_VERSION},
    },
    Result,
};

/// A field or method to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberBuilder {
    name: String,
    flags: u16,
    annotations: Vec<String>,
}

impl MemberBuilder {
    /// Creates a member with the given name and raw access flags.
    #[must_use]
    pub fn new(name: impl Into<String>, flags: u16) -> Self {
        MemberBuilder {
            name: name.into(),
            flags,
            annotations: Vec::new(),
        }
    }

    /// Attaches an annotation type to the member.
    #[must_use]
    pub fn annotation(mut self, type_name: impl Into<String>) -> Self {
        self.annotations.push(type_name.into());
        self
    }
}

/// A class to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassBuilder {
    name: String,
    super_name: Option<String>,
    flags: u16,
    interfaces: Vec<String>,
    fields: Vec<MemberBuilder>,
    methods: Vec<MemberBuilder>,
    annotations: Vec<String>,
}

impl ClassBuilder {
    /// Creates a class without superclass, flags, members or annotations.
    ///
    /// A class without an explicit superclass is written with the root sentinel.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        ClassBuilder {
            name: name.into(),
            super_name: None,
            flags: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            annotations: Vec::new(),
        }
    }

    /// Sets the superclass name.
    #[must_use]
    pub fn super_name(mut self, name: impl Into<String>) -> Self {
        self.super_name = Some(name.into());
        self
    }

    /// Sets the raw access flags.
    #[must_use]
    pub fn flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    /// Adds an implemented interface.
    #[must_use]
    pub fn interface(mut self, name: impl Into<String>) -> Self {
        self.interfaces.push(name.into());
        self
    }

    /// Adds a declared field.
    #[must_use]
    pub fn field(mut self, field: MemberBuilder) -> Self {
        self.fields.push(field);
        self
    }

    /// Adds a declared method.
    #[must_use]
    pub fn method(mut self, method: MemberBuilder) -> Self {
        self.methods.push(method);
        self
    }

    /// Attaches a class-level annotation type.
    #[must_use]
    pub fn annotation(mut self, type_name: impl Into<String>) -> Self {
        self.annotations.push(type_name.into());
        self
    }
}

/// Collects classes and serializes them into an index.
#[derive(Debug, Clone, Default)]
pub struct IndexBuilder {
    classes: Vec<ClassBuilder>,
}

/// Name interning in first-use order.
#[derive(Default)]
struct PoolBuilder<'a> {
    names: Vec<&'a str>,
    ids: HashMap<&'a str, u32>,
}

impl<'a> PoolBuilder<'a> {
    fn intern(&mut self, name: &'a str) -> Result<u32> {
        if let Some(id) = self.ids.get(name) {
            return Ok(*id);
        }

        let Ok(id) = u32::try_from(self.names.len()) else {
            return Err(malformed_error!("Name pool exceeds u32 entries"));
        };

        if id == ROOT_SUPER_SENTINEL {
            return Err(malformed_error!("Name pool collides with the root sentinel"));
        }

        self.names.push(name);
        self.ids.insert(name, id);
        Ok(id)
    }

    fn id(&self, name: &str) -> Result<u32> {
        match self.ids.get(name) {
            Some(id) => Ok(*id),
            None => Err(malformed_error!("Name was not interned - {}", name)),
        }
    }

    fn encoded_size(&self) -> Result<usize> {
        let mut size = 4;
        for name in &self.names {
            size += packed_u32_size(encode_len(name.len())?) + name.len();
        }
        Ok(size)
    }
}

impl IndexBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a class. Classes are written in insertion order.
    pub fn add_class(&mut self, class: ClassBuilder) -> &mut Self {
        self.classes.push(class);
        self
    }

    /// Number of classes added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no class has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Serializes all classes into a version 1 index.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if two classes share a name or the model exceeds a
    /// limit of the format (more than 65535 entries in one region, offsets beyond 4 GiB).
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut seen = HashSet::with_capacity(self.classes.len());
        let mut pool = PoolBuilder::default();

        for class in &self.classes {
            if !seen.insert(class.name.as_str()) {
                return Err(malformed_error!("Duplicate class name - {}", class.name));
            }

            pool.intern(&class.name)?;
            if let Some(super_name) = &class.super_name {
                pool.intern(super_name)?;
            }
            for name in class.interfaces.iter().chain(&class.annotations) {
                pool.intern(name)?;
            }
            for member in class.fields.iter().chain(&class.methods) {
                pool.intern(&member.name)?;
                for annotation in &member.annotations {
                    pool.intern(annotation)?;
                }
            }
        }

        let Ok(class_count) = u32::try_from(self.classes.len()) else {
            return Err(malformed_error!("Too many classes - {}", self.classes.len()));
        };

        let table_offset = HEADER_SIZE + pool.encoded_size()?;
        let mut out = vec![0u8; table_offset + self.classes.len() * ClassRecord::SIZE];

        let mut offset = 0;
        write_be_at(&mut out, &mut offset, INDEX_MAGIC)?;
        write_be_at(&mut out, &mut offset, INDEX_VERSION)?;
        write_be_at(&mut out, &mut offset, class_count)?;

        write_be_at(&mut out, &mut offset, encode_len(pool.names.len())?)?;
        for name in &pool.names {
            write_packed_u32_at(&mut out, &mut offset, encode_len(name.len())?)?;
            out[offset..offset + name.len()].copy_from_slice(name.as_bytes());
            offset += name.len();
        }

        for (rid, class) in self.classes.iter().enumerate() {
            let interfaces = append_names::<InterfaceRecord>(&mut out, &pool, &class.interfaces)?;
            let fields = append_members(&mut out, &pool, &class.fields)?;
            let methods = append_members(&mut out, &pool, &class.methods)?;
            let annotations =
                append_names::<AnnotationRecord>(&mut out, &pool, &class.annotations)?;

            let super_name_id = match &class.super_name {
                Some(name) => pool.id(name)?,
                None => ROOT_SUPER_SENTINEL,
            };

            let mut offset = table_offset + rid * ClassRecord::SIZE;
            write_be_at(&mut out, &mut offset, pool.id(&class.name)?)?;
            write_be_at(&mut out, &mut offset, super_name_id)?;
            write_be_at(&mut out, &mut offset, class.flags)?;
            for (region_offset, count) in [interfaces, fields, methods, annotations] {
                write_be_at(&mut out, &mut offset, region_offset)?;
                write_be_at(&mut out, &mut offset, count)?;
            }
        }

        Ok(out)
    }
}

fn encode_len(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| malformed_error!("Length {} exceeds u32", len))
}

/// Reserves `count` records of `T` at the end of `out`, returning the region pointer.
fn reserve<T: RecordReadable>(out: &mut Vec<u8>, count: usize) -> Result<(u32, u16)> {
    let Ok(count) = u16::try_from(count) else {
        return Err(malformed_error!("Region of {} entries exceeds u16", count));
    };

    if count == 0 {
        return Ok((0, 0));
    }

    let Ok(offset) = u32::try_from(out.len()) else {
        return Err(malformed_error!("Region offset {} exceeds u32", out.len()));
    };

    out.resize(out.len() + usize::from(count) * T::SIZE, 0);
    Ok((offset, count))
}

fn append_names<T: RecordReadable>(
    out: &mut Vec<u8>,
    pool: &PoolBuilder,
    names: &[String],
) -> Result<(u32, u16)> {
    let (region_offset, count) = reserve::<T>(out, names.len())?;

    let mut offset = region_offset as usize;
    for name in names {
        write_be_at(out, &mut offset, pool.id(name)?)?;
    }

    Ok((region_offset, count))
}

fn append_members(
    out: &mut Vec<u8>,
    pool: &PoolBuilder,
    members: &[MemberBuilder],
) -> Result<(u32, u16)> {
    let (region_offset, count) = reserve::<MemberRecord>(out, members.len())?;

    for (index, member) in members.iter().enumerate() {
        let (anno_offset, anno_count) =
            append_names::<AnnotationRecord>(out, pool, &member.annotations)?;

        let mut offset = region_offset as usize + index * MemberRecord::SIZE;
        write_be_at(out, &mut offset, pool.id(&member.name)?)?;
        write_be_at(out, &mut offset, member.flags)?;
        write_be_at(out, &mut offset, anno_offset)?;
        write_be_at(out, &mut offset, anno_count)?;
    }

    Ok((region_offset, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{file::parser::Parser, index::header::IndexHeader, Error};

    #[test]
    fn empty_index() {
        let bytes = IndexBuilder::new().build().unwrap();

        assert_eq!(
            bytes,
            vec![
                0xBA, 0xBE, 0x1F, 0x15, // magic
                0x00, 0x01, // version
                0x00, 0x00, 0x00, 0x00, // class_count
                0x00, 0x00, 0x00, 0x00, // pool_length
            ]
        );
    }

    #[test]
    fn single_class_layout() {
        let mut builder = IndexBuilder::new();
        builder.add_class(
            ClassBuilder::new("a.A")
                .flags(0x0021)
                .interface("b.B")
                .annotation("c.C"),
        );
        let bytes = builder.build().unwrap();

        let mut parser = Parser::new(&bytes);
        let header = IndexHeader::read(&mut parser).unwrap();
        assert_eq!(header.class_count, 1);

        // pool: a.A, b.B, c.C
        assert_eq!(parser.read_be::<u32>().unwrap(), 3);
        for expected in ["a.A", "b.B", "c.C"] {
            assert_eq!(parser.read_prefixed_string_utf8().unwrap(), expected);
        }

        let record = ClassRecord::read(&mut parser).unwrap();
        assert_eq!(record.name_id, 0);
        assert!(record.has_root_super());
        assert_eq!(record.flags, 0x0021);
        assert_eq!(record.interfaces.count, 1);
        assert_eq!(record.interfaces.offset as usize, parser.pos());
        assert!(record.fields.is_empty());
        assert!(record.methods.is_empty());
        assert_eq!(record.annotations.count, 1);
        assert_eq!(record.annotations.offset as usize, parser.pos() + 4);
        assert_eq!(bytes.len(), parser.pos() + 8);
    }

    #[test]
    fn names_interned_once() {
        let mut builder = IndexBuilder::new();
        builder
            .add_class(ClassBuilder::new("a.A").interface("java.io.Serializable"))
            .add_class(
                ClassBuilder::new("a.B")
                    .super_name("a.A")
                    .interface("java.io.Serializable"),
            );
        let bytes = builder.build().unwrap();

        let mut parser = Parser::new(&bytes);
        IndexHeader::read(&mut parser).unwrap();
        assert_eq!(parser.read_be::<u32>().unwrap(), 3);
    }

    #[test]
    fn pool_lookup_requires_interning() {
        let mut pool = PoolBuilder::default();
        assert_eq!(pool.intern("a.A").unwrap(), 0);
        assert_eq!(pool.intern("b.B").unwrap(), 1);
        assert_eq!(pool.intern("a.A").unwrap(), 0);

        assert_eq!(pool.id("b.B").unwrap(), 1);
        assert!(matches!(pool.id("c.C"), Err(Error::Malformed { .. })));

        let mut out = Vec::new();
        let result = append_names::<InterfaceRecord>(&mut out, &pool, &["c.C".to_string()]);
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn duplicate_class() {
        let mut builder = IndexBuilder::new();
        builder
            .add_class(ClassBuilder::new("a.A"))
            .add_class(ClassBuilder::new("a.A").flags(1));

        assert_eq!(builder.len(), 2);
        assert!(matches!(builder.build(), Err(Error::Malformed { .. })));
    }

    #[test]
    fn region_limit() {
        let mut class = ClassBuilder::new("a.A");
        for i in 0..=u16::MAX as usize {
            class = class.interface(format!("i.I{i}"));
        }

        let mut builder = IndexBuilder::new();
        builder.add_class(class);
        assert!(matches!(builder.build(), Err(Error::Malformed { .. })));
    }
}
