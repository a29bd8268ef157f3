//! Shared helpers for the integration tests.
//!
//! [`FullIndex`] is an eager decoder written independently of the crate's cursor and views.
//! It materializes every class up front and is used as the oracle the lazy decoder is
//! compared against. [`fixture`] produces deterministic, well-formed indices of any size.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use annodex::{ClassBuilder, IndexBuilder, MemberBuilder};

const MAGIC: u32 = 0xBABE_1F15;
const ROOT_SENTINEL: u32 = 0xFFFF_FFFF;
const ROOT_NAME: &str = "java.lang.Object";

/// One fully materialized class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullClass {
    pub name: String,
    pub super_name: String,
    pub flags: u16,
    pub interfaces: Vec<String>,
    pub fields: Vec<(String, u16)>,
    pub methods: Vec<(String, u16)>,
    pub class_annotations: HashSet<String>,
    pub field_annotations: HashSet<String>,
    pub method_annotations: HashSet<String>,
}

/// Eagerly decoded index.
#[derive(Debug)]
pub struct FullIndex {
    pub classes: Vec<FullClass>,
    by_name: HashMap<String, usize>,
}

struct Reader<'a> {
    data: &'a [u8],
}

impl Reader<'_> {
    fn bytes(&self, offset: usize, len: usize) -> Result<&[u8], String> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| format!("{len} bytes at {offset} exceed the buffer"))
    }

    fn u16(&self, offset: usize) -> Result<u16, String> {
        let bytes = self.bytes(offset, 2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&self, offset: usize) -> Result<u32, String> {
        let bytes = self.bytes(offset, 4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn varint(&self, offset: &mut usize) -> Result<u32, String> {
        let mut value = 0u64;
        for shift in (0..35).step_by(7) {
            let byte = *self.data.get(*offset).ok_or("varint past the end")?;
            *offset += 1;
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return u32::try_from(value).map_err(|_| "varint overflow".to_string());
            }
        }
        Err("varint too long".to_string())
    }
}

impl FullIndex {
    /// Decodes everything, failing on any defect anywhere in the buffer.
    pub fn decode(data: &[u8]) -> Result<FullIndex, String> {
        let reader = Reader { data };

        if reader.u32(0)? != MAGIC {
            return Err("bad magic".to_string());
        }
        if reader.u16(4)? != 1 {
            return Err("bad version".to_string());
        }
        let class_count = reader.u32(6)? as usize;

        let mut offset = 10;
        let pool_len = reader.u32(offset)? as usize;
        offset += 4;

        let mut pool = Vec::new();
        for _ in 0..pool_len {
            let len = reader.varint(&mut offset)? as usize;
            let bytes = reader.bytes(offset, len)?;
            pool.push(String::from_utf8(bytes.to_vec()).map_err(|e| e.to_string())?);
            offset += len;
        }

        let name = |id: u32| -> Result<String, String> {
            pool.get(id as usize)
                .cloned()
                .ok_or_else(|| format!("name id {id} outside of the pool"))
        };

        let names = |region_offset: u32, count: u16| -> Result<Vec<String>, String> {
            (0..usize::from(count))
                .map(|i| name(reader.u32(region_offset as usize + i * 4)?))
                .collect()
        };

        let members = |region_offset: u32,
                       count: u16,
                       annotations: &mut HashSet<String>|
         -> Result<Vec<(String, u16)>, String> {
            let mut members = Vec::new();
            for i in 0..usize::from(count) {
                let at = region_offset as usize + i * 12;
                members.push((name(reader.u32(at)?)?, reader.u16(at + 4)?));
                annotations.extend(names(reader.u32(at + 6)?, reader.u16(at + 10)?)?);
            }
            Ok(members)
        };

        let mut classes = Vec::new();
        let mut by_name = HashMap::new();
        for rid in 0..class_count {
            let at = offset + rid * 34;
            let super_id = reader.u32(at + 4)?;

            let mut field_annotations = HashSet::new();
            let mut method_annotations = HashSet::new();
            let class = FullClass {
                name: name(reader.u32(at)?)?,
                super_name: if super_id == ROOT_SENTINEL {
                    ROOT_NAME.to_string()
                } else {
                    name(super_id)?
                },
                flags: reader.u16(at + 8)?,
                interfaces: names(reader.u32(at + 10)?, reader.u16(at + 14)?)?,
                fields: members(reader.u32(at + 16)?, reader.u16(at + 20)?, &mut field_annotations)?,
                methods: members(reader.u32(at + 22)?, reader.u16(at + 26)?, &mut method_annotations)?,
                class_annotations: names(reader.u32(at + 28)?, reader.u16(at + 32)?)?
                    .into_iter()
                    .collect(),
                field_annotations,
                method_annotations,
            };

            if by_name.insert(class.name.clone(), rid).is_some() {
                return Err(format!("duplicate class {}", class.name));
            }
            classes.push(class);
        }

        Ok(FullIndex { classes, by_name })
    }

    pub fn class_by_name(&self, name: &str) -> Option<&FullClass> {
        self.by_name.get(name).map(|rid| &self.classes[*rid])
    }
}

/// Deterministic xorshift generator so fixtures are reproducible without a rand dependency.
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        XorShift(seed.max(1))
    }

    pub fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    pub fn below(&mut self, bound: usize) -> usize {
        (self.next() % bound as u64) as usize
    }
}

const PACKAGES: &[&str] = &["com.acme", "com.acme.util", "org.sample.core", "net.demo"];

const INTERFACES: &[&str] = &[
    "java.io.Serializable",
    "java.lang.Runnable",
    "java.lang.Comparable",
    "java.lang.AutoCloseable",
    "java.util.function.Supplier",
];

const ANNOTATIONS: &[&str] = &[
    "javax.inject.Singleton",
    "javax.inject.Inject",
    "java.lang.Deprecated",
    "java.lang.Override",
    "com.acme.Entity",
    "com.acme.Key",
];

/// Builds a well-formed index of `class_count` pseudo-random classes.
pub fn fixture(seed: u64, class_count: usize) -> Vec<u8> {
    let mut rng = XorShift::new(seed);
    let mut builder = IndexBuilder::new();
    let mut names: Vec<String> = Vec::new();

    for i in 0..class_count {
        let name = format!("{}.Class{}", PACKAGES[rng.below(PACKAGES.len())], i);
        let mut class = ClassBuilder::new(name.as_str()).flags(rng.next() as u16);

        if !names.is_empty() && rng.below(3) != 0 {
            class = class.super_name(names[rng.below(names.len())].as_str());
        }

        for _ in 0..rng.below(4) {
            class = class.interface(INTERFACES[rng.below(INTERFACES.len())]);
        }

        for f in 0..rng.below(5) {
            let mut field = MemberBuilder::new(format!("field{f}"), rng.next() as u16);
            for _ in 0..rng.below(3) {
                field = field.annotation(ANNOTATIONS[rng.below(ANNOTATIONS.len())]);
            }
            class = class.field(field);
        }

        for m in 0..rng.below(6) {
            let mut method = MemberBuilder::new(format!("method{m}"), rng.next() as u16);
            for _ in 0..rng.below(3) {
                method = method.annotation(ANNOTATIONS[rng.below(ANNOTATIONS.len())]);
            }
            class = class.method(method);
        }

        for _ in 0..rng.below(3) {
            class = class.annotation(ANNOTATIONS[rng.below(ANNOTATIONS.len())]);
        }

        builder.add_class(class);
        names.push(name);
    }

    builder
        .build()
        .expect("generated fixture must serialize")
}

/// A single public class `com.acme.Foo` implementing two interfaces, with two unannotated
/// fields and one method annotated `com.acme.Deprecated`.
pub fn single_foo() -> Vec<u8> {
    let mut builder = IndexBuilder::new();
    builder.add_class(
        ClassBuilder::new("com.acme.Foo")
            .flags(0x0021)
            .interface("java.io.Serializable")
            .interface("java.lang.Runnable")
            .field(MemberBuilder::new("id", 0x0002))
            .field(MemberBuilder::new("label", 0x0002))
            .method(MemberBuilder::new("run", 0x0001).annotation("com.acme.Deprecated")),
    );
    builder.build().expect("fixture must serialize")
}

/// `com.acme.Foo` with a deprecated method and a class annotation, plus a plain subclass of it.
pub fn acme() -> Vec<u8> {
    let mut builder = IndexBuilder::new();
    builder
        .add_class(
            ClassBuilder::new("com.acme.Foo")
                .flags(0x0021)
                .interface("java.io.Serializable")
                .interface("java.lang.Runnable")
                .field(MemberBuilder::new("state", 0x0002))
                .method(MemberBuilder::new("run", 0x0001))
                .method(MemberBuilder::new("legacy", 0x0001).annotation("java.lang.Deprecated"))
                .annotation("javax.inject.Singleton"),
        )
        .add_class(ClassBuilder::new("com.acme.Bar").super_name("com.acme.Foo"));
    builder.build().expect("fixture must serialize")
}
