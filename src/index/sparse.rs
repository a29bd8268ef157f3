//! The lazily decoded annotation index.
//!
//! [`SparseIndex`] is the entry point of the crate. Decoding validates the header, records the
//! name pool spans and makes a single pass over the class table; nothing else is read until a
//! query asks for it. All later work happens through borrowed [`SparseClassInfo`] views.

use std::{path::Path, sync::Arc};

use rayon::prelude::*;

use crate::{
    file::{parser::Parser, File},
    index::{
        classinfo::SparseClassInfo,
        classtable::ClassTable,
        config::DecodeConfig,
        dotname::SparseDotName,
        flags::{ROOT_CLASS_NAME, ROOT_SUPER_SENTINEL},
        header::IndexHeader,
        namepool::NamePool,
    },
    Result,
};

/// A decoded annotation index over an immutable byte buffer.
///
/// The index owns its buffer (in memory or memory-mapped) and is never modified after
/// [`SparseIndex::decode`] returns. It is `Send + Sync`; the only interior mutability is the
/// name pool memo, which tolerates concurrent resolution of the same id.
///
/// # Architecture
///
/// - [`IndexHeader`] - magic, version and class count
/// - [`NamePool`] - span table with per-id memoized strings
/// - [`ClassTable`] - fixed-stride class records and the by-name lookup
///
/// # Examples
///
/// ```rust,no_run
/// use annodex::SparseIndex;
///
/// let index = SparseIndex::from_file("classes.idx")?;
/// println!("{} classes", index.class_count());
///
/// for class in index.known_classes() {
///     println!("{} (0x{:04X})", class.name(), class.flags());
/// }
///
/// for class in index.annotated_classes("javax.inject.Singleton")? {
///     println!("singleton: {}", class.name());
/// }
/// # Ok::<(), annodex::Error>(())
/// ```
pub struct SparseIndex {
    file: File,
    config: DecodeConfig,
    header: IndexHeader,
    pool: NamePool,
    table: ClassTable,
    root: Arc<str>,
}

impl SparseIndex {
    /// Decodes an index from a borrowed buffer, copying it.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the buffer is not a well-formed index. No partial
    /// index is ever returned.
    pub fn decode(bytes: &[u8]) -> Result<SparseIndex> {
        Self::decode_with_config(bytes, DecodeConfig::default())
    }

    /// Decodes an index from a borrowed buffer with explicit validation settings.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the buffer is not a well-formed index.
    pub fn decode_with_config(bytes: &[u8], config: DecodeConfig) -> Result<SparseIndex> {
        Self::load(File::from_mem(bytes.to_vec()), config)
    }

    /// Decodes an index from an owned buffer without copying it.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the buffer is not a well-formed index.
    pub fn from_mem(data: Vec<u8>) -> Result<SparseIndex> {
        Self::from_mem_with_config(data, DecodeConfig::default())
    }

    /// Decodes an index from an owned buffer with explicit validation settings.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the buffer is not a well-formed index.
    pub fn from_mem_with_config(data: Vec<u8>, config: DecodeConfig) -> Result<SparseIndex> {
        Self::load(File::from_mem(data), config)
    }

    /// Memory-maps and decodes the index file at `path`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened, and
    /// [`crate::Error::Malformed`] if its content is not a well-formed index.
    pub fn from_file(path: impl AsRef<Path>) -> Result<SparseIndex> {
        Self::from_file_with_config(path, DecodeConfig::default())
    }

    /// Memory-maps and decodes the index file at `path` with explicit validation settings.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be opened, and
    /// [`crate::Error::Malformed`] if its content is not a well-formed index.
    pub fn from_file_with_config(path: impl AsRef<Path>, config: DecodeConfig) -> Result<SparseIndex> {
        Self::load(File::from_file(path)?, config)
    }

    fn load(file: File, config: DecodeConfig) -> Result<SparseIndex> {
        let data = file.data();
        let mut parser = Parser::new(data);

        let header = IndexHeader::read(&mut parser)?;

        let pool = NamePool::read(&mut parser).map_err(|e| e.into_structural("Name pool"))?;
        if config.validate_names {
            pool.verify(data)
                .map_err(|e| e.into_structural("Name pool"))?;
        }

        let table = ClassTable::read(&mut parser, header.class_count, &pool, &config)
            .map_err(|e| e.into_structural("Class table"))?;

        log::debug!(
            "decoded index: {} classes, {} names, {} bytes (eager validation: {})",
            table.len(),
            pool.len(),
            data.len(),
            config.is_eager()
        );

        Ok(SparseIndex {
            file,
            config,
            header,
            pool,
            table,
            root: Arc::from(ROOT_CLASS_NAME),
        })
    }

    /// The decoded header.
    #[must_use]
    pub fn header(&self) -> &IndexHeader {
        &self.header
    }

    /// The validation settings this index was decoded with.
    #[must_use]
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// The name pool.
    #[must_use]
    pub fn name_pool(&self) -> &NamePool {
        &self.pool
    }

    /// The class table.
    #[must_use]
    pub fn class_table(&self) -> &ClassTable {
        &self.table
    }

    /// The raw buffer.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.file.data()
    }

    /// The buffer owner.
    #[must_use]
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Number of decoded class records.
    #[must_use]
    pub fn class_count(&self) -> usize {
        self.table.len()
    }

    /// Resolves a name pool id.
    ///
    /// # Errors
    /// Returns [`crate::Error::NameResolution`] if `id` is outside the pool, or
    /// [`crate::Error::Malformed`] if the entry is not valid UTF-8.
    pub fn resolve_name(&self, id: u32) -> Result<SparseDotName> {
        let value = self.pool.resolve(self.file.data(), id)?;
        Ok(SparseDotName::new(id, value))
    }

    /// The name reported as superclass of classes stored without one.
    #[must_use]
    pub fn root_name(&self) -> SparseDotName {
        SparseDotName::new(ROOT_SUPER_SENTINEL, self.root.clone())
    }

    /// Returns the view of the class at table position `rid`.
    #[must_use]
    pub fn class(&self, rid: u32) -> Option<SparseClassInfo<'_>> {
        let record = self.table.get(rid)?;
        let name = self.table.name(rid)?;
        Some(SparseClassInfo::new(self, rid, record, name))
    }

    /// One view per class record, in table order.
    ///
    /// The result always has exactly [`SparseIndex::class_count`] entries.
    #[must_use]
    pub fn known_classes(&self) -> Vec<SparseClassInfo<'_>> {
        self.table
            .records()
            .iter()
            .zip(self.table.names())
            .enumerate()
            .map(|(rid, (record, name))| SparseClassInfo::new(self, rid as u32, record, name))
            .collect()
    }

    /// Parallel counterpart of [`SparseIndex::known_classes`].
    pub fn par_known_classes(&self) -> impl IndexedParallelIterator<Item = SparseClassInfo<'_>> {
        self.table
            .records()
            .par_iter()
            .zip(self.table.names().par_iter())
            .enumerate()
            .map(move |(rid, (record, name))| SparseClassInfo::new(self, rid as u32, record, name))
    }

    /// Looks up a class by its fully qualified name.
    #[must_use]
    pub fn class_by_name(&self, name: &str) -> Option<SparseClassInfo<'_>> {
        self.class(self.table.find(name)?)
    }

    /// Classes whose superclass is `name`.
    ///
    /// Asking for the root class name also returns the classes stored without a superclass.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a superclass name is not valid UTF-8.
    pub fn known_direct_subclasses(&self, name: &str) -> Result<Vec<SparseClassInfo<'_>>> {
        let mut subclasses = Vec::new();
        for class in self.known_classes() {
            if class.super_name()? == name {
                subclasses.push(class);
            }
        }

        Ok(subclasses)
    }

    /// Classes that directly list `name` among their interfaces.
    ///
    /// # Errors
    /// Returns the first query-time error encountered while decoding an interface list.
    pub fn known_direct_implementors(&self, name: &str) -> Result<Vec<SparseClassInfo<'_>>> {
        let mut implementors = Vec::new();
        for class in self.known_classes() {
            if class.interface_names()?.iter().any(|interface| interface == name) {
                implementors.push(class);
            }
        }

        Ok(implementors)
    }

    /// Classes carrying the class-level annotation `annotation`.
    ///
    /// # Errors
    /// Returns the first query-time error encountered while decoding an annotation list.
    pub fn annotated_classes(&self, annotation: &str) -> Result<Vec<SparseClassInfo<'_>>> {
        let mut annotated = Vec::new();
        for class in self.known_classes() {
            if class.has_annotation(annotation)? {
                annotated.push(class);
            }
        }

        Ok(annotated)
    }
}

impl std::fmt::Debug for SparseIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SparseIndex")
            .field("header", &self.header)
            .field("pool", &self.pool)
            .field("table", &self.table)
            .finish()
    }
}
