use std::path::Path;

use serde::Serialize;

use crate::{app::GlobalOptions, commands::common::load_index, output::print_output};

#[derive(Debug, Serialize)]
pub struct IndexInfo {
    pub magic: String,
    pub version: u16,
    pub size: usize,
    pub class_count: usize,
    pub name_count: usize,
    pub interface_count: usize,
    pub annotation_count: usize,
    pub root_classes: usize,
    pub strict: bool,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let index = load_index(path, opts)?;
    let header = index.header();

    let classes = index.known_classes();
    let interface_count = classes.iter().filter(|c| c.is_interface()).count();
    let annotation_count = classes.iter().filter(|c| c.is_annotation()).count();
    let root_classes = classes.iter().filter(|c| c.has_root_super()).count();

    let info = IndexInfo {
        magic: format!("0x{:08X}", header.magic),
        version: header.version,
        size: index.data().len(),
        class_count: index.class_count(),
        name_count: index.name_pool().len(),
        interface_count,
        annotation_count,
        root_classes,
        strict: index.config().is_eager(),
    };

    print_output(&info, opts, |info| {
        println!("Magic:           {}", info.magic);
        println!("Version:         {}", info.version);
        println!("Size:            {} bytes", info.size);
        println!("Classes:         {}", info.class_count);
        println!("  interfaces:    {}", info.interface_count);
        println!("  annotations:   {}", info.annotation_count);
        println!("  root classes:  {}", info.root_classes);
        println!("Names:           {}", info.name_count);
        if info.strict {
            println!("Validation:      strict");
        }
    })
}
