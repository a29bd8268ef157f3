use std::path::Path;

use annodex::ClassModifiers;
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{class_kind, load_index},
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct ClassEntry {
    rid: u32,
    flags: String,
    kind: String,
    name: String,
    super_name: String,
    interfaces: usize,
    fields: usize,
    methods: usize,
}

#[derive(Debug, Serialize)]
struct ClassesOutput {
    classes: Vec<ClassEntry>,
    count: usize,
}

pub fn run(
    path: &Path,
    package: Option<&str>,
    public_only: bool,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let index = load_index(path, opts)?;

    let mut entries = Vec::new();
    for class in index.known_classes() {
        let name = class.name();

        if public_only && !class.modifiers().contains(ClassModifiers::PUBLIC) {
            continue;
        }

        if let Some(package) = package {
            if name.package() != Some(package) {
                continue;
            }
        }

        entries.push(ClassEntry {
            rid: class.rid(),
            flags: format!("0x{:04X}", class.flags()),
            kind: class_kind(class.modifiers()).to_string(),
            name: name.to_string(),
            super_name: class.super_name()?.to_string(),
            interfaces: class.interface_count(),
            fields: class.field_count(),
            methods: class.method_count(),
        });
    }

    let count = entries.len();
    let output = ClassesOutput {
        classes: entries,
        count,
    };

    print_output(&output, opts, |out| {
        let mut tw = TabWriter::new(&[
            ("RID", Align::Right),
            ("Flags", Align::Left),
            ("Kind", Align::Left),
            ("Name", Align::Left),
            ("Super", Align::Left),
            ("Ifaces", Align::Right),
            ("Fields", Align::Right),
            ("Methods", Align::Right),
        ]);
        for e in &out.classes {
            tw.row([
                e.rid.to_string(),
                e.flags.clone(),
                e.kind.clone(),
                e.name.clone(),
                e.super_name.clone(),
                e.interfaces.to_string(),
                e.fields.to_string(),
                e.methods.to_string(),
            ]);
        }
        tw.print();
        println!("\n{} class(es) listed.", out.count);
    })
}
