use std::path::Path;

use anyhow::Context;
use annodex::{SparseDotName, SparseMemberInfo};
use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::{class_kind, load_index, modifier_keywords},
    output::{print_list, print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct MemberEntry {
    name: String,
    flags: String,
}

#[derive(Debug, Serialize)]
struct ClassDetails {
    name: String,
    kind: String,
    flags: String,
    modifiers: String,
    super_name: String,
    root_super: bool,
    interfaces: Vec<String>,
    annotations: Vec<String>,
    fields: Vec<MemberEntry>,
    field_annotations: Vec<String>,
    methods: Vec<MemberEntry>,
    method_annotations: Vec<String>,
}

fn sorted(names: impl IntoIterator<Item = SparseDotName>) -> Vec<String> {
    let mut names: Vec<String> = names.into_iter().map(|n| n.to_string()).collect();
    names.sort();
    names
}

fn members(list: Vec<SparseMemberInfo>) -> Vec<MemberEntry> {
    list.iter()
        .map(|m| MemberEntry {
            name: m.name().to_string(),
            flags: format!("0x{:04X}", m.flags()),
        })
        .collect()
}

fn print_members(title: &str, members: &[MemberEntry]) {
    println!("{title}:");
    if members.is_empty() {
        println!("  (none)");
        return;
    }

    let mut tw = TabWriter::new(&[("Flags", Align::Left), ("Name", Align::Left)]);
    for m in members {
        tw.row([m.flags.as_str(), m.name.as_str()]);
    }
    tw.print();
}

pub fn run(path: &Path, name: &str, opts: &GlobalOptions) -> anyhow::Result<()> {
    let index = load_index(path, opts)?;
    let class = index
        .class_by_name(name)
        .with_context(|| format!("class not found: {name}"))?;

    let details = ClassDetails {
        name: class.name().to_string(),
        kind: class_kind(class.modifiers()).to_string(),
        flags: format!("0x{:04X}", class.flags()),
        modifiers: modifier_keywords(class.modifiers()),
        super_name: class.super_name()?.to_string(),
        root_super: class.has_root_super(),
        interfaces: class
            .interface_names()?
            .iter()
            .map(ToString::to_string)
            .collect(),
        annotations: sorted(class.class_annotations()?),
        fields: members(class.fields()?),
        field_annotations: sorted(class.field_annotations()?),
        methods: members(class.methods()?),
        method_annotations: sorted(class.method_annotations()?),
    };

    print_output(&details, opts, |d| {
        println!("Class:           {}", d.name);
        println!("Kind:            {}", d.kind);
        println!("Flags:           {} {}", d.flags, d.modifiers);
        if d.root_super {
            println!("Super:           {} (root)", d.super_name);
        } else {
            println!("Super:           {}", d.super_name);
        }
        println!();
        print_list("Interfaces", &d.interfaces);
        print_list("Annotations", &d.annotations);
        println!();
        print_members("Fields", &d.fields);
        print_list("Field annotations", &d.field_annotations);
        println!();
        print_members("Methods", &d.methods);
        print_list("Method annotations", &d.method_annotations);
    })
}
