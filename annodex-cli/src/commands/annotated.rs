use std::path::Path;

use serde::Serialize;

use crate::{
    app::GlobalOptions,
    commands::common::load_index,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct AnnotatedEntry {
    name: String,
    on_class: bool,
    on_fields: bool,
    on_methods: bool,
}

#[derive(Debug, Serialize)]
struct AnnotatedOutput {
    annotation: String,
    classes: Vec<AnnotatedEntry>,
    count: usize,
}

fn mark(set: bool) -> &'static str {
    if set {
        "x"
    } else {
        ""
    }
}

pub fn run(
    path: &Path,
    annotation: &str,
    members: bool,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let index = load_index(path, opts)?;

    let mut entries = Vec::new();
    if members {
        for class in index.known_classes() {
            let on_class = class.has_annotation(annotation)?;
            let on_fields = class.field_annotations()?.contains(annotation);
            let on_methods = class.method_annotations()?.contains(annotation);

            if on_class || on_fields || on_methods {
                entries.push(AnnotatedEntry {
                    name: class.name().to_string(),
                    on_class,
                    on_fields,
                    on_methods,
                });
            }
        }
    } else {
        for class in index.annotated_classes(annotation)? {
            entries.push(AnnotatedEntry {
                name: class.name().to_string(),
                on_class: true,
                on_fields: false,
                on_methods: false,
            });
        }
    }

    let count = entries.len();
    let output = AnnotatedOutput {
        annotation: annotation.to_string(),
        classes: entries,
        count,
    };

    print_output(&output, opts, |out| {
        let mut tw = TabWriter::new(&[
            ("Class", Align::Left),
            ("Type", Align::Left),
            ("Fields", Align::Left),
            ("Methods", Align::Left),
        ]);
        for e in &out.classes {
            tw.row([
                e.name.as_str(),
                mark(e.on_class),
                mark(e.on_fields),
                mark(e.on_methods),
            ]);
        }
        tw.print();
        println!("\n{} class(es) annotated with {}.", out.count, out.annotation);
    })
}
