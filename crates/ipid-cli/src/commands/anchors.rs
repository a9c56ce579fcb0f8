use ipid_core::anchors::{builtin, load_anchor_table, AnchorTable};
use ipid_core::error::IpidError;
use ipid_core::model::Field;
use std::path::Path;

pub fn list() -> Result<(), IpidError> {
    println!("Available anchor tables:\n");
    for name in builtin::PRESETS {
        let table = builtin::load_preset(name)?;
        println!(
            "  {:<8} {} (v{}), {} sections, {} captures",
            name,
            table.name(),
            table.version(),
            table.sections().count(),
            table.captures().count()
        );
        if let Some(desc) = table.description() {
            println!("           {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn show(preset: &str) -> Result<(), IpidError> {
    let table = builtin::load_preset(preset)?;
    print_table(&table);
    Ok(())
}

pub fn validate(path: &Path) -> Result<(), IpidError> {
    let table = load_anchor_table(path)?;
    println!(
        "{}: valid ({} v{}, {} anchors)",
        path.display(),
        table.name(),
        table.version(),
        table.anchors().len()
    );
    let fed: Vec<Field> = table.anchors().iter().filter_map(|a| a.field).collect();
    let missing: Vec<&str> = Field::ALL
        .iter()
        .filter(|f| !fed.contains(f))
        .map(|f| f.as_str())
        .collect();
    if !missing.is_empty() {
        println!("  note: no anchor feeds {}", missing.join(", "));
    }
    Ok(())
}

fn print_table(table: &AnchorTable) {
    println!("{} (version {})\n", table.name(), table.version());
    if let Some(desc) = table.description() {
        println!("{}\n", desc);
    }

    let width = table
        .anchors()
        .iter()
        .map(|a| a.name.len())
        .max()
        .unwrap_or(12);

    println!("Sections (each one closes every other section):\n");
    for anchor in table.sections() {
        let target = if anchor.field.is_some() {
            anchor.group.to_string()
        } else {
            "boundary only".to_string()
        };
        println!(
            "  {:<width$}  {:<14} {}",
            anchor.name,
            target,
            anchor.regex.as_str(),
            width = width
        );
        print_note(anchor.note.as_deref(), width);
    }

    println!("\nCaptures:\n");
    for anchor in table.captures() {
        let suffix = if anchor.uppercase { " (upper-cased)" } else { "" };
        println!(
            "  {:<width$}  {:<14} {}{}",
            anchor.name,
            anchor.group.to_string(),
            anchor.regex.as_str(),
            suffix,
            width = width
        );
        print_note(anchor.note.as_deref(), width);
    }

    println!("\nPolicies:\n");
    for field in Field::ALL {
        let policy = if field.is_list() {
            "list".to_string()
        } else {
            format!("{:?}", table.policies().get(field))
        };
        let fed = table.anchors().iter().any(|a| a.field == Some(field));
        let marker = if fed { "" } else { "  (no anchor)" };
        println!("  {:<width$}  {}{}", field.as_str(), policy, marker, width = width);
    }
    println!();
}

fn print_note(note: Option<&str>, width: usize) {
    if let Some(note) = note {
        println!("  {:<width$}  note: {}", "", note, width = width);
    }
}
