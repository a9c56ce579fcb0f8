use ipid_core::model::{Field, Group, Ipid};

const GROUPS: [Group; 4] = [
    Group::Insurer,
    Group::Product,
    Group::Coverage,
    Group::Applicability,
];

/// Print a parsed document grouped by section, one field per line.
pub fn print(doc: &Ipid) {
    print!("{}", format_document(doc));
}

pub fn format_document(doc: &Ipid) -> String {
    let mut out = String::new();
    let width = Field::ALL
        .iter()
        .map(|f| f.as_str().len())
        .max()
        .unwrap_or(10);

    for (i, group) in GROUPS.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&format!("=== {} ===\n\n", group));

        for field in Field::ALL.iter().filter(|f| f.group() == *group) {
            let value = if field.is_list() {
                doc.insurer.siren.join(", ")
            } else {
                doc.text(*field).unwrap_or_default().to_string()
            };
            let shown = if value.is_empty() { "-" } else { value.as_str() };
            out.push_str(&format!(
                "  {:<width$}  {}\n",
                field.as_str(),
                shown,
                width = width
            ));
        }
    }

    out
}
